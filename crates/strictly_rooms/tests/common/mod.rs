//! Shared fixtures for hub integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;
use strictly_rooms::{
    ConnectionId, GraceTimer, Hub, HubSettings, RoomCode, Scheduler, ScriptedRandom,
    ServerMessage, StateView,
};
use tokio::sync::mpsc;

/// What a [`RecordingScheduler`] was asked to do.
#[derive(Debug, Default)]
pub struct TimerLog {
    pub scheduled: Vec<(GraceTimer, Duration)>,
    pub cancelled: Vec<GraceTimer>,
}

impl TimerLog {
    /// Scheduled timers that were never cancelled.
    pub fn pending(&self) -> Vec<GraceTimer> {
        self.scheduled
            .iter()
            .map(|(timer, _)| timer.clone())
            .filter(|timer| !self.cancelled.contains(timer))
            .collect()
    }
}

/// Scheduler that only records; tests fire timers by hand.
#[derive(Debug, Clone, Default)]
pub struct RecordingScheduler {
    pub log: Arc<Mutex<TimerLog>>,
}

impl Scheduler for RecordingScheduler {
    fn schedule(&mut self, timer: GraceTimer, delay: Duration) {
        self.log.lock().unwrap().scheduled.push((timer, delay));
    }

    fn cancel(&mut self, timer: &GraceTimer) {
        self.log.lock().unwrap().cancelled.push(timer.clone());
    }
}

/// A hub driven by `rng` and a [`RecordingScheduler`].
///
/// Without scripted picks every generated room code is `AAAA`.
pub fn hub_with(rng: ScriptedRandom) -> (Hub, Arc<Mutex<TimerLog>>) {
    let scheduler = RecordingScheduler::default();
    let log = scheduler.log.clone();
    let hub = Hub::new(Box::new(rng), Box::new(scheduler), HubSettings::default());
    (hub, log)
}

/// One fake connection.
pub struct Client {
    pub id: ConnectionId,
    rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Client {
    pub fn connect(hub: &mut Hub) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = hub.connect(tx);
        Self { id, rx }
    }

    /// Everything queued for this client so far.
    pub fn drain(&mut self) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Last `state` among the queued messages, draining the queue.
    pub fn last_state(&mut self) -> Option<StateView> {
        self.drain().into_iter().rev().find_map(|msg| match msg {
            ServerMessage::State(view) => Some(view),
            _ => None,
        })
    }
}

/// The error message text sent to a client, if the queue holds exactly one error.
pub fn only_error(messages: &[ServerMessage]) -> Option<&str> {
    match messages {
        [ServerMessage::Error { message }] => Some(message.as_str()),
        _ => None,
    }
}

pub fn code(raw: &str) -> RoomCode {
    RoomCode::parse(raw).unwrap()
}
