//! Cancellable reconnection timers.
//!
//! The hub decides when a grace window starts and ends; a [`Scheduler`]
//! only has to wake it up later. A timer that fires after being cancelled
//! is harmless because the hub checks the id against the room first.

use crate::code::RoomCode;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, instrument, trace};

/// Identifier of one scheduled grace window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("timer-{}", _0)]
pub struct TimerId(u64);

impl TimerId {
    /// Wraps a raw id.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// A grace window for one slot of one room.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraceTimer {
    /// Room the vacated slot belongs to.
    pub code: RoomCode,
    /// Timer identity, stored on the room while pending.
    pub id: TimerId,
}

/// Runs grace timers on behalf of the hub.
pub trait Scheduler: Send {
    /// Arranges for `timer` to be delivered back after `delay`.
    fn schedule(&mut self, timer: GraceTimer, delay: Duration);

    /// Drops a pending timer. Unknown or already fired timers are ignored.
    fn cancel(&mut self, timer: &GraceTimer);
}

/// Spawns one sleeping tokio task per timer.
///
/// Fired timers are sent on the channel returned by [`TokioScheduler::new`];
/// the server feeds them into [`Hub::expire_grace`](crate::Hub::expire_grace).
#[derive(Debug)]
pub struct TokioScheduler {
    fired: mpsc::UnboundedSender<GraceTimer>,
    tasks: HashMap<TimerId, AbortHandle>,
}

impl TokioScheduler {
    /// Creates a scheduler and the receiver its timers fire into.
    ///
    /// Must be used from within a tokio runtime.
    #[instrument]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<GraceTimer>) {
        let (fired, rx) = mpsc::unbounded_channel();
        (
            Self {
                fired,
                tasks: HashMap::new(),
            },
            rx,
        )
    }

    /// Number of timers still sleeping.
    pub fn pending(&self) -> usize {
        self.tasks.values().filter(|t| !t.is_finished()).count()
    }
}

impl Scheduler for TokioScheduler {
    #[instrument(skip(self, timer), fields(room = %timer.code, timer = %timer.id))]
    fn schedule(&mut self, timer: GraceTimer, delay: Duration) {
        self.tasks.retain(|_, task| !task.is_finished());
        let id = timer.id;
        let fired = self.fired.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            trace!(room = %timer.code, timer = %timer.id, "Grace timer fired");
            // The receiver only goes away at shutdown.
            let _ = fired.send(timer);
        });
        self.tasks.insert(id, task.abort_handle());
        debug!(?delay, "Grace timer scheduled");
    }

    #[instrument(skip(self, timer), fields(room = %timer.code, timer = %timer.id))]
    fn cancel(&mut self, timer: &GraceTimer) {
        if let Some(task) = self.tasks.remove(&timer.id) {
            task.abort();
            debug!("Grace timer cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer(id: u64) -> GraceTimer {
        GraceTimer {
            code: RoomCode::parse("WXYZ").unwrap(),
            id: TimerId::new(id),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_delay() {
        let (mut scheduler, mut fired) = TokioScheduler::new();
        scheduler.schedule(timer(1), Duration::from_secs(60));
        assert_eq!(scheduler.pending(), 1);

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert!(fired.try_recv().is_err());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.recv().await, Some(timer(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timer_never_fires() {
        let (mut scheduler, mut fired) = TokioScheduler::new();
        scheduler.schedule(timer(1), Duration::from_secs(60));
        scheduler.schedule(timer(2), Duration::from_secs(60));
        scheduler.cancel(&timer(1));
        assert_eq!(scheduler.pending(), 1);

        // Unknown and repeated cancels are ignored.
        scheduler.cancel(&timer(1));
        scheduler.cancel(&timer(7));
        assert_eq!(scheduler.pending(), 1);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(fired.recv().await, Some(timer(2)));
        assert!(fired.try_recv().is_err());
    }
}
