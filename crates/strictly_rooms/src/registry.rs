//! In-memory room store.

use crate::code::RoomCode;
use crate::random::RandomSource;
use crate::room::Room;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// Rooms idle longer than this are evicted by the sweep.
pub const DEFAULT_ROOM_TTL: Duration = Duration::from_secs(10 * 60);

/// How often the sweep runs.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Maps room codes to live rooms.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, Room>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fresh room under a code no live room uses.
    #[instrument(skip(self, rng, now))]
    pub fn create_room(&mut self, rng: &mut dyn RandomSource, now: Instant) -> &mut Room {
        let code = loop {
            let candidate = RoomCode::generate(rng);
            if !self.rooms.contains_key(&candidate) {
                break candidate;
            }
            debug!(code = %candidate, "Room code collision, retrying");
        };
        self.rooms
            .entry(code.clone())
            .or_insert_with(|| Room::new(code, now))
    }

    /// Looks up a room by user-supplied code (case-insensitive, trimmed).
    #[instrument(skip(self))]
    pub fn lookup(&self, input: &str) -> Option<&Room> {
        RoomCode::parse(input).and_then(|code| self.rooms.get(&code))
    }

    /// Room under an already normalized code.
    pub fn get(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    /// Mutable room under an already normalized code.
    pub fn get_mut(&mut self, code: &RoomCode) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    /// Removes a room. Removing an absent room is a no-op.
    #[instrument(skip(self))]
    pub fn remove(&mut self, code: &RoomCode) -> Option<Room> {
        let room = self.rooms.remove(code);
        if room.is_some() {
            info!(room = %code, "Room destroyed");
        }
        room
    }

    /// Evicts every room idle for more than `ttl` as of `now`.
    #[instrument(skip(self, now))]
    pub fn sweep(&mut self, now: Instant, ttl: Duration) -> Vec<Room> {
        let expired: Vec<RoomCode> = self
            .rooms
            .iter()
            .filter(|(_, room)| now.saturating_duration_since(*room.last_activity()) > ttl)
            .map(|(code, _)| code.clone())
            .collect();
        let evicted: Vec<Room> = expired
            .iter()
            .filter_map(|code| self.rooms.remove(code))
            .collect();
        if !evicted.is_empty() {
            info!(evicted = evicted.len(), remaining = self.rooms.len(), "Swept idle rooms");
        }
        evicted
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether no rooms are live.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;

    #[test]
    fn test_create_retries_on_collision() {
        // First two draws both spell AAAA; the second room must retry.
        let mut rng = ScriptedRandom::new().with_picks([0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1]);
        let mut registry = RoomRegistry::new();
        let now = Instant::now();
        let first = registry.create_room(&mut rng, now).code().clone();
        let second = registry.create_room(&mut rng, now).code().clone();
        assert_eq!(first.as_str(), "AAAA");
        assert_eq!(second.as_str(), "BBBB");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_lookup_is_case_insensitive_and_trimmed() {
        let mut rng = ScriptedRandom::new().with_picks([0, 1, 2, 3]);
        let mut registry = RoomRegistry::new();
        registry.create_room(&mut rng, Instant::now());
        assert!(registry.lookup(" abcd ").is_some());
        assert!(registry.lookup("ABCE").is_none());
        assert!(registry.lookup("").is_none());
    }

    #[test]
    fn test_sweep_evicts_only_idle_rooms() {
        let mut rng = ScriptedRandom::new().with_picks([0, 0, 0, 0, 1, 1, 1, 1]);
        let mut registry = RoomRegistry::new();
        let start = Instant::now();
        let stale = registry.create_room(&mut rng, start).code().clone();
        let fresh = registry.create_room(&mut rng, start).code().clone();
        let later = start + DEFAULT_ROOM_TTL + Duration::from_secs(1);
        if let Some(room) = registry.get_mut(&fresh) {
            room.touch(later - Duration::from_secs(5));
        }

        let evicted = registry.sweep(later, DEFAULT_ROOM_TTL);
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].code(), &stale);
        assert!(registry.get(&stale).is_none());
        assert!(registry.get(&fresh).is_some());

        // Revisiting is harmless.
        assert!(registry.sweep(later, DEFAULT_ROOM_TTL).is_empty());
    }

    #[test]
    fn test_remove_twice_is_harmless() {
        let mut rng = ScriptedRandom::new();
        let mut registry = RoomRegistry::new();
        let code = registry.create_room(&mut rng, Instant::now()).code().clone();
        assert!(registry.remove(&code).is_some());
        assert!(registry.remove(&code).is_none());
        assert!(registry.is_empty());
    }
}
