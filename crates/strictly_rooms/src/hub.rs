//! Session handling: the per-connection state machine over shared rooms.
//!
//! A [`Hub`] owns every room and every connection's seat. Each call runs to
//! completion, including the outbound broadcast, so operations on a room
//! never interleave as long as the hub sits behind a single lock.

use crate::code::RoomCode;
use crate::error::SessionError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::random::RandomSource;
use crate::registry::{DEFAULT_ROOM_TTL, RoomRegistry};
use crate::room::Room;
use crate::scheduler::{GraceTimer, Scheduler, TimerId};
use derive_getters::Getters;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use strictly_tictactoe::Mark;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, trace, warn};

/// Default time a vacated slot stays reserved.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(60);

/// Reason sent with `roomClosed` when a grace window runs out.
pub const NO_RECONNECT_REASON: &str = "Opponent did not reconnect in time";

/// Identifier the hub assigns to each connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("conn-{}", _0)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Wraps a raw id.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Outbound half of a connection. Sends never block.
pub type Outbound = mpsc::UnboundedSender<ServerMessage>;

/// The (room, symbol) pair a connection currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    /// Room the connection is bound to.
    pub code: RoomCode,
    /// Symbol slot it holds.
    pub mark: Mark,
}

#[derive(Debug)]
struct Connection {
    outbound: Outbound,
    seat: Option<Seat>,
}

/// Timing knobs for a hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct HubSettings {
    grace_period: Duration,
    room_ttl: Duration,
}

impl HubSettings {
    /// Creates settings from explicit durations.
    pub fn new(grace_period: Duration, room_ttl: Duration) -> Self {
        Self {
            grace_period,
            room_ttl,
        }
    }
}

impl Default for HubSettings {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE_PERIOD, DEFAULT_ROOM_TTL)
    }
}

/// Rooms, connections and the rules that tie them together.
pub struct Hub {
    registry: RoomRegistry,
    connections: HashMap<ConnectionId, Connection>,
    rng: Box<dyn RandomSource>,
    scheduler: Box<dyn Scheduler>,
    settings: HubSettings,
    next_connection: u64,
    next_timer: u64,
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("rooms", &self.registry.len())
            .field("connections", &self.connections.len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Hub {
    /// Creates a hub with injected randomness and timers.
    #[instrument(skip(rng, scheduler))]
    pub fn new(
        rng: Box<dyn RandomSource>,
        scheduler: Box<dyn Scheduler>,
        settings: HubSettings,
    ) -> Self {
        info!("Creating hub");
        Self {
            registry: RoomRegistry::new(),
            connections: HashMap::new(),
            rng,
            scheduler,
            settings,
            next_connection: 0,
            next_timer: 0,
        }
    }

    /// Live room under `code`.
    pub fn room(&self, code: &RoomCode) -> Option<&Room> {
        self.registry.get(code)
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of registered connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Seat held by `conn`, if bound.
    pub fn seat(&self, conn: ConnectionId) -> Option<&Seat> {
        self.connections.get(&conn).and_then(|c| c.seat.as_ref())
    }

    /// Registers a new, unbound connection.
    #[instrument(skip(self, outbound))]
    pub fn connect(&mut self, outbound: Outbound) -> ConnectionId {
        self.next_connection += 1;
        let id = ConnectionId(self.next_connection);
        self.connections.insert(
            id,
            Connection {
                outbound,
                seat: None,
            },
        );
        info!(conn = %id, "Connection registered");
        id
    }

    /// Dispatches one inbound message. Rejections go back to `conn` as `error`.
    #[instrument(skip(self, conn, now), fields(conn = %conn))]
    pub fn handle(&mut self, conn: ConnectionId, msg: ClientMessage, now: Instant) {
        let result = match msg {
            ClientMessage::Create => self.create(conn, now),
            ClientMessage::Join { code } => self.join(conn, &code, now),
            ClientMessage::Move { index } => {
                self.play(conn, ClientMessage::move_index(&index), now)
            }
            ClientMessage::Reset => {
                self.restart(conn, false, now);
                Ok(())
            }
            ClientMessage::New => {
                self.restart(conn, true, now);
                Ok(())
            }
        };
        if let Err(e) = result {
            debug!(error = %e, "Request rejected");
            self.send(
                conn,
                ServerMessage::Error {
                    message: e.to_string(),
                },
            );
        }
    }

    /// Opens a room and seats `conn` in a random slot.
    #[instrument(skip(self, conn, now), fields(conn = %conn))]
    pub fn create(&mut self, conn: ConnectionId, now: Instant) -> Result<(), SessionError> {
        if !self.connections.contains_key(&conn) {
            warn!("Create from unknown connection");
            return Ok(());
        }
        self.leave_current(conn);

        let mark = if self.rng.coin_flip() { Mark::X } else { Mark::O };
        let room = self.registry.create_room(self.rng.as_mut(), now);
        room.set_player(mark, Some(conn));
        let code = room.code().clone();

        self.bind(conn, Seat {
            code: code.clone(),
            mark,
        });
        info!(room = %code, ?mark, "Room created");
        self.send(
            conn,
            ServerMessage::Created {
                code: code.clone(),
                symbol: mark,
            },
        );
        self.broadcast(&code);
        Ok(())
    }

    /// Seats `conn` in the first open slot of the room named by `input`.
    #[instrument(skip(self, conn, now), fields(conn = %conn))]
    pub fn join(&mut self, conn: ConnectionId, input: &str, now: Instant) -> Result<(), SessionError> {
        if !self.connections.contains_key(&conn) {
            warn!("Join from unknown connection");
            return Ok(());
        }
        let room = self.registry.lookup(input).ok_or(SessionError::RoomNotFound)?;
        let code = room.code().clone();

        if let Some(seat) = self.seat(conn).filter(|seat| seat.code == code) {
            // Already seated here; repeat the confirmation.
            let mark = seat.mark;
            debug!(room = %code, ?mark, "Join for current room");
            self.send(conn, ServerMessage::Joined { code: code.clone(), symbol: mark });
            self.broadcast(&code);
            return Ok(());
        }
        if room.open_slot().is_none() {
            debug!(room = %code, "Room is full");
            return Err(SessionError::RoomFull);
        }

        self.leave_current(conn);

        let Some(room) = self.registry.get_mut(&code) else {
            return Err(SessionError::RoomNotFound);
        };
        let mark = room.open_slot().ok_or(SessionError::RoomFull)?;
        room.set_player(mark, Some(conn));
        room.touch(now);
        if let Some(id) = room.set_disconnect_timer(mark, None) {
            debug!(room = %code, timer = %id, "Slot reclaimed within grace window");
            self.scheduler.cancel(&GraceTimer {
                code: code.clone(),
                id,
            });
        }

        self.bind(conn, Seat {
            code: code.clone(),
            mark,
        });
        info!(room = %code, ?mark, "Player joined");
        self.send(conn, ServerMessage::Joined { code: code.clone(), symbol: mark });
        self.broadcast(&code);
        Ok(())
    }

    /// Places the sender's symbol at `index`.
    #[instrument(skip(self, conn, now), fields(conn = %conn))]
    pub fn play(
        &mut self,
        conn: ConnectionId,
        index: Option<usize>,
        now: Instant,
    ) -> Result<(), SessionError> {
        let Some(Seat { code, mark }) = self.seat(conn).cloned() else {
            debug!("Move from unbound connection");
            return Err(SessionError::RoomNotFound);
        };
        let Some(room) = self.registry.get_mut(&code) else {
            debug!(room = %code, "Move for a room that is gone");
            self.unbind(conn);
            return Err(SessionError::RoomNotFound);
        };
        room.play(mark, index, now)?;
        self.broadcast(&code);
        Ok(())
    }

    /// Clears the board, optionally the scores, and reshuffles symbols.
    ///
    /// Does nothing when `conn` is unbound or its room no longer exists.
    #[instrument(skip(self, conn, now), fields(conn = %conn))]
    pub fn restart(&mut self, conn: ConnectionId, clear_scores: bool, now: Instant) {
        let Some(code) = self.seat(conn).map(|seat| seat.code.clone()) else {
            trace!("Restart from unbound connection");
            return;
        };
        let swap = self.rng.coin_flip();
        let Some(room) = self.registry.get_mut(&code) else {
            trace!(room = %code, "Restart for a room that is gone");
            self.unbind(conn);
            return;
        };

        room.reset_board();
        if clear_scores {
            room.clear_scores();
        }
        if swap {
            room.swap_slots();
        }
        room.touch(now);
        let holders: Vec<(Mark, ConnectionId)> = [Mark::X, Mark::O]
            .into_iter()
            .filter_map(|mark| room.player(mark).map(|holder| (mark, holder)))
            .collect();
        info!(room = %code, clear_scores, swap, "Round restarted");

        for (mark, holder) in holders {
            self.bind(holder, Seat {
                code: code.clone(),
                mark,
            });
            self.send(holder, ServerMessage::SymbolUpdate { symbol: mark });
        }
        self.broadcast(&code);
    }

    /// Drops a connection, reserving its slot for the grace period.
    #[instrument(skip(self, conn), fields(conn = %conn))]
    pub fn disconnect(&mut self, conn: ConnectionId) {
        let Some(connection) = self.connections.remove(&conn) else {
            return;
        };
        info!("Connection closed");
        if let Some(seat) = connection.seat {
            self.vacate(conn, seat);
        }
    }

    /// Handles a fired grace timer.
    ///
    /// Destroys the room if the timer is still the one pending on a slot
    /// and that slot is still empty. Superseded timers are ignored.
    #[instrument(skip(self, timer), fields(room = %timer.code, timer = %timer.id))]
    pub fn expire_grace(&mut self, timer: GraceTimer) {
        let Some(room) = self.registry.get_mut(&timer.code) else {
            trace!("Grace timer for a room that is gone");
            return;
        };
        let Some(mark) = room.timer_slot(timer.id) else {
            trace!("Grace timer superseded");
            return;
        };
        room.set_disconnect_timer(mark, None);
        if room.player(mark).is_some() {
            trace!(?mark, "Slot already reclaimed");
            return;
        }

        info!(?mark, "Grace window expired, closing room");
        let remaining: Vec<ConnectionId> = [Mark::X, Mark::O]
            .into_iter()
            .filter_map(|m| room.player(m))
            .collect();
        for holder in remaining {
            self.send(
                holder,
                ServerMessage::RoomClosed {
                    reason: NO_RECONNECT_REASON.to_string(),
                },
            );
        }
        if let Some(room) = self.registry.remove(&timer.code) {
            self.discard(room);
        }
    }

    /// Evicts rooms idle longer than the TTL. Returns how many went.
    #[instrument(skip(self, now))]
    pub fn sweep(&mut self, now: Instant) -> usize {
        let evicted = self.registry.sweep(now, self.settings.room_ttl);
        let count = evicted.len();
        for room in evicted {
            self.discard(room);
        }
        count
    }

    /// Releases `conn`'s current seat, if any, as though it had disconnected.
    fn leave_current(&mut self, conn: ConnectionId) {
        let Some(seat) = self.connections.get_mut(&conn).and_then(|c| c.seat.take()) else {
            return;
        };
        debug!(room = %seat.code, mark = ?seat.mark, "Leaving current room");
        self.vacate(conn, seat);
    }

    /// Empties `seat` and starts its grace window.
    fn vacate(&mut self, conn: ConnectionId, seat: Seat) {
        let Seat { code, mark } = seat;
        let Some(room) = self.registry.get_mut(&code) else {
            return;
        };
        if room.player(mark) != Some(conn) {
            return;
        }
        room.set_player(mark, None);

        self.next_timer += 1;
        let id = TimerId::new(self.next_timer);
        if let Some(previous) = room.set_disconnect_timer(mark, Some(id)) {
            self.scheduler.cancel(&GraceTimer {
                code: code.clone(),
                id: previous,
            });
        }
        let opponent = room.player(mark.opponent());

        info!(room = %code, ?mark, timer = %id, "Slot vacated, grace window started");
        self.scheduler.schedule(
            GraceTimer {
                code: code.clone(),
                id,
            },
            self.settings.grace_period,
        );
        if let Some(opponent) = opponent {
            self.send(
                opponent,
                ServerMessage::OpponentLeft {
                    grace_period: self.settings.grace_period.as_secs(),
                },
            );
        }
        self.broadcast(&code);
    }

    /// Cancels a destroyed room's timers and unbinds everyone seated in it.
    fn discard(&mut self, room: Room) {
        for mark in [Mark::X, Mark::O] {
            if let Some(id) = room.disconnect_timer(mark) {
                self.scheduler.cancel(&GraceTimer {
                    code: room.code().clone(),
                    id,
                });
            }
        }
        for connection in self.connections.values_mut() {
            if connection.seat.as_ref().is_some_and(|s| &s.code == room.code()) {
                connection.seat = None;
            }
        }
    }

    fn bind(&mut self, conn: ConnectionId, seat: Seat) {
        if let Some(connection) = self.connections.get_mut(&conn) {
            connection.seat = Some(seat);
        }
    }

    fn unbind(&mut self, conn: ConnectionId) {
        if let Some(connection) = self.connections.get_mut(&conn) {
            connection.seat = None;
        }
    }

    /// Sends each slot-holder of `code` its own view of the room.
    fn broadcast(&self, code: &RoomCode) {
        let Some(room) = self.registry.get(code) else {
            return;
        };
        for mark in [Mark::X, Mark::O] {
            if let Some(holder) = room.player(mark) {
                self.send(holder, ServerMessage::State(room.view_for(mark)));
            }
        }
    }

    /// Fire-and-forget delivery. Missing or closed connections are skipped.
    fn send(&self, conn: ConnectionId, msg: ServerMessage) {
        let Some(connection) = self.connections.get(&conn) else {
            trace!(conn = %conn, "Send to unknown connection skipped");
            return;
        };
        if connection.outbound.is_closed() {
            trace!(conn = %conn, "Send to closed connection skipped");
            return;
        }
        if connection.outbound.send(msg).is_err() {
            debug!(conn = %conn, "Outbound channel closed during send");
        }
    }
}
