//! Strictly Rooms - two-player tic-tac-toe over WebSocket.
//!
//! Clients create or join a room by its four-character code, exchange
//! moves, and receive authoritative state after every change.
//!
//! # Architecture
//!
//! - **Registry**: live rooms keyed by [`RoomCode`], with an inactivity sweep
//! - **Room**: board, turn, scores and the two symbol slots
//! - **Hub**: the session handler applying client messages to rooms and
//!   broadcasting per-player views
//! - **Scheduler**: cancellable reconnection grace timers
//! - **Server**: axum WebSocket endpoint driving a shared [`Hub`]
//!
//! # Example
//!
//! ```
//! use std::time::Instant;
//! use strictly_rooms::{ClientMessage, Hub, HubSettings, ScriptedRandom, ServerMessage};
//! # use strictly_rooms::{GraceTimer, Scheduler};
//! # struct NoTimers;
//! # impl Scheduler for NoTimers {
//! #     fn schedule(&mut self, _: GraceTimer, _: std::time::Duration) {}
//! #     fn cancel(&mut self, _: &GraceTimer) {}
//! # }
//!
//! let mut hub = Hub::new(
//!     Box::new(ScriptedRandom::new().with_flips([true])),
//!     Box::new(NoTimers),
//!     HubSettings::default(),
//! );
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let conn = hub.connect(tx);
//! hub.handle(conn, ClientMessage::Create, Instant::now());
//!
//! assert!(matches!(rx.try_recv(), Ok(ServerMessage::Created { .. })));
//! assert!(matches!(rx.try_recv(), Ok(ServerMessage::State(_))));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod code;
mod config;
mod error;
mod hub;
mod protocol;
mod random;
mod registry;
mod room;
mod scheduler;
pub mod server;

// Crate-level exports - Room codes
pub use code::{ROOM_CODE_ALPHABET, ROOM_CODE_LEN, RoomCode};

// Crate-level exports - Configuration
pub use config::ServerConfig;

// Crate-level exports - Errors
pub use error::{ConfigError, SessionError};

// Crate-level exports - Session handling
pub use hub::{
    ConnectionId, DEFAULT_GRACE_PERIOD, Hub, HubSettings, NO_RECONNECT_REASON, Outbound, Seat,
};

// Crate-level exports - Wire protocol
pub use protocol::{ClientMessage, ServerMessage, StateView};

// Crate-level exports - Randomness
pub use random::{RandomSource, ScriptedRandom, ThreadRandom};

// Crate-level exports - Rooms
pub use registry::{DEFAULT_ROOM_TTL, DEFAULT_SWEEP_INTERVAL, RoomRegistry};
pub use room::{MoveOutcome, PerMark, Room, Scores};

// Crate-level exports - Timers
pub use scheduler::{GraceTimer, Scheduler, TimerId, TokioScheduler};

// Crate-level exports - Game types
pub use strictly_tictactoe::{Board, Mark, Square};
