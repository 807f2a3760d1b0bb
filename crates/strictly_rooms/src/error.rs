//! Error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Rejection reported back to the connection that sent a message.
///
/// None of these close the connection or affect the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum SessionError {
    /// No live room has the requested code.
    #[display("Room not found")]
    RoomNotFound,
    /// Both symbol slots are occupied.
    #[display("Room is full")]
    RoomFull,
    /// The sender's symbol is not the one to move.
    #[display("Not your turn")]
    NotYourTurn,
    /// Index out of range, square occupied, or round already decided.
    #[display("Invalid move")]
    InvalidMove,
}

/// Configuration error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
