//! JSON wire messages exchanged over the WebSocket.
//!
//! Every frame is a JSON object with a `type` discriminator.

use crate::code::RoomCode;
use crate::room::Scores;
use serde::{Deserialize, Serialize};
use strictly_tictactoe::{BOARD_SIZE, Board, Mark};
use tracing::{debug, instrument};

/// Message from a client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Open a new room and take a random slot in it.
    Create,
    /// Take the first open slot in an existing room.
    Join {
        /// Room code, any case, surrounding whitespace allowed.
        code: String,
    },
    /// Place the sender's symbol.
    Move {
        /// Board index 0-8. Anything else is an invalid move.
        #[serde(default)]
        index: serde_json::Value,
    },
    /// Start a new round keeping scores.
    Reset,
    /// Start a new round and zero the scores.
    New,
}

impl ClientMessage {
    /// Parses a text frame. Unparseable frames yield `None` and are dropped.
    #[instrument(skip(text), fields(len = text.len()))]
    pub fn parse(text: &str) -> Option<Self> {
        match serde_json::from_str(text) {
            Ok(msg) => Some(msg),
            Err(e) => {
                debug!(error = %e, "Dropping malformed message");
                None
            }
        }
    }

    /// Board index carried by a `move`, if it is a non-negative integer.
    ///
    /// Integral floats such as `4.0` count, since JSON clients cannot
    /// always tell them apart from `4`.
    pub fn move_index(index: &serde_json::Value) -> Option<usize> {
        if let Some(i) = index.as_u64() {
            return usize::try_from(i).ok();
        }
        index
            .as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f < BOARD_SIZE as f64)
            .map(|f| f as usize)
    }
}

/// Message to a client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// A room was created for the requester.
    Created {
        /// Code to share with the opponent.
        code: RoomCode,
        /// Requester's symbol.
        symbol: Mark,
    },
    /// The requester joined a room.
    Joined {
        /// Joined room.
        code: RoomCode,
        /// Requester's symbol.
        symbol: Mark,
    },
    /// Full room view for the recipient.
    State(StateView),
    /// A request was rejected.
    Error {
        /// Human-readable reason.
        message: String,
    },
    /// The opponent disconnected and may come back.
    #[serde(rename_all = "camelCase")]
    OpponentLeft {
        /// Seconds the opponent has to reconnect.
        grace_period: u64,
    },
    /// The room was destroyed.
    RoomClosed {
        /// Why the room is gone.
        reason: String,
    },
    /// The recipient's symbol after a reshuffle.
    SymbolUpdate {
        /// New symbol.
        symbol: Mark,
    },
}

/// Room state tailored to one slot-holder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateView {
    /// Nine cells, `"X"`, `"O"` or `null`.
    pub board: Board,
    /// Symbol to move next.
    pub current_player: Mark,
    /// Winner of the round, if decided by a line.
    pub winner: Option<Mark>,
    /// Indices of the winning line.
    pub winning_line: Option<[usize; 3]>,
    /// Round ended with a full board.
    pub is_draw: bool,
    /// Running scores.
    pub scores: Scores,
    /// Recipient's symbol.
    pub your_symbol: Mark,
    /// Whether the other slot is held.
    pub opponent_connected: bool,
    /// Occupied slots (0-2).
    pub player_count: usize,
}
