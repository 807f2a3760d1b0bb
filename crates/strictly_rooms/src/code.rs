//! Short room codes.

use crate::random::RandomSource;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Characters a room code is drawn from: no 0/O or 1/I.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of every room code.
pub const ROOM_CODE_LEN: usize = 4;

/// Four-character, upper-case room identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Normalizes user input into a code.
    ///
    /// Surrounding whitespace is trimmed and letters are upper-cased. Returns
    /// `None` when the result is not [`ROOM_CODE_LEN`] alphabet characters,
    /// since no room could ever be registered under it.
    #[instrument]
    pub fn parse(input: &str) -> Option<Self> {
        let normalized = input.trim().to_ascii_uppercase();
        let valid = normalized.len() == ROOM_CODE_LEN
            && normalized.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b));
        valid.then_some(Self(normalized))
    }

    /// Draws a fresh random code.
    pub fn generate(rng: &mut dyn RandomSource) -> Self {
        let code = (0..ROOM_CODE_LEN)
            .map(|_| char::from(ROOM_CODE_ALPHABET[rng.pick(ROOM_CODE_ALPHABET.len())]))
            .collect();
        Self(code)
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RoomCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
