//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`](crate::Board). Nothing here holds state
//! between calls.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::{LINES, Win, check_winner};
