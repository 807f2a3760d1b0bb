//! Pure tic-tac-toe game logic.
//!
//! Board storage lives in [`Board`]; the rules that evaluate a board are
//! free functions in [`rules`] so callers can compose them without owning
//! any game session state.
//!
//! # Example
//!
//! ```
//! use strictly_tictactoe::{Board, Mark, apply_move, check_winner};
//!
//! let mut board = Board::new();
//! for index in [0, 1, 2] {
//!     board = apply_move(&board, index, Mark::X).unwrap();
//! }
//! let win = check_winner(&board).unwrap();
//! assert_eq!(win.mark, Mark::X);
//! assert_eq!(win.line, [0, 1, 2]);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
pub mod rules;
mod types;

pub use action::{MoveError, apply_move};
pub use rules::{LINES, Win, check_winner, is_draw, is_full};
pub use types::{BOARD_SIZE, Board, Mark, Square};
