//! Core domain types for tic-tac-toe.

use serde::{Deserialize, Serialize};

/// Number of cells on the board.
pub const BOARD_SIZE: usize = 9;

/// A player's symbol.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
)]
pub enum Mark {
    /// Symbol X (moves first in every round).
    X,
    /// Symbol O.
    O,
}

impl Mark {
    /// Returns the opposing symbol.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// A single cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Square {
    /// Nothing placed yet.
    #[default]
    Empty,
    /// Holds a symbol.
    Occupied(Mark),
}

impl Square {
    /// Returns the symbol in this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Square::Empty => None,
            Square::Occupied(mark) => Some(mark),
        }
    }
}

// Serialized as `null`, `"X"` or `"O"` so a board reads as a plain array.
impl Serialize for Square {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.mark().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<Mark>::deserialize(deserializer)?.map_or(Square::Empty, Square::Occupied))
    }
}

/// 3x3 tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    /// Squares in row-major order (0-8).
    squares: [Square; BOARD_SIZE],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the square at the given index, `None` when out of range.
    pub fn get(&self, index: usize) -> Option<Square> {
        self.squares.get(index).copied()
    }

    /// Checks if the square at `index` exists and is empty.
    pub fn is_empty(&self, index: usize) -> bool {
        matches!(self.get(index), Some(Square::Empty))
    }

    /// Returns all squares.
    pub fn squares(&self) -> &[Square; BOARD_SIZE] {
        &self.squares
    }

    /// Number of occupied squares.
    pub fn occupied(&self) -> usize {
        self.squares.iter().filter(|s| **s != Square::Empty).count()
    }

    /// Writes a square without validation. Only rules in this crate call it.
    pub(crate) fn set(&mut self, index: usize, square: Square) {
        self.squares[index] = square;
    }

    /// Builds a board from a row-major template of `X`, `O` and `.`.
    ///
    /// Characters other than those three are ignored, so `"XO./.../..."`
    /// style layouts are fine.
    pub fn from_template(template: &str) -> Self {
        let mut board = Self::new();
        let cells = template
            .chars()
            .filter_map(|c| match c {
                'X' | 'x' => Some(Square::Occupied(Mark::X)),
                'O' | 'o' => Some(Square::Occupied(Mark::O)),
                '.' => Some(Square::Empty),
                _ => None,
            })
            .take(BOARD_SIZE);
        for (index, square) in cells.enumerate() {
            board.set(index, square);
        }
        board
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..3 {
            for col in 0..3 {
                let pos = row * 3 + col;
                match self.squares[pos] {
                    Square::Empty => write!(f, "{}", pos + 1)?,
                    Square::Occupied(mark) => write!(f, "{mark}")?,
                }
                if col < 2 {
                    write!(f, "|")?;
                }
            }
            if row < 2 {
                write!(f, "\n-+-+-\n")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_serializes_as_nullable_array() {
        let board = Board::from_template("X.. .O. ...");
        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(json, r#"["X",null,null,null,"O",null,null,null,null]"#);
    }

    #[test]
    fn test_template_ignores_separators() {
        let board = Board::from_template("XOX/OXO/...");
        assert_eq!(board.occupied(), 6);
        assert_eq!(board.get(4), Some(Square::Occupied(Mark::X)));
        assert!(board.is_empty(8));
    }

    #[test]
    fn test_display_numbers_empty_squares() {
        let board = Board::from_template("X........");
        assert!(board.to_string().starts_with("X|2|3"));
    }
}
