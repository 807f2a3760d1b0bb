//! Move application.

use super::types::{BOARD_SIZE, Board, Mark, Square};
use tracing::instrument;

/// Error that can occur when applying a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MoveError {
    /// The index is not a board cell.
    #[display("Index {} is outside the board (must be 0-8)", _0)]
    OutOfRange(#[error(not(source))] usize),

    /// The square is already occupied.
    #[display("Square {} is already occupied", _0)]
    Occupied(#[error(not(source))] usize),
}

/// Places `mark` at `index`, returning the new board.
///
/// Squares are never overwritten: an occupied target is rejected and the
/// input board is left as it was.
#[instrument(skip(board))]
pub fn apply_move(board: &Board, index: usize, mark: Mark) -> Result<Board, MoveError> {
    if index >= BOARD_SIZE {
        return Err(MoveError::OutOfRange(index));
    }
    if !board.is_empty(index) {
        return Err(MoveError::Occupied(index));
    }
    let mut next = *board;
    next.set(index, Square::Occupied(mark));
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_move_places_mark() {
        let board = apply_move(&Board::new(), 4, Mark::O).unwrap();
        assert_eq!(board.get(4), Some(Square::Occupied(Mark::O)));
        assert_eq!(board.occupied(), 1);
    }

    #[test]
    fn test_apply_move_rejects_occupied() {
        let board = Board::from_template("X........");
        assert_eq!(apply_move(&board, 0, Mark::O), Err(MoveError::Occupied(0)));
        assert_eq!(board.get(0), Some(Square::Occupied(Mark::X)));
    }

    #[test]
    fn test_apply_move_rejects_out_of_range() {
        assert_eq!(
            apply_move(&Board::new(), 9, Mark::X),
            Err(MoveError::OutOfRange(9))
        );
    }
}
