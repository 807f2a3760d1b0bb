//! Draw detection logic for tic-tac-toe.

use super::win::check_winner;
use crate::{BOARD_SIZE, Board, Square};
use tracing::instrument;

/// Checks if the board is full (all squares occupied).
#[instrument]
pub fn is_full(board: &Board) -> bool {
    board.squares().iter().all(|s| *s != Square::Empty)
}

/// A round is drawn once all nine symbols are placed and no line is complete.
///
/// `move_count` is the caller's running count of placed symbols.
#[instrument]
pub fn is_draw(board: &Board, move_count: usize) -> bool {
    move_count == BOARD_SIZE && check_winner(board).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Mark, apply_move};

    #[test]
    fn test_empty_board_not_full() {
        assert!(!is_full(&Board::new()));
    }

    #[test]
    fn test_full_board() {
        assert!(is_full(&Board::from_template("XOX/XOO/OXX")));
    }

    #[test]
    fn test_draw_detection() {
        let board = Board::from_template("XOX/OXX/OXO");
        assert!(is_draw(&board, 9));
    }

    #[test]
    fn test_not_draw_before_ninth_move() {
        let board = Board::from_template("XOX/OXX/OX.");
        assert!(!is_draw(&board, 8));
    }

    #[test]
    fn test_not_draw_if_winner() {
        let board = Board::from_template("XXX/OOX/OXO");
        assert!(!is_draw(&board, 9));
    }

    #[test]
    fn test_alternating_sequence_without_line_is_draw() {
        // X O X / X O O / O X X, played in alternating order.
        let order = [0, 1, 2, 4, 3, 5, 7, 6, 8];
        let mut board = Board::new();
        let mut mark = Mark::X;
        for (played, index) in order.into_iter().enumerate() {
            board = apply_move(&board, index, mark).unwrap();
            assert!(check_winner(&board).is_none());
            assert_eq!(is_draw(&board, played + 1), played + 1 == 9);
            mark = mark.opponent();
        }
    }
}
