//! Win detection logic for tic-tac-toe.

use crate::{Board, Mark, Square};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// The eight winning triples, in evaluation order: rows top to bottom,
/// columns left to right, then the two diagonals.
pub const LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// A completed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Win {
    /// Symbol occupying the line.
    pub mark: Mark,
    /// Board indices of the line.
    pub line: [usize; 3],
}

/// Checks if there is a winner on the board.
///
/// Returns the first line in [`LINES`] whose three squares hold the same
/// symbol. Boards with several complete lines always report the earliest
/// one.
#[instrument]
pub fn check_winner(board: &Board) -> Option<Win> {
    LINES.into_iter().find_map(|line @ [a, b, c]| {
        let sq = board.get(a)?;
        match sq {
            Square::Occupied(mark) if board.get(b) == Some(sq) && board.get(c) == Some(sq) => {
                Some(Win { mark, line })
            }
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_winner_empty_board() {
        assert_eq!(check_winner(&Board::new()), None);
    }

    #[test]
    fn test_winner_top_row() {
        let board = Board::from_template("XXX/OO./...");
        assert_eq!(
            check_winner(&board),
            Some(Win {
                mark: Mark::X,
                line: [0, 1, 2]
            })
        );
    }

    #[test]
    fn test_winner_anti_diagonal() {
        let board = Board::from_template("XXO/XO./O..");
        assert_eq!(
            check_winner(&board),
            Some(Win {
                mark: Mark::O,
                line: [2, 4, 6]
            })
        );
    }

    #[test]
    fn test_winner_middle_column() {
        let board = Board::from_template("XOX/.O./.OX");
        assert_eq!(check_winner(&board).map(|w| w.line), Some([1, 4, 7]));
    }

    #[test]
    fn test_no_winner_incomplete() {
        let board = Board::from_template("XX./OO./...");
        assert_eq!(check_winner(&board), None);
    }

    #[test]
    fn test_mixed_line_is_not_a_win() {
        let board = Board::from_template("XOX/OXO/OXO");
        assert_eq!(check_winner(&board), None);
    }

    #[test]
    fn test_rows_take_priority_over_columns() {
        // Row 0 and column 0 are both complete; the row is reported.
        let board = Board::from_template("XXX/X../X..");
        assert_eq!(check_winner(&board).map(|w| w.line), Some([0, 1, 2]));
    }

    #[test]
    fn test_columns_take_priority_over_diagonals() {
        // Column 0 and the anti-diagonal are both complete.
        let board = Board::from_template("O.O/OO./O.X");
        assert_eq!(check_winner(&board).map(|w| w.line), Some([0, 3, 6]));
    }

    #[test]
    fn test_earlier_row_wins_over_later_row() {
        let board = Board::from_template("OOO/XXX/...");
        assert_eq!(
            check_winner(&board),
            Some(Win {
                mark: Mark::O,
                line: [0, 1, 2]
            })
        );
    }

    #[test]
    fn test_result_iff_some_line_complete() {
        // Every assignment of {empty, X, O} to the nine squares.
        for code in 0..3usize.pow(9) {
            let mut rest = code;
            let template: String = (0..9)
                .map(|_| {
                    let c = ['.', 'X', 'O'][rest % 3];
                    rest /= 3;
                    c
                })
                .collect();
            let board = Board::from_template(&template);
            let complete = LINES.iter().any(|&[a, b, c]| {
                let sq = board.get(a);
                sq != Some(Square::Empty) && sq == board.get(b) && sq == board.get(c)
            });
            assert_eq!(check_winner(&board).is_some(), complete, "{template}");
        }
    }
}
