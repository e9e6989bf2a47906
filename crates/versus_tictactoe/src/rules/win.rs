//! Win detection logic for tic-tac-toe.

use tracing::instrument;

use crate::{Board, Cell, Mark, Position};

/// Three positions forming a row, column or diagonal.
pub type WinLine = [Position; 3];

/// The eight lines: rows, then columns, then diagonals.
pub const WIN_LINES: [WinLine; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [Position::MiddleLeft, Position::Center, Position::MiddleRight],
    [Position::BottomLeft, Position::BottomCenter, Position::BottomRight],
    // Columns
    [Position::TopLeft, Position::MiddleLeft, Position::BottomLeft],
    [Position::TopCenter, Position::Center, Position::BottomCenter],
    [Position::TopRight, Position::MiddleRight, Position::BottomRight],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

/// Returns every line fully occupied by `mark`.
///
/// Normal play yields zero or one line; a single move can complete two
/// (e.g. a row and a diagonal through the same cell), and a corrupted board
/// can yield more, so all matches are reported.
#[instrument(skip(board))]
pub fn winning_lines(board: &Board, mark: Mark) -> Vec<WinLine> {
    let target = Cell::from(mark);
    WIN_LINES
        .iter()
        .filter(|line| line.iter().all(|pos| board.get(*pos) == target))
        .copied()
        .collect()
}
