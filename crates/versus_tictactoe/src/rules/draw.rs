//! Stalemate detection logic for tic-tac-toe.

use tracing::instrument;

use crate::{Board, Cell};

/// Checks if the board is full.
///
/// Callers check for a win first: a full board that also holds a line is a
/// win, never a stalemate.
#[instrument(skip(board))]
pub fn is_stalemate(board: &Board) -> bool {
    board.cells().iter().all(|c| *c != Cell::Empty)
}
