//! Board plus turn and started flag.

use tracing::{debug, instrument};

use crate::rules::{self, WinLine};
use crate::{Board, InvalidMove, Mark, Position};

/// Tic-tac-toe engine state.
///
/// Turn-agnostic: [`Game::apply_move`] accepts any mark and only guards
/// bounds and occupancy. Alternation happens through [`Game::switch_turn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    turn: Mark,
    started: bool,
}

impl Game {
    /// Creates a fresh game: empty board, X to move, not started.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            turn: Mark::X,
            started: false,
        }
    }

    /// Restores a game from stored parts.
    pub fn from_parts(board: Board, turn: Mark, started: bool) -> Self {
        Self {
            board,
            turn,
            started,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the mark to move.
    pub fn turn(&self) -> Mark {
        self.turn
    }

    /// Whether the ready handshake has started the round.
    pub fn started(&self) -> bool {
        self.started
    }

    /// Marks the round as started.
    pub fn start(&mut self) {
        self.started = true;
    }

    /// Places `mark` at `position`.
    ///
    /// # Errors
    ///
    /// See [`Board::apply_move`].
    #[instrument(skip(self))]
    pub fn apply_move(&mut self, position: usize, mark: Mark) -> Result<Position, InvalidMove> {
        self.board.apply_move(position, mark)
    }

    /// Every line fully held by `mark`.
    pub fn check_win(&self, mark: Mark) -> Vec<WinLine> {
        rules::winning_lines(&self.board, mark)
    }

    /// True when no cell is empty.
    pub fn check_stalemate(&self) -> bool {
        rules::is_stalemate(&self.board)
    }

    /// Flips the turn between X and O.
    pub fn switch_turn(&mut self) {
        self.turn = self.turn.opponent();
        debug!(turn = %self.turn, "Turn switched");
    }

    /// Clears the board, gives X the move and clears the started flag.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.board.clear();
        self.turn = Mark::X;
        self.started = false;
        debug!("Game reset");
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
