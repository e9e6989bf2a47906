//! Move rejection reasons.

use derive_more::{Display, Error};

use crate::Mark;

/// Why a move was refused.
///
/// The board itself only ever produces `OutOfRange` and `CellOccupied`;
/// `NotYourTurn` is decided by whoever tracks players and turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum InvalidMove {
    /// Index outside 0-8.
    #[display("Position {position} is out of bounds (must be 0-8)")]
    OutOfRange {
        /// The rejected index.
        position: usize,
    },
    /// The cell already holds a mark.
    #[display("Position {position} is already occupied")]
    CellOccupied {
        /// The rejected index.
        position: usize,
    },
    /// The submitted mark is not the one to move.
    #[display("Not your turn: waiting for {expected}")]
    NotYourTurn {
        /// The mark whose turn it is.
        expected: Mark,
    },
}

impl InvalidMove {
    /// Machine-readable reason, as sent to clients.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::OutOfRange { .. } => "outOfRange",
            Self::CellOccupied { .. } => "cellOccupied",
            Self::NotYourTurn { .. } => "notYourTurn",
        }
    }
}
