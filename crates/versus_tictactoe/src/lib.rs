//! Versus tic-tac-toe rules.
//!
//! Pure board logic shared by the lobby server: move legality, the eight
//! winning lines, stalemate detection, turn alternation and reset. Nothing in
//! this crate knows about players, connections or persistence.
//!
//! # Example
//!
//! ```
//! use versus_tictactoe::{Game, Mark};
//!
//! let mut game = Game::new();
//! game.apply_move(4, Mark::X).unwrap();
//! assert!(game.check_win(Mark::X).is_empty());
//! game.switch_turn();
//! assert_eq!(game.turn(), Mark::O);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod game;
mod position;
pub mod rules;
mod types;

pub use error::InvalidMove;
pub use game::Game;
pub use position::{Position, PositionOutOfRange};
pub use rules::{WIN_LINES, WinLine};
pub use types::{Board, Cell, Mark};
