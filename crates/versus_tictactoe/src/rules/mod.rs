//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`](crate::Board). Turn order and the
//! started flag live in [`Game`](crate::Game); these rules only look at cells.

pub mod draw;
pub mod win;

pub use draw::is_stalemate;
pub use win::{WIN_LINES, WinLine, winning_lines};
