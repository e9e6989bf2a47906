//! Registry-level errors.

use derive_more::{Display, Error, From};

use crate::{RoomId, StoreError};

/// Failure to resolve or manage a room.
#[derive(Debug, Clone, Display, Error, From)]
pub enum LobbyError {
    /// Neither memory nor the store knows this room.
    #[display("Room not found: {_0}")]
    #[from(ignore)]
    RoomNotFound(#[error(not(source))] RoomId),
    /// The snapshot store failed.
    #[display("{_0}")]
    Store(StoreError),
}
