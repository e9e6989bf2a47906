//! Persistence error type.

use derive_more::{Display, Error};

use crate::RoomId;

/// Snapshot store failure, tagged with the operation and room it hit.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum StoreError {
    /// The database could not be opened, configured or migrated.
    #[display("Cannot open snapshot database '{path}': {message}")]
    Open {
        /// Database location.
        path: String,
        /// Underlying failure.
        message: String,
    },
    /// Writing one room's record failed.
    #[display("Saving room {room_id} failed: {message}")]
    Save {
        /// Room being written.
        room_id: RoomId,
        /// Underlying failure.
        message: String,
    },
    /// Reading one room's record failed.
    #[display("Loading room {room_id} failed: {message}")]
    Load {
        /// Room being read.
        room_id: RoomId,
        /// Underlying failure.
        message: String,
    },
    /// Reading the room list failed.
    #[display("Listing rooms failed: {message}")]
    List {
        /// Underlying failure.
        message: String,
    },
    /// A record could not be encoded or decoded.
    #[display("Snapshot record is not valid: {message}")]
    Codec {
        /// Serializer message.
        message: String,
    },
    /// The blocking task running a query died.
    #[display("Blocking store task failed: {message}")]
    Task {
        /// Join failure.
        message: String,
    },
}

impl StoreError {
    pub(crate) fn open(path: &str, err: impl std::fmt::Display) -> Self {
        Self::Open {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn save(room_id: &str, err: impl std::fmt::Display) -> Self {
        Self::Save {
            room_id: room_id.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn load(room_id: &str, err: impl std::fmt::Display) -> Self {
        Self::Load {
            room_id: room_id.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn list(err: impl std::fmt::Display) -> Self {
        Self::List {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Codec {
            message: err.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task {
            message: err.to_string(),
        }
    }
}
