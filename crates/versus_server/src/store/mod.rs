//! Snapshot persistence.
//!
//! Rooms are stored as one JSON record per room id. The store is only ever
//! written by a [`SnapshotWriter`], off the gameplay path.

mod error;
mod memory;
mod models;
mod schema;
mod sqlite;
mod writer;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use writer::SnapshotWriter;

use async_trait::async_trait;

use crate::RoomSnapshot;

/// Durable home for room snapshots.
#[async_trait]
pub trait SnapshotStore: Send + Sync + std::fmt::Debug {
    /// Inserts or replaces the record for the snapshot's room.
    async fn save(&self, snapshot: &RoomSnapshot) -> Result<(), StoreError>;

    /// Loads one room. `Ok(None)` when no record exists.
    async fn load(&self, room_id: &str) -> Result<Option<RoomSnapshot>, StoreError>;

    /// Loads every stored room, ordered by room id.
    async fn list(&self) -> Result<Vec<RoomSnapshot>, StoreError>;
}
