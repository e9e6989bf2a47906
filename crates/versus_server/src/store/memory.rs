//! In-process snapshot store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::{RoomId, RoomSnapshot, SnapshotStore, StoreError};

/// Keeps serialized snapshots in memory.
///
/// Used when no database path is configured, and in tests. Records go
/// through the same JSON encoding as the SQLite store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<RoomId, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rooms.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Whether nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    #[instrument(skip(self, snapshot), fields(room_id = %snapshot.room_id()))]
    async fn save(&self, snapshot: &RoomSnapshot) -> Result<(), StoreError> {
        let json = snapshot.to_json()?;
        self.records
            .lock()
            .await
            .insert(snapshot.room_id().clone(), json);
        debug!("Snapshot stored in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn load(&self, room_id: &str) -> Result<Option<RoomSnapshot>, StoreError> {
        let records = self.records.lock().await;
        records
            .get(room_id)
            .map(|json| RoomSnapshot::from_json(json))
            .transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<RoomSnapshot>, StoreError> {
        let records = self.records.lock().await;
        let mut rooms = Vec::with_capacity(records.len());
        for (room_id, json) in records.iter() {
            match RoomSnapshot::from_json(json) {
                Ok(snapshot) => rooms.push(snapshot),
                Err(e) => warn!(room_id = %room_id, error = %e, "Skipping unreadable snapshot"),
            }
        }
        Ok(rooms)
    }
}
