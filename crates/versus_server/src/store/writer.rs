//! Background snapshot writes.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::{RoomId, RoomSnapshot, SnapshotStore};

/// Per-room queue in front of a [`SnapshotStore`].
///
/// Submitting never blocks. A background task saves snapshots in commit
/// order; when several are queued only the newest is written. The task ends
/// once the writer is dropped and the queue has drained.
#[derive(Debug)]
pub struct SnapshotWriter {
    room_id: RoomId,
    tx: mpsc::UnboundedSender<RoomSnapshot>,
}

impl SnapshotWriter {
    /// Spawns the writer task for one room.
    #[instrument(skip(store))]
    pub fn spawn(store: Arc<dyn SnapshotStore>, room_id: RoomId) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<RoomSnapshot>();
        let task_room = room_id.clone();
        let handle = tokio::spawn(async move {
            while let Some(mut snapshot) = rx.recv().await {
                while let Ok(newer) = rx.try_recv() {
                    snapshot = newer;
                }
                if let Err(e) = store.save(&snapshot).await {
                    warn!(room_id = %task_room, error = %e, "Snapshot write failed");
                }
            }
            debug!(room_id = %task_room, "Snapshot writer finished");
        });
        (Self { room_id, tx }, handle)
    }

    /// Queues a snapshot for writing.
    pub fn submit(&self, snapshot: RoomSnapshot) {
        if self.tx.send(snapshot).is_err() {
            warn!(room_id = %self.room_id, "Snapshot writer stopped, dropping snapshot");
        }
    }
}
