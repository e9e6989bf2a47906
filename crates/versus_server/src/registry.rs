//! Room id to session lookup.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{LobbyError, RoomSnapshot, Session, SnapshotStore, SnapshotWriter};

/// Unique identifier for a room.
pub type RoomId = String;

/// Shared handle to a room. Locking it is the room's critical section.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Every room resident in this process.
///
/// Cloning is cheap and clones share the same rooms. Rooms that are not
/// resident are rehydrated from the store on first access.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    rooms: Arc<RwLock<HashMap<RoomId, SessionHandle>>>,
    store: Arc<dyn SnapshotStore>,
    writers: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl SessionRegistry {
    /// Creates an empty registry backed by `store`.
    #[instrument(skip(store))]
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        info!("Creating session registry");
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            store,
            writers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Allocates a fresh room id and an empty room.
    ///
    /// The empty room is persisted right away so it survives a restart.
    #[instrument(skip(self))]
    pub async fn create(&self) -> (RoomId, SessionHandle) {
        let room_id = Uuid::now_v7().to_string();
        let handle = self.install(Session::new(room_id.clone())).await;
        handle.lock().await.persist();
        info!(room_id = %room_id, "Created new room");
        (room_id, handle)
    }

    /// Looks up a room, rehydrating it from the store when not resident.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::RoomNotFound`] when neither memory nor the store
    /// knows the room. A failing store read counts as not found.
    #[instrument(skip(self))]
    pub async fn get(&self, room_id: &str) -> Result<SessionHandle, LobbyError> {
        if let Some(handle) = self.resident(room_id).await {
            return Ok(handle);
        }
        match self.load(room_id).await {
            Some(snapshot) => Ok(self.install(Session::from_snapshot(snapshot)).await),
            None => {
                debug!(room_id, "Room not found");
                Err(LobbyError::RoomNotFound(room_id.to_string()))
            }
        }
    }

    /// Looks up a room, creating an empty one under `room_id` if unknown.
    #[instrument(skip(self))]
    pub async fn get_or_create(&self, room_id: &str) -> SessionHandle {
        if let Some(handle) = self.resident(room_id).await {
            return handle;
        }
        let session = match self.load(room_id).await {
            Some(snapshot) => Session::from_snapshot(snapshot),
            None => Session::new(room_id.to_string()),
        };
        let handle = self.install(session).await;
        handle.lock().await.persist();
        handle
    }

    /// Snapshots of every known room, resident and stored, one per room id.
    ///
    /// A resident room wins over its stored copy.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::Store`] if the stored rooms cannot be listed.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<RoomSnapshot>, LobbyError> {
        let mut merged: BTreeMap<_, _> = self
            .store
            .list()
            .await?
            .into_iter()
            .map(|snapshot| (snapshot.room_id().clone(), snapshot))
            .collect();

        let handles: Vec<SessionHandle> = self.rooms.read().await.values().cloned().collect();
        for handle in handles {
            let snapshot = handle.lock().await.snapshot();
            merged.insert(snapshot.room_id().clone(), snapshot);
        }

        info!(count = merged.len(), "Listed rooms");
        Ok(merged.into_values().collect())
    }

    /// Number of rooms held in memory.
    pub async fn resident_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Evicts every room and waits for pending snapshot writes.
    ///
    /// Each room drops its connections and writer; stored snapshots stay.
    /// Returns how many rooms were evicted.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> usize {
        let rooms: Vec<SessionHandle> = self.rooms.write().await.drain().map(|(_, h)| h).collect();
        for handle in &rooms {
            handle.lock().await.close();
        }

        let writers = std::mem::take(&mut *self.writers.lock().await);
        for writer in writers {
            if let Err(e) = writer.await {
                warn!(error = %e, "Snapshot writer task failed");
            }
        }
        info!(count = rooms.len(), "Registry shut down");
        rooms.len()
    }

    async fn resident(&self, room_id: &str) -> Option<SessionHandle> {
        self.rooms.read().await.get(room_id).cloned()
    }

    async fn load(&self, room_id: &str) -> Option<RoomSnapshot> {
        match self.store.load(room_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(room_id, error = %e, "Snapshot read failed");
                None
            }
        }
    }

    /// Inserts `session` unless another task installed the same room first,
    /// in which case that one is returned and `session` is dropped.
    async fn install(&self, mut session: Session) -> SessionHandle {
        let mut rooms = self.rooms.write().await;
        if let Some(existing) = rooms.get(session.room_id()) {
            return existing.clone();
        }
        let room_id = session.room_id().clone();
        let (writer, task) = SnapshotWriter::spawn(self.store.clone(), room_id.clone());
        session.attach_writer(writer);
        self.writers.lock().await.push(task);

        let handle = Arc::new(Mutex::new(session));
        rooms.insert(room_id.clone(), handle.clone());
        debug!(room_id = %room_id, resident = rooms.len(), "Room installed");
        handle
    }
}
