//! SQLite snapshot store.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};

use crate::store::models::{NewStoredRoom, StoredRoom};
use crate::store::schema;
use crate::{RoomSnapshot, SnapshotStore, StoreError};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Applied to every connection. WAL lets readers run beside the writer, and
/// the busy timeout makes a locked database wait instead of failing.
const CONNECTION_PRAGMAS: &str = "PRAGMA busy_timeout = 5000; PRAGMA journal_mode = WAL;";

/// Stores one row per room in a SQLite database file.
///
/// Diesel connections are blocking, so the async trait methods run each
/// query on tokio's blocking pool. The `*_blocking` methods are usable
/// directly from synchronous code such as the CLI.
///
/// SQLite admits one writer at a time; clones share a write lock so rooms
/// saving concurrently queue up in-process rather than contend on the file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: String,
    write_lock: Arc<Mutex<()>>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `db_path` and applies
    /// pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Open`] if the database cannot be opened or
    /// migrated.
    #[instrument(skip(db_path))]
    pub fn open(db_path: impl Into<String>) -> Result<Self, StoreError> {
        let store = Self {
            db_path: db_path.into(),
            write_lock: Arc::new(Mutex::new(())),
        };
        info!(path = %store.db_path, "Opening snapshot database");
        let mut conn = store.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::open(&store.db_path, format!("migrations failed: {}", e)))?;
        debug!(count = applied.len(), "Migrations applied");
        Ok(store)
    }

    /// Establishes a configured database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, StoreError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path)
            .map_err(|e| StoreError::open(&self.db_path, e))?;
        conn.batch_execute(CONNECTION_PRAGMAS)
            .map_err(|e| StoreError::open(&self.db_path, e))?;
        Ok(conn)
    }

    /// Inserts or replaces a room row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on encoding or database failure.
    #[instrument(skip(self, snapshot), fields(room_id = %snapshot.room_id()))]
    pub fn save_blocking(&self, snapshot: &RoomSnapshot) -> Result<(), StoreError> {
        let room_id = snapshot.room_id();
        let row = NewStoredRoom::new(room_id.clone(), snapshot.to_json()?, Utc::now().naive_utc());

        // The lock guards no data, so a poisoned lock is still usable.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut conn = self.connection()?;
        diesel::replace_into(schema::room_snapshots::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| StoreError::save(room_id, e))?;
        debug!("Snapshot saved");
        Ok(())
    }

    /// Loads one room row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database failure or an unreadable record.
    #[instrument(skip(self))]
    pub fn load_blocking(&self, room_id: &str) -> Result<Option<RoomSnapshot>, StoreError> {
        let mut conn = self.connection()?;
        let row = schema::room_snapshots::table
            .find(room_id)
            .select(StoredRoom::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| StoreError::load(room_id, e))?;

        match row {
            Some(row) => {
                debug!(updated_at = %row.updated_at(), "Snapshot found");
                row.parse().map(Some)
            }
            None => {
                debug!("Snapshot not found");
                Ok(None)
            }
        }
    }

    /// Loads every room row, skipping unreadable records.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::List`] on database failure.
    #[instrument(skip(self))]
    pub fn list_blocking(&self) -> Result<Vec<RoomSnapshot>, StoreError> {
        let mut conn = self.connection()?;
        let rows = schema::room_snapshots::table
            .order(schema::room_snapshots::room_id.asc())
            .select(StoredRoom::as_select())
            .load(&mut conn)
            .map_err(|e| StoreError::list(e))?;

        let mut rooms = Vec::with_capacity(rows.len());
        for row in &rows {
            match row.parse() {
                Ok(snapshot) => rooms.push(snapshot),
                Err(e) => warn!(room_id = %row.room_id(), error = %e, "Skipping unreadable snapshot"),
            }
        }
        info!(count = rooms.len(), "Stored rooms loaded");
        Ok(rooms)
    }
}

#[async_trait]
impl SnapshotStore for SqliteStore {
    async fn save(&self, snapshot: &RoomSnapshot) -> Result<(), StoreError> {
        let store = self.clone();
        let snapshot = snapshot.clone();
        tokio::task::spawn_blocking(move || store.save_blocking(&snapshot)).await?
    }

    async fn load(&self, room_id: &str) -> Result<Option<RoomSnapshot>, StoreError> {
        let store = self.clone();
        let room_id = room_id.to_string();
        tokio::task::spawn_blocking(move || store.load_blocking(&room_id)).await?
    }

    async fn list(&self) -> Result<Vec<RoomSnapshot>, StoreError> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.list_blocking()).await?
    }
}
