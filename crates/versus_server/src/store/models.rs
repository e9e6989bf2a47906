//! Database rows for stored rooms.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use tracing::instrument;

use crate::store::schema;
use crate::{RoomSnapshot, StoreError};

/// A stored room row.
#[derive(Debug, Clone, Queryable, Selectable, Getters)]
#[diesel(table_name = schema::room_snapshots)]
pub struct StoredRoom {
    room_id: String,
    state: String,
    updated_at: NaiveDateTime,
}

impl StoredRoom {
    /// Parses the stored JSON into a snapshot.
    #[instrument(skip(self), fields(room_id = %self.room_id))]
    pub fn parse(&self) -> Result<RoomSnapshot, StoreError> {
        RoomSnapshot::from_json(&self.state)
    }
}

/// Insertable room row.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::room_snapshots)]
pub struct NewStoredRoom {
    room_id: String,
    state: String,
    updated_at: NaiveDateTime,
}
