//! Versus lobby server.
//!
//! Hosts tic-tac-toe rooms that two players and any number of spectators
//! share over WebSockets.
//!
//! # Architecture
//!
//! - **Session**: one room's authoritative state and the operations that
//!   mutate it (join, leave, ready, move, chat)
//! - **Fan-out**: the live connections subscribed to a room
//! - **Registry**: room id to session lookup, creation and rehydration
//! - **Store**: snapshot persistence (SQLite or in-memory) behind one trait
//! - **HTTP**: axum router exposing room creation, listing and the socket
//!
//! Every mutation of a room runs while holding that room's lock, and its
//! broadcasts go out before the lock is released, so every connection sees
//! the same event order.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use versus_server::{MemoryStore, SessionRegistry, router};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let registry = SessionRegistry::new(Arc::new(MemoryStore::new()));
//! let app = router(registry.clone());
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! registry.shutdown().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod chat;
mod config;
mod error;
mod fanout;
mod http;
mod participant;
mod player;
mod protocol;
mod registry;
mod session;
mod snapshot;
mod store;
mod transport;

pub use chat::{ChatEntry, SYSTEM_SENDER};
pub use config::{ConfigError, ServerConfig};
pub use error::LobbyError;
pub use fanout::{Connection, ConnectionId, DeliveryFailure, Fanout};
pub use http::{CreatedRoom, router};
pub use participant::Participant;
pub use player::{Assignment, Player, PlayerId, Role};
pub use protocol::{ClientEvent, ProtocolError, ServerEvent};
pub use registry::{RoomId, SessionHandle, SessionRegistry};
pub use session::{MoveOutcome, Session, SessionPhase};
pub use snapshot::RoomSnapshot;
pub use store::{MemoryStore, SnapshotStore, SnapshotWriter, SqliteStore, StoreError};
