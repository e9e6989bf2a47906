//! Delivery of room events to subscribed connections.

use derive_more::{Display, Error};
use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::ServerEvent;

/// Identifies one transport connection.
pub type ConnectionId = Uuid;

/// Outbound half of a transport connection.
///
/// The transport owns the receiving end and forwards whatever arrives to its
/// socket. A room only ever holds this sending handle, so dropping the socket
/// never requires the room's cooperation.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<ServerEvent>,
}

impl Connection {
    /// Opens a connection handle and the receiver its transport drains.
    pub fn open() -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::now_v7();
        debug!(connection_id = %id, "Connection opened");
        (Self { id, tx }, rx)
    }

    /// Returns the connection id.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queues one event for this connection.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryFailure`] when the transport side has gone away.
    pub fn send(&self, event: ServerEvent) -> Result<(), DeliveryFailure> {
        self.tx.send(event).map_err(|_| DeliveryFailure {
            connection_id: self.id,
        })
    }
}

/// The transport behind a connection is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("Delivery to connection {connection_id} failed: receiver closed")]
pub struct DeliveryFailure {
    /// The unreachable connection.
    pub connection_id: ConnectionId,
}

/// Connections subscribed to one room, in subscription order.
#[derive(Debug, Default)]
pub struct Fanout {
    connections: Vec<Connection>,
}

impl Fanout {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection. Returns `false` if it was already subscribed.
    #[instrument(skip(self, conn), fields(connection_id = %conn.id()))]
    pub fn subscribe(&mut self, conn: Connection) -> bool {
        if self.contains(conn.id()) {
            return false;
        }
        self.connections.push(conn);
        debug!(count = self.connections.len(), "Connection subscribed");
        true
    }

    /// Removes a connection. Returns `false` if it was not subscribed.
    #[instrument(skip(self))]
    pub fn unsubscribe(&mut self, id: ConnectionId) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c.id() != id);
        let removed = self.connections.len() != before;
        debug!(removed, count = self.connections.len(), "Connection unsubscribed");
        removed
    }

    /// Whether a connection is subscribed.
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.iter().any(|c| c.id() == id)
    }

    /// Number of subscribed connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether no connection is subscribed.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Delivers `event` to every subscribed connection.
    ///
    /// A failed send is logged and skipped; the connection stays subscribed
    /// until it is explicitly unsubscribed. Returns how many sends succeeded.
    pub fn broadcast(&self, event: &ServerEvent) -> usize {
        let mut delivered = 0;
        for conn in &self.connections {
            match conn.send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => warn!(error = %e, event = event.kind(), "Broadcast delivery failed"),
            }
        }
        delivered
    }

    /// Delivers `event` to one subscribed connection.
    ///
    /// An unknown or closed connection is logged the same way a failed
    /// broadcast is. Returns whether the event was queued.
    pub fn send_to(&self, id: ConnectionId, event: ServerEvent) -> bool {
        let kind = event.kind();
        let result = self
            .connections
            .iter()
            .find(|c| c.id() == id)
            .ok_or(DeliveryFailure { connection_id: id })
            .and_then(|conn| conn.send(event));
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, event = kind, "Unicast delivery failed");
                false
            }
        }
    }

    /// Drops every connection handle.
    pub fn clear(&mut self) {
        self.connections.clear();
    }
}
