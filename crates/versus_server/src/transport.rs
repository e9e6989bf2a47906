//! WebSocket transport for one room connection.
//!
//! Outbound events flow from the room's fan-out through an unbounded
//! channel to a writer task that owns the socket's sink. Inbound frames are
//! parsed here and applied to the room under its lock, one at a time.

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::{ClientEvent, Connection, Participant, SessionHandle};

/// Drives one upgraded socket until the peer goes away.
#[instrument(skip_all)]
pub(crate) async fn serve_socket(socket: WebSocket, session: SessionHandle) {
    let (mut sink, mut stream) = socket.split();
    let (conn, mut rx) = Connection::open();
    let connection_id = conn.id();
    info!(connection_id = %connection_id, "WebSocket connected");

    session.lock().await.connect(conn.clone());

    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, event = event.kind(), "Failed to encode event");
                    continue;
                }
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                debug!("Socket sink closed");
                break;
            }
        }
    });

    let mut participant = Participant::new(conn);
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match ClientEvent::parse(text.as_str()) {
                Ok(event) => {
                    let mut room = session.lock().await;
                    participant.handle(&mut room, event);
                }
                Err(e) => warn!(connection_id = %connection_id, error = %e, "Ignoring frame"),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(connection_id = %connection_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    session.lock().await.leave(connection_id);
    drop(participant);
    writer.abort();
    info!(connection_id = %connection_id, "WebSocket disconnected");
}
