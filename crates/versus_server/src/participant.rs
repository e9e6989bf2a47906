//! Maps one connection's inbound events onto session operations.

use tracing::{debug, instrument, warn};

use crate::{ClientEvent, Connection, PlayerId, Session};

/// A connection plus the player it speaks for, once it has joined.
#[derive(Debug)]
pub struct Participant {
    connection: Connection,
    player_id: Option<PlayerId>,
}

impl Participant {
    /// Wraps a connection that has not joined yet.
    pub fn new(connection: Connection) -> Self {
        Self {
            connection,
            player_id: None,
        }
    }

    /// Returns the connection.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// The player this connection joined as, if any.
    pub fn player_id(&self) -> Option<&PlayerId> {
        self.player_id.as_ref()
    }

    /// Applies one inbound event to `session`.
    ///
    /// Moves and ready toggles from a connection that never joined are
    /// attributed by the name or id they carry.
    #[instrument(skip(self, session), fields(room_id = %session.room_id(), event = event.kind()))]
    pub fn handle(&mut self, session: &mut Session, event: ClientEvent) {
        match event {
            ClientEvent::SetUsername { username, id } => {
                let id = id.or_else(|| self.player_id.clone());
                let assignment = session.join(&self.connection, &username, id.as_deref());
                self.player_id = Some(assignment.player_id().clone());
            }
            ClientEvent::Chat { sender, text } => {
                session.post_chat(&sender, &text);
            }
            ClientEvent::Move {
                position,
                symbol,
                username,
            } => {
                // An unknown sender holds no mark, so the session rejects it
                // and reports back to this connection.
                let player_id = session
                    .resolve_player(self.player_id.as_deref(), Some(username.as_str()))
                    .unwrap_or(username);
                match session.submit_move(self.connection.id(), &player_id, position, symbol) {
                    Ok(outcome) => debug!(?outcome, "Move accepted"),
                    Err(e) => debug!(reason = e.reason(), "Move reported back to sender"),
                }
            }
            ClientEvent::Ready {
                username,
                id,
                ready,
            } => {
                let id = id.or_else(|| self.player_id.clone());
                match session.resolve_player(id.as_deref(), username.as_deref()) {
                    Some(player_id) => {
                        session.set_ready(&player_id, ready);
                    }
                    None => warn!(?username, ?id, "Ready from unknown player"),
                }
            }
            ClientEvent::Unready { id } => {
                session.set_ready(&id, false);
            }
        }
        debug!("Event handled");
    }
}
