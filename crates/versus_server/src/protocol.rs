//! Wire events exchanged over a room socket.
//!
//! Both directions are JSON objects tagged by a `type` field. Inbound
//! payloads are validated here so the session only ever sees well-formed
//! events.

use chrono::{DateTime, Utc};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use versus_tictactoe::{Mark, Position, WinLine};

use crate::{ChatEntry, PlayerId, RoomSnapshot};

/// Event sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Join the room, or reconnect when `id` names a known player.
    #[serde(alias = "open")]
    SetUsername {
        /// Display name.
        username: String,
        /// Previously assigned player id.
        #[serde(default, alias = "playerID")]
        id: Option<PlayerId>,
    },
    /// Post a chat line.
    Chat {
        /// Sender label.
        sender: String,
        /// Message text.
        text: String,
    },
    /// Place a mark.
    Move {
        /// Board index, 0-8.
        position: usize,
        /// Mark being placed.
        symbol: Mark,
        /// Name of the submitting player.
        username: String,
    },
    /// Set readiness. At least one of `username` and `id` is required.
    Ready {
        /// Name of the player.
        #[serde(default)]
        username: Option<String>,
        /// Id of the player.
        #[serde(default)]
        id: Option<PlayerId>,
        /// New readiness.
        ready: bool,
    },
    /// Clear readiness.
    Unready {
        /// Id of the player.
        id: PlayerId,
    },
}

impl ClientEvent {
    /// Parses and validates one inbound text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedEvent`] for unknown types, missing
    /// or mistyped fields, and `ready` events naming no player.
    #[instrument(skip(text), fields(len = text.len()))]
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let event: Self = serde_json::from_str(text).map_err(|e| ProtocolError::MalformedEvent {
            reason: e.to_string(),
        })?;
        if let Self::Ready {
            username: None,
            id: None,
            ..
        } = event
        {
            return Err(ProtocolError::MalformedEvent {
                reason: "ready event needs a username or an id".to_string(),
            });
        }
        Ok(event)
    }

    /// The `type` tag, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetUsername { .. } => "setUsername",
            Self::Chat { .. } => "chat",
            Self::Move { .. } => "move",
            Self::Ready { .. } => "ready",
            Self::Unready { .. } => "unready",
        }
    }
}

/// Inbound payload that could not be turned into a [`ClientEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ProtocolError {
    /// Missing or mistyped fields, or an unknown type.
    #[display("Malformed event: {reason}")]
    MalformedEvent {
        /// Parser message.
        reason: String,
    },
}

/// Event sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Full snapshot, sent once to each new connection.
    InitialState {
        /// Room state.
        state: RoomSnapshot,
    },
    /// Tells a joiner which mark it plays.
    AssignPlayer {
        /// Player id to reconnect with.
        id: PlayerId,
        /// Display name.
        user_name: String,
        /// Assigned mark.
        symbol: Mark,
    },
    /// Tells a joiner it is a spectator.
    LobbyFull {
        /// Player id to reconnect with.
        id: PlayerId,
        /// Display name.
        user_name: String,
        /// Human-readable notice.
        text: String,
    },
    /// Full snapshot broadcast after membership or readiness changes.
    UpdatePlayers {
        /// Room state.
        state: RoomSnapshot,
    },
    /// A chat line.
    Chat {
        /// Sender label.
        sender: String,
        /// Message text.
        text: String,
        /// When the line was appended.
        timestamp: DateTime<Utc>,
    },
    /// An accepted move.
    Move {
        /// Where the mark went.
        position: Position,
        /// The mark placed.
        symbol: Mark,
    },
    /// A line was completed.
    Win {
        /// Winning mark.
        winner: Mark,
        /// Every completed line.
        lines: Vec<WinLine>,
        /// Human-readable result.
        text: String,
    },
    /// Board full with no line.
    Draw {
        /// Human-readable result.
        text: String,
    },
    /// Mark to move next.
    UpdateTurn {
        /// The mark to move.
        turn: Mark,
    },
    /// A rejected move, sent to the submitter only.
    InvalidMove {
        /// Requested index.
        position: usize,
        /// `outOfRange`, `cellOccupied` or `notYourTurn`.
        reason: String,
        /// Human-readable reason.
        text: String,
    },
    /// Both players are ready.
    StartGame {
        /// Human-readable notice.
        text: String,
    },
}

impl ServerEvent {
    /// The `type` tag, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InitialState { .. } => "initialState",
            Self::AssignPlayer { .. } => "assignPlayer",
            Self::LobbyFull { .. } => "lobbyFull",
            Self::UpdatePlayers { .. } => "updatePlayers",
            Self::Chat { .. } => "chat",
            Self::Move { .. } => "move",
            Self::Win { .. } => "win",
            Self::Draw { .. } => "draw",
            Self::UpdateTurn { .. } => "updateTurn",
            Self::InvalidMove { .. } => "invalidMove",
            Self::StartGame { .. } => "startGame",
        }
    }
}

impl From<&ChatEntry> for ServerEvent {
    fn from(entry: &ChatEntry) -> Self {
        Self::Chat {
            sender: entry.sender().clone(),
            text: entry.text().clone(),
            timestamp: *entry.timestamp(),
        }
    }
}
