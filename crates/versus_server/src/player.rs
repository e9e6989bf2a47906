//! Room membership.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use versus_tictactoe::Mark;

/// Stable identifier of a player within a room.
pub type PlayerId = String;

/// What a member of the room may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Plays X.
    X,
    /// Plays O.
    O,
    /// Watches and chats.
    Spectator,
}

impl Role {
    /// The mark this role plays, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Role::X => Some(Mark::X),
            Role::O => Some(Mark::O),
            Role::Spectator => None,
        }
    }
}

impl From<Mark> for Role {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Role::X,
            Mark::O => Role::O,
        }
    }
}

/// A member of a room. Identity outlives any single connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Player {
    id: PlayerId,
    name: String,
    role: Role,
    ready: bool,
}

impl Player {
    /// Creates a player who is not ready yet.
    pub fn new(id: PlayerId, name: String, role: Role) -> Self {
        Self {
            id,
            name,
            role,
            ready: false,
        }
    }

    pub(crate) fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }
}

/// Result of a join: who the connection now speaks for.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Assignment {
    player_id: PlayerId,
    name: String,
    role: Role,
    reconnected: bool,
}

impl Assignment {
    pub(crate) fn new(player: &Player, reconnected: bool) -> Self {
        Self {
            player_id: player.id.clone(),
            name: player.name.clone(),
            role: player.role,
            reconnected,
        }
    }
}
