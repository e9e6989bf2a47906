//! Connection-free copies of a room's state.

use std::collections::BTreeMap;

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use versus_tictactoe::{Board, Mark};

use crate::{ChatEntry, Player, PlayerId, RoomId, StoreError};

/// Everything needed to rebuild a room, minus its connections.
///
/// Sent to clients as `initialState`/`updatePlayers` and stored verbatim (as
/// JSON) by the snapshot store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    room_id: RoomId,
    game_board: Board,
    current_turn: Mark,
    game_started: bool,
    chat_messages: Vec<ChatEntry>,
    ready_players: BTreeMap<PlayerId, bool>,
    players: Vec<Player>,
}

impl RoomSnapshot {
    pub(crate) fn new(
        room_id: RoomId,
        game_board: Board,
        current_turn: Mark,
        game_started: bool,
        chat_messages: Vec<ChatEntry>,
        players: Vec<Player>,
    ) -> Self {
        let ready_players = players
            .iter()
            .map(|p| (p.id().clone(), *p.ready()))
            .collect();
        Self {
            room_id,
            game_board,
            current_turn,
            game_started,
            chat_messages,
            ready_players,
            players,
        }
    }

    /// Serializes to the stored text form.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if serialization fails.
    #[instrument(skip(self), fields(room_id = %self.room_id))]
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses the stored text form.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the text is not a valid snapshot.
    #[instrument(skip(json))]
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub(crate) fn into_parts(self) -> (RoomId, Board, Mark, bool, Vec<ChatEntry>, Vec<Player>) {
        (
            self.room_id,
            self.game_board,
            self.current_turn,
            self.game_started,
            self.chat_messages,
            self.players,
        )
    }
}
