//! One room's authoritative state.
//!
//! A [`Session`] is only ever touched through `&mut self`, and the registry
//! hands it out behind a per-room async mutex. Each operation therefore runs
//! as one critical section: state is mutated, the resulting events are
//! queued on every subscribed connection, and a snapshot is handed to the
//! writer, all before the lock is released.

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use versus_tictactoe::{Game, InvalidMove, Mark, WinLine};

use crate::{
    Assignment, ChatEntry, Connection, ConnectionId, Fanout, Player, PlayerId, Role, RoomId,
    RoomSnapshot, SYSTEM_SENDER, ServerEvent, SnapshotWriter,
};

/// Coarse lifecycle stage of a room, derived from its state.
///
/// Terminal outcomes are never observable: a win or draw resets the board
/// before the operation that produced it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nobody has joined.
    Empty,
    /// Fewer than two players hold a mark.
    Filling,
    /// Both marks are taken, waiting for both players to be ready.
    ReadyPending,
    /// The ready handshake completed.
    InProgress,
}

/// What an accepted move led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// No result yet; the other mark moves next.
    Continue {
        /// The mark to move.
        next_turn: Mark,
    },
    /// `winner` completed at least one line. The board has been reset.
    Win {
        /// Winning mark.
        winner: Mark,
        /// Completed lines.
        lines: Vec<WinLine>,
    },
    /// Board filled without a line. The board has been reset.
    Draw,
}

/// One tic-tac-toe room.
#[derive(Debug)]
pub struct Session {
    room_id: RoomId,
    game: Game,
    players: Vec<Player>,
    chat: Vec<ChatEntry>,
    fanout: Fanout,
    writer: Option<SnapshotWriter>,
}

impl Session {
    /// Creates an empty room.
    #[instrument]
    pub fn new(room_id: RoomId) -> Self {
        info!(room_id = %room_id, "Creating new session");
        Self {
            room_id,
            game: Game::new(),
            players: Vec::new(),
            chat: Vec::new(),
            fanout: Fanout::new(),
            writer: None,
        }
    }

    /// Rebuilds a room from a stored snapshot, with no connections.
    #[instrument(skip(snapshot), fields(room_id = %snapshot.room_id()))]
    pub fn from_snapshot(snapshot: RoomSnapshot) -> Self {
        let (room_id, board, turn, started, chat, players) = snapshot.into_parts();
        info!(
            players = players.len(),
            chat = chat.len(),
            started,
            "Rehydrating session"
        );
        Self {
            room_id,
            game: Game::from_parts(board, turn, started),
            players,
            chat,
            fanout: Fanout::new(),
            writer: None,
        }
    }

    /// Routes every later committed mutation to `writer`.
    pub fn attach_writer(&mut self, writer: SnapshotWriter) {
        self.writer = Some(writer);
    }

    /// Returns the room id.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Returns the game state.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Returns members in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Returns the chat log.
    pub fn chat(&self) -> &[ChatEntry] {
        &self.chat
    }

    /// Number of subscribed connections.
    pub fn connection_count(&self) -> usize {
        self.fanout.len()
    }

    /// Current lifecycle stage.
    pub fn phase(&self) -> SessionPhase {
        if self.game.started() {
            SessionPhase::InProgress
        } else if self.players.is_empty() {
            SessionPhase::Empty
        } else if self.seated().count() < 2 {
            SessionPhase::Filling
        } else {
            SessionPhase::ReadyPending
        }
    }

    /// Finds a player by id first, then by display name.
    pub fn resolve_player(&self, id: Option<&str>, name: Option<&str>) -> Option<PlayerId> {
        id.and_then(|id| self.players.iter().find(|p| p.id() == id))
            .or_else(|| name.and_then(|name| self.players.iter().find(|p| p.name() == name)))
            .map(|p| p.id().clone())
    }

    /// Subscribes a connection and sends it the current state.
    ///
    /// Does nothing if the connection is already subscribed.
    #[instrument(skip(self, conn), fields(room_id = %self.room_id, connection_id = %conn.id()))]
    pub fn connect(&mut self, conn: Connection) {
        let id = conn.id();
        if !self.fanout.subscribe(conn) {
            debug!("Connection already subscribed");
            return;
        }
        let state = self.snapshot();
        self.fanout.send_to(id, ServerEvent::InitialState { state });
        info!(connections = self.fanout.len(), "Connection attached");
    }

    /// Joins the room, or reconnects a known player.
    ///
    /// An `existing_id` matching a member returns that member unchanged.
    /// Otherwise a new member is created: the first free mark (X, then O),
    /// or spectator once both are taken. The joiner gets `assignPlayer` or
    /// `lobbyFull`; everyone gets a system chat line and `updatePlayers`.
    #[instrument(skip(self, conn), fields(room_id = %self.room_id, connection_id = %conn.id()))]
    pub fn join(
        &mut self,
        conn: &Connection,
        display_name: &str,
        existing_id: Option<&str>,
    ) -> Assignment {
        self.connect(conn.clone());

        if let Some(player) = existing_id.and_then(|id| self.players.iter().find(|p| p.id() == id)) {
            let assignment = Assignment::new(player, true);
            info!(player_id = %player.id(), role = ?player.role(), "Player reconnected");
            self.send_assignment(conn.id(), &assignment);
            self.post_system(format!("welcome back {}", assignment.name()));
            self.broadcast_state();
            self.persist();
            return assignment;
        }

        let id = existing_id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::now_v7().to_string());
        let role = self.free_mark().map(Role::from).unwrap_or(Role::Spectator);
        let player = Player::new(id, display_name.to_string(), role);
        let assignment = Assignment::new(&player, false);
        info!(player_id = %player.id(), role = ?role, "Player joined");
        self.players.push(player);

        self.send_assignment(conn.id(), &assignment);
        let announcement = match role.mark() {
            Some(mark) => format!("{} has joined the game, playing as {}", display_name, mark),
            None => format!("{} is now spectating", display_name),
        };
        self.post_system(announcement);
        self.broadcast_state();
        self.persist();
        assignment
    }

    /// Unsubscribes a connection. The player it spoke for stays a member.
    #[instrument(skip(self), fields(room_id = %self.room_id))]
    pub fn leave(&mut self, connection_id: ConnectionId) {
        if self.fanout.unsubscribe(connection_id) {
            info!(connections = self.fanout.len(), "Connection left");
        } else {
            debug!("Leave for unknown connection");
        }
    }

    /// Records readiness and starts the round once both players are ready.
    ///
    /// Returns `true` only for the call that started the round; while a
    /// round is running further ready toggles never restart it.
    #[instrument(skip(self), fields(room_id = %self.room_id))]
    pub fn set_ready(&mut self, player_id: &str, ready: bool) -> bool {
        let Some(player) = self.players.iter_mut().find(|p| p.id() == player_id) else {
            warn!(player_id, "Ready toggle for unknown player");
            return false;
        };
        player.set_ready(ready);
        debug!(player_id, ready, "Readiness updated");

        let ready_count = self.seated().filter(|p| *p.ready()).count();
        let starting = ready_count == 2 && !self.game.started();
        if starting {
            self.game.start();
        }
        self.broadcast_state();
        if starting {
            info!("Both players ready, starting game");
            self.fanout.broadcast(&ServerEvent::StartGame {
                text: "Both players are ready. The game will start now!".to_string(),
            });
            self.post_system(format!("Game started! {}'s turn.", self.game.turn()));
        }
        self.persist();
        starting
    }

    /// Plays `symbol` at `position` on behalf of `player_id`.
    ///
    /// A rejection is sent as `invalidMove` to connection `from` only and
    /// leaves the room untouched. On success the move is broadcast, followed
    /// by exactly one of `win`, `draw` or `updateTurn`. A win is checked
    /// before a draw, so a full board with a line is a win.
    ///
    /// # Errors
    ///
    /// [`InvalidMove::NotYourTurn`] when `symbol` is not the mark to move or
    /// the player does not hold it, otherwise whatever the board rejects.
    #[instrument(skip(self), fields(room_id = %self.room_id))]
    pub fn submit_move(
        &mut self,
        from: ConnectionId,
        player_id: &str,
        position: usize,
        symbol: Mark,
    ) -> Result<MoveOutcome, InvalidMove> {
        match self.play(player_id, position, symbol) {
            Ok(outcome) => {
                self.persist();
                Ok(outcome)
            }
            Err(e) => {
                warn!(player_id, position, %symbol, error = %e, "Move rejected");
                self.fanout.send_to(
                    from,
                    ServerEvent::InvalidMove {
                        position,
                        reason: e.reason().to_string(),
                        text: format!("Invalid move: {}", e),
                    },
                );
                Err(e)
            }
        }
    }

    /// Appends a chat line and broadcasts it.
    #[instrument(skip(self, text), fields(room_id = %self.room_id))]
    pub fn post_chat(&mut self, sender: &str, text: &str) -> ChatEntry {
        let entry = self.append_chat(ChatEntry::now(sender, text));
        self.persist();
        entry
    }

    /// Connection-free copy of the current state.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot::new(
            self.room_id.clone(),
            self.game.board().clone(),
            self.game.turn(),
            self.game.started(),
            self.chat.clone(),
            self.players.clone(),
        )
    }

    /// Drops every connection and the snapshot writer.
    #[instrument(skip(self), fields(room_id = %self.room_id))]
    pub fn close(&mut self) {
        self.fanout.clear();
        self.writer = None;
        info!("Session closed");
    }

    pub(crate) fn persist(&self) {
        if let Some(writer) = &self.writer {
            writer.submit(self.snapshot());
        }
    }

    fn play(
        &mut self,
        player_id: &str,
        position: usize,
        symbol: Mark,
    ) -> Result<MoveOutcome, InvalidMove> {
        let expected = self.game.turn();
        let holds_symbol = self
            .players
            .iter()
            .any(|p| p.id() == player_id && p.role().mark() == Some(symbol));
        if symbol != expected || !holds_symbol {
            return Err(InvalidMove::NotYourTurn { expected });
        }

        let pos = self.game.apply_move(position, symbol)?;
        debug!(position, %symbol, "Move applied");
        self.fanout.broadcast(&ServerEvent::Move {
            position: pos,
            symbol,
        });

        let lines = self.game.check_win(symbol);
        if !lines.is_empty() {
            info!(winner = %symbol, lines = lines.len(), "Game won");
            self.fanout.broadcast(&ServerEvent::Win {
                winner: symbol,
                lines: lines.clone(),
                text: format!("Player {} wins!", symbol),
            });
            self.game.reset();
            return Ok(MoveOutcome::Win {
                winner: symbol,
                lines,
            });
        }

        if self.game.check_stalemate() {
            info!("Game drawn");
            self.fanout.broadcast(&ServerEvent::Draw {
                text: "It's a draw!".to_string(),
            });
            self.game.reset();
            return Ok(MoveOutcome::Draw);
        }

        self.game.switch_turn();
        let next_turn = self.game.turn();
        self.fanout
            .broadcast(&ServerEvent::UpdateTurn { turn: next_turn });
        Ok(MoveOutcome::Continue { next_turn })
    }

    fn seated(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.role().mark().is_some())
    }

    fn free_mark(&self) -> Option<Mark> {
        [Mark::X, Mark::O]
            .into_iter()
            .find(|mark| !self.seated().any(|p| p.role().mark() == Some(*mark)))
    }

    fn send_assignment(&self, id: ConnectionId, assignment: &Assignment) {
        let event = match assignment.role().mark() {
            Some(symbol) => ServerEvent::AssignPlayer {
                id: assignment.player_id().clone(),
                user_name: assignment.name().clone(),
                symbol,
            },
            None => ServerEvent::LobbyFull {
                id: assignment.player_id().clone(),
                user_name: assignment.name().clone(),
                text: "The lobby is full, you are now spectating.".to_string(),
            },
        };
        self.fanout.send_to(id, event);
    }

    fn post_system(&mut self, text: String) {
        self.append_chat(ChatEntry::now(SYSTEM_SENDER, text));
    }

    fn append_chat(&mut self, entry: ChatEntry) -> ChatEntry {
        self.fanout.broadcast(&ServerEvent::from(&entry));
        self.chat.push(entry.clone());
        entry
    }

    fn broadcast_state(&self) {
        self.fanout.broadcast(&ServerEvent::UpdatePlayers {
            state: self.snapshot(),
        });
    }
}
