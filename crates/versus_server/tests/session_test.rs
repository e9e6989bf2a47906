//! Scenario tests for a single room.

use tokio::sync::mpsc::UnboundedReceiver;
use versus_server::{
    Connection, MoveOutcome, Role, SYSTEM_SENDER, ServerEvent, Session, SessionPhase,
};
use versus_tictactoe::{Cell, InvalidMove, Mark, Position};

fn drain(rx: &mut UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn kinds(events: &[ServerEvent]) -> Vec<&'static str> {
    events.iter().map(ServerEvent::kind).collect()
}

struct Client {
    conn: Connection,
    rx: UnboundedReceiver<ServerEvent>,
    id: String,
}

fn join(session: &mut Session, name: &str) -> Client {
    let (conn, rx) = Connection::open();
    let assignment = session.join(&conn, name, None);
    Client {
        conn,
        rx,
        id: assignment.player_id().clone(),
    }
}

/// Two seated players, both ready, every queue drained.
fn started_room() -> (Session, Client, Client) {
    let mut session = Session::new("room-1".to_string());
    let mut alice = join(&mut session, "alice");
    let mut bob = join(&mut session, "bob");
    session.set_ready(&alice.id, true);
    assert!(session.set_ready(&bob.id, true));
    drain(&mut alice.rx);
    drain(&mut bob.rx);
    (session, alice, bob)
}

#[test]
fn test_join_assigns_x_then_o_then_spectator() {
    let mut session = Session::new("room-1".to_string());
    assert_eq!(session.phase(), SessionPhase::Empty);

    let mut alice = join(&mut session, "alice");
    assert_eq!(session.phase(), SessionPhase::Filling);
    let mut bob = join(&mut session, "bob");
    assert_eq!(session.phase(), SessionPhase::ReadyPending);
    let mut carol = join(&mut session, "carol");

    let roles: Vec<Role> = session.players().iter().map(|p| *p.role()).collect();
    assert_eq!(roles, vec![Role::X, Role::O, Role::Spectator]);

    let alice_events = drain(&mut alice.rx);
    assert_eq!(
        kinds(&alice_events)[..4],
        ["initialState", "assignPlayer", "chat", "updatePlayers"]
    );
    match &alice_events[1] {
        ServerEvent::AssignPlayer { symbol, user_name, .. } => {
            assert_eq!(*symbol, Mark::X);
            assert_eq!(user_name, "alice");
        }
        other => panic!("Expected assignPlayer, got {:?}", other),
    }

    let bob_events = drain(&mut bob.rx);
    assert!(bob_events.contains(&ServerEvent::AssignPlayer {
        id: bob.id.clone(),
        user_name: "bob".to_string(),
        symbol: Mark::O,
    }));

    let carol_events = drain(&mut carol.rx);
    assert!(carol_events.iter().any(|e| matches!(
        e,
        ServerEvent::LobbyFull { text, .. } if text == "The lobby is full, you are now spectating."
    )));

    let announcements: Vec<&str> = session
        .chat()
        .iter()
        .filter(|entry| entry.is_system())
        .map(|entry| entry.text().as_str())
        .collect();
    assert_eq!(
        announcements,
        vec![
            "alice has joined the game, playing as X",
            "bob has joined the game, playing as O",
            "carol is now spectating",
        ]
    );
    assert_eq!(session.connection_count(), 3);
}

#[test]
fn test_initial_state_sent_on_connect() {
    let mut session = Session::new("room-1".to_string());
    let _alice = join(&mut session, "alice");

    let (conn, mut rx) = Connection::open();
    session.connect(conn.clone());
    session.connect(conn);

    let events = drain(&mut rx);
    assert_eq!(kinds(&events), vec!["initialState"]);
    match &events[0] {
        ServerEvent::InitialState { state } => {
            assert_eq!(state.room_id(), "room-1");
            assert_eq!(state.players().len(), 1);
        }
        other => panic!("Expected initialState, got {:?}", other),
    }
}

#[test]
fn test_ready_starts_game_exactly_once() {
    let mut session = Session::new("room-1".to_string());
    let mut alice = join(&mut session, "alice");
    let bob = join(&mut session, "bob");
    let carol = join(&mut session, "carol");
    drain(&mut alice.rx);

    // Spectators never count toward the threshold.
    assert!(!session.set_ready(&carol.id, true));
    assert!(!session.set_ready(&alice.id, true));
    assert!(!session.game().started());
    assert!(session.set_ready(&bob.id, true));
    assert!(session.game().started());
    assert_eq!(session.phase(), SessionPhase::InProgress);

    assert!(!session.set_ready(&bob.id, true));
    assert!(!session.set_ready(&alice.id, false));
    assert!(!session.set_ready(&alice.id, true));

    let starts = drain(&mut alice.rx)
        .into_iter()
        .filter(|e| matches!(e, ServerEvent::StartGame { .. }))
        .count();
    assert_eq!(starts, 1);
    let last = session.chat().last().expect("Start announcement");
    assert_eq!(last.sender(), SYSTEM_SENDER);
    assert_eq!(last.text(), "Game started! X's turn.");
}

#[test]
fn test_unknown_player_ready_is_ignored() {
    let mut session = Session::new("room-1".to_string());
    let mut alice = join(&mut session, "alice");
    drain(&mut alice.rx);

    assert!(!session.set_ready("nobody", true));
    assert!(drain(&mut alice.rx).is_empty());
}

#[test]
fn test_occupied_cell_rejected_to_submitter_only() {
    let (mut session, mut alice, mut bob) = started_room();

    session
        .submit_move(alice.conn.id(), &alice.id, 4, Mark::X)
        .expect("Center free");
    drain(&mut alice.rx);
    drain(&mut bob.rx);

    let before = session.game().clone();
    let err = session
        .submit_move(bob.conn.id(), &bob.id, 4, Mark::O)
        .expect_err("Center taken");
    assert_eq!(err, InvalidMove::CellOccupied { position: 4 });
    assert_eq!(session.game(), &before);

    let bob_events = drain(&mut bob.rx);
    assert_eq!(bob_events.len(), 1);
    match &bob_events[0] {
        ServerEvent::InvalidMove {
            position, reason, ..
        } => {
            assert_eq!(*position, 4);
            assert_eq!(reason, "cellOccupied");
        }
        other => panic!("Expected invalidMove, got {:?}", other),
    }
    assert!(drain(&mut alice.rx).is_empty());
}

#[test]
fn test_out_of_turn_and_foreign_symbol_rejected() {
    let (mut session, alice, bob) = started_room();

    assert_eq!(
        session.submit_move(bob.conn.id(), &bob.id, 0, Mark::O),
        Err(InvalidMove::NotYourTurn { expected: Mark::X })
    );
    assert_eq!(
        session.submit_move(bob.conn.id(), &bob.id, 0, Mark::X),
        Err(InvalidMove::NotYourTurn { expected: Mark::X })
    );
    assert_eq!(
        session.submit_move(alice.conn.id(), &alice.id, 9, Mark::X),
        Err(InvalidMove::OutOfRange { position: 9 })
    );
    assert_eq!(session.game().board().get(Position::TopLeft), Cell::Empty);
}

#[test]
fn test_row_win_broadcasts_and_resets() {
    let (mut session, mut alice, bob) = started_room();

    let moves = [
        (&alice, 0, Mark::X),
        (&bob, 3, Mark::O),
        (&alice, 1, Mark::X),
        (&bob, 4, Mark::O),
    ];
    for (client, position, mark) in moves {
        let outcome = session
            .submit_move(client.conn.id(), &client.id, position, mark)
            .expect("Legal move");
        assert_eq!(
            outcome,
            MoveOutcome::Continue {
                next_turn: mark.opponent()
            }
        );
    }
    drain(&mut alice.rx);

    let outcome = session
        .submit_move(alice.conn.id(), &alice.id, 2, Mark::X)
        .expect("Winning move");
    let row = [Position::TopLeft, Position::TopCenter, Position::TopRight];
    assert_eq!(
        outcome,
        MoveOutcome::Win {
            winner: Mark::X,
            lines: vec![row],
        }
    );

    let events = drain(&mut alice.rx);
    assert_eq!(kinds(&events), vec!["move", "win"]);
    assert_eq!(
        events[1],
        ServerEvent::Win {
            winner: Mark::X,
            lines: vec![row],
            text: "Player X wins!".to_string(),
        }
    );

    assert!(Position::ALL.iter().all(|p| session.game().board().is_empty(*p)));
    assert_eq!(session.game().turn(), Mark::X);
    assert!(!session.game().started());
}

#[test]
fn test_full_board_without_line_is_draw() {
    let (mut session, mut alice, bob) = started_room();

    let sequence = [0, 1, 2, 4, 3, 5, 7, 6];
    for (i, position) in sequence.into_iter().enumerate() {
        let (client, mark) = if i % 2 == 0 {
            (&alice, Mark::X)
        } else {
            (&bob, Mark::O)
        };
        session
            .submit_move(client.conn.id(), &client.id, position, mark)
            .expect("Legal move");
    }
    drain(&mut alice.rx);

    let outcome = session
        .submit_move(alice.conn.id(), &alice.id, 8, Mark::X)
        .expect("Last cell");
    assert_eq!(outcome, MoveOutcome::Draw);

    let events = drain(&mut alice.rx);
    assert_eq!(
        events,
        vec![
            ServerEvent::Move {
                position: Position::BottomRight,
                symbol: Mark::X,
            },
            ServerEvent::Draw {
                text: "It's a draw!".to_string(),
            },
        ]
    );
    assert_eq!(session.game().turn(), Mark::X);
}

#[test]
fn test_winning_move_on_full_board_is_win_not_draw() {
    let (mut session, mut alice, bob) = started_room();

    // X ends on the main diagonal with the ninth mark.
    let sequence = [0, 1, 2, 3, 4, 5, 7, 6];
    for (i, position) in sequence.into_iter().enumerate() {
        let (client, mark) = if i % 2 == 0 {
            (&alice, Mark::X)
        } else {
            (&bob, Mark::O)
        };
        let outcome = session
            .submit_move(client.conn.id(), &client.id, position, mark)
            .expect("Legal move");
        assert!(matches!(outcome, MoveOutcome::Continue { .. }));
    }
    drain(&mut alice.rx);

    let outcome = session
        .submit_move(alice.conn.id(), &alice.id, 8, Mark::X)
        .expect("Last cell");
    let diagonal = [Position::TopLeft, Position::Center, Position::BottomRight];
    assert_eq!(
        outcome,
        MoveOutcome::Win {
            winner: Mark::X,
            lines: vec![diagonal],
        }
    );

    let events = drain(&mut alice.rx);
    assert_eq!(kinds(&events), vec!["move", "win"]);
    assert!(Position::ALL.iter().all(|p| session.game().board().is_empty(*p)));
    assert_eq!(session.game().turn(), Mark::X);
    assert!(!session.game().started());
}

#[test]
fn test_readiness_survives_reset() {
    let (mut session, alice, bob) = started_room();
    for (client, position, mark) in [
        (&alice, 0, Mark::X),
        (&bob, 3, Mark::O),
        (&alice, 1, Mark::X),
        (&bob, 4, Mark::O),
        (&alice, 2, Mark::X),
    ] {
        session
            .submit_move(client.conn.id(), &client.id, position, mark)
            .expect("Legal move");
    }
    assert!(!session.game().started());
    assert!(session.players().iter().all(|p| *p.ready()));

    // Any ready toggle re-evaluates and starts the next round.
    assert!(session.set_ready(&alice.id, true));
}

#[test]
fn test_reconnect_keeps_identity() {
    let mut session = Session::new("room-1".to_string());
    let alice = join(&mut session, "alice");
    let _bob = join(&mut session, "bob");
    session.leave(alice.conn.id());
    assert_eq!(session.players().len(), 2);

    let (conn, mut rx) = Connection::open();
    let assignment = session.join(&conn, "ignored", Some(&alice.id));
    assert!(*assignment.reconnected());
    assert_eq!(assignment.player_id(), &alice.id);
    assert_eq!(*assignment.role(), Role::X);
    assert_eq!(session.players().len(), 2);

    let events = drain(&mut rx);
    assert_eq!(
        kinds(&events),
        vec!["initialState", "assignPlayer", "chat", "updatePlayers"]
    );
    assert_eq!(
        session.chat().last().map(|entry| entry.text().as_str()),
        Some("welcome back alice")
    );
}

#[test]
fn test_dropped_connection_does_not_block_others() {
    let mut session = Session::new("room-1".to_string());
    let alice = join(&mut session, "alice");
    let mut bob = join(&mut session, "bob");
    drain(&mut bob.rx);

    drop(alice.rx);
    let entry = session.post_chat("bob", "anyone there?");
    assert_eq!(entry.text(), "anyone there?");

    let events = drain(&mut bob.rx);
    assert_eq!(events, vec![ServerEvent::from(&entry)]);
    assert_eq!(session.connection_count(), 2);

    session.leave(alice.conn.id());
    assert_eq!(session.connection_count(), 1);
}

#[test]
fn test_snapshot_rehydrates_state() {
    let (mut session, alice, _bob) = started_room();
    session
        .submit_move(alice.conn.id(), &alice.id, 4, Mark::X)
        .expect("Center free");
    session.post_chat("alice", "hi");

    let snapshot = session.snapshot();
    assert_eq!(snapshot.ready_players().get(&alice.id), Some(&true));

    let json = snapshot.to_json().expect("Encode");
    let restored = Session::from_snapshot(
        versus_server::RoomSnapshot::from_json(&json).expect("Decode"),
    );
    assert_eq!(restored.game(), session.game());
    assert_eq!(restored.players(), session.players());
    assert_eq!(restored.chat(), session.chat());
    assert_eq!(restored.connection_count(), 0);
}
