//! Inbound events routed through a participant onto its room.

use tokio::sync::mpsc::UnboundedReceiver;
use versus_server::{ClientEvent, Connection, Participant, Role, ServerEvent, Session};
use versus_tictactoe::{Cell, Mark, Position};

fn drain(rx: &mut UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn send(participant: &mut Participant, session: &mut Session, frame: &str) {
    let event = ClientEvent::parse(frame).expect("Well-formed frame");
    participant.handle(session, event);
}

fn joined(session: &mut Session, name: &str) -> (Participant, UnboundedReceiver<ServerEvent>) {
    let (conn, rx) = Connection::open();
    let mut participant = Participant::new(conn);
    send(
        &mut participant,
        session,
        &format!(r#"{{"type":"open","username":"{}"}}"#, name),
    );
    (participant, rx)
}

fn ready_flag(session: &Session, name: &str) -> bool {
    session
        .players()
        .iter()
        .find(|p| p.name() == name)
        .map(|p| *p.ready())
        .expect("Player exists")
}

#[test]
fn test_open_joins_and_remembers_player() {
    let mut session = Session::new("room-1".to_string());
    let (alice, mut rx) = joined(&mut session, "alice");

    let player_id = alice.player_id().expect("Joined").clone();
    assert_eq!(session.players().len(), 1);
    assert_eq!(session.players()[0].id(), &player_id);
    assert_eq!(*session.players()[0].role(), Role::X);
    assert!(drain(&mut rx).iter().any(|e| matches!(
        e,
        ServerEvent::AssignPlayer { symbol: Mark::X, .. }
    )));
}

#[test]
fn test_second_set_username_reconnects() {
    let mut session = Session::new("room-1".to_string());
    let (mut alice, mut rx) = joined(&mut session, "alice");
    let first_id = alice.player_id().expect("Joined").clone();
    drain(&mut rx);

    send(
        &mut alice,
        &mut session,
        r#"{"type":"setUsername","username":"alice"}"#,
    );

    assert_eq!(session.players().len(), 1);
    assert_eq!(alice.player_id(), Some(&first_id));
    assert_eq!(
        session.chat().last().map(|entry| entry.text().as_str()),
        Some("welcome back alice")
    );
    assert!(drain(&mut rx).iter().any(|e| matches!(
        e,
        ServerEvent::AssignPlayer { id, .. } if id == &first_id
    )));
}

#[test]
fn test_set_username_with_known_id_from_new_connection() {
    let mut session = Session::new("room-1".to_string());
    let (alice, _rx) = joined(&mut session, "alice");
    let alice_id = alice.player_id().expect("Joined").clone();
    drop(alice);

    let (conn, _rx) = Connection::open();
    let mut again = Participant::new(conn);
    send(
        &mut again,
        &mut session,
        &format!(
            r#"{{"type":"open","username":"alice","playerID":"{}"}}"#,
            alice_id
        ),
    );
    assert_eq!(again.player_id(), Some(&alice_id));
    assert_eq!(session.players().len(), 1);
}

#[test]
fn test_move_attributed_to_joined_player() {
    let mut session = Session::new("room-1".to_string());
    let (mut alice, _alice_rx) = joined(&mut session, "alice");
    let (_bob, _bob_rx) = joined(&mut session, "bob");

    // The username in the frame is ignored when the connection has joined.
    send(
        &mut alice,
        &mut session,
        r#"{"type":"move","position":4,"symbol":"X","username":"someone else"}"#,
    );
    assert_eq!(session.game().board().get(Position::Center), Cell::X);
    assert_eq!(session.game().turn(), Mark::O);
}

#[test]
fn test_move_from_unjoined_connection_uses_username() {
    let mut session = Session::new("room-1".to_string());
    let (_alice, _alice_rx) = joined(&mut session, "alice");

    let (conn, _rx) = Connection::open();
    let mut anonymous = Participant::new(conn);
    send(
        &mut anonymous,
        &mut session,
        r#"{"type":"move","position":0,"symbol":"X","username":"alice"}"#,
    );
    assert_eq!(session.game().board().get(Position::TopLeft), Cell::X);
}

#[test]
fn test_spectator_move_in_players_name_is_rejected() {
    let mut session = Session::new("room-1".to_string());
    let (_alice, mut alice_rx) = joined(&mut session, "alice");
    let (_bob, _bob_rx) = joined(&mut session, "bob");
    let (mut carol, mut carol_rx) = joined(&mut session, "carol");
    drain(&mut alice_rx);
    drain(&mut carol_rx);

    send(
        &mut carol,
        &mut session,
        r#"{"type":"move","position":4,"symbol":"X","username":"alice"}"#,
    );

    assert_eq!(session.game().board().get(Position::Center), Cell::Empty);
    let events = drain(&mut carol_rx);
    assert_eq!(events.len(), 1);
    match &events[0] {
        ServerEvent::InvalidMove { reason, .. } => assert_eq!(reason, "notYourTurn"),
        other => panic!("Expected invalidMove, got {:?}", other),
    }
    assert!(drain(&mut alice_rx).is_empty());
}

#[test]
fn test_ready_by_name_and_id_then_unready() {
    let mut session = Session::new("room-1".to_string());
    let (alice, _alice_rx) = joined(&mut session, "alice");
    let (mut bob, _bob_rx) = joined(&mut session, "bob");
    let alice_id = alice.player_id().expect("Joined").clone();

    let (conn, _rx) = Connection::open();
    let mut observer = Participant::new(conn);
    send(
        &mut observer,
        &mut session,
        r#"{"type":"ready","username":"alice","ready":true}"#,
    );
    assert!(ready_flag(&session, "alice"));

    send(&mut bob, &mut session, r#"{"type":"ready","ready":true,"id":"unknown"}"#);
    assert!(!ready_flag(&session, "bob"));

    let bob_id = bob.player_id().expect("Joined").clone();
    send(
        &mut bob,
        &mut session,
        &format!(r#"{{"type":"ready","id":"{}","ready":true}}"#, bob_id),
    );
    assert!(ready_flag(&session, "bob"));
    assert!(session.game().started());

    send(
        &mut observer,
        &mut session,
        &format!(r#"{{"type":"unready","id":"{}"}}"#, alice_id),
    );
    assert!(!ready_flag(&session, "alice"));
    assert!(session.game().started());
}

#[test]
fn test_chat_is_appended_and_broadcast() {
    let mut session = Session::new("room-1".to_string());
    let (mut alice, mut rx) = joined(&mut session, "alice");
    drain(&mut rx);

    send(
        &mut alice,
        &mut session,
        r#"{"type":"chat","sender":"alice","text":"gl hf"}"#,
    );
    let last = session.chat().last().expect("Chat appended");
    assert_eq!(last.text(), "gl hf");
    assert_eq!(drain(&mut rx), vec![ServerEvent::from(last)]);
}
