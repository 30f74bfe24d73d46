mod common;

use common::*;
use pretty_assertions::assert_eq;
use whales_chess::api::{ApiCommand, ApiError};
use whales_chess::board_view::SquareHighlight;
use whales_chess::coordinator::{MoveAttempt, SessionPhase};
use whales_chess::force::Force;
use whales_chess::move_client::RequestId;


fn assert_halted(session: &Session, raw_message_part: &str) {
    match session.phase() {
        SessionPhase::Halted { message } => assert!(
            message.contains(raw_message_part),
            "'{message}' does not contain '{raw_message_part}'"
        ),
        phase => panic!("expected halted session, got {phase:?}"),
    }
    let fatal_error = session.view().fatal_error.clone().unwrap();
    assert!(fatal_error.starts_with("W.H.A.L.E.S. encountered an unexpected error"));
}

#[test]
fn white_move_and_reply() {
    let mut session = Session::new("");
    assert_eq!(session.phase(), SessionPhase::PlayerToMove);
    assert_eq!(session.view().status, "Your move!");
    assert_eq!(session.num_outstanding(), 0);

    assert_eq!(session.player_moves("e2e4"), MoveAttempt::ACCEPTED);
    assert_eq!(session.phase(), SessionPhase::AwaitingOpponent);
    assert_eq!(session.view().status, "The computer is thinking...");
    assert!(session.view().outlined().is_empty());

    let request = session.opponent_replies("1. e4 e5 *");
    assert_eq!(
        request.command,
        ApiCommand::GetMove { model: "random".to_owned(), pgn: "1. e4".to_owned() }
    );
    assert_eq!(session.pgn(), "1. e4 e5");
    assert_eq!(session.phase(), SessionPhase::PlayerToMove);
    assert_eq!(session.view().status, "Your move!");
    assert_eq!(session.view().outlined(), vec!["e7", "e5"]);
    assert_eq!(session.coordinator.session().pending, None);
}

#[test]
fn black_waits_for_opponent_first() {
    let mut session = Session::new("playerColor:b");
    assert_eq!(session.view().orientation, Some(Force::Black));
    assert_eq!(session.phase(), SessionPhase::AwaitingOpponent);

    let request = session.opponent_replies("1. e4");
    assert_eq!(request_pgn(&request), "");
    assert_eq!(session.phase(), SessionPhase::PlayerToMove);
    assert_eq!(session.player_moves("e7e5"), MoveAttempt::ACCEPTED);
    assert_eq!(request_pgn(&session.opponent_replies("1. e4 e5 2. Nf3")), "1. e4 e5");
    assert_eq!(session.pgn(), "1. e4 e5 2. Nf3");
}

#[test]
fn foreign_or_missing_piece_is_rejected() {
    let mut session = Session::new("");
    assert_eq!(session.player_moves("e7e5"), MoveAttempt::REJECTED);
    assert_eq!(session.player_moves("e4e5"), MoveAttempt::REJECTED);
    assert_eq!(session.player_moves("e2e5"), MoveAttempt::REJECTED);
    assert_eq!(session.pgn(), "");
    assert_eq!(session.phase(), SessionPhase::PlayerToMove);
    assert_eq!(session.num_outstanding(), 0);
    assert!(!session.coordinator.can_drag_from(coord("e7")));
    assert!(session.coordinator.can_drag_from(coord("e2")));
}

#[test]
fn no_moves_while_opponent_thinks() {
    let mut session = Session::new("");
    session.player_moves("e2e4");
    assert!(!session.coordinator.can_drag_from(coord("d2")));
    assert_eq!(session.player_moves("d2d4"), MoveAttempt::REJECTED);
    assert_eq!(session.player_moves("e7e5"), MoveAttempt::REJECTED);
    assert_eq!(session.pgn(), "1. e4");
    assert_eq!(session.num_outstanding(), 1);
}

#[test]
fn promotion_needs_choice() {
    let mut session = Session::new("pgn:1. h4 g5 2. hxg5 h6 3. gxh6 Bg7 4. hxg7 Nf6");
    let pgn_before = session.pgn();
    assert_eq!(session.player_moves("g7g8"), MoveAttempt::NEEDS_PROMOTION_CHOICE);
    assert_eq!(session.pgn(), pgn_before);
    assert_eq!(session.phase(), SessionPhase::PlayerToMove);
    assert_eq!(session.num_outstanding(), 0);

    assert_eq!(session.player_moves("g7g8n"), MoveAttempt::ACCEPTED);
    assert_eq!(session.coordinator.session().transcript.last(), Some("g8=N"));
    assert_eq!(session.phase(), SessionPhase::AwaitingOpponent);
}

#[test]
fn malformed_move_response_halts_session() {
    let mut session = Session::new("");
    session.player_moves("e2e4");
    session.answer_move(r#"{"error": null}"#);
    assert_halted(&session, "API response for 'get_move' has no 'pgn' string");

    assert!(!session.coordinator.can_drag_from(coord("d2")));
    assert_eq!(session.player_moves("d2d4"), MoveAttempt::REJECTED);
    assert!(!session.coordinator.undo());
    session.coordinator.new_game();
    assert_eq!(session.pgn(), "1. e4");
    assert_eq!(session.num_outstanding(), 0);
}

#[test]
fn server_error_halts_session() {
    let mut session = Session::new("");
    session.player_moves("e2e4");
    session.answer_move(&error_response("model exploded"));
    assert_halted(&session, "model exploded");
    assert!(session.view().fatal_error.clone().unwrap().contains("\"Model exploded\""));
    assert!(session.coordinator.status_text().contains("Model exploded"));
}

#[test]
fn transport_error_halts_session() {
    let mut session = Session::new("");
    session.player_moves("e2e4");
    let request = session.take_move_request().unwrap();
    session
        .coordinator
        .process_api_response(request.id, Err(ApiError::Transport("gateway timeout".to_owned())));
    assert_halted(&session, "gateway timeout");
}

#[test]
fn response_must_extend_by_one_ply() {
    let mut session = Session::new("");
    session.player_moves("e2e4");
    session.opponent_replies("1. d4 d5");
    assert_halted(&session, "does not extend the game");

    let mut session = Session::new("");
    session.player_moves("e2e4");
    session.opponent_replies("1. e4 e5 2. Nf3");
    assert_halted(&session, "does not extend the game");

    let mut session = Session::new("");
    session.player_moves("e2e4");
    session.opponent_replies("1. e4 e4");
    assert_halted(&session, "illegal move 'e4'");
}

#[test]
fn undo_cancels_pending_request() {
    let mut session = Session::new("");
    session.player_moves("e2e4");
    let request = session.take_move_request().unwrap();
    assert!(session.coordinator.undo());
    assert_eq!(session.pgn(), "");
    assert_eq!(session.cancelled(), vec![request.id]);
    assert_eq!(session.phase(), SessionPhase::PlayerToMove);

    // Late answer to the cancelled request.
    session.coordinator.process_api_response(request.id, Ok(get_move_response("1. e4 e5")));
    assert_eq!(session.pgn(), "");
    assert_eq!(session.phase(), SessionPhase::PlayerToMove);
    assert_eq!(session.view().fatal_error, None);
}

#[test]
fn undo_reverts_move_pair() {
    let mut session = Session::new("");
    session.player_moves("e2e4");
    session.opponent_replies("1. e4 e5");
    session.player_moves("g1f3");
    session.opponent_replies("1. e4 e5 2. Nf3 Nc6");

    assert!(session.coordinator.undo());
    assert_eq!(session.pgn(), "1. e4 e5");
    assert_eq!(session.view().outlined(), vec!["e7", "e5"]);
    assert!(session.coordinator.undo());
    assert_eq!(session.pgn(), "");
    assert!(session.view().outlined().is_empty());
    assert!(!session.coordinator.undo());
    assert_eq!(session.num_outstanding(), 0);
}

#[test]
fn black_cannot_undo_before_first_move() {
    let mut session = Session::new("playerColor:b");
    assert!(!session.coordinator.undo());
    assert_eq!(session.num_outstanding(), 1);
    session.opponent_replies("1. e4");
    assert!(!session.coordinator.undo());
    assert_eq!(session.pgn(), "1. e4");

    session.player_moves("e7e5");
    assert!(session.coordinator.undo());
    assert_eq!(session.pgn(), "1. e4");
    assert_eq!(session.phase(), SessionPhase::PlayerToMove);
}

#[test]
fn undo_after_game_over() {
    let mut won = Session::new("pgn:1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6");
    assert_eq!(won.player_moves("h5f7"), MoveAttempt::ACCEPTED);
    assert_eq!(won.phase(), SessionPhase::GameOver);
    assert_eq!(won.view().status, "Checkmate! You have won!");
    assert_eq!(won.num_outstanding(), 0);
    assert!(won.coordinator.undo());
    assert_eq!(won.pgn(), "1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6");
    assert_eq!(won.phase(), SessionPhase::PlayerToMove);

    let mut lost = Session::new("pgn:1. f3 e5 2. g4");
    lost.opponent_replies("1. f3 e5 2. g4 Qh4#");
    assert_eq!(lost.phase(), SessionPhase::GameOver);
    assert_eq!(lost.view().status, "Checkmate! You have lost.");
    assert!(lost.coordinator.undo());
    assert_eq!(lost.pgn(), "1. f3 e5");
    assert_eq!(lost.phase(), SessionPhase::PlayerToMove);
}

#[test]
fn check_highlight_follows_position() {
    let mut session = Session::new("pgn:1. e4 f5");
    session.player_moves("d1h5");
    assert_eq!(session.view().status, "Check! The computer is thinking...");
    assert_eq!(session.view().highlighted(SquareHighlight::Check), vec!["e8"]);

    session.opponent_replies("1. e4 f5 2. Qh5+ g6");
    assert_eq!(session.view().status, "Your move!");
    assert!(session.view().highlighted(SquareHighlight::Check).is_empty());
}

#[test]
fn hover_highlights_destinations() {
    let mut session = Session::new("");
    session.coordinator.hover_square(coord("e2"));
    assert_eq!(session.view().highlighted(SquareHighlight::Hover), vec!["e2", "e3", "e4"]);
    session.coordinator.hover_exit();
    assert!(session.view().highlights.is_empty());

    // Opponent pieces and stuck pieces are not highlighted.
    session.coordinator.hover_square(coord("e7"));
    session.coordinator.hover_square(coord("a1"));
    assert!(session.view().highlights.is_empty());
}

#[test]
fn hover_keeps_check_highlight() {
    let mut session = Session::new("playerColor:b,pgn:1. e4 f5");
    session.opponent_replies("1. e4 f5 2. Qh5+");
    assert_eq!(session.view().status, "Check! Your move.");
    session.coordinator.hover_square(coord("g7"));
    assert_eq!(session.view().highlighted(SquareHighlight::Hover), vec!["g6", "g7"]);
    session.coordinator.hover_exit();
    assert_eq!(session.view().highlighted(SquareHighlight::Hover), Vec::<String>::new());
    assert_eq!(session.view().highlighted(SquareHighlight::Check), vec!["e8"]);
}

#[test]
fn opponent_display_name() {
    let session = Session::new("backendModel:minimax");
    assert_eq!(session.view().opponent_name.as_deref(), Some("Hard"));
    assert_eq!(session.coordinator.models().unwrap().len(), 2);

    let unknown = Session::new("backendModel:stockfish");
    assert_eq!(unknown.view().opponent_name.as_deref(), Some("stockfish"));
}

#[test]
fn malformed_model_list_halts_session() {
    let mut session = Session::without_models("");
    session.answer_models(r#"{"error": null, "models": 5}"#);
    assert_halted(&session, "API response for 'list_models' was not an array");

    let mut session = Session::without_models("");
    session.answer_models(r#"{"error": null, "models": [{"displayName": "Easy"}]}"#);
    assert_halted(&session, "missing key 'internalName'");
}

#[test]
fn stale_responses_are_ignored() {
    let mut session = Session::new("");
    session.player_moves("e2e4");
    session.coordinator.process_api_response(RequestId(999), Ok(get_move_response("1. e4 c5")));
    session
        .coordinator
        .process_api_response(RequestId(998), Ok(list_models_response(&[("X", "random")])));
    assert_eq!(session.pgn(), "1. e4");
    assert_eq!(session.phase(), SessionPhase::AwaitingOpponent);
    assert_eq!(session.view().opponent_name.as_deref(), Some("Easy"));
    session.opponent_replies("1. e4 e5");
    assert_eq!(session.pgn(), "1. e4 e5");
}

#[test]
fn new_game_restarts() {
    let mut session = Session::new("playerColor:b");
    let first = session.opponent_replies("1. e4");
    session.player_moves("e7e5");
    let pending = session.take_move_request().unwrap();
    session.coordinator.new_game();
    assert_eq!(session.pgn(), "");
    assert_eq!(session.cancelled(), vec![pending.id]);
    let restart = session.take_move_request().unwrap();
    assert_eq!(request_pgn(&restart), "");
    assert_ne!(restart.id, first.id);
    assert_eq!(session.coordinator.session().pending, Some(restart.id));
}

#[test]
fn change_settings_starts_new_session() {
    let mut session = Session::new("");
    session.player_moves("e2e4");
    let pending = session.take_move_request().unwrap();

    session.coordinator.change_settings(Force::Black, "minimax".to_owned());
    assert_eq!(session.cancelled(), vec![pending.id]);
    assert_eq!(session.pgn(), "");
    assert_eq!(session.view().orientation, Some(Force::Black));
    assert_eq!(session.view().opponent_name.as_deref(), Some("Hard"));
    // Model list is cached.
    assert_eq!(session.take_models_request(), None);
    let request = session.take_move_request().unwrap();
    assert_eq!(request.command, ApiCommand::GetMove { model: "minimax".to_owned(), pgn: String::new() });
    assert_eq!(session.fragment(), "playerColor:b,backendModel:minimax,pgn:");
}

#[test]
fn session_is_persisted_on_every_change() {
    let mut session = Session::new("");
    assert_eq!(session.fragment(), "playerColor:w,backendModel:random,pgn:");
    session.player_moves("e2e4");
    assert_eq!(session.fragment(), "playerColor:w,backendModel:random,pgn:1.%20e4");
    session.opponent_replies("1. e4 e5");
    let fragment = session.fragment().to_owned();
    assert_eq!(fragment, "playerColor:w,backendModel:random,pgn:1.%20e4%20e5");

    let restored = Session::new(&fragment);
    assert_eq!(restored.pgn(), "1. e4 e5");
    assert_eq!(restored.phase(), SessionPhase::PlayerToMove);
}

#[test]
fn bad_persisted_game_falls_back_to_defaults() {
    let session = Session::new("playerColor:w,backendModel:minimax,pgn:1. e4 e5 2. Ke2");
    assert_eq!(session.pgn(), "1. e4 e5 2. Ke2");

    let session = Session::new("playerColor:w,backendModel:minimax,pgn:1. e4 Kf7");
    assert_eq!(session.pgn(), "");
    assert_eq!(session.phase(), SessionPhase::PlayerToMove);
    assert_eq!(session.coordinator.session().opponent_id, "minimax");
}
