//! Draw detection across real move sequences.

use crate::board::{MoveList, Position, START_FEN};

fn play(pos: &mut Position, line: &[&str]) {
    for uci in line {
        let mv = pos.parse_move(uci).unwrap();
        pos.perform_move(mv);
    }
}

#[test]
fn test_no_draw_in_fresh_game() {
    let pos = Position::from_fen(START_FEN).unwrap();
    assert!(!pos.is_draw());
}

#[test]
fn test_twofold_is_not_yet_a_draw() {
    let mut pos = Position::from_fen(START_FEN).unwrap();
    play(&mut pos, &["g1f3", "g8f6", "f3g1", "f6g8"]);
    assert!(!pos.is_draw());
}

#[test]
fn test_threefold_draw_after_shuffle() {
    let mut pos = Position::from_fen(START_FEN).unwrap();
    play(
        &mut pos,
        &["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"],
    );
    assert!(pos.is_draw());
}

#[test]
fn test_repetition_window_resets_on_pawn_move() {
    let mut pos = Position::from_fen(START_FEN).unwrap();
    play(&mut pos, &["g1f3", "g8f6", "f3g1", "f6g8"]);
    // a pawn move makes the earlier keys unreachable
    play(&mut pos, &["e2e4", "e7e5"]);
    play(&mut pos, &["g1f3", "g8f6", "f3g1", "f6g8"]);
    assert!(!pos.is_draw());
}

#[test]
fn test_draw_flag_clears_on_revert() {
    let mut pos = Position::from_fen(START_FEN).unwrap();
    play(
        &mut pos,
        &["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1"],
    );
    let mv = pos.parse_move("f6g8").unwrap();
    let info = pos.perform_move(mv);
    assert!(pos.is_draw());
    pos.revert_move(&info);
    assert!(!pos.is_draw());
}

#[test]
fn test_capture_to_lone_kings_is_draw() {
    let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 b - - 0 1").unwrap();
    assert!(!pos.is_draw());
    play(&mut pos, &["e8d8"]);
    assert!(!pos.is_draw());
    // white blunders the queen; K v K remains
    play(&mut pos, &["d1d7", "d8d7"]);
    assert!(pos.is_draw());
}

#[test]
fn test_stalemate_is_no_moves_not_draw_predicate() {
    let pos = Position::from_fen("5k2/5P2/5K2/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(pos.has_no_moves());
    assert!(!pos.in_check());
    let mut moves = MoveList::new();
    pos.legal_moves(&mut moves);
    assert!(moves.is_empty());
}
