//! Boundary behaviour: tricky legality cases cross-checked with small
//! perft counts.

use crate::board::{Move, MoveList, Position, START_FEN};
use crate::perft::perft;

fn legal(fen: &str) -> MoveList {
    let pos = Position::from_fen(fen).unwrap();
    let mut moves = MoveList::new();
    pos.legal_moves(&mut moves);
    moves
}

fn count(fen: &str, depth: u32) -> u64 {
    let mut pos = Position::from_fen(fen).unwrap();
    perft(&mut pos, depth)
}

#[test]
fn test_start_position_counts() {
    assert_eq!(count(START_FEN, 1), 20);
    assert_eq!(count(START_FEN, 2), 400);
    assert_eq!(count(START_FEN, 3), 8902);
}

#[test]
fn test_en_passant_position_counts() {
    let fen = "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3";
    assert_eq!(count(fen, 1), 31);
    assert_eq!(count(fen, 2), 707);
    assert_eq!(count(fen, 3), 21_637);
}

#[test]
fn test_promotion_position_counts() {
    let fen = "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1";
    assert_eq!(count(fen, 1), 24);
    assert_eq!(count(fen, 2), 496);
    assert_eq!(count(fen, 3), 9483);
}

#[test]
fn test_castling_position_counts() {
    let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
    assert_eq!(count(fen, 1), 26);
    assert_eq!(count(fen, 2), 568);
    assert_eq!(count(fen, 3), 13_744);
}

#[test]
fn test_kiwipete_shallow() {
    let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    assert_eq!(count(fen, 1), 48);
    assert_eq!(count(fen, 2), 2039);
}

#[test]
fn test_uci_round_trip_over_all_legal_moves() {
    for fen in [
        START_FEN,
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
    ] {
        let pos = Position::from_fen(fen).unwrap();
        let mut moves = MoveList::new();
        pos.legal_moves(&mut moves);
        for &mv in &moves {
            assert_eq!(Move::from_uci(&mv.to_string()).unwrap(), mv);
        }
    }
}

#[test]
fn test_no_legal_move_leaves_own_king_in_check() {
    for fen in [
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "4k3/8/8/8/4r3/8/3B4/4K3 w - - 0 1",
    ] {
        let mut pos = Position::from_fen(fen).unwrap();
        let us = pos.turn();
        let mut moves = MoveList::new();
        pos.legal_moves(&mut moves);
        for &mv in &moves {
            let info = pos.perform_move(mv);
            let king = pos.king_square(us);
            assert!(
                !pos.is_square_attacked(king, us.opponent(), pos.occupancy),
                "{mv} leaves the king en prise in {fen}"
            );
            pos.revert_move(&info);
        }
    }
}

#[test]
fn test_castling_rights_fade_after_king_walk() {
    let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    let mv = pos.parse_move("e1e2").unwrap();
    pos.perform_move(mv);
    let mv = pos.parse_move("e8e7").unwrap();
    pos.perform_move(mv);
    let mv = pos.parse_move("e2e1").unwrap();
    pos.perform_move(mv);
    let mv = pos.parse_move("e7e8").unwrap();
    pos.perform_move(mv);
    // kings are home again, but the rights are gone for good
    let mut moves = MoveList::new();
    pos.legal_moves(&mut moves);
    let strings: Vec<String> = moves.iter().map(ToString::to_string).collect();
    assert!(!strings.contains(&"e1g1".to_string()));
    assert!(!strings.contains(&"e1c1".to_string()));
}

#[test]
fn test_en_passant_expires_after_one_move() {
    let mut pos = Position::from_fen(
        "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
    )
    .unwrap();
    // white declines the capture
    let mv = pos.parse_move("g1f3").unwrap();
    pos.perform_move(mv);
    let mv = pos.parse_move("g8f6").unwrap();
    pos.perform_move(mv);
    let mut moves = MoveList::new();
    pos.legal_moves(&mut moves);
    let strings: Vec<String> = moves.iter().map(ToString::to_string).collect();
    assert!(!strings.contains(&"e5f6".to_string()));
}

#[test]
fn test_promotion_only_on_last_rank() {
    // the pawn on a6 must not emit promotion moves
    let moves = legal("4k3/8/P7/8/8/8/8/4K3 w - - 0 1");
    let a_pawn: Vec<String> = moves
        .iter()
        .map(ToString::to_string)
        .filter(|m| m.starts_with("a6"))
        .collect();
    assert_eq!(a_pawn, vec!["a6a7".to_string()]);
}

#[test]
fn test_underpromotion_capture_counts() {
    // pawn may capture either knight or push, each with four promotions
    let fen = "n1n5/1P6/8/8/8/8/8/k3K3 w - - 0 1";
    let moves = legal(fen);
    let promos: Vec<String> = moves
        .iter()
        .map(ToString::to_string)
        .filter(|m| m.starts_with("b7"))
        .collect();
    assert_eq!(promos.len(), 12); // b7a8, b7b8, b7c8 with q n r b each
}
