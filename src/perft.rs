//! Perft: the correctness oracle for move generation and make/unmake.
//!
//! Counts leaf nodes of the legal move tree and compares against known
//! values for a fixed set of positions.

use std::time::Instant;

use crate::board::{MoveList, Position};

/// Count leaf nodes of the legal-move tree `depth` plies deep.
#[must_use]
pub fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut moves = MoveList::new();
    pos.legal_moves(&mut moves);

    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for &mv in &moves {
        let info = pos.perform_move(mv);
        nodes += perft(pos, depth - 1);
        pos.revert_move(&info);
    }
    nodes
}

pub struct PerftFixture {
    pub fen: &'static str,
    pub node_counts: &'static [u64],
}

/// Known-good node counts, indexed by depth starting at 1.
pub const FIXTURES: &[PerftFixture] = &[
    PerftFixture {
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        node_counts: &[20, 400, 8902, 197_281, 4_865_609],
    },
    PerftFixture {
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        node_counts: &[48, 2039, 97_862, 4_085_603],
    },
    PerftFixture {
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        node_counts: &[14, 191, 2812, 43_238, 674_624, 11_030_083],
    },
    PerftFixture {
        fen: "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        node_counts: &[6, 264, 9467, 422_333, 15_833_292],
    },
    PerftFixture {
        fen: "r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1",
        node_counts: &[6, 264, 9467, 422_333, 15_833_292],
    },
    PerftFixture {
        fen: "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        node_counts: &[44, 1486, 62_379, 2_103_487],
    },
    PerftFixture {
        fen: "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
        node_counts: &[46, 2079, 89_890, 3_894_594],
    },
    PerftFixture {
        fen: "rnbq1k1r/pp1P1ppp/2p5/8/2B4b/P7/1PP1NnPP/RNBQK2R w KQ - 1 9",
        node_counts: &[42, 1432, 51_677, 1_747_286],
    },
    PerftFixture {
        fen: "3b4/2P5/8/8/8/2n5/8/2k1K2R w K - 0 1",
        node_counts: &[20, 268, 5464, 69_692, 1_490_361],
    },
    PerftFixture {
        fen: "6b1/5P2/8/8/3n1k2/8/8/4K2R w K - 0 1",
        node_counts: &[22, 325, 6839, 96_270, 2_148_378],
    },
    PerftFixture {
        fen: "8/p3p3/1b1k4/3P1p2/8/8/1n3B2/2KR4 w - - 0 1",
        node_counts: &[19, 326, 5853, 99_157, 1_905_025],
    },
    PerftFixture {
        fen: "8/p3p3/3k4/3P1p2/8/8/5B2/K7 w - - 0 1",
        node_counts: &[12, 99, 1262, 11_208, 150_846, 1_366_710],
    },
];

/// Run one position at one depth and print its numbers.
pub fn run_one(fen: &str, depth: u32) -> u64 {
    let mut pos = Position::from_fen(fen).expect("perft fixture FEN is valid");
    let started = Instant::now();
    let nodes = perft(&mut pos, depth);
    let elapsed = started.elapsed();
    let ms = elapsed.as_secs_f64() * 1000.0;
    let knps = if ms > 0.0 { nodes as f64 / ms } else { 0.0 };

    println!("fen: {fen}");
    println!("depth: {depth}");
    println!("nodes: {nodes}");
    println!("time: {ms:.3} ms");
    println!("perft: {knps:.0} kn/s");

    nodes
}

/// Run every fixture at every recorded depth. Returns an error naming the
/// first mismatch; the CLI turns that into a non-zero exit.
pub fn run_all() -> Result<(), String> {
    let started = Instant::now();
    let mut total_nodes = 0u64;

    for fixture in FIXTURES {
        for (i, &expected) in fixture.node_counts.iter().enumerate() {
            let depth = i as u32 + 1;
            let nodes = run_one(fixture.fen, depth);
            total_nodes += nodes;
            if nodes != expected {
                return Err(format!(
                    "invalid node count. fen: {}, depth: {depth}, expected {expected}, got {nodes}",
                    fixture.fen
                ));
            }
        }
    }

    let elapsed = started.elapsed();
    let ms = elapsed.as_secs_f64() * 1000.0;
    println!("test took {ms:.3} ms");
    println!("sum perft: {:.0} kn/s", total_nodes as f64 / ms);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::START_FEN;

    #[test]
    fn test_perft_depth_zero_is_one() {
        let mut pos = Position::from_fen(START_FEN).unwrap();
        assert_eq!(perft(&mut pos, 0), 1);
    }

    #[test]
    fn test_perft_leaves_position_unchanged() {
        let mut pos = Position::from_fen(START_FEN).unwrap();
        let key = pos.position_key();
        perft(&mut pos, 3);
        assert_eq!(pos.position_key(), key);
        assert_eq!(pos.to_fen(), START_FEN);
    }

    #[test]
    fn test_start_position_shallow() {
        let mut pos = Position::from_fen(START_FEN).unwrap();
        assert_eq!(perft(&mut pos, 1), 20);
        assert_eq!(perft(&mut pos, 2), 400);
        assert_eq!(perft(&mut pos, 3), 8902);
    }
}
