//! The engine: a position plus a fixed-depth searcher, exposed to hosts as
//! construct / apply moves / ask for a move.

mod eval;
mod log;
mod search;

pub use eval::{is_mate_score, INFINITE_SCORE, MATE_SCORE, SCORE_EQUAL};
pub use log::format_score;
pub use search::OPTIMAL_MOVE_THRESHOLD;

use std::collections::HashMap;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::board::error::{FenError, MoveParseError};
use crate::board::{Color, Move, Position, UnmakeInfo};

/// Default search horizon in half-moves
pub const DEFAULT_SEARCH_DEPTH: u32 = 6;

/// A playing engine bound to one side of one game.
pub struct Engine {
    pub(crate) pos: Position,
    color: Color,
    pub(crate) search_depth: u32,
    pub(crate) evaluated_positions: HashMap<u64, i32>,
    pub(crate) evaluated_pawn_positions: [HashMap<u64, i32>; 2],
    pub(crate) nodes: u64,
    pub(crate) cut_nodes: u64,
    pub(crate) first_cut_nodes: u64,
    pub(crate) rng: StdRng,
}

impl Engine {
    /// Build an engine from a FEN, playing `color`, searching
    /// `search_depth` half-moves deep.
    pub fn new(fen: &str, color: Color, search_depth: u32) -> Result<Engine, FenError> {
        Ok(Engine {
            pos: Position::from_fen(fen)?,
            color,
            search_depth,
            evaluated_positions: HashMap::new(),
            evaluated_pawn_positions: [HashMap::new(), HashMap::new()],
            nodes: 0,
            cut_nodes: 0,
            first_cut_nodes: 0,
            rng: StdRng::from_entropy(),
        })
    }

    /// The position being played
    #[must_use]
    pub fn pos(&self) -> &Position {
        &self.pos
    }

    /// The side this engine plays
    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Replay a space-separated list of long-algebraic moves. Moves already
    /// performed (by count) are skipped, so the host may resend the full
    /// game line each time. On any bad token the call fails and the
    /// position is left exactly as it was.
    pub fn apply_moves(&mut self, moves: &str) -> Result<(), MoveParseError> {
        let mut applied: Vec<UnmakeInfo> = Vec::new();
        for token in moves.split_whitespace().skip(self.pos.move_count()) {
            match self.pos.parse_move(token) {
                Ok(mv) => applied.push(self.pos.perform_move(mv)),
                Err(err) => {
                    while let Some(info) = applied.pop() {
                        self.pos.revert_move(&info);
                    }
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// Search for a move. Returns `None` when it is not this engine's turn,
    /// the game is drawn, or there is no legal move; that is an answer, not
    /// an error.
    pub fn make_move(&mut self) -> Option<Move> {
        if self.color != self.pos.turn() || self.pos.is_draw() || self.pos.has_no_moves() {
            return None;
        }

        self.nodes = 0;
        self.cut_nodes = 0;
        self.first_cut_nodes = 0;
        self.evaluated_positions.clear();
        self.evaluated_pawn_positions[0].clear();
        self.evaluated_pawn_positions[1].clear();

        let started = Instant::now();
        let mv = self.optimal_move();
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.log_search_report(elapsed_ms);

        mv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::START_FEN;

    #[test]
    fn test_engine_rejects_bad_fen() {
        assert!(Engine::new("not a fen", Color::White, 4).is_err());
    }

    #[test]
    fn test_apply_moves_replays_a_line() {
        let mut e = Engine::new(START_FEN, Color::White, 4).unwrap();
        e.apply_moves("e2e4 e7e5").unwrap();
        assert_eq!(e.pos().move_count(), 2);
        assert_eq!(e.pos().turn(), Color::White);
    }

    #[test]
    fn test_apply_moves_skips_already_played_prefix() {
        let mut e = Engine::new(START_FEN, Color::White, 4).unwrap();
        e.apply_moves("e2e4").unwrap();
        // host resends the whole line; only the tail is applied
        e.apply_moves("e2e4 e7e5 g1f3").unwrap();
        assert_eq!(e.pos().move_count(), 3);
    }

    #[test]
    fn test_apply_moves_rolls_back_on_error() {
        let mut e = Engine::new(START_FEN, Color::White, 4).unwrap();
        let fen_before = e.pos().to_fen();
        let key_before = e.pos().position_key();

        let result = e.apply_moves("e2e4 e7e5 z9z9");
        assert!(result.is_err());
        assert_eq!(e.pos().to_fen(), fen_before);
        assert_eq!(e.pos().position_key(), key_before);
        assert_eq!(e.pos().move_count(), 0);
    }

    #[test]
    fn test_apply_moves_rolls_back_on_illegal_move() {
        let mut e = Engine::new(START_FEN, Color::White, 4).unwrap();
        let fen_before = e.pos().to_fen();
        let result = e.apply_moves("e2e4 e7e5 a1a5");
        assert!(matches!(result, Err(MoveParseError::IllegalMove { .. })));
        assert_eq!(e.pos().to_fen(), fen_before);
    }

    #[test]
    fn test_make_move_refuses_off_turn() {
        let mut e = Engine::new(START_FEN, Color::Black, 2).unwrap();
        assert_eq!(e.make_move(), None);
    }

    #[test]
    fn test_make_move_refuses_drawn_position() {
        let mut e = Engine::new("4k3/8/8/8/8/8/8/4K3 w - - 0 1", Color::White, 2).unwrap();
        assert_eq!(e.make_move(), None);
    }

    #[test]
    fn test_make_move_refuses_when_no_moves() {
        // stalemated side asked to move
        let mut e = Engine::new("5k2/5P2/5K2/8/8/8/8/8 b - - 0 1", Color::Black, 2).unwrap();
        assert_eq!(e.make_move(), None);
    }

    #[test]
    fn test_make_move_plays_a_legal_move() {
        let mut e = Engine::new(START_FEN, Color::White, 2).unwrap();
        let mv = e.make_move().unwrap();
        assert!(e.pos().parse_move(&mv.to_string()).is_ok());
    }

    #[test]
    fn test_caches_cleared_between_searches() {
        let mut e = Engine::new(START_FEN, Color::White, 2).unwrap();
        e.make_move().unwrap();
        let nodes_first = e.nodes;
        assert!(nodes_first > 0);
        assert!(!e.evaluated_positions.is_empty());
        // engine does not mutate its own game state; searching again works
        e.make_move().unwrap();
        assert!(e.nodes > 0);
    }
}
