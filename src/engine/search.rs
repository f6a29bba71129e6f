//! Fixed-depth negamax with alpha-beta, static move ordering, and the
//! threshold-and-jitter move pick at the root.

use rand::Rng;

use crate::board::tables::{KNIGHT_ATTACKS, PAWN_ATTACKS};
use crate::board::{Move, MoveList, PieceType, ScoredMoveList, Square};

use super::eval::{is_mate_score, mate_score, INFINITE_SCORE, SCORE_EQUAL};
use super::Engine;

/// Root candidates within this margin of the best move stay in the hat
pub const OPTIMAL_MOVE_THRESHOLD: i32 = 50;

impl Engine {
    /// Pick a move for the current position: order the root moves by a
    /// shallow evaluation, search each with a window anchored just below
    /// the best score so far, then choose uniformly among the candidates
    /// that finished within the threshold.
    pub(crate) fn optimal_move(&mut self) -> Option<Move> {
        let mut legal = MoveList::new();
        self.pos.legal_moves(&mut legal);

        if legal.is_empty() {
            return None;
        }
        if legal.len() == 1 {
            self.log_only_move(legal[0]);
            return Some(legal[0]);
        }

        let mut ordered = ScoredMoveList::new();
        for &mv in &legal {
            let info = self.pos.perform_move(mv);
            let shallow = -self.eval(1);
            self.pos.revert_move(&info);
            ordered.push(mv, shallow);
        }
        ordered.sort_by_score_desc();

        let mut candidates = ScoredMoveList::new();
        for i in 0..ordered.len() {
            let mv = ordered.as_slice()[i].mv;
            let best_so_far = candidates
                .iter()
                .map(|c| c.score)
                .max()
                .unwrap_or(-INFINITE_SCORE);

            let info = self.pos.perform_move(mv);
            let score = -self.negamax(
                1,
                -INFINITE_SCORE,
                -(best_so_far - OPTIMAL_MOVE_THRESHOLD),
            );
            self.pos.revert_move(&info);
            candidates.push(mv, score);
        }
        candidates.sort_by_score_desc();

        // near a mate only exact ties are interchangeable
        let margin = if is_mate_score(candidates.as_slice()[0].score) {
            1
        } else {
            OPTIMAL_MOVE_THRESHOLD
        };
        candidates.truncate_below(margin);

        let pick = candidates.as_slice()[self.rng.gen_range(0..candidates.len())];
        self.log_candidates(&candidates, pick);
        Some(pick.mv)
    }

    /// Fail-hard negamax. At the horizon the evaluation is transposed on
    /// the position key.
    pub(crate) fn negamax(&mut self, depth: u32, alpha: i32, beta: i32) -> i32 {
        if depth == self.search_depth {
            let key = self.pos.position_key();
            let score = match self.evaluated_positions.get(&key) {
                Some(&score) => score,
                None => {
                    let score = self.eval(depth);
                    self.evaluated_positions.insert(key, score);
                    score
                }
            };
            self.nodes += 1;
            return score;
        }

        if self.pos.is_draw() {
            return SCORE_EQUAL;
        }

        let mut legal = MoveList::new();
        self.pos.legal_moves(&mut legal);
        if legal.is_empty() {
            return if self.pos.in_check() {
                mate_score(depth)
            } else {
                SCORE_EQUAL
            };
        }

        let endgame = self.pos.is_endgame();
        let mut ordered = ScoredMoveList::new();
        for &mv in &legal {
            ordered.push(mv, self.move_score(mv, endgame));
        }
        ordered.sort_by_score_desc();

        let mut alpha = alpha;
        for i in 0..ordered.len() {
            let mv = ordered.as_slice()[i].mv;
            let info = self.pos.perform_move(mv);
            let score = -self.negamax(depth + 1, -beta, -alpha);
            self.pos.revert_move(&info);

            if score >= beta {
                if i == 0 {
                    self.first_cut_nodes += 1;
                }
                self.cut_nodes += 1;
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }
        alpha
    }

    /// Static move ordering: promotions and captures first, then tactical
    /// pawn-pressure hints and the piece-square delta.
    pub(crate) fn move_score(&self, mv: Move, endgame: bool) -> i32 {
        let from = mv.from();
        let to = mv.to();
        let us = self.pos.turn();
        let them = us.opponent();
        let mut score = 0;

        if let Some(promo) = mv.promoted_to() {
            score += 1000 * promo.worth();
        }

        let (_, kind) = self.pos.piece_at(from).expect("move source is occupied");
        if let Some((_, captured)) = self.pos.piece_at(to) {
            score += 1000 * captured.worth();
        }

        // fleeing a pawn attack is good, stepping into one is not
        if !matches!(kind, PieceType::Pawn | PieceType::King) {
            if self.controlled_by_enemy_pawn(from) {
                score += 1000;
            }
            if self.controlled_by_enemy_pawn(to) {
                score -= 2000;
            }
        }

        match kind {
            PieceType::Pawn => {
                // reward pushes that poke at pieces
                for target in PAWN_ATTACKS[us.index()][to.index()].iter() {
                    if let Some((color, victim)) = self.pos.piece_at(target) {
                        if color == them && victim != PieceType::Pawn {
                            score += if victim == PieceType::King {
                                100
                            } else {
                                victim.worth() * 100
                            };
                        }
                    }
                }
            }
            PieceType::Knight => {
                // knight hops that eye heavy pieces
                for target in KNIGHT_ATTACKS[to.index()].iter() {
                    if let Some((color, victim)) = self.pos.piece_at(target) {
                        if color == them
                            && matches!(
                                victim,
                                PieceType::King | PieceType::Queen | PieceType::Rook
                            )
                        {
                            score += if victim == PieceType::King {
                                100
                            } else {
                                victim.worth() * 50
                            };
                        }
                    }
                }
            }
            _ => {}
        }

        score
            + 10 * (crate::board::pst::pst(us, kind, endgame, to)
                - crate::board::pst::pst(us, kind, endgame, from))
    }

    fn controlled_by_enemy_pawn(&self, sq: Square) -> bool {
        let us = self.pos.turn();
        (PAWN_ATTACKS[us.index()][sq.index()] & self.pos.bb(us.opponent(), PieceType::Pawn)).any()
    }
}
