//! Static evaluation.
//!
//! Scores are integers, centipawn-scaled by 1000 so every coefficient stays
//! integral. Evaluation is always from the side-to-move's perspective;
//! negamax negates at each level.

use crate::board::pst::pst;
use crate::board::tables::{file_bb, CONTROL_ZONES, KING_RINGS};
use crate::board::{Bitboard, Color, PieceType, Square, MAX_PIECES_PER_SIDE};

use super::Engine;

pub const SCORE_EQUAL: i32 = 0;
pub const MATE_SCORE: i32 = 10_000_000;
pub const INFINITE_SCORE: i32 = 1_000_000_000;

/// Mate score for the side to move, `depth` plies below the root. Closer
/// mates score worse for the mated side, so the search prefers the fastest.
#[inline]
#[must_use]
pub(crate) fn mate_score(depth: u32) -> i32 {
    -(MATE_SCORE - depth as i32)
}

/// Anything within a ply of the mate band counts as mate.
#[inline]
#[must_use]
pub fn is_mate_score(score: i32) -> bool {
    score.abs() > 1_000_000
}

const NO_RANK: u8 = 8;

/// Min and max rank of one color's pawns on a single file
#[derive(Clone, Copy)]
struct FileInfo {
    min: u8,
    max: u8,
}

impl FileInfo {
    const EMPTY: FileInfo = FileInfo {
        min: NO_RANK,
        max: NO_RANK,
    };

    #[inline]
    fn has_pawns(self) -> bool {
        self.min != NO_RANK
    }
}

/// Pawn summary computed once per evaluation call
struct PositionInfo {
    pawn_files: [[FileInfo; 8]; 2],
    pawns: [[Square; MAX_PIECES_PER_SIDE]; 2],
    pawn_counts: [usize; 2],
}

impl PositionInfo {
    fn gather(engine: &Engine) -> PositionInfo {
        let mut info = PositionInfo {
            pawn_files: [[FileInfo::EMPTY; 8]; 2],
            pawns: [[Square::A1; MAX_PIECES_PER_SIDE]; 2],
            pawn_counts: [0; 2],
        };
        for color in Color::BOTH {
            for sq in engine.pos.bb(color, PieceType::Pawn).iter() {
                let rank = sq.rank() as u8;
                let slot = &mut info.pawn_files[color.index()][sq.file()];
                if slot.has_pawns() {
                    slot.min = slot.min.min(rank);
                    slot.max = slot.max.max(rank);
                } else {
                    slot.min = rank;
                    slot.max = rank;
                }
                info.pawns[color.index()][info.pawn_counts[color.index()]] = sq;
                info.pawn_counts[color.index()] += 1;
            }
        }
        info
    }
}

impl Engine {
    /// Evaluate the current leaf. `depth` is the distance from the search
    /// root and only shapes mate scores.
    pub(crate) fn eval(&mut self, depth: u32) -> i32 {
        if self.pos.has_no_moves() {
            return if self.pos.in_check() {
                mate_score(depth)
            } else {
                SCORE_EQUAL
            };
        }
        if self.pos.is_draw() {
            return SCORE_EQUAL;
        }

        let us = self.pos.turn();
        let them = us.opponent();

        let cached = self.evaluated_pawn_positions[us.index()]
            .get(&self.pos.pawn_key())
            .copied();
        let pawns_score = cached.unwrap_or_else(|| {
            let info = PositionInfo::gather(self);
            let score = self.eval_pawns(us, &info) - self.eval_pawns(them, &info);
            self.evaluated_pawn_positions[us.index()].insert(self.pos.pawn_key(), score);
            score
        });

        pawns_score + self.eval_color(us) - self.eval_color(them)
    }

    fn eval_color(&self, color: Color) -> i32 {
        self.eval_king_safety(color) + self.eval_pieces(color)
    }

    /// King shelter ladder. Exposed kings are graded by how far they have
    /// strayed; castled kings collect shelter bonuses. Worth nothing in the
    /// endgame.
    fn eval_king_safety(&self, color: Color) -> i32 {
        if self.pos.is_endgame() {
            return SCORE_EQUAL;
        }

        let king_sq = self.pos.king_square(color);
        let file = king_sq.file();
        let rank = king_sq.rank();
        let relative = color.relative_rank(rank);

        if relative > 3 {
            return -3000;
        }
        if relative == 3 {
            return -2000;
        }
        if relative == 2 {
            return -1000;
        }
        if relative == 1 && (2..=5).contains(&file) {
            return if file == 3 || file == 4 { -750 } else { -500 };
        }
        if file == 3 || file == 4 {
            return -250;
        }
        if file == 5 {
            return -100;
        }

        // sheltered king: probe the two squares beside it and the three in
        // front of it
        let forward = if color == Color::White { 1i32 } else { -1 };
        let upper_rank = (rank as i32 + forward) as usize;
        let mut score = if relative == 0 && file == 2 { 0 } else { 100 };

        let mut probe = |r: usize, f: i32, upper: bool| {
            if !(0..8).contains(&f) {
                return;
            }
            if let Some((piece_color, kind)) = self.pos.piece_at(Square::new(r, f as usize)) {
                if piece_color == color {
                    score += match (upper, kind == PieceType::Pawn) {
                        (true, true) => 100,
                        (true, false) => 50,
                        (false, true) => 50,
                        (false, false) => 25,
                    };
                }
            }
        };
        probe(rank, file as i32 - 1, false);
        probe(rank, file as i32 + 1, false);
        probe(upper_rank, file as i32 - 1, true);
        probe(upper_rank, file as i32, true);
        probe(upper_rank, file as i32 + 1, true);

        score
    }

    /// Pawn-structure score for one color: doubled files, islands, passers,
    /// and doubled-weight piece-square values.
    fn eval_pawns(&self, color: Color, info: &PositionInfo) -> i32 {
        let them = color.opponent();
        let files = &info.pawn_files[color.index()];
        let their_files = &info.pawn_files[them.index()];
        let white = color == Color::White;
        let mut score = 0;

        let mut in_island = false;
        let mut islands = 0;
        for file_info in files.iter() {
            if file_info.has_pawns() {
                if file_info.max != file_info.min {
                    score -= 300;
                }
                if !in_island {
                    islands += 1;
                }
                in_island = true;
            } else {
                in_island = false;
            }
        }

        for &sq in &info.pawns[color.index()][..info.pawn_counts[color.index()]] {
            let file = sq.file();
            let rank = sq.rank() as u8;

            score += 2 * pst(color, PieceType::Pawn, false, sq);

            let clear = |file_info: Option<&FileInfo>| {
                file_info.map_or(true, |fi| {
                    !fi.has_pawns() || if white { fi.max <= rank } else { fi.min >= rank }
                })
            };
            let passed = clear(if file > 0 {
                Some(&their_files[file - 1])
            } else {
                None
            }) && clear(Some(&their_files[file]))
                && clear(if file < 7 {
                    Some(&their_files[file + 1])
                } else {
                    None
                });
            if passed {
                score += 500
                    + match color.relative_rank(rank as usize) {
                        6 => 1000,
                        5 => 500,
                        4 => 200,
                        _ => 0,
                    };
            }
        }

        score + (islands - 1) * -200
    }

    /// Everything per piece: piece-square values, development, bishop pair,
    /// rook files, board control, and hanging-piece exchanges. Material is
    /// folded in at the end.
    fn eval_pieces(&self, color: Color) -> i32 {
        let endgame = self.pos.is_endgame();
        let them = color.opponent();
        // the side not on move is assumed able to cash in hanging material
        let hanging_coeff = if self.pos.turn() == color { 100 } else { 1000 };
        let their_king_rings = &KING_RINGS[self.pos.king_square(them).index()];
        let zones = &CONTROL_ZONES[color.index()];
        let mut bishops = 0;
        let mut score = 0;

        for i in 0..self.pos.piece_counts[color.index()] {
            let id = self.pos.piece_lists[color.index()][i];
            let piece = self.pos.piece(id);
            let sq = piece.square;
            let kind = piece.kind;
            let file = sq.file();
            let relative = color.relative_rank(sq.rank());

            score += 10 * pst(color, kind, endgame, sq);

            // development: undeveloped minors and stuck center pawns
            if (kind == PieceType::Knight || kind == PieceType::Bishop) && relative == 0 {
                score -= 300;
            } else if kind == PieceType::Pawn && (file == 3 || file == 4) && relative == 1 {
                let ahead = sq.offset(color.pawn_push());
                score -= if self.pos.piece_at(ahead).is_none() {
                    300
                } else {
                    1000
                };
            }

            if kind == PieceType::Bishop {
                bishops += 1;
            }

            if kind == PieceType::Rook {
                let on_file = file_bb(file);
                if (on_file & self.pos.bb(color, PieceType::Pawn)).is_empty() {
                    score += 100
                        + if (on_file & self.pos.bb(them, PieceType::Pawn)).is_empty() {
                            100
                        } else {
                            0
                        };
                }
            }

            // control: every attacked square earns by where it lies, plus a
            // premium for squares near the enemy king
            if kind != PieceType::King || endgame {
                let attacks = self.pos.attacks_of(id);
                if endgame {
                    score += 10 * attacks.popcount() as i32;
                } else {
                    score += 50 * (attacks & zones.center).popcount() as i32
                        + 25 * (attacks & zones.around_center).popcount() as i32
                        + 20 * (attacks & zones.opponent).popcount() as i32
                        + 10 * (attacks & zones.unimportant).popcount() as i32;
                }
                score += 150 * (attacks & their_king_rings[0]).popcount() as i32
                    + 50 * (attacks & their_king_rings[1]).popcount() as i32;
            }

            if kind != PieceType::King {
                score += self.eval_hanging(color, kind, sq) * hanging_coeff;
            }
        }

        score + self.pos.material[color.index()] * 1000 + if bishops >= 2 { 500 } else { 0 }
    }

    /// Static exchange on an attacked piece: play out captures least worth
    /// first, alternating sides, then take the minimax over the running
    /// material swing. Returns the unscaled swing (negative when the piece
    /// is lost).
    fn eval_hanging(&self, color: Color, kind: PieceType, sq: Square) -> i32 {
        let them = color.opponent();
        let mut attackers = self.pos.attackers_to(sq, them, self.pos.occupancy);
        if attackers.is_empty() {
            return 0;
        }
        let mut defenders = self.pos.attackers_to(sq, color, self.pos.occupancy);
        if defenders.is_empty() {
            return -kind.worth();
        }

        let mut loss_states = [0i32; 40];
        let mut len = 1;
        let mut to_take = kind;
        let mut defending = false;
        loop {
            let side = if defending {
                &mut defenders
            } else {
                &mut attackers
            };
            if side.is_empty() {
                break;
            }
            loss_states[len] = if defending {
                to_take.worth()
            } else {
                -to_take.worth()
            };
            len += 1;
            let capturing_color = if defending { color } else { them };
            to_take = self.least_worth_attacker(side, capturing_color);
            defending = !defending;
        }
        loss_states[len] = loss_states[len - 1];
        len += 1;

        let mut running = 0;
        let mut max_win = -10_000;
        let mut max_win_index = 0;
        let mut min_loss = 10_000;
        let mut min_loss_index = 0;
        for (i, &delta) in loss_states[..len].iter().enumerate() {
            running += delta;
            if i & 1 == 1 {
                if max_win < running {
                    max_win = running;
                    max_win_index = i;
                }
            } else if min_loss > running {
                min_loss = running;
                min_loss_index = i;
            }
        }

        if min_loss_index < max_win_index {
            min_loss
        } else {
            max_win
        }
    }

    /// Pop the least valuable `color` piece out of `attackers` and return
    /// its type.
    fn least_worth_attacker(&self, attackers: &mut Bitboard, color: Color) -> PieceType {
        for kind in PieceType::BY_WORTH_ASC {
            let candidates = *attackers & self.pos.bb(color, kind);
            if candidates.any() {
                let sq = candidates.lsb();
                *attackers ^= Bitboard::from_square(sq);
                return kind;
            }
        }
        PieceType::King
    }
}
