//! Legal move generation: attack queries, pin detection, and the
//! per-piece legality filter.

use super::magics::{bishop_attacks, queen_attacks, rook_attacks};
use super::state::PieceId;
use super::tables::{
    aligned, aligned_diagonally, en_passant_piece_square, on_one_line, relative_rank_bb,
    square_between, BEHIND_BB, BETWEEN_BB, KING_ATTACKS, KNIGHT_ATTACKS, PAWN_ATTACKS,
};
use super::types::{Bitboard, CastlingRights, Color, Move, MoveList, PieceType, Square, SquareList};
use super::Position;

/// How a pinned piece is tied to its king
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum PinDirection {
    Diagonal,
    Horizontal,
    Vertical,
}

/// One castling option: the squares that must be empty, the square the rook
/// lands on (which the king crosses), and the king's destination.
struct CastlingLane {
    rights: CastlingRights,
    middle: &'static [Square],
    rook_landing: Square,
    king_to: Square,
}

const WHITE_LANES: [CastlingLane; 2] = [
    CastlingLane {
        rights: CastlingRights::king_side(Color::White),
        middle: &[Square::F1, Square::G1],
        rook_landing: Square::F1,
        king_to: Square::G1,
    },
    CastlingLane {
        rights: CastlingRights::queen_side(Color::White),
        middle: &[Square::new(0, 1), Square::C1, Square::D1],
        rook_landing: Square::D1,
        king_to: Square::C1,
    },
];

const BLACK_LANES: [CastlingLane; 2] = [
    CastlingLane {
        rights: CastlingRights::king_side(Color::Black),
        middle: &[Square::F8, Square::G8],
        rook_landing: Square::F8,
        king_to: Square::G8,
    },
    CastlingLane {
        rights: CastlingRights::queen_side(Color::Black),
        middle: &[Square::new(7, 1), Square::C8, Square::D8],
        rook_landing: Square::D8,
        king_to: Square::C8,
    },
];

impl Position {
    /// Bitboard of `by`-colored pieces attacking `sq` under the given
    /// occupancy. The occupancy is a parameter so callers can x-ray through
    /// a lifted king.
    #[must_use]
    pub(crate) fn attackers_to(&self, sq: Square, by: Color, occupancy: Bitboard) -> Bitboard {
        let defender = by.opponent();
        (KNIGHT_ATTACKS[sq.index()] & self.bb(by, PieceType::Knight))
            | (KING_ATTACKS[sq.index()] & self.bb(by, PieceType::King))
            | (PAWN_ATTACKS[defender.index()][sq.index()] & self.bb(by, PieceType::Pawn))
            | (bishop_attacks(sq, occupancy)
                & (self.bb(by, PieceType::Bishop) | self.bb(by, PieceType::Queen)))
            | (rook_attacks(sq, occupancy)
                & (self.bb(by, PieceType::Rook) | self.bb(by, PieceType::Queen)))
    }

    #[inline]
    pub(crate) fn is_square_attacked(&self, sq: Square, by: Color, occupancy: Bitboard) -> bool {
        self.attackers_to(sq, by, occupancy).any()
    }

    /// Squares a piece attacks right now (occupancy-aware for sliders).
    /// This is the raw attack set; own pieces are not masked off.
    #[must_use]
    pub(crate) fn attacks_of(&self, id: PieceId) -> Bitboard {
        let piece = self.piece(id);
        match piece.kind {
            PieceType::Knight => KNIGHT_ATTACKS[piece.square.index()],
            PieceType::King => KING_ATTACKS[piece.square.index()],
            PieceType::Pawn => PAWN_ATTACKS[piece.color.index()][piece.square.index()],
            PieceType::Bishop => bishop_attacks(piece.square, self.occupancy),
            PieceType::Rook => rook_attacks(piece.square, self.occupancy),
            PieceType::Queen => queen_attacks(piece.square, self.occupancy),
        }
    }

    /// The first `color` slider sitting on the prolongation of the
    /// `from -> through` line past `through`, with nothing between it and
    /// `through`. Queens always qualify; otherwise the slider type must
    /// match the line direction.
    fn slider_behind(
        &self,
        from: Square,
        through: Square,
        color: Color,
        occupancy: Bitboard,
    ) -> Option<Square> {
        let direction_slider = if aligned_diagonally(from, through) {
            PieceType::Bishop
        } else {
            PieceType::Rook
        };
        let candidates = BEHIND_BB[from.index()][through.index()]
            & (self.bb(color, PieceType::Queen) | self.bb(color, direction_slider));
        candidates
            .iter()
            .find(|&sq| (BETWEEN_BB[through.index()][sq.index()] & occupancy).is_empty())
    }

    /// All legal moves for the side to move. Promotions are expanded to the
    /// four piece choices in queen, knight, rook, bishop order.
    pub fn legal_moves(&self, out: &mut MoveList) {
        let us = self.turn;
        for i in 0..self.piece_counts[us.index()] {
            let id = self.piece_lists[us.index()][i];
            let piece = self.piece(id);
            let from = piece.square;
            let promoting = piece.kind == PieceType::Pawn
                && piece.square.rank() == us.relative_rank(6);

            let mut destinations = SquareList::new();
            self.legal_destinations(id, false, &mut destinations);
            for &to in destinations.iter() {
                if promoting {
                    for promo in PieceType::PROMOTIONS {
                        out.push(Move::promotion(from, to, promo));
                    }
                } else {
                    out.push(Move::new(from, to));
                }
            }
        }
    }

    /// True if the side to move has no legal move at all. Short-circuits on
    /// the first piece that can move.
    #[must_use]
    pub fn has_no_moves(&self) -> bool {
        let us = self.turn;
        let mut destinations = SquareList::new();
        for i in 0..self.piece_counts[us.index()] {
            let id = self.piece_lists[us.index()][i];
            self.legal_destinations(id, true, &mut destinations);
            if !destinations.is_empty() {
                return false;
            }
        }
        true
    }

    /// Legal destination squares for one piece. With `stop_after_one` the
    /// scan ends at the first legal destination.
    fn legal_destinations(&self, id: PieceId, stop_after_one: bool, out: &mut SquareList) {
        let piece = self.piece(id);
        let us = piece.color;
        let them = us.opponent();
        let is_king = piece.kind == PieceType::King;
        let is_pawn = piece.kind == PieceType::Pawn;
        let from = piece.square;
        let king_sq = self.king_square(us);
        let in_check = self.checkers.any();

        // in double check only the king may move
        if self.checkers.more_than_one() && !is_king {
            return;
        }

        // pin detection: aligned with our king, path clear, and an enemy
        // slider of the matching direction behind us
        let mut pin_direction = None;
        let mut pinning_square = Square::A1;
        if !is_king
            && aligned(from, king_sq)
            && (BETWEEN_BB[from.index()][king_sq.index()] & self.occupancy).is_empty()
        {
            if let Some(pinner) = self.slider_behind(king_sq, from, them, self.occupancy) {
                pinning_square = pinner;
                pin_direction = Some(if aligned_diagonally(from, king_sq) {
                    PinDirection::Diagonal
                } else if from.rank() == king_sq.rank() {
                    PinDirection::Horizontal
                } else {
                    PinDirection::Vertical
                });
            }
        }
        let pinned = pin_direction.is_some();

        // a pawn may be free to move yet pinned against the en-passant
        // capture alone: removing both pawns can open a line to the king
        let mut en_passant_pinned = false;
        if !pinned && is_pawn {
            if let Some(ep) = self.en_passant {
                if PAWN_ATTACKS[us.index()][from.index()].contains(ep) {
                    let captured_sq = en_passant_piece_square(ep);
                    let occupancy = self.occupancy ^ Bitboard::from_square(captured_sq);
                    en_passant_pinned = self
                        .slider_behind(king_sq, from, them, occupancy)
                        .is_some()
                        && (BETWEEN_BB[from.index()][king_sq.index()] & occupancy).is_empty();
                }
            }
        }

        if pinned && in_check {
            return;
        }

        // a pinned piece that can never travel along its pin line is frozen
        if let Some(direction) = pin_direction {
            let frozen = match piece.kind {
                PieceType::Knight => true,
                PieceType::Rook => direction == PinDirection::Diagonal,
                PieceType::Pawn => direction == PinDirection::Horizontal,
                PieceType::Bishop => direction != PinDirection::Diagonal,
                _ => false,
            };
            if frozen {
                return;
            }
        }

        let mut pseudo = SquareList::new();
        self.pseudo_legal_destinations(id, &mut pseudo);

        // fast path: nothing can invalidate these moves
        if !in_check && !is_king && !pinned && !(is_pawn && en_passant_pinned) {
            for &sq in pseudo.iter() {
                out.push(sq);
                if stop_after_one {
                    return;
                }
            }
            return;
        }

        // king moves are tested with the king lifted off the board so
        // sliders x-ray through its current square
        let occupancy_sans_king = self.occupancy ^ Bitboard::from_square(king_sq);
        let checker_sq = if in_check && !self.checkers.more_than_one() {
            Some(self.checkers.lsb())
        } else {
            None
        };

        for &to in pseudo.iter() {
            let is_en_passant_capture = is_pawn && Some(to) == self.en_passant;

            if is_en_passant_capture && en_passant_pinned {
                continue;
            }

            if !is_king {
                if let Some(checker) = checker_sq {
                    let captured_sq = if is_en_passant_capture {
                        en_passant_piece_square(to)
                    } else {
                        to
                    };
                    let checker_kind = self
                        .piece_at(checker)
                        .map(|(_, kind)| kind)
                        .expect("checker square holds a piece");
                    // a non-king move must capture the checker or block a
                    // sliding checker's ray
                    if captured_sq != checker
                        && (!checker_kind.is_slider()
                            || !square_between(king_sq, to, checker))
                    {
                        continue;
                    }
                }

                if !pinned || on_one_line(king_sq, to, pinning_square) {
                    out.push(to);
                    if stop_after_one {
                        return;
                    }
                }
                continue;
            }

            if !self.is_square_attacked(to, them, occupancy_sans_king) {
                out.push(to);
                if stop_after_one {
                    return;
                }
            }
        }
    }

    /// Pseudo-legal destinations: movement rules and occupancy only, no
    /// check or pin filtering.
    fn pseudo_legal_destinations(&self, id: PieceId, out: &mut SquareList) {
        let piece = self.piece(id);
        let us = piece.color;
        let from = piece.square;
        let own = self.color_bb(us);

        match piece.kind {
            PieceType::Queen => {
                for sq in (queen_attacks(from, self.occupancy) & !own).iter() {
                    out.push(sq);
                }
            }
            PieceType::Rook => {
                for sq in (rook_attacks(from, self.occupancy) & !own).iter() {
                    out.push(sq);
                }
            }
            PieceType::Bishop => {
                for sq in (bishop_attacks(from, self.occupancy) & !own).iter() {
                    out.push(sq);
                }
            }
            PieceType::Knight => {
                for sq in (KNIGHT_ATTACKS[from.index()] & !own).iter() {
                    out.push(sq);
                }
            }
            PieceType::King => {
                for sq in (KING_ATTACKS[from.index()] & !own).iter() {
                    out.push(sq);
                }
                self.pseudo_legal_castlings(piece.color, from, out);
            }
            PieceType::Pawn => {
                let push = us.pawn_push();
                let one_ahead = from.offset(push);
                if self.board[one_ahead.index()].is_none() {
                    out.push(one_ahead);
                    if relative_rank_bb(us, 1).contains(from) {
                        let two_ahead = one_ahead.offset(push);
                        if self.board[two_ahead.index()].is_none() {
                            out.push(two_ahead);
                        }
                    }
                }
                for sq in PAWN_ATTACKS[us.index()][from.index()].iter() {
                    if Some(sq) == self.en_passant {
                        out.push(sq);
                    } else if let Some(id) = self.piece_id_at(sq) {
                        if self.piece(id).color != us {
                            out.push(sq);
                        }
                    }
                }
            }
        }
    }

    /// Castling pre-checks: the right survives, the king stands on its
    /// original square and is not in check, the lane is empty, and the
    /// square the king crosses is not attacked. The destination square is
    /// vetted by the full legality filter like any other king move.
    fn pseudo_legal_castlings(&self, us: Color, from: Square, out: &mut SquareList) {
        let home = if us == Color::White {
            Square::E1
        } else {
            Square::E8
        };
        if from != home || self.checkers.any() {
            return;
        }
        let lanes = if us == Color::White {
            &WHITE_LANES
        } else {
            &BLACK_LANES
        };
        for lane in lanes {
            if !self.castling.has_any(lane.rights) {
                continue;
            }
            if lane
                .middle
                .iter()
                .any(|&sq| self.board[sq.index()].is_some())
            {
                continue;
            }
            if self.is_square_attacked(lane.rook_landing, us.opponent(), self.occupancy) {
                continue;
            }
            out.push(lane.king_to);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::START_FEN;
    use super::*;

    fn legal_strings(fen: &str) -> Vec<String> {
        let pos = Position::from_fen(fen).unwrap();
        let mut moves = MoveList::new();
        pos.legal_moves(&mut moves);
        let mut out: Vec<String> = moves.iter().map(ToString::to_string).collect();
        out.sort();
        out
    }

    #[test]
    fn test_twenty_moves_from_start() {
        assert_eq!(legal_strings(START_FEN).len(), 20);
    }

    #[test]
    fn test_en_passant_pin_is_rejected() {
        // removing both pawns with bxc6 would expose the king to the h5 rook
        let moves = legal_strings("8/8/8/KPp4r/8/8/8/4k3 w - c6 0 1");
        assert!(!moves.contains(&"b5c6".to_string()), "moves: {moves:?}");
        assert!(moves.contains(&"b5b6".to_string()));
    }

    #[test]
    fn test_en_passant_allowed_when_not_pinned() {
        let moves = legal_strings(
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
        );
        assert!(moves.contains(&"e5f6".to_string()));
    }

    #[test]
    fn test_promotion_generates_four_moves() {
        let moves = legal_strings("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        for uci in ["a7a8q", "a7a8n", "a7a8r", "a7a8b"] {
            assert!(moves.contains(&uci.to_string()), "missing {uci}");
        }
        assert_eq!(
            moves.iter().filter(|m| m.starts_with("a7a8")).count(),
            4
        );
    }

    #[test]
    fn test_castling_blocked_by_attack_on_crossed_square() {
        // black rook on f2 covers f1, so e1g1 must not appear
        let moves = legal_strings("4k3/8/8/8/8/8/5r2/4K2R w K - 0 1");
        assert!(!moves.contains(&"e1g1".to_string()), "moves: {moves:?}");
    }

    #[test]
    fn test_castling_both_sides_available() {
        let moves = legal_strings("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert!(moves.contains(&"e1g1".to_string()));
        assert!(moves.contains(&"e1c1".to_string()));
    }

    #[test]
    fn test_no_castling_while_in_check() {
        let moves = legal_strings("4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1");
        assert!(!moves.contains(&"e1g1".to_string()));
        assert!(!moves.contains(&"e1c1".to_string()));
    }

    #[test]
    fn test_double_check_only_king_moves() {
        // knight on f3 and rook on e8 both give check
        let pos = Position::from_fen("3rr3/8/8/8/8/5n2/8/4K3 w - - 0 1").unwrap();
        assert!(pos.checkers().more_than_one());
        let moves = legal_strings("3rr3/8/8/8/8/5n2/8/4K3 w - - 0 1");
        assert!(moves.iter().all(|m| m.starts_with("e1")), "moves: {moves:?}");
    }

    #[test]
    fn test_pinned_knight_cannot_move() {
        // knight on e2 is pinned against the king by the e8 rook
        let moves = legal_strings("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1");
        assert!(moves.iter().all(|m| !m.starts_with("e2")), "moves: {moves:?}");
    }

    #[test]
    fn test_pinned_rook_slides_along_pin_ray() {
        // rook on e4 pinned by the e8 rook may move on the e-file only
        let moves = legal_strings("4r1k1/8/8/8/4R3/8/8/4K3 w - - 0 1");
        let rook_moves: Vec<&String> =
            moves.iter().filter(|m| m.starts_with("e4")).collect();
        assert!(!rook_moves.is_empty());
        assert!(rook_moves.iter().all(|m| m.as_bytes()[2] == b'e'));
    }

    #[test]
    fn test_pinned_bishop_slides_along_diagonal_pin() {
        // bishop on d2 pinned by the a5 queen may stay on the a5-e1 diagonal
        let moves = legal_strings("6k1/8/8/q7/8/8/3B4/4K3 w - - 0 1");
        let bishop_moves: Vec<&String> =
            moves.iter().filter(|m| m.starts_with("d2")).collect();
        let mut expected = vec!["d2a5".to_string(), "d2b4".to_string(), "d2c3".to_string()];
        expected.sort();
        let mut got: Vec<String> = bishop_moves.iter().map(|m| (*m).clone()).collect();
        got.sort();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_check_must_be_answered() {
        // every move must capture the checker, block, or step away
        let pos = Position::from_fen("4k3/8/8/8/4r3/8/8/4K3 w - - 0 1").unwrap();
        assert!(pos.in_check());
        let mut moves = MoveList::new();
        pos.legal_moves(&mut moves);
        for mv in &moves {
            // king leaves the e-file or nothing else moves
            assert!(mv.from() == Square::E1);
            assert_ne!(mv.to().file(), 4, "king may not stay on the checked file");
        }
    }

    #[test]
    fn test_blocking_a_sliding_check() {
        let moves = legal_strings("4k3/8/8/8/4r3/8/3B4/4K3 w - - 0 1");
        // the bishop can interpose on e3
        assert!(moves.contains(&"d2e3".to_string()));
    }

    #[test]
    fn test_king_cannot_retreat_along_checker_ray() {
        // king on e4 checked by the e8 rook: e3 is still covered through
        // the lifted king
        let moves = legal_strings("4r1k1/8/8/8/4K3/8/8/8 w - - 0 1");
        assert!(!moves.contains(&"e4e3".to_string()), "moves: {moves:?}");
    }

    #[test]
    fn test_has_no_moves_matches_move_list() {
        for fen in [
            START_FEN,
            "6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1",
            "R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1", // back-rank mate
            "5k2/5P2/5K2/8/8/8/8/8 b - - 0 1",   // stalemate
        ] {
            let pos = Position::from_fen(fen).unwrap();
            let mut moves = MoveList::new();
            pos.legal_moves(&mut moves);
            assert_eq!(pos.has_no_moves(), moves.is_empty(), "{fen}");
        }
    }

    #[test]
    fn test_attackers_to_counts_all_families() {
        // e4 attacked from both sides by several piece families at once
        let pos =
            Position::from_fen("k7/8/8/3p4/8/2n2K2/8/1B2R3 w - - 0 1").unwrap();
        let e4 = Square::new(3, 4);
        let black_attackers = pos.attackers_to(e4, Color::Black, pos.occupancy);
        assert!(black_attackers.contains(Square::new(2, 2))); // knight c3
        assert!(black_attackers.contains(Square::new(4, 3))); // pawn d5
        assert_eq!(black_attackers.popcount(), 2);
        let white_attackers = pos.attackers_to(e4, Color::White, pos.occupancy);
        assert!(white_attackers.contains(Square::new(0, 1))); // bishop b1
        assert!(white_attackers.contains(Square::E1)); // rook up the e-file
        assert!(white_attackers.contains(Square::new(2, 5))); // king f3
        assert_eq!(white_attackers.popcount(), 3);
    }
}
