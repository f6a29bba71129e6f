//! Incremental, fully reversible position mutation.

use super::state::{UnmakeInfo, ALL_PIECES};
use super::tables::en_passant_piece_square;
use super::types::{Bitboard, CastlingRights, Color, Move, PieceType, Square};
use crate::zobrist::ZOBRIST;

impl super::Position {
    #[inline]
    fn lift_piece_bits(&mut self, color: Color, kind: PieceType, sq: Square) {
        let bit = Bitboard::from_square(sq);
        self.bitboards[color.index()][kind.index()] ^= bit;
        self.bitboards[color.index()][ALL_PIECES] ^= bit;
        self.occupancy ^= bit;
    }

    #[inline]
    fn drop_piece_bits(&mut self, color: Color, kind: PieceType, sq: Square) {
        let bit = Bitboard::from_square(sq);
        self.bitboards[color.index()][kind.index()] |= bit;
        self.bitboards[color.index()][ALL_PIECES] |= bit;
        self.occupancy |= bit;
    }

    /// Castling right that dies when a rook leaves or is captured on `sq`
    fn corner_castling_right(sq: Square) -> CastlingRights {
        match sq {
            Square::A1 => CastlingRights::queen_side(Color::White),
            Square::H1 => CastlingRights::king_side(Color::White),
            Square::A8 => CastlingRights::queen_side(Color::Black),
            Square::H8 => CastlingRights::king_side(Color::Black),
            _ => CastlingRights::NONE,
        }
    }

    /// Apply a move produced by the generator. Returns the reversal record
    /// for `revert_move`. Feeding a move that is not legal in this position
    /// is a programming error.
    pub fn perform_move(&mut self, mv: Move) -> UnmakeInfo {
        let from = mv.from();
        let to = mv.to();
        let promotion = mv.promoted_to();

        let moved_id = self.board[from.index()].expect("perform_move: empty source square");
        let (us, kind) = {
            let piece = self.piece(moved_id);
            (piece.color, piece.kind)
        };
        let them = us.opponent();
        debug_assert_eq!(us, self.turn, "perform_move: not this side's turn");

        let info_base = UnmakeInfo {
            mv,
            moved_piece: moved_id,
            captured_piece: None,
            castling_rook: None,
            prev_checkers: self.checkers,
            prev_position_key: self.position_key,
            prev_pawn_key: self.pawn_key,
            prev_en_passant: self.en_passant,
            prev_castling: self.castling,
            prev_plies_for_50_move_rule: self.plies_for_50_move_rule,
        };
        let mut info = info_base;

        let is_en_passant_capture = kind == PieceType::Pawn && Some(to) == self.en_passant;
        let captured_sq = if is_en_passant_capture {
            en_passant_piece_square(to)
        } else {
            to
        };
        let captured_id = self.board[captured_sq.index()];

        // remove the captured piece first: swap-remove from the owner's
        // list, rewriting the relocated tail's index
        if let Some(captured) = captured_id {
            let (cap_kind, cap_sq, cap_slot) = {
                let piece = self.piece(captured);
                (piece.kind, piece.square, piece.list_index as usize)
            };
            debug_assert_eq!(self.piece(captured).color, them);

            let last = self.piece_counts[them.index()] - 1;
            let displaced = self.piece_lists[them.index()][last];
            self.piece_lists[them.index()][cap_slot] = displaced;
            self.piece_mut(displaced).list_index = cap_slot as u8;
            self.piece_counts[them.index()] = last;

            self.board[cap_sq.index()] = None;
            self.lift_piece_bits(them, cap_kind, cap_sq);
            self.material[them.index()] -= cap_kind.worth();
            self.position_key ^= ZOBRIST.piece(them, cap_kind, cap_sq);

            match cap_kind {
                PieceType::Rook => self.castling.clear(Self::corner_castling_right(cap_sq)),
                PieceType::Bishop => self.bishops_count -= 1,
                PieceType::Pawn => {
                    self.pawn_key ^= ZOBRIST.piece(them, cap_kind, cap_sq);
                    self.pawn_count -= 1;
                }
                _ => {}
            }

            info.captured_piece = Some(captured);
        }

        // move the piece itself
        let key_change = ZOBRIST.piece(us, kind, from) ^ ZOBRIST.piece(us, kind, to);
        self.position_key ^= key_change;
        if kind == PieceType::Pawn {
            self.pawn_key ^= key_change;
        }
        self.board[from.index()] = None;
        self.board[to.index()] = Some(moved_id);
        self.lift_piece_bits(us, kind, from);
        self.drop_piece_bits(us, kind, to);
        self.piece_mut(moved_id).square = to;

        // castling rights die with king moves and corner-rook moves
        if kind == PieceType::King {
            self.castling.clear(CastlingRights::of_color(us));
        } else if kind == PieceType::Rook {
            self.castling.clear(Self::corner_castling_right(from));
        }

        // a two-file king move is a castle: bring the rook across
        if kind == PieceType::King && to.file().abs_diff(from.file()) > 1 {
            let (rook_from, rook_to) = match to {
                Square::C1 => (Square::A1, Square::D1),
                Square::G1 => (Square::H1, Square::F1),
                Square::C8 => (Square::A8, Square::D8),
                _ => (Square::H8, Square::F8),
            };
            let rook_id = self.board[rook_from.index()].expect("castling without a rook");
            self.position_key ^= ZOBRIST.piece(us, PieceType::Rook, rook_from)
                ^ ZOBRIST.piece(us, PieceType::Rook, rook_to);
            self.board[rook_from.index()] = None;
            self.board[rook_to.index()] = Some(rook_id);
            self.lift_piece_bits(us, PieceType::Rook, rook_from);
            self.drop_piece_bits(us, PieceType::Rook, rook_to);
            self.piece_mut(rook_id).square = rook_to;
            info.castling_rook = Some(rook_id);
        }

        if captured_id.is_some() || kind == PieceType::Pawn {
            self.plies_for_50_move_rule = 0;
        } else {
            self.plies_for_50_move_rule += 1;
        }

        if let Some(promo) = promotion {
            debug_assert_eq!(kind, PieceType::Pawn);
            self.piece_mut(moved_id).kind = promo;
            self.material[us.index()] += promo.worth() - PieceType::Pawn.worth();
            let bit = Bitboard::from_square(to);
            self.bitboards[us.index()][PieceType::Pawn.index()] ^= bit;
            self.bitboards[us.index()][promo.index()] |= bit;
            self.position_key ^=
                ZOBRIST.piece(us, PieceType::Pawn, to) ^ ZOBRIST.piece(us, promo, to);
            self.pawn_key ^= ZOBRIST.piece(us, PieceType::Pawn, to);
            self.pawn_count -= 1;
            if promo == PieceType::Bishop {
                self.bishops_count += 1;
            }
        }

        // a double push leaves an en-passant target only when an enemy pawn
        // stands ready next to the landing square
        self.en_passant = None;
        if kind == PieceType::Pawn && to.rank().abs_diff(from.rank()) > 1 {
            let enemy_pawns = self.bb(them, PieceType::Pawn);
            let mut adjacent = Bitboard::EMPTY;
            if to.file() > 0 {
                adjacent |= Bitboard::from_square(to.offset(-1));
            }
            if to.file() < 7 {
                adjacent |= Bitboard::from_square(to.offset(1));
            }
            if (enemy_pawns & adjacent).any() {
                self.en_passant = Some(to.offset(-us.pawn_push()));
            }
        }

        // non-piece hash features: side to move, castling mask, ep file
        self.position_key ^= ZOBRIST.turn();
        self.position_key ^= ZOBRIST.castling(info.prev_castling) ^ ZOBRIST.castling(self.castling);
        if let Some(prev_ep) = info.prev_en_passant {
            self.position_key ^= ZOBRIST.en_passant(prev_ep);
        }
        if let Some(ep) = self.en_passant {
            self.position_key ^= ZOBRIST.en_passant(ep);
        }

        self.move_count += 1;
        self.turn = them;
        self.checkers = self.attackers_to(self.king_square(them), us, self.occupancy);
        self.position_history.push(self.position_key);

        info
    }

    /// Undo a move. The record must be the one returned by the matching
    /// `perform_move`, and moves must unwind in reverse order.
    pub fn revert_move(&mut self, info: &UnmakeInfo) {
        let from = info.mv.from();
        let promotion = info.mv.promoted_to();
        let moved_id = info.moved_piece;
        let us = self.piece(moved_id).color;

        // walk the mover back, shedding a promotion on the way
        let current_sq = self.piece(moved_id).square;
        let current_kind = self.piece(moved_id).kind;
        self.board[current_sq.index()] = None;
        self.lift_piece_bits(us, current_kind, current_sq);
        if promotion.is_some() {
            self.piece_mut(moved_id).kind = PieceType::Pawn;
            self.material[us.index()] -=
                current_kind.worth() - PieceType::Pawn.worth();
            self.pawn_count += 1;
            if current_kind == PieceType::Bishop {
                self.bishops_count -= 1;
            }
        }
        let restored_kind = self.piece(moved_id).kind;
        self.board[from.index()] = Some(moved_id);
        self.drop_piece_bits(us, restored_kind, from);
        self.piece_mut(moved_id).square = from;

        // resurrect the captured piece into its old list slot, pushing the
        // piece that was swapped in back to the tail
        if let Some(captured) = info.captured_piece {
            let (cap_color, cap_kind, cap_sq, cap_slot) = {
                let piece = self.piece(captured);
                (
                    piece.color,
                    piece.kind,
                    piece.square,
                    piece.list_index as usize,
                )
            };
            let count = self.piece_counts[cap_color.index()];
            let displaced = self.piece_lists[cap_color.index()][cap_slot];
            self.piece_lists[cap_color.index()][count] = displaced;
            self.piece_mut(displaced).list_index = count as u8;
            self.piece_lists[cap_color.index()][cap_slot] = captured;
            self.piece_counts[cap_color.index()] = count + 1;

            self.board[cap_sq.index()] = Some(captured);
            self.drop_piece_bits(cap_color, cap_kind, cap_sq);
            self.material[cap_color.index()] += cap_kind.worth();
            match cap_kind {
                PieceType::Bishop => self.bishops_count += 1,
                PieceType::Pawn => self.pawn_count += 1,
                _ => {}
            }
        }

        // send the castling rook home
        if let Some(rook_id) = info.castling_rook {
            let rook_sq = self.piece(rook_id).square;
            let home_file = if rook_sq.file() == 5 { 7 } else { 0 };
            let home = Square::new(rook_sq.rank(), home_file);
            self.board[rook_sq.index()] = None;
            self.board[home.index()] = Some(rook_id);
            self.lift_piece_bits(us, PieceType::Rook, rook_sq);
            self.drop_piece_bits(us, PieceType::Rook, home);
            self.piece_mut(rook_id).square = home;
        }

        self.checkers = info.prev_checkers;
        self.position_key = info.prev_position_key;
        self.pawn_key = info.prev_pawn_key;
        self.en_passant = info.prev_en_passant;
        self.castling = info.prev_castling;
        self.plies_for_50_move_rule = info.prev_plies_for_50_move_rule;
        self.turn = us;
        self.position_history.pop();
        self.move_count -= 1;
    }
}
