//! Position construction from FEN and move-string parsing.

use std::str::FromStr;

use super::error::{FenError, MoveParseError};
use super::state::MAX_PIECES_PER_SIDE;
use super::types::{Color, Move, MoveList, PieceType, Square};
use super::Position;

impl Position {
    /// Parse a position from FEN.
    ///
    /// The first five fields are consumed (placement, side to move, castling
    /// rights, en-passant target, halfmove clock); a sixth field is accepted
    /// and ignored.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 5 {
            return Err(FenError::TooFewFields {
                found: fields.len(),
            });
        }

        let mut pos = Position::blank();

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidRankCount { found: ranks.len() });
        }
        for (row, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - row;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(step) = c.to_digit(10) {
                    file += step as usize;
                } else {
                    let kind =
                        PieceType::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
                    let color = if c.is_ascii_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };
                    if file >= 8 {
                        return Err(FenError::TooManyFiles {
                            rank,
                            files: file + 1,
                        });
                    }
                    if pos.piece_counts[color.index()] >= MAX_PIECES_PER_SIDE {
                        return Err(FenError::TooManyPieces {
                            color: color.to_string(),
                        });
                    }
                    pos.add_piece(color, kind, Square::new(rank, file));
                    file += 1;
                }
            }
            if file > 8 {
                return Err(FenError::TooManyFiles { rank, files: file });
            }
        }

        for color in Color::BOTH {
            let kings = pos.bb(color, PieceType::King).popcount() as usize;
            if kings != 1 {
                return Err(FenError::BadKingCount {
                    color: color.to_string(),
                    found: kings,
                });
            }
        }

        pos.turn = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        };

        for c in fields[2].chars() {
            match c {
                'K' => pos.castling.grant(super::types::CastlingRights::king_side(Color::White)),
                'Q' => pos.castling.grant(super::types::CastlingRights::queen_side(Color::White)),
                'k' => pos.castling.grant(super::types::CastlingRights::king_side(Color::Black)),
                'q' => pos.castling.grant(super::types::CastlingRights::queen_side(Color::Black)),
                '-' => {}
                _ => return Err(FenError::InvalidCastling { char: c }),
            }
        }

        pos.en_passant = match fields[3] {
            "-" => None,
            literal => {
                let sq = Square::from_str(literal).map_err(|_| FenError::InvalidEnPassant {
                    found: literal.to_string(),
                })?;
                Some(sq)
            }
        };

        pos.plies_for_50_move_rule =
            fields[4]
                .parse()
                .map_err(|_| FenError::InvalidHalfmoveClock {
                    found: fields[4].to_string(),
                })?;

        // the add_piece calls already folded the piece keys in; finish the
        // hash with the non-piece features
        pos.position_key = pos.compute_position_key();
        pos.checkers = pos.attackers_to(
            pos.king_square(pos.turn),
            pos.turn.opponent(),
            pos.occupancy,
        );
        pos.position_history.push(pos.position_key);

        Ok(pos)
    }

    /// Serialize the position back to FEN. The fullmove field is always 1;
    /// it is not tracked.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.piece_at(Square::new(rank, file)) {
                    Some((color, kind)) => {
                        if empty > 0 {
                            placement.push_str(&empty.to_string());
                            empty = 0;
                        }
                        placement.push(kind.to_fen_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                placement.push_str(&empty.to_string());
            }
            if rank > 0 {
                placement.push('/');
            }
        }

        let turn = if self.turn == Color::White { "w" } else { "b" };
        let ep = self
            .en_passant
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());

        format!(
            "{placement} {turn} {} {ep} {} 1",
            self.castling, self.plies_for_50_move_rule
        )
    }

    /// Parse a long-algebraic move string against the current position,
    /// returning the matching legal move.
    pub fn parse_move(&self, uci: &str) -> Result<Move, MoveParseError> {
        let mv = Move::from_uci(uci)?;
        let mut legal = MoveList::new();
        self.legal_moves(&mut legal);
        if legal.contains(mv) {
            Ok(mv)
        } else {
            Err(MoveParseError::IllegalMove {
                notation: uci.to_string(),
            })
        }
    }
}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::from_fen(s)
    }
}
