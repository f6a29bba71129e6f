//! Precomputed board geometry: leaper attack sets, line predicates,
//! between/behind masks, king rings, en-passant mapping, and the control
//! zones used by evaluation.

use std::sync::LazyLock;

use super::types::{Bitboard, Color, Square};

/// File mask for a file index (0-7)
#[inline]
#[must_use]
pub(crate) const fn file_bb(file: usize) -> Bitboard {
    Bitboard(Bitboard::FILE_A.0 << file)
}

/// Rank mask seen from a color's side: `relative_rank_bb(White, 0)` is rank 1,
/// `relative_rank_bb(Black, 0)` is rank 8.
#[inline]
#[must_use]
pub(crate) const fn relative_rank_bb(color: Color, rank: usize) -> Bitboard {
    let r = match color {
        Color::White => rank,
        Color::Black => 7 - rank,
    };
    Bitboard(Bitboard::RANK_1.0 << (r * 8))
}

/// Square shade: 0 for dark (a1), 1 for light
#[inline]
#[must_use]
pub(crate) const fn square_shade(sq: Square) -> u8 {
    ((sq.rank() + sq.file()) % 2) as u8
}

/// True if the squares share a diagonal
#[inline]
#[must_use]
pub(crate) const fn aligned_diagonally(a: Square, b: Square) -> bool {
    (a.rank() as i32 - b.rank() as i32).abs() == (a.file() as i32 - b.file() as i32).abs()
}

/// True if the squares share a rank or file
#[inline]
#[must_use]
pub(crate) const fn aligned_orthogonally(a: Square, b: Square) -> bool {
    a.rank() == b.rank() || a.file() == b.file()
}

/// True if the squares share any line
#[inline]
#[must_use]
pub(crate) const fn aligned(a: Square, b: Square) -> bool {
    aligned_diagonally(a, b) || aligned_orthogonally(a, b)
}

/// True if the three squares are collinear. Cross-multiplied slope identity,
/// so no division and no table.
#[inline]
#[must_use]
pub(crate) const fn on_one_line(a: Square, b: Square, c: Square) -> bool {
    (a.rank() as i32 - b.rank() as i32) * (a.file() as i32 - c.file() as i32)
        == (a.rank() as i32 - c.rank() as i32) * (a.file() as i32 - b.file() as i32)
}

/// True if `b` lies strictly between `a` and `c` on their common line.
/// Square indices are monotone along every board line, so an index
/// comparison settles the ordering.
#[inline]
#[must_use]
pub(crate) const fn square_between(a: Square, b: Square, c: Square) -> bool {
    on_one_line(a, b, c)
        && if a.index() < c.index() {
            a.index() < b.index() && b.index() < c.index()
        } else {
            a.index() > b.index() && b.index() > c.index()
        }
}

fn leaper_attacks(deltas: &[(i32, i32)]) -> [Bitboard; 64] {
    let mut attacks = [Bitboard::EMPTY; 64];
    for (sq, slot) in attacks.iter_mut().enumerate() {
        let r = (sq / 8) as i32;
        let f = (sq % 8) as i32;
        let mut mask = 0u64;
        for &(dr, df) in deltas {
            let nr = r + dr;
            let nf = f + df;
            if (0..8).contains(&nr) && (0..8).contains(&nf) {
                mask |= 1u64 << (nr * 8 + nf);
            }
        }
        *slot = Bitboard(mask);
    }
    attacks
}

pub(crate) static KNIGHT_ATTACKS: LazyLock<[Bitboard; 64]> = LazyLock::new(|| {
    leaper_attacks(&[
        (2, 1),
        (1, 2),
        (-1, 2),
        (-2, 1),
        (-2, -1),
        (-1, -2),
        (1, -2),
        (2, -1),
    ])
});

pub(crate) static KING_ATTACKS: LazyLock<[Bitboard; 64]> = LazyLock::new(|| {
    leaper_attacks(&[
        (1, 0),
        (-1, 0),
        (0, 1),
        (0, -1),
        (1, 1),
        (1, -1),
        (-1, 1),
        (-1, -1),
    ])
});

/// `PAWN_ATTACKS[color][sq]` is the up-to-two squares a pawn of `color`
/// on `sq` attacks.
pub(crate) static PAWN_ATTACKS: LazyLock<[[Bitboard; 64]; 2]> = LazyLock::new(|| {
    let mut attacks = [[Bitboard::EMPTY; 64]; 2];
    for sq in 0..64 {
        let r = (sq / 8) as i32;
        let f = (sq % 8) as i32;
        for (color, dr) in [(0usize, 1i32), (1, -1)] {
            let nr = r + dr;
            if !(0..8).contains(&nr) {
                continue;
            }
            let mut mask = 0u64;
            for df in [-1, 1] {
                let nf = f + df;
                if (0..8).contains(&nf) {
                    mask |= 1u64 << (nr * 8 + nf);
                }
            }
            attacks[color][sq] = Bitboard(mask);
        }
    }
    attacks
});

/// `BETWEEN_BB[a][b]` holds the squares strictly between `a` and `b` when
/// they share a line, else empty.
pub(crate) static BETWEEN_BB: LazyLock<Box<[[Bitboard; 64]; 64]>> = LazyLock::new(|| {
    let mut table = vec![[Bitboard::EMPTY; 64]; 64].into_boxed_slice();
    for a in 0..64 {
        for b in 0..64 {
            let sa = Square::from_index(a);
            let sb = Square::from_index(b);
            if a == b || !aligned(sa, sb) {
                continue;
            }
            let dr = (sb.rank() as i32 - sa.rank() as i32).signum();
            let df = (sb.file() as i32 - sa.file() as i32).signum();
            let mut mask = 0u64;
            let mut r = sa.rank() as i32 + dr;
            let mut f = sa.file() as i32 + df;
            while (r, f) != (sb.rank() as i32, sb.file() as i32) {
                mask |= 1u64 << (r * 8 + f);
                r += dr;
                f += df;
            }
            table[a][b] = Bitboard(mask);
        }
    }
    table.try_into().map_err(|_| ()).unwrap()
});

/// `BEHIND_BB[a][b]` holds the squares on the a-b line continuing past `b`
/// away from `a`, else empty.
pub(crate) static BEHIND_BB: LazyLock<Box<[[Bitboard; 64]; 64]>> = LazyLock::new(|| {
    let mut table = vec![[Bitboard::EMPTY; 64]; 64].into_boxed_slice();
    for a in 0..64 {
        for b in 0..64 {
            let sa = Square::from_index(a);
            let sb = Square::from_index(b);
            if a == b || !aligned(sa, sb) {
                continue;
            }
            let dr = (sb.rank() as i32 - sa.rank() as i32).signum();
            let df = (sb.file() as i32 - sa.file() as i32).signum();
            let mut mask = 0u64;
            let mut r = sb.rank() as i32 + dr;
            let mut f = sb.file() as i32 + df;
            while (0..8).contains(&r) && (0..8).contains(&f) {
                mask |= 1u64 << (r * 8 + f);
                r += dr;
                f += df;
            }
            table[a][b] = Bitboard(mask);
        }
    }
    table.try_into().map_err(|_| ()).unwrap()
});

/// `KING_RINGS[sq][0]` is the ring at Chebyshev distance 1 around `sq`,
/// `KING_RINGS[sq][1]` the ring at distance 2.
pub(crate) static KING_RINGS: LazyLock<[[Bitboard; 2]; 64]> = LazyLock::new(|| {
    let mut rings = [[Bitboard::EMPTY; 2]; 64];
    for sq in 0..64 {
        let r = (sq / 8) as i32;
        let f = (sq % 8) as i32;
        for (nr, nf) in (0..8).flat_map(|nr| (0..8).map(move |nf| (nr, nf))) {
            let dist = (nr - r).abs().max((nf - f).abs());
            if dist == 1 || dist == 2 {
                rings[sq][(dist - 1) as usize] |= Bitboard(1u64 << (nr * 8 + nf));
            }
        }
    }
    rings
});

/// Square of the pawn that can be captured en passant, given the en-passant
/// target square (rank 3 maps to rank 4, rank 6 to rank 5).
#[inline]
#[must_use]
pub(crate) const fn en_passant_piece_square(ep: Square) -> Square {
    match ep.rank() {
        2 => Square::new(3, ep.file()),
        5 => Square::new(4, ep.file()),
        _ => ep,
    }
}

/// Board regions weighted by the middle-game control term, one partition of
/// the 64 squares per color.
pub(crate) struct ControlZones {
    pub center: Bitboard,
    pub around_center: Bitboard,
    pub opponent: Bitboard,
    pub unimportant: Bitboard,
}

pub(crate) static CONTROL_ZONES: LazyLock<[ControlZones; 2]> = LazyLock::new(|| {
    let mut center = Bitboard::EMPTY;
    for sq in [
        Square::new(3, 3),
        Square::new(3, 4),
        Square::new(4, 3),
        Square::new(4, 4),
    ] {
        center |= Bitboard::from_square(sq);
    }

    let mut around = Bitboard::EMPTY;
    for rank in 2..6 {
        for file in 2..6 {
            around |= Bitboard::from_square(Square::new(rank, file));
        }
    }
    around ^= center;

    let zones = |color: Color| {
        let mut opponent_half = Bitboard::EMPTY;
        for rank in 0..4 {
            let r = match color {
                Color::White => 4 + rank,
                Color::Black => rank,
            };
            opponent_half |= Bitboard(Bitboard::RANK_1.0 << (r * 8));
        }
        let opponent = opponent_half & !center & !around;
        ControlZones {
            center,
            around_center: around,
            opponent,
            unimportant: !(center | around | opponent),
        }
    };

    [zones(Color::White), zones(Color::Black)]
});
