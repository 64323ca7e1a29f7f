//! Custom-piece movement patterns.
//!
//! A fixed catalog of miniature Betza notations is mapped onto the
//! reserved custom piece-type range; there is no general parser. Each
//! notation expands to one or more patterns of (file, rank) offsets,
//! either leaps or rider rays, optionally restricted to quiet moves or
//! captures only (the `m`/`c` prefixes). Patterns are stored from White's
//! point of view and not mirrored per color, matching the engine these
//! pieces were ported from.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::types::{Bitboard, PieceType, Square};

struct Pattern {
    offsets: &'static [(i8, i8)],
    rider: bool,
    capture_only: bool,
    quiet_only: bool,
}

impl Pattern {
    const fn leaper(offsets: &'static [(i8, i8)]) -> Pattern {
        Pattern {
            offsets,
            rider: false,
            capture_only: false,
            quiet_only: false,
        }
    }

    const fn rider(offsets: &'static [(i8, i8)]) -> Pattern {
        Pattern {
            offsets,
            rider: true,
            capture_only: false,
            quiet_only: false,
        }
    }
}

const KNIGHT_OFFSETS: &[(i8, i8)] = &[
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];
const WAZIR_OFFSETS: &[(i8, i8)] = &[(1, 0), (-1, 0), (0, 1), (0, -1)];
const FERZ_OFFSETS: &[(i8, i8)] = &[(1, 1), (1, -1), (-1, 1), (-1, -1)];
const KING_OFFSETS: &[(i8, i8)] = &[
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];
const THREE_LEAPER_OFFSETS: &[(i8, i8)] = &[(3, 0), (-3, 0), (0, 3), (0, -3)];

/// The recognized notations, in custom-slot order.
static REGISTRY: Lazy<HashMap<PieceType, Vec<Pattern>>> = Lazy::new(|| {
    let mut pieces = HashMap::new();

    // N
    pieces.insert(PieceType::CUSTOM_1, vec![Pattern::leaper(KNIGHT_OFFSETS)]);
    // K
    pieces.insert(PieceType::CUSTOM_2, vec![Pattern::leaper(KING_OFFSETS)]);
    // R
    pieces.insert(PieceType::CUSTOM_3, vec![Pattern::rider(WAZIR_OFFSETS)]);
    // B
    pieces.insert(PieceType::CUSTOM_4, vec![Pattern::rider(FERZ_OFFSETS)]);
    // Q
    pieces.insert(PieceType::CUSTOM_5, vec![Pattern::rider(KING_OFFSETS)]);
    // mWcF: moves like a wazir straight ahead, captures like a ferz ahead
    pieces.insert(
        PieceType::CUSTOM_6,
        vec![
            Pattern {
                offsets: &[(0, 1)],
                rider: false,
                capture_only: false,
                quiet_only: true,
            },
            Pattern {
                offsets: &[(1, 1), (-1, 1)],
                rider: false,
                capture_only: true,
                quiet_only: false,
            },
        ],
    );
    // WF
    pieces.insert(PieceType::CUSTOM_7, vec![Pattern::leaper(KING_OFFSETS)]);
    // RN
    pieces.insert(
        PieceType::CUSTOM_8,
        vec![Pattern::rider(WAZIR_OFFSETS), Pattern::leaper(KNIGHT_OFFSETS)],
    );
    // HW
    pieces.insert(
        PieceType::CUSTOM_9,
        vec![
            Pattern::leaper(THREE_LEAPER_OFFSETS),
            Pattern::leaper(WAZIR_OFFSETS),
        ],
    );

    pieces
});

/// Returns true if the type has a registered movement pattern.
pub(crate) fn is_registered(pt: PieceType) -> bool {
    REGISTRY.contains_key(&pt)
}

/// Attack set of a custom piece from `from` under `occupied`.
///
/// With `captures_only` set, quiet-only patterns are skipped; otherwise
/// capture-only patterns are skipped. Rider rays include the first
/// occupied square and stop there. Stepping in file/rank coordinates
/// makes board wrap impossible by construction; consecutive ray squares
/// are always exactly one step apart.
pub(crate) fn attacks(
    pt: PieceType,
    from: Square,
    occupied: Bitboard,
    captures_only: bool,
) -> Bitboard {
    let Some(patterns) = REGISTRY.get(&pt) else {
        return Bitboard::EMPTY;
    };

    let mut attacks = Bitboard::EMPTY;
    for pattern in patterns {
        if captures_only && pattern.quiet_only {
            continue;
        }
        if !captures_only && pattern.capture_only {
            continue;
        }

        for &(df, dr) in pattern.offsets {
            let mut file = from.file() as i32;
            let mut rank = from.rank() as i32;
            loop {
                file += i32::from(df);
                rank += i32::from(dr);
                if !(0..8).contains(&file) || !(0..8).contains(&rank) {
                    break;
                }
                let to = Square::new(rank as usize, file as usize);
                attacks |= to;
                if !pattern.rider || occupied.contains(to) {
                    break;
                }
            }
        }
    }

    attacks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::attack_tables::{leaper_attacks_bb, queen_attacks, rook_attacks};
    use crate::board::types::Color;

    #[test]
    fn test_registry_covers_custom_range() {
        for idx in PieceType::CUSTOM_1.index()..=PieceType::CUSTOM_9.index() {
            assert!(is_registered(PieceType::from_index(idx)));
        }
        assert!(!is_registered(PieceType::QUEEN));
    }

    #[test]
    fn test_knight_like_matches_table() {
        let d4 = Square::new(3, 3);
        assert_eq!(
            attacks(PieceType::CUSTOM_1, d4, Bitboard::ALL, false),
            leaper_attacks_bb(Color::White, PieceType::KNIGHT, d4)
        );
    }

    #[test]
    fn test_rook_like_matches_magic() {
        let d4 = Square::new(3, 3);
        let occ = Bitboard(0x0010_0800_2200_0010);
        assert_eq!(attacks(PieceType::CUSTOM_3, d4, occ, false), rook_attacks(d4, occ));
    }

    #[test]
    fn test_queen_like_matches_magic() {
        let b7 = Square::new(6, 1);
        let occ = Bitboard(0x0210_0800_2200_0010);
        assert_eq!(attacks(PieceType::CUSTOM_5, b7, occ, false), queen_attacks(b7, occ));
    }

    #[test]
    fn test_rider_stops_at_blocker() {
        let a1 = Square::A1;
        let blocker = Bitboard::from_square(Square::new(0, 2));
        let b = attacks(PieceType::CUSTOM_3, a1, blocker, false);
        assert!(b.contains(Square::B1));
        assert!(b.contains(Square::C1));
        assert!(!b.contains(Square::D1));
    }

    #[test]
    fn test_pawn_like_polarity() {
        let e4 = Square::new(3, 4);
        let quiet = attacks(PieceType::CUSTOM_6, e4, Bitboard::EMPTY, false);
        assert_eq!(quiet, Bitboard::from_square(Square::new(4, 4)));
        let caps = attacks(PieceType::CUSTOM_6, e4, Bitboard::EMPTY, true);
        assert_eq!(
            caps,
            Bitboard::from_square(Square::new(4, 3)) | Square::new(4, 5)
        );
    }

    #[test]
    fn test_three_leaper_no_wrap() {
        let g1 = Square::G1;
        let b = attacks(PieceType::CUSTOM_9, g1, Bitboard::EMPTY, false);
        // The 3-leap east would wrap off the board; west, north and the
        // wazir steps remain.
        assert!(b.contains(Square::D1));
        assert!(b.contains(Square::new(3, 6)));
        assert!(b.contains(Square::F1));
        assert!(b.contains(Square::H1));
        assert!(!b.contains(Square::new(0, 1)));
        assert_eq!(b.popcount(), 5);
    }
}
