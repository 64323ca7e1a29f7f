//! Castling rights.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::piece::Color;

pub(crate) const WHITE_OO: u8 = 1 << 0;
pub(crate) const WHITE_OOO: u8 = 1 << 1;
pub(crate) const BLACK_OO: u8 = 1 << 2;
pub(crate) const BLACK_OOO: u8 = 1 << 3;

/// Number of distinct rights masks (all subsets of the four bits).
pub(crate) const CASTLING_RIGHT_NB: usize = 16;

/// A single castling right, identified by its bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CastlingRight(pub(crate) u8);

impl CastlingRight {
    pub const WHITE_KING_SIDE: CastlingRight = CastlingRight(WHITE_OO);
    pub const WHITE_QUEEN_SIDE: CastlingRight = CastlingRight(WHITE_OOO);
    pub const BLACK_KING_SIDE: CastlingRight = CastlingRight(BLACK_OO);
    pub const BLACK_QUEEN_SIDE: CastlingRight = CastlingRight(BLACK_OOO);

    /// The right for a color and side (`king_side` true for O-O).
    #[inline]
    #[must_use]
    pub const fn new(c: Color, king_side: bool) -> Self {
        let side_bit = if king_side { WHITE_OO } else { WHITE_OOO };
        CastlingRight(side_bit << (2 * c.index()))
    }

    /// Index into per-right tables (0..4).
    #[inline]
    #[must_use]
    pub(crate) const fn index(self) -> usize {
        self.0.trailing_zeros() as usize
    }

    #[inline]
    #[must_use]
    pub const fn king_side(self) -> bool {
        self.0 & (WHITE_OO | BLACK_OO) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_right_bits() {
        assert_eq!(CastlingRight::new(Color::White, true).0, WHITE_OO);
        assert_eq!(CastlingRight::new(Color::White, false).0, WHITE_OOO);
        assert_eq!(CastlingRight::new(Color::Black, true).0, BLACK_OO);
        assert_eq!(CastlingRight::new(Color::Black, false).0, BLACK_OOO);
    }

    #[test]
    fn test_right_index() {
        assert_eq!(CastlingRight::WHITE_KING_SIDE.index(), 0);
        assert_eq!(CastlingRight::BLACK_QUEEN_SIDE.index(), 3);
    }

    #[test]
    fn test_king_side() {
        assert!(CastlingRight::BLACK_KING_SIDE.king_side());
        assert!(!CastlingRight::WHITE_QUEEN_SIDE.king_side());
    }
}
