//! Position consistency checks.
//!
//! `pos_is_ok` runs the cheap invariants and is asserted after every
//! do/undo in debug builds; `pos_is_ok_full` additionally validates the
//! bitboards, piece lists and incremental state against a from-scratch
//! recomputation and is meant for tests.

use super::betza;
use super::state::Position;
use super::types::{Bitboard, Color, Piece, PieceType};

impl Position {
    /// Quick sanity check: kings in place, en passant on a sane rank.
    #[must_use]
    pub fn pos_is_ok(&self) -> bool {
        for c in Color::BOTH {
            if self.count(c, PieceType::KING) != 1
                || self.piece_on(self.king_square(c)) != Piece::new(c, PieceType::KING)
            {
                return false;
            }
        }

        if self.ep_square().is_ok() && self.ep_square().relative_rank(self.side_to_move) != 5 {
            return false;
        }

        true
    }

    /// Full structural check, including hash consistency.
    #[must_use]
    pub fn pos_is_ok_full(&self) -> bool {
        if !self.pos_is_ok() {
            return false;
        }

        // The color bitboards partition the occupancy.
        if (self.pieces_c(Color::White) & self.pieces_c(Color::Black)).any()
            || (self.pieces_c(Color::White) | self.pieces_c(Color::Black)) != self.pieces()
        {
            return false;
        }

        // Pawns never stand on the first or last rank.
        if (self.pieces_t(PieceType::PAWN) & (Bitboard::RANK_1 | Bitboard::RANK_8)).any() {
            return false;
        }

        // Type bitboards are pairwise disjoint and union to the
        // occupancy.
        let mut union = Bitboard::EMPTY;
        for t1 in 1..PieceType::NB {
            let b1 = self.pieces_t(PieceType::from_index(t1));
            union |= b1;
            for t2 in (t1 + 1)..PieceType::NB {
                if (b1 & self.pieces_t(PieceType::from_index(t2))).any() {
                    return false;
                }
            }
        }
        if union != self.pieces() {
            return false;
        }

        // Board array, counts and piece lists agree; custom pieces on
        // the board must have a registered movement pattern.
        for c in Color::BOTH {
            for t in 1..PieceType::NB {
                let pt = PieceType::from_index(t);
                let pc = Piece::new(c, pt);
                if self.count(c, pt) != self.pieces_ct(c, pt).popcount() as usize {
                    return false;
                }
                if pt.is_custom() && self.count(c, pt) > 0 && !betza::is_registered(pt) {
                    return false;
                }
                for (i, &s) in self.squares(c, pt).iter().enumerate() {
                    if self.piece_on(s) != pc || self.index[s.index()] as usize != i {
                        return false;
                    }
                }
            }
        }

        // Gate bookkeeping is involutive.
        for s in self.gates().iter() {
            if self.gate_board[s.index()].index() == 0 {
                return false;
            }
        }

        // The incremental key equals the recomputed one.
        self.compute_key() == self.key()
    }
}
