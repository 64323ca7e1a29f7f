//! Repetition, fifty-move and upcoming-cycle detection.
//!
//! `has_game_cycle` uses Marcel van Kervinck's cuckoo construction: a
//! two-way hash table built once over every reversible single-piece
//! move, keyed by the XOR of its two piece-square keys and the side
//! term. A hit on the XOR of two position keys names a candidate move
//! that would repeat an earlier position.

use once_cell::sync::Lazy;

use crate::zobrist::ZOBRIST;

use super::attack_tables::{between_bb, pseudo_attacks_bb};
use super::movegen::generate_legal;
use super::state::Position;
use super::types::{Color, Move, Piece, PieceType, Square};

#[inline]
fn h1(key: u64) -> usize {
    (key & 0x1fff) as usize
}

#[inline]
fn h2(key: u64) -> usize {
    ((key >> 16) & 0x1fff) as usize
}

struct CuckooTable {
    keys: [u64; 8192],
    moves: [Move; 8192],
}

/// One entry per reversible move of the orthodox non-pawn types, for
/// either color.
static CUCKOO: Lazy<Box<CuckooTable>> = Lazy::new(|| {
    let mut table = Box::new(CuckooTable {
        keys: [0; 8192],
        moves: [Move::NONE; 8192],
    });

    let mut count = 0;
    for c in Color::BOTH {
        for pt in [
            PieceType::KNIGHT,
            PieceType::BISHOP,
            PieceType::ROOK,
            PieceType::QUEEN,
            PieceType::KING,
        ] {
            let pc = Piece::new(c, pt);
            for s1 in 0..64 {
                for s2 in (s1 + 1)..64 {
                    if !pseudo_attacks_bb(Color::White, pt, Square::from_index(s1))
                        .contains(Square::from_index(s2))
                    {
                        continue;
                    }

                    let mut mv = Move::new(Square::from_index(s1), Square::from_index(s2));
                    let mut key =
                        ZOBRIST.psq[pc.index()][s1] ^ ZOBRIST.psq[pc.index()][s2] ^ ZOBRIST.side;
                    let mut slot = h1(key);
                    loop {
                        std::mem::swap(&mut table.keys[slot], &mut key);
                        std::mem::swap(&mut table.moves[slot], &mut mv);
                        if mv == Move::NONE {
                            break;
                        }
                        // Push the evicted entry to its alternative slot.
                        slot = if slot == h1(key) { h2(key) } else { h1(key) };
                    }
                    count += 1;
                }
            }
        }
    }
    debug_assert_eq!(count, 3668);
    table
});

impl Position {
    /// Draw by the fifty-move rule or by repetition. `ply` is the
    /// distance from the search root: one repetition strictly after the
    /// root suffices, otherwise two are required. Stalemate is not
    /// detected here.
    #[must_use]
    pub fn is_draw(&self, ply: i32) -> bool {
        if self.st().rule50 > 99
            && (self.checkers().is_empty() || !generate_legal(self).is_empty())
        {
            return true;
        }

        let end = self.st().rule50.min(self.st().plies_from_null);
        if end < 4 {
            return false;
        }

        let cur = self.states.len() - 1;
        let mut cnt = 0;
        let mut i = 4;
        while i <= end && (i as usize) <= cur {
            if self.states[cur - i as usize].key == self.st().key {
                cnt += 1;
                if cnt + i32::from(ply > i) == 2 {
                    return true;
                }
            }
            i += 2;
        }
        false
    }

    /// Whether any position since the last irreversible move occurred
    /// before, anywhere in the played line.
    #[must_use]
    pub fn has_repeated(&self) -> bool {
        let mut cur = self.states.len() - 1;
        loop {
            let stc = &self.states[cur];
            let end = stc.rule50.min(stc.plies_from_null) as usize;
            if end < 4 {
                return false;
            }

            let mut i = 4;
            while i <= end && i <= cur {
                if self.states[cur - i].key == stc.key {
                    return true;
                }
                i += 2;
            }

            if cur == 0 {
                return false;
            }
            cur -= 1;
        }
    }

    /// Whether the side to move has a move that repeats an earlier
    /// position, or an earlier position could reach this one directly.
    #[must_use]
    pub fn has_game_cycle(&self, ply: i32) -> bool {
        let end = self.st().rule50.min(self.st().plies_from_null) as usize;
        if end < 3 {
            return false;
        }

        let original_key = self.st().key;
        let cur = self.states.len() - 1;

        let mut i = 3;
        while i <= end && i <= cur {
            let stp_key = self.states[cur - i].key;

            let move_key = original_key ^ stp_key;
            let mut slot = h1(move_key);
            if CUCKOO.keys[slot] != move_key {
                slot = h2(move_key);
            }
            if CUCKOO.keys[slot] == move_key {
                let mv = CUCKOO.moves[slot];
                if (between_bb(mv.from(), mv.to()) & self.pieces()).is_empty() {
                    if ply > i as i32 {
                        return true;
                    }

                    // Repetitions before or at the root need one more
                    // occurrence further back.
                    let mut k = i + 2;
                    while k <= end && k <= cur {
                        if self.states[cur - k].key == stp_key {
                            return true;
                        }
                        k += 2;
                    }
                }
            }
            i += 2;
        }
        false
    }
}
