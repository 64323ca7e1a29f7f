//! Zobrist hashing tables.
//!
//! All keys come from a fixed-seed PRNG so hashes are identical from run
//! to run and saved keys stay comparable. The castling table is composed
//! so that `castling[a] ^ castling[b] == castling[a ^ b]`, which lets
//! `do_move` fold rights changes into the key with a single XOR.

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::types::{Gate, Piece, PieceType, CASTLING_RIGHT_NB};

const ZOBRIST_SEED: u64 = 1_070_372;

pub struct Zobrist {
    /// Piece on a square.
    pub psq: [[u64; 64]; Piece::NB],
    /// Unreleased gating piece on a first-rank file.
    pub psq_gate: [[u64; 8]; Piece::NB],
    /// Selected ("in hand") gating type per gate slot.
    pub inhand: [[u64; Gate::NB]; PieceType::NB],
    /// En passant file, only XORed when a capture is actually possible.
    pub enpassant: [u64; 8],
    /// Castling rights mask.
    pub castling: [u64; CASTLING_RIGHT_NB],
    /// Side-to-move term, XORed in when Black is to move.
    pub side: u64,
    /// Base term of the pawn key.
    pub no_pawns: u64,
}

pub static ZOBRIST: Lazy<Zobrist> = Lazy::new(|| {
    let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);

    let mut psq = [[0u64; 64]; Piece::NB];
    for piece in &mut psq {
        for key in piece.iter_mut() {
            *key = rng.gen();
        }
    }

    let mut psq_gate = [[0u64; 8]; Piece::NB];
    for piece in &mut psq_gate {
        for key in piece.iter_mut() {
            *key = rng.gen();
        }
    }

    let mut inhand = [[0u64; Gate::NB]; PieceType::NB];
    for pt in &mut inhand {
        for key in pt.iter_mut() {
            *key = rng.gen();
        }
    }

    let mut enpassant = [0u64; 8];
    for key in &mut enpassant {
        *key = rng.gen();
    }

    let mut bit_keys = [0u64; 4];
    for key in &mut bit_keys {
        *key = rng.gen();
    }
    let mut castling = [0u64; CASTLING_RIGHT_NB];
    for (cr, key) in castling.iter_mut().enumerate() {
        for (bit, bit_key) in bit_keys.iter().enumerate() {
            if cr & (1 << bit) != 0 {
                *key ^= bit_key;
            }
        }
    }

    Zobrist {
        psq,
        psq_gate,
        inhand,
        enpassant,
        castling,
        side: rng.gen(),
        no_pawns: rng.gen(),
    }
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_castling_keys_compose() {
        for a in 0..CASTLING_RIGHT_NB {
            for b in 0..CASTLING_RIGHT_NB {
                assert_eq!(
                    ZOBRIST.castling[a] ^ ZOBRIST.castling[b],
                    ZOBRIST.castling[a ^ b]
                );
            }
        }
        assert_eq!(ZOBRIST.castling[0], 0);
    }

    #[test]
    fn test_keys_are_deterministic() {
        // Same seed, same tables.
        let mut rng = StdRng::seed_from_u64(1_070_372);
        let first: u64 = rng.gen();
        assert_eq!(first, ZOBRIST.psq[0][0]);
    }

    #[test]
    fn test_keys_look_distinct() {
        assert_ne!(ZOBRIST.side, 0);
        assert_ne!(ZOBRIST.psq[1][0], ZOBRIST.psq[1][1]);
        assert_ne!(ZOBRIST.inhand[6][1], ZOBRIST.inhand[6][2]);
    }
}
