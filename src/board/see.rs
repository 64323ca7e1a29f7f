//! Static Exchange Evaluation.
//!
//! `see_ge` decides whether the net material outcome of the exchanges a
//! move starts is at least a threshold, without executing any move. The
//! classical iterative scheme: keep a running balance, repeatedly pick
//! the cheapest attacker of the destination, lift it off the occupancy
//! and re-scan for x-ray attackers behind it.

use super::attack_tables::{bishop_attacks, rook_attacks};
use super::state::Position;
use super::types::{Bitboard, Move, MoveType, PieceType, Square};

/// Capture ordering for the exchange loop: cheapest kinds first, the
/// king strictly last.
const EXCHANGE_ORDER: [PieceType; 25] = [
    PieceType::PAWN,
    PieceType::KNIGHT,
    PieceType::BISHOP,
    PieceType::ROOK,
    PieceType::QUEEN,
    PieceType::CANNON,
    PieceType::LEOPARD,
    PieceType::ARCHBISHOP,
    PieceType::CHANCELLOR,
    PieceType::SPIDER,
    PieceType::DRAGON,
    PieceType::UNICORN,
    PieceType::HAWK,
    PieceType::ELEPHANT,
    PieceType::FORTRESS,
    PieceType::CUSTOM_1,
    PieceType::CUSTOM_2,
    PieceType::CUSTOM_3,
    PieceType::CUSTOM_4,
    PieceType::CUSTOM_5,
    PieceType::CUSTOM_6,
    PieceType::CUSTOM_7,
    PieceType::CUSTOM_8,
    PieceType::CUSTOM_9,
    PieceType::KING,
];

impl Position {
    /// Locate the least valuable attacker for the side to move, remove
    /// it from the occupancy and add any x-ray attacker revealed behind
    /// it. Only orthodox slider lines are re-scanned.
    fn min_attacker(
        &self,
        to: Square,
        stm_attackers: Bitboard,
        occupied: &mut Bitboard,
        attackers: &mut Bitboard,
    ) -> PieceType {
        for pt in EXCHANGE_ORDER {
            let b = stm_attackers & self.pieces_t(pt);
            if b.is_empty() {
                continue;
            }

            if pt == PieceType::KING {
                // Last cycle; no bitboard update needed.
                return PieceType::KING;
            }

            *occupied ^= Bitboard::from_square(b.lsb());

            if matches!(pt, PieceType::PAWN | PieceType::BISHOP | PieceType::QUEEN) {
                *attackers |= bishop_attacks(to, *occupied)
                    & self.pieces_tt(PieceType::BISHOP, PieceType::QUEEN);
            }
            if matches!(pt, PieceType::ROOK | PieceType::QUEEN) {
                *attackers |= rook_attacks(to, *occupied)
                    & self.pieces_tt(PieceType::ROOK, PieceType::QUEEN);
            }

            // X-rays may re-add pieces already processed.
            *attackers &= *occupied;
            return pt;
        }
        PieceType::KING
    }

    /// Test whether the static exchange value of a move reaches the
    /// threshold. Only normal moves are evaluated; other kinds return a
    /// conservative answer.
    #[must_use]
    pub fn see_ge(&self, m: Move, threshold: i32) -> bool {
        debug_assert!(m.is_ok());

        if m.move_type() != MoveType::Normal {
            return 0 >= threshold;
        }

        let from = m.from();
        let to = m.to();
        let mut next_victim = self.piece_on(from).piece_type();
        let us = self.piece_on(from).color();
        let mut stm = !us; // the opponent recaptures first

        // The best case: the capture stands and nothing recaptures. A
        // captured gating piece on the destination adds its value.
        let mut balance = self.piece_on(to).piece_type().value() - threshold;
        if self.gates().contains(to) {
            balance += self.gating_piece_on(to).value();
        }
        if balance < 0 {
            return false;
        }

        // The worst case: our mover is lost for nothing.
        balance -= next_victim.value();
        if balance >= 0 {
            return true;
        }

        let mut occupied = self.pieces() ^ from ^ to;
        let mut attackers = self.attackers_to_occ(to, occupied) & occupied;

        loop {
            let mut stm_attackers = attackers & self.pieces_c(stm);

            // Pinned pieces may not join in while their pinners stand.
            if (self.pinners(!stm) & !occupied).is_empty() {
                stm_attackers &= !self.blockers_for_king(stm);
            }

            if stm_attackers.is_empty() {
                break;
            }

            next_victim = self.min_attacker(to, stm_attackers, &mut occupied, &mut attackers);
            stm = !stm;

            // Negamax the balance with a null window.
            debug_assert!(balance < 0);
            balance = -balance - 1 - next_victim.value();

            if balance >= 0 {
                // A king "capture" only stands when nothing recaptures.
                if next_victim == PieceType::KING && (attackers & self.pieces_c(stm)).any() {
                    stm = !stm;
                }
                break;
            }
            debug_assert!(next_victim != PieceType::KING);
        }

        us != stm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Position;

    fn make_position(fen: &str) -> Position {
        Position::from_fen(fen)
    }

    fn find_move(pos: &Position, uci: &str) -> Move {
        pos.parse_move(uci).expect("move should be legal")
    }

    #[test]
    fn test_see_free_pawn() {
        let pos = make_position("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1");
        let m = find_move(&pos, "e4d5");
        assert!(pos.see_ge(m, 0));
        assert!(pos.see_ge(m, 100));
        assert!(!pos.see_ge(m, 101));
    }

    #[test]
    fn test_see_defended_pawn_equal() {
        let pos = make_position("4k3/8/2p5/3p4/4P3/8/8/4K3 w - - 0 1");
        let m = find_move(&pos, "e4d5");
        // Pawn takes pawn, pawn recaptures: net zero.
        assert!(pos.see_ge(m, 0));
        assert!(!pos.see_ge(m, 1));
    }

    #[test]
    fn test_see_knight_takes_defended_pawn() {
        let pos = make_position("4k3/8/2p5/3p4/4N3/8/8/4K3 w - - 0 1");
        let m = find_move(&pos, "e4d5");
        // 100 - 320 after the recapture.
        assert!(!pos.see_ge(m, 0));
        assert!(pos.see_ge(m, -220));
    }

    #[test]
    fn test_see_xray_recapture() {
        // White wins the d5 pawn with rook support stacked on the file.
        let pos = make_position("3r3k/3r4/8/3p4/8/8/3R4/3R3K w - - 0 1");
        let m = find_move(&pos, "d2d5");
        // RxP, rxR, RxR, rxR: 100 - 500 + 500 - 500 = -400.
        assert!(!pos.see_ge(m, 0));
        assert!(pos.see_ge(m, -400));
        assert!(!pos.see_ge(m, -399));
    }

    #[test]
    fn test_see_counts_captured_gate() {
        // Taking the rook on a1 also takes the cannon gated there.
        let pos = make_position("r3k3/8/8/8/8/8/8/R3K3[CaLecale] b - - 0 1");
        let m = find_move(&pos, "a8a1");
        assert!(pos.see_ge(m, 500 + PieceType::CANNON.value()));
        assert!(!pos.see_ge(m, 500 + PieceType::CANNON.value() + 1));
    }

    #[test]
    fn test_see_quiet_move_not_negative() {
        let pos = make_position("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
        let m = find_move(&pos, "e2e3");
        assert!(pos.see_ge(m, 0));
        assert!(!pos.see_ge(m, 1));
    }
}
