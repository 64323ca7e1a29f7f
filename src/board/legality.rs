//! Move legality and check detection.

use super::attack_tables::{
    aligned, attacks_bb, between_bb, leaper_attacks_bb, pawn_attacks_bb, pseudo_attacks_bb,
    rook_attacks,
};
use super::betza;
use super::movegen::{generate, GenType};
use super::state::Position;
use super::types::{Bitboard, GamePhase, Move, MoveType, PieceType, Square};

impl Position {
    /// Decide whether a pseudo-legal move leaves the own king unchecked.
    #[must_use]
    pub fn legal(&self, m: Move) -> bool {
        debug_assert!(m.is_ok());

        // Setup-phase moves never touch the board.
        if m.is_setup() {
            debug_assert!(m.gating_type() != PieceType::NONE);
            return true;
        }

        let us = self.side_to_move;
        let from = m.from();
        let to = m.to();
        let ksq = self.king_square(us);

        debug_assert_eq!(self.moved_piece(m).color(), us);

        // En passant is rare enough to just replay the occupancy and
        // test whether the king is attacked afterwards.
        if m.move_type() == MoveType::EnPassant {
            let capsq = to.offset(-us.pawn_push());
            let occupied = (self.pieces() ^ from ^ capsq) | to;

            debug_assert_eq!(to, self.ep_square());
            debug_assert!(self.empty(to));

            return (self.attackers_to_occ(ksq, occupied) & self.pieces_c(!us) & occupied)
                .is_empty();
        }

        // For king moves, test the destination with the king itself
        // lifted off the board so slider rays extend through it.
        // Castling legality is established during generation.
        if self.piece_on(from).piece_type() == PieceType::KING {
            return m.move_type() == MoveType::Castling
                || (self.attackers_to_occ(to, self.pieces() ^ from) & self.pieces_c(!us))
                    .is_empty();
        }

        // Anything else is legal unless it is pinned and leaves the line
        // to the king open.
        (self.blockers_for_king(us) & from).is_empty()
            || (self.attackers_to_occ(ksq, (self.pieces() ^ from) | to)
                & self.pieces_c(!us)
                & !Bitboard::from_square(to))
                .is_empty()
    }

    /// Screen a move from an untrusted source (transposition table, GUI)
    /// against the current position.
    #[must_use]
    pub fn pseudo_legal(&self, m: Move) -> bool {
        let us = self.side_to_move;
        let from = m.from();
        let to = m.to();
        let pc = self.moved_piece(m);

        // Uncommon kinds go through the slow but simple path.
        if m.move_type() != MoveType::Normal {
            return generate(self, GenType::Legal).contains(m);
        }

        // A normal move can not be legal during the setup phases.
        if self.game_phase() != GamePhase::Playing {
            return false;
        }

        // Not a promotion, so the payload must be empty.
        if m.payload() != PieceType::NONE {
            return false;
        }

        if pc.is_none() || pc.color() != us {
            return false;
        }

        if (self.pieces_c(us) & to).any() {
            return false;
        }

        if pc.piece_type() == PieceType::PAWN {
            // Promotions were handled above, so the destination cannot
            // be on the last rank.
            if to.relative_rank(us) == 7 {
                return false;
            }

            let push = us.pawn_push();
            let capture_ok = (pawn_attacks_bb(us, from) & self.pieces_c(!us) & to).any();
            let single_ok = from.offset(push) == to && self.empty(to);
            let double_ok = from.offset(2 * push) == to
                && from.relative_rank(us) == 1
                && self.empty(to)
                && self.empty(to.offset(-push));
            if !capture_ok && !single_ok && !double_ok {
                return false;
            }
        } else {
            let attacks = if pc.piece_type().is_custom() {
                betza::attacks(pc.piece_type(), from, self.pieces(), !self.empty(to))
            } else {
                self.attacks_from(us, pc.piece_type(), from)
            };
            if !(attacks & to).any() {
                return false;
            }
        }

        // While in check, only moves the evasion generator would emit
        // are acceptable; `legal` relies on this.
        if self.checkers().any() {
            if pc.piece_type() != PieceType::KING {
                if self.checkers().more_than_one() {
                    return false;
                }

                let checksq = self.checkers().lsb();
                let ksq = self.king_square(us);
                let leaper_check =
                    (leaper_attacks_bb(!us, self.piece_on(checksq).piece_type(), checksq) & ksq)
                        .any();
                if leaper_check {
                    // A leaper check cannot be blocked.
                    if to != checksq {
                        return false;
                    }
                } else if !((between_bb(checksq, ksq) | self.checkers()) & to).any() {
                    return false;
                }
            } else if (self.attackers_to_occ(to, self.pieces() ^ from) & self.pieces_c(!us)).any()
            {
                return false;
            }
        }

        true
    }

    /// Test whether a pseudo-legal move gives check.
    #[must_use]
    pub fn gives_check(&self, m: Move) -> bool {
        debug_assert!(m.is_ok());

        // There are no checks during the setup phases.
        if self.game_phase() != GamePhase::Playing || m.is_setup() {
            return false;
        }

        debug_assert_eq!(self.moved_piece(m).color(), self.side_to_move);

        let us = self.side_to_move;
        let them = !us;
        let from = m.from();
        let to = m.to();
        let ksq = self.king_square(them);

        // Direct check?
        if (self.check_squares(self.piece_on(from).piece_type()) & to).any() {
            return true;
        }

        // Discovered check? A piece may also leap over a slider, so the
        // alignment shortcut is backed by a full occupancy recompute.
        if (self.blockers_for_king(them) & from).any()
            && (!aligned(from, to, ksq)
                || (self.attackers_to_occ(ksq, self.pieces() ^ from ^ to) & self.pieces_c(us))
                    .any())
        {
            return true;
        }

        // Check by the piece gated in behind the mover?
        if self.gates().contains(from)
            && (attacks_bb(us, self.gating_piece_on(from), from, self.pieces() ^ to) & ksq).any()
        {
            return true;
        }

        if m.is_promotion() {
            return (attacks_bb(us, m.promotion_type(), to, self.pieces() ^ from) & ksq).any();
        }

        match m.move_type() {
            MoveType::Normal => false,

            // The remaining en-passant case is a discovered check
            // through the captured pawn.
            MoveType::EnPassant => {
                let capsq = Square::new(from.rank(), to.file());
                let occupied = (self.pieces() ^ from ^ capsq) | to;
                (self.attackers_to_occ(ksq, occupied) & self.pieces_c(us) & occupied).any()
            }

            MoveType::Castling => {
                let kfrom = from;
                let rfrom = to; // castling is encoded as "king captures rook"
                let king_side = rfrom > kfrom;
                let kto = Square::new(us.back_rank(), if king_side { 6 } else { 2 });
                let rto = Square::new(us.back_rank(), if king_side { 5 } else { 3 });

                // Check by a piece gated in on the rook square?
                if self.gates().contains(rfrom)
                    && (attacks_bb(
                        us,
                        self.gating_piece_on(rfrom),
                        rfrom,
                        self.pieces() ^ kfrom ^ kto ^ rto,
                    ) & ksq)
                        .any()
                {
                    return true;
                }

                (pseudo_attacks_bb(us, PieceType::ROOK, rto) & ksq).any()
                    && (rook_attacks(rto, (self.pieces() ^ kfrom ^ rfrom) | rto | kto) & ksq)
                        .any()
            }

            _ => false,
        }
    }
}
