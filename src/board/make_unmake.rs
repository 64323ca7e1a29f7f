//! Making and unmaking moves.
//!
//! `do_move` assumes the move is legal: pseudo-legal moves must pass the
//! legality filter first. Hash keys, psq and material are updated
//! incrementally; `undo_move` restores everything from the saved state
//! and never recomputes a hash.

use crate::zobrist::ZOBRIST;

use super::attack_tables::pawn_attacks_bb;
use super::psqt::{PSQ, PSQ_GATE};
use super::state::{count_node, Position, StateInfo};
use super::types::{Bitboard, Color, Gate, Move, MoveType, Piece, PieceType, Square};

impl Position {
    /// Make a move, computing the check hint internally.
    pub fn do_move(&mut self, m: Move) {
        let gives_check = self.gives_check(m);
        self.do_move_with_check(m, gives_check);
    }

    /// Make a move with a precomputed `gives_check` hint.
    pub fn do_move_with_check(&mut self, m: Move, gives_check: bool) {
        debug_assert!(m.is_ok());
        count_node();

        let mut k = self.st().key ^ ZOBRIST.side;

        // Copy the incrementally-updated prefix of the old state into a
        // fresh record and make it current.
        let prev = self.st();
        let mut new_st = StateInfo::new();
        new_st.pawn_key = prev.pawn_key;
        new_st.material_key = prev.material_key;
        new_st.non_pawn_material = prev.non_pawn_material;
        new_st.castling_rights = prev.castling_rights;
        new_st.rule50 = prev.rule50;
        new_st.plies_from_null = prev.plies_from_null;
        new_st.psq = prev.psq;
        new_st.ep_square = prev.ep_square;
        self.states.push(new_st);

        let us = self.side_to_move;
        let them = !us;

        match m.move_type() {
            MoveType::SetGatingType => {
                let pt = m.gating_type();
                let gc = self.gate_count;
                if gc == Gate::NONE || pt != self.gating_pieces[gc.index()] {
                    self.set_gating_type(pt);
                    k ^= ZOBRIST.inhand[pt.index()][self.gate_count.index()];
                } else {
                    // The same type was picked twice: the duplicated
                    // selection is replaced by the cannon/leopard pair,
                    // and the removed type is recorded for undo.
                    k ^= ZOBRIST.inhand[pt.index()][gc.index()]
                        ^ ZOBRIST.inhand[PieceType::CANNON.index()][gc.index()]
                        ^ ZOBRIST.inhand[PieceType::LEOPARD.index()][gc.index() + 1];
                    self.unset_gating_type();
                    self.set_gating_type(PieceType::CANNON);
                    self.set_gating_type(PieceType::LEOPARD);
                    self.st_mut().removed_gating_type = pt;
                }
            }
            MoveType::PutGatingPiece => {
                debug_assert_eq!(
                    m.gating_type(),
                    self.gating_pieces[self.setup_count[us.index()].index() + 1]
                );
                let to = m.to();
                self.put_gating_piece(us, to);
                let pc = Piece::new(us, m.gating_type());
                self.st_mut().psq += PSQ_GATE[pc.index()][to.file()];
                k ^= ZOBRIST.psq_gate[pc.index()][to.file()];
            }
            _ => {
                self.game_ply += 1;
                self.st_mut().rule50 += 1;
                self.st_mut().plies_from_null += 1;

                let from = m.from();
                let mut to = m.to();
                let pc = self.piece_on(from);
                let mut captured = if m.move_type() == MoveType::EnPassant {
                    Piece::new(them, PieceType::PAWN)
                } else {
                    self.piece_on(to)
                };

                debug_assert_eq!(pc.color(), us);
                debug_assert!(captured.piece_type() != PieceType::KING);

                if m.move_type() == MoveType::Castling {
                    debug_assert_eq!(pc, Piece::new(us, PieceType::KING));
                    debug_assert_eq!(captured, Piece::new(us, PieceType::ROOK));

                    let (kto, rfrom, rto) = self.do_castling_make(us, from, to, &mut k);
                    to = kto;

                    self.st_mut().psq +=
                        PSQ[captured.index()][rto.index()] - PSQ[captured.index()][rfrom.index()];
                    k ^= ZOBRIST.psq[captured.index()][rfrom.index()]
                        ^ ZOBRIST.psq[captured.index()][rto.index()];
                    captured = Piece::NONE;
                }

                if !captured.is_none() {
                    let mut capsq = to;

                    if captured.piece_type() == PieceType::PAWN {
                        if m.move_type() == MoveType::EnPassant {
                            capsq = capsq.offset(-us.pawn_push());

                            debug_assert_eq!(pc, Piece::new(us, PieceType::PAWN));
                            debug_assert_eq!(to, self.st().ep_square);
                            debug_assert_eq!(to.relative_rank(us), 5);
                            debug_assert!(self.empty(to));
                            debug_assert_eq!(
                                self.piece_on(capsq),
                                Piece::new(them, PieceType::PAWN)
                            );
                        }
                        self.st_mut().pawn_key ^= ZOBRIST.psq[captured.index()][capsq.index()];
                    } else {
                        self.st_mut().non_pawn_material[them.index()] -=
                            captured.piece_type().value();
                    }

                    self.remove_piece(captured, capsq);

                    // A capture on a gate square also takes the gate.
                    if self.gate_bb.contains(capsq) {
                        let gated = Piece::new(them, self.gating_piece_on(capsq));
                        self.st_mut().psq -= PSQ_GATE[gated.index()][capsq.file()];
                        k ^= ZOBRIST.psq_gate[gated.index()][capsq.file()];
                        self.capture_gate(them, capsq);
                    }

                    k ^= ZOBRIST.psq[captured.index()][capsq.index()];
                    let captured_count = self.piece_count[captured.index()] as usize;
                    self.st_mut().material_key ^= ZOBRIST.psq[captured.index()][captured_count];
                    self.st_mut().psq -= PSQ[captured.index()][capsq.index()];
                    self.st_mut().rule50 = 0;
                }

                k ^= ZOBRIST.psq[pc.index()][from.index()] ^ ZOBRIST.psq[pc.index()][to.index()];

                if self.st().ep_square.is_ok() {
                    k ^= ZOBRIST.enpassant[self.st().ep_square.file()];
                    self.st_mut().ep_square = Square::NONE;
                }

                let cr_mask = self.castling_rights_mask[from.index()]
                    | self.castling_rights_mask[to.index()];
                if self.st().castling_rights != 0 && cr_mask != 0 {
                    let cr = self.st().castling_rights & cr_mask;
                    k ^= ZOBRIST.castling[cr as usize];
                    self.st_mut().castling_rights &= !cr_mask;
                }

                // Move the piece; the tricky Chess960 castling was
                // handled above. Vacating a gate square releases its
                // gating piece onto the board.
                if m.move_type() != MoveType::Castling {
                    self.move_piece(pc, from, to);
                    if self.gate_bb.contains(from) {
                        let gated = Piece::new(us, self.gating_piece_on(from));
                        self.st_mut().psq +=
                            PSQ[gated.index()][from.index()] - PSQ_GATE[gated.index()][from.file()];
                        k ^= ZOBRIST.psq[gated.index()][from.index()]
                            ^ ZOBRIST.psq_gate[gated.index()][from.file()];
                        self.gate_piece(us, from);
                    }
                }

                if pc.piece_type() == PieceType::PAWN {
                    if (to.index() ^ from.index()) == 16 {
                        // Set the en-passant square only if the pushed
                        // pawn can actually be captured.
                        let ep = to.offset(-us.pawn_push());
                        if (pawn_attacks_bb(us, ep) & self.pieces_ct(them, PieceType::PAWN)).any()
                        {
                            self.st_mut().ep_square = ep;
                            k ^= ZOBRIST.enpassant[ep.file()];
                        }
                    } else if m.is_promotion() {
                        let promotion = Piece::new(us, m.promotion_type());

                        debug_assert_eq!(to.relative_rank(us), 7);
                        debug_assert!(promotion.piece_type() >= PieceType::KNIGHT);
                        debug_assert!(promotion.piece_type() != PieceType::KING);

                        self.remove_piece(pc, to);
                        self.put_piece(promotion, to);

                        k ^= ZOBRIST.psq[pc.index()][to.index()]
                            ^ ZOBRIST.psq[promotion.index()][to.index()];
                        self.st_mut().pawn_key ^= ZOBRIST.psq[pc.index()][to.index()];
                        let promo_count = self.piece_count[promotion.index()] as usize;
                        let pawn_count = self.piece_count[pc.index()] as usize;
                        self.st_mut().material_key ^= ZOBRIST.psq[promotion.index()]
                            [promo_count - 1]
                            ^ ZOBRIST.psq[pc.index()][pawn_count];

                        self.st_mut().psq +=
                            PSQ[promotion.index()][to.index()] - PSQ[pc.index()][to.index()];
                        self.st_mut().non_pawn_material[us.index()] +=
                            m.promotion_type().value();
                    }

                    self.st_mut().pawn_key ^=
                        ZOBRIST.psq[pc.index()][from.index()] ^ ZOBRIST.psq[pc.index()][to.index()];
                    self.st_mut().rule50 = 0;
                }

                self.st_mut().psq += PSQ[pc.index()][to.index()] - PSQ[pc.index()][from.index()];
                self.st_mut().captured_piece = captured;
            }
        }

        let checkers = if gives_check {
            self.attackers_to(self.king_square(them)) & self.pieces_c(us)
        } else {
            Bitboard::EMPTY
        };
        self.st_mut().checkers_bb = checkers;
        self.st_mut().key = k;
        self.side_to_move = them;
        self.set_check_info();

        debug_assert!(self.pos_is_ok());
    }

    /// Unmake a move, restoring the position to the exact state before
    /// the corresponding `do_move`.
    pub fn undo_move(&mut self, m: Move) {
        debug_assert!(m.is_ok());

        self.side_to_move = !self.side_to_move;
        let us = self.side_to_move;

        match m.move_type() {
            MoveType::SetGatingType => {
                self.unset_gating_type();
                let removed = self.st().removed_gating_type;
                if removed != PieceType::NONE {
                    // A duplicate pick installed the fallback pair;
                    // drop both and put the original selection back.
                    self.unset_gating_type();
                    self.set_gating_type(removed);
                }
            }
            MoveType::PutGatingPiece => {
                debug_assert_eq!(
                    m.gating_type(),
                    self.gating_pieces[self.setup_count[us.index()].index()]
                );
                self.remove_gating_piece(us, m.to());
            }
            _ => {
                let from = m.from();
                let to = m.to();
                let mut pc = self.piece_on(to);

                debug_assert!(
                    self.empty(from) || m.move_type() == MoveType::Castling || pc.color() == us
                );
                debug_assert!(self.st().captured_piece.piece_type() != PieceType::KING);

                if m.is_promotion() {
                    debug_assert_eq!(to.relative_rank(us), 7);
                    debug_assert_eq!(pc.piece_type(), m.promotion_type());

                    self.remove_piece(pc, to);
                    pc = Piece::new(us, PieceType::PAWN);
                    self.put_piece(pc, to);
                }

                if m.move_type() == MoveType::Castling {
                    self.do_castling_undo(us, from, to);
                } else {
                    // A piece on the origin square can only be the
                    // gating piece released by this move.
                    if (self.pieces() & from).any() {
                        self.ungate_piece(us, from);
                    }
                    self.move_piece(pc, to, from);

                    let captured = self.st().captured_piece;
                    if !captured.is_none() {
                        let mut capsq = to;
                        if m.move_type() == MoveType::EnPassant {
                            capsq = capsq.offset(-us.pawn_push());
                            debug_assert_eq!(pc.piece_type(), PieceType::PAWN);
                            debug_assert!(self.empty(capsq));
                            debug_assert_eq!(captured, Piece::new(!us, PieceType::PAWN));
                        }
                        self.put_piece(captured, capsq);
                        if self.st().captured_gate > Gate::NONE {
                            self.uncapture_gate(!us, capsq);
                        }
                    }
                }

                self.game_ply -= 1;
            }
        }

        self.states.pop();
        debug_assert!(self.pos_is_ok());
    }

    /// Do/undo helper for castling; tricky in Chess960 where the from and
    /// to squares can overlap.
    fn do_castling_make(
        &mut self,
        us: Color,
        from: Square,
        rfrom: Square,
        k: &mut u64,
    ) -> (Square, Square, Square) {
        let king_side = rfrom > from;
        let kto = Square::new(us.back_rank(), if king_side { 6 } else { 2 });
        let rto = Square::new(us.back_rank(), if king_side { 5 } else { 3 });

        // Remove both pieces first since squares could overlap.
        self.remove_piece(Piece::new(us, PieceType::KING), from);
        self.remove_piece(Piece::new(us, PieceType::ROOK), rfrom);
        self.put_piece(Piece::new(us, PieceType::KING), kto);
        self.put_piece(Piece::new(us, PieceType::ROOK), rto);

        if (self.gate_bb & (Bitboard::from_square(from) | rfrom)).any() {
            let s = if self.gate_bb.contains(from) { from } else { rfrom };
            let gated = Piece::new(us, self.gating_piece_on(s));
            if s != kto && s != rto {
                // The gate square came free: release the piece.
                self.st_mut().psq +=
                    PSQ[gated.index()][s.index()] - PSQ_GATE[gated.index()][s.file()];
                *k ^= ZOBRIST.psq[gated.index()][s.index()]
                    ^ ZOBRIST.psq_gate[gated.index()][s.file()];
                self.gate_piece(us, s);
            } else {
                // One of our own pieces re-occupies the gate square; the
                // gate is forfeited.
                self.st_mut().psq -= PSQ_GATE[gated.index()][s.file()];
                *k ^= ZOBRIST.psq_gate[gated.index()][s.file()];
                self.capture_gate(us, s);
            }
        }

        (kto, rfrom, rto)
    }

    fn do_castling_undo(&mut self, us: Color, from: Square, rfrom: Square) {
        let king_side = rfrom > from;
        let kto = Square::new(us.back_rank(), if king_side { 6 } else { 2 });
        let rto = Square::new(us.back_rank(), if king_side { 5 } else { 3 });

        if (self.pieces() & (Bitboard::from_square(from) | rfrom)).any() {
            let s = if (self.pieces() & from).any() { from } else { rfrom };
            if s != kto && s != rto {
                self.ungate_piece(us, s);
            } else if self.st().captured_gate > Gate::NONE {
                self.uncapture_gate(us, s);
            }
        }

        self.remove_piece(Piece::new(us, PieceType::KING), kto);
        self.remove_piece(Piece::new(us, PieceType::ROOK), rto);
        self.put_piece(Piece::new(us, PieceType::KING), from);
        self.put_piece(Piece::new(us, PieceType::ROOK), rfrom);
    }

    /// Flip the side to move without touching the board.
    pub fn do_null_move(&mut self) {
        debug_assert!(self.checkers().is_empty());

        let new_st = self.st().clone();
        self.states.push(new_st);

        if self.st().ep_square.is_ok() {
            let file = self.st().ep_square.file();
            self.st_mut().key ^= ZOBRIST.enpassant[file];
            self.st_mut().ep_square = Square::NONE;
        }
        self.st_mut().key ^= ZOBRIST.side;
        self.st_mut().rule50 += 1;
        self.st_mut().plies_from_null = 0;

        self.side_to_move = !self.side_to_move;
        self.set_check_info();

        debug_assert!(self.pos_is_ok());
    }

    pub fn undo_null_move(&mut self) {
        debug_assert!(self.checkers().is_empty());
        self.states.pop();
        self.side_to_move = !self.side_to_move;
    }
}
