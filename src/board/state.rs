//! Position representation and state stack.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::zobrist::ZOBRIST;

use super::attack_tables::{attacks_bb, between_bb, PASSED_PAWN_MASK};
use super::psqt::{Score, PSQ, PSQ_GATE};
use super::types::{
    Bitboard, CastlingRight, Color, Gate, GamePhase, Move, MoveType, Piece, PieceType, Square,
    RANK_1, RANK_8, WHITE_OO, WHITE_OOO,
};

/// Global node counter, bumped once per `do_move` on any position.
static NODES: AtomicU64 = AtomicU64::new(0);

/// Total number of moves made across all positions since program start.
#[must_use]
pub fn nodes_visited() -> u64 {
    NODES.load(Ordering::Relaxed)
}

pub(crate) fn count_node() {
    NODES.fetch_add(1, Ordering::Relaxed);
}

/// Everything needed to restore a `Position` when one move is retracted.
///
/// The first group is copied forward by `do_move` and updated
/// incrementally; the second group is recomputed for every move.
#[derive(Clone)]
pub struct StateInfo {
    pub(crate) pawn_key: u64,
    pub(crate) material_key: u64,
    pub(crate) non_pawn_material: [i32; Color::NB],
    pub(crate) castling_rights: u8,
    pub(crate) rule50: i32,
    pub(crate) plies_from_null: i32,
    pub(crate) psq: Score,
    pub(crate) ep_square: Square,

    pub(crate) key: u64,
    pub(crate) checkers_bb: Bitboard,
    pub(crate) captured_piece: Piece,
    pub(crate) gate: Gate,
    pub(crate) captured_gate: Gate,
    pub(crate) removed_gating_type: PieceType,
    pub(crate) blockers_for_king: [Bitboard; Color::NB],
    pub(crate) pinners: [Bitboard; Color::NB],
    pub(crate) check_squares: [Bitboard; PieceType::NB],
}

impl StateInfo {
    pub(crate) fn new() -> StateInfo {
        StateInfo {
            pawn_key: 0,
            material_key: 0,
            non_pawn_material: [0; Color::NB],
            castling_rights: 0,
            rule50: 0,
            plies_from_null: 0,
            psq: Score::ZERO,
            ep_square: Square::NONE,
            key: 0,
            checkers_bb: Bitboard::EMPTY,
            captured_piece: Piece::NONE,
            gate: Gate::NONE,
            captured_gate: Gate::NONE,
            removed_gating_type: PieceType::NONE,
            blockers_for_king: [Bitboard::EMPTY; Color::NB],
            pinners: [Bitboard::EMPTY; Color::NB],
            check_squares: [Bitboard::EMPTY; PieceType::NB],
        }
    }
}

/// Board state for the gating variant.
///
/// A position owns its undo stack: `do_move` pushes a `StateInfo`,
/// `undo_move` pops exactly that record. Positions are never copied
/// implicitly; use FEN round-trips to duplicate one.
pub struct Position {
    pub(crate) board: [Piece; 64],
    /// Slot 0 holds the union of all pieces.
    pub(crate) by_type_bb: [Bitboard; PieceType::NB],
    pub(crate) by_color_bb: [Bitboard; Color::NB],
    pub(crate) piece_count: [u8; Piece::NB],
    pub(crate) piece_list: [[Square; 16]; Piece::NB],
    pub(crate) index: [u8; 64],

    pub(crate) gate_board: [Gate; 64],
    pub(crate) gating_pieces: [PieceType; Gate::NB],
    pub(crate) gating_squares: [[Square; Gate::NB]; Color::NB],
    pub(crate) gate_bb: Bitboard,
    pub(crate) gate_count: Gate,
    pub(crate) setup_count: [Gate; Color::NB],

    pub(crate) castling_rights_mask: [u8; 64],
    pub(crate) castling_rook_square: [Square; 4],
    pub(crate) castling_path: [Bitboard; 4],

    pub(crate) game_ply: i32,
    pub(crate) side_to_move: Color,
    pub(crate) chess960: bool,
    pub(crate) musketeer: bool,

    pub(crate) states: Vec<StateInfo>,
}

impl Position {
    /// A blank position with an empty board and a fresh root state.
    pub(crate) fn blank() -> Position {
        Position {
            board: [Piece::NONE; 64],
            by_type_bb: [Bitboard::EMPTY; PieceType::NB],
            by_color_bb: [Bitboard::EMPTY; Color::NB],
            piece_count: [0; Piece::NB],
            piece_list: [[Square::NONE; 16]; Piece::NB],
            index: [0; 64],
            gate_board: [Gate::NONE; 64],
            gating_pieces: [PieceType::NONE; Gate::NB],
            gating_squares: [[Square::NONE; Gate::NB]; Color::NB],
            gate_bb: Bitboard::EMPTY,
            gate_count: Gate::NONE,
            setup_count: [Gate::NONE; Color::NB],
            castling_rights_mask: [0; 64],
            castling_rook_square: [Square::NONE; 4],
            castling_path: [Bitboard::EMPTY; 4],
            game_ply: 0,
            side_to_move: Color::White,
            chess960: false,
            musketeer: false,
            states: {
                // Keep do_move off the allocator for any realistic
                // search depth.
                let mut states = Vec::with_capacity(256);
                states.push(StateInfo::new());
                states
            },
        }
    }

    #[inline]
    pub(crate) fn st(&self) -> &StateInfo {
        self.states.last().unwrap()
    }

    #[inline]
    pub(crate) fn st_mut(&mut self) -> &mut StateInfo {
        self.states.last_mut().unwrap()
    }

    // --- Read-side API ---

    #[inline]
    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// All occupied squares.
    #[inline]
    #[must_use]
    pub fn pieces(&self) -> Bitboard {
        self.by_type_bb[0]
    }

    #[inline]
    #[must_use]
    pub fn pieces_t(&self, pt: PieceType) -> Bitboard {
        self.by_type_bb[pt.index()]
    }

    #[inline]
    #[must_use]
    pub fn pieces_tt(&self, pt1: PieceType, pt2: PieceType) -> Bitboard {
        self.by_type_bb[pt1.index()] | self.by_type_bb[pt2.index()]
    }

    #[inline]
    #[must_use]
    pub fn pieces_c(&self, c: Color) -> Bitboard {
        self.by_color_bb[c.index()]
    }

    #[inline]
    #[must_use]
    pub fn pieces_ct(&self, c: Color, pt: PieceType) -> Bitboard {
        self.by_color_bb[c.index()] & self.by_type_bb[pt.index()]
    }

    #[inline]
    #[must_use]
    pub fn pieces_ctt(&self, c: Color, pt1: PieceType, pt2: PieceType) -> Bitboard {
        self.by_color_bb[c.index()] & self.pieces_tt(pt1, pt2)
    }

    #[inline]
    #[must_use]
    pub fn piece_on(&self, s: Square) -> Piece {
        self.board[s.index()]
    }

    #[inline]
    #[must_use]
    pub fn empty(&self, s: Square) -> bool {
        self.board[s.index()].is_none()
    }

    #[inline]
    #[must_use]
    pub fn count(&self, c: Color, pt: PieceType) -> usize {
        self.piece_count[Piece::new(c, pt).index()] as usize
    }

    /// The squares of all pieces of one kind, in list order.
    #[inline]
    #[must_use]
    pub fn squares(&self, c: Color, pt: PieceType) -> &[Square] {
        let pc = Piece::new(c, pt);
        &self.piece_list[pc.index()][..self.piece_count[pc.index()] as usize]
    }

    /// The king square of a color; exactly one king per side exists.
    #[inline]
    #[must_use]
    pub fn king_square(&self, c: Color) -> Square {
        debug_assert_eq!(self.count(c, PieceType::KING), 1);
        self.piece_list[Piece::new(c, PieceType::KING).index()][0]
    }

    #[inline]
    #[must_use]
    pub fn ep_square(&self) -> Square {
        self.st().ep_square
    }

    #[inline]
    #[must_use]
    pub fn key(&self) -> u64 {
        self.st().key
    }

    #[inline]
    #[must_use]
    pub fn pawn_key(&self) -> u64 {
        self.st().pawn_key
    }

    #[inline]
    #[must_use]
    pub fn material_key(&self) -> u64 {
        self.st().material_key
    }

    #[inline]
    #[must_use]
    pub fn psq_score(&self) -> Score {
        self.st().psq
    }

    #[inline]
    #[must_use]
    pub fn non_pawn_material(&self, c: Color) -> i32 {
        self.st().non_pawn_material[c.index()]
    }

    #[inline]
    #[must_use]
    pub fn rule50_count(&self) -> i32 {
        self.st().rule50
    }

    #[inline]
    #[must_use]
    pub fn game_ply(&self) -> i32 {
        self.game_ply
    }

    #[inline]
    #[must_use]
    pub fn is_chess960(&self) -> bool {
        self.chess960
    }

    /// Whether the gating variant is active for this game.
    #[inline]
    #[must_use]
    pub fn is_musketeer(&self) -> bool {
        self.musketeer
    }

    // --- Gating state ---

    /// Squares currently hosting an unreleased gating piece.
    #[inline]
    #[must_use]
    pub fn gates(&self) -> Bitboard {
        self.gate_bb
    }

    /// The piece type agreed for a gate slot.
    #[inline]
    #[must_use]
    pub fn gating_piece(&self, gate: Gate) -> PieceType {
        self.gating_pieces[gate.index()]
    }

    /// The gating type sitting on a gate square.
    #[inline]
    #[must_use]
    pub fn gating_piece_on(&self, s: Square) -> PieceType {
        debug_assert!(self.gate_bb.contains(s));
        self.gating_piece(self.gate_board[s.index()])
    }

    /// The home square of a gate, `Square::NONE` once released or taken.
    #[inline]
    #[must_use]
    pub fn gating_square(&self, c: Color, gate: Gate) -> Square {
        self.gating_squares[c.index()][gate.index()]
    }

    #[inline]
    #[must_use]
    pub fn gate_count(&self) -> Gate {
        self.gate_count
    }

    #[inline]
    #[must_use]
    pub fn setup_count(&self, c: Color) -> Gate {
        self.setup_count[c.index()]
    }

    /// The phase is derived from the gating counters: both slots must be
    /// agreed, then the side to move must have placed its pieces. Without
    /// the variant flag the game is always in normal play.
    #[must_use]
    pub fn game_phase(&self) -> GamePhase {
        if !self.musketeer {
            GamePhase::Playing
        } else if self.gate_count.index() < Gate::NB - 1 {
            GamePhase::Selection
        } else if self.setup_count[self.side_to_move.index()].index() < Gate::NB - 1 {
            GamePhase::Placing
        } else {
            GamePhase::Playing
        }
    }

    // --- Castling ---

    #[inline]
    #[must_use]
    pub fn can_castle(&self, cr: CastlingRight) -> bool {
        self.st().castling_rights & cr.0 != 0
    }

    #[inline]
    #[must_use]
    pub fn can_castle_any(&self, c: Color) -> bool {
        self.st().castling_rights & ((WHITE_OO | WHITE_OOO) << (2 * c.index() as u8)) != 0
    }

    #[inline]
    #[must_use]
    pub fn castling_impeded(&self, cr: CastlingRight) -> bool {
        (self.pieces() & self.castling_path[cr.index()]).any()
    }

    #[inline]
    #[must_use]
    pub fn castling_rook_square(&self, cr: CastlingRight) -> Square {
        self.castling_rook_square[cr.index()]
    }

    // --- Checking info ---

    /// Opponent pieces currently giving check to the side to move.
    #[inline]
    #[must_use]
    pub fn checkers(&self) -> Bitboard {
        self.st().checkers_bb
    }

    /// Pieces whose removal would expose `c`'s king to a slider.
    #[inline]
    #[must_use]
    pub fn blockers_for_king(&self, c: Color) -> Bitboard {
        self.st().blockers_for_king[c.index()]
    }

    #[inline]
    #[must_use]
    pub fn pinners(&self, c: Color) -> Bitboard {
        self.st().pinners[c.index()]
    }

    /// Squares from which a piece of the given type would check the enemy
    /// king.
    #[inline]
    #[must_use]
    pub fn check_squares(&self, pt: PieceType) -> Bitboard {
        self.st().check_squares[pt.index()]
    }

    // --- Attacks ---

    /// All pieces of both colors attacking a square under the current
    /// occupancy.
    #[inline]
    #[must_use]
    pub fn attackers_to(&self, s: Square) -> Bitboard {
        self.attackers_to_occ(s, self.pieces())
    }

    /// All pieces of both colors attacking a square under the given
    /// occupancy.
    #[must_use]
    pub fn attackers_to_occ(&self, s: Square, occupied: Bitboard) -> Bitboard {
        let mut attackers = Bitboard::EMPTY;
        for c in Color::BOTH {
            for idx in 1..PieceType::NB {
                let pt = PieceType::from_index(idx);
                let candidates = self.pieces_ct(c, pt);
                if candidates.is_empty() {
                    continue;
                }
                attackers |= attacks_bb(!c, pt, s, occupied) & candidates;
            }
        }
        attackers
    }

    /// Attack set of a piece of `c` and type `pt` standing on `s`, using
    /// the current occupancy.
    #[inline]
    #[must_use]
    pub fn attacks_from(&self, c: Color, pt: PieceType, s: Square) -> Bitboard {
        attacks_bb(c, pt, s, self.pieces())
    }

    /// Pieces of both colors that block `sliders`' attacks to `s`,
    /// together with the subset of sliders pinning them. A blocker of the
    /// same color as the piece on `s` is pinned; one of the slider's
    /// color hides a discovered attack.
    #[must_use]
    pub fn slider_blockers(&self, sliders: Bitboard, s: Square) -> (Bitboard, Bitboard) {
        let mut blockers = Bitboard::EMPTY;
        let mut pinners = Bitboard::EMPTY;

        // Snipers attack s only once some piece is out of the way.
        let snipers =
            sliders & self.attackers_to_occ(s, Bitboard::EMPTY) & !self.attackers_to(s);

        for sniper in snipers.iter() {
            let b = between_bb(s, sniper) & self.pieces();
            if b.any() && !b.more_than_one() {
                blockers |= b;
                if (b & self.pieces_c(self.piece_on(s).color())).any() {
                    pinners |= sniper;
                }
            }
        }
        (blockers, pinners)
    }

    // --- Move properties ---

    /// The piece a move would put in motion; for setup moves this is the
    /// gating piece being selected or placed.
    #[inline]
    #[must_use]
    pub fn moved_piece(&self, m: Move) -> Piece {
        if m.is_setup() {
            Piece::new(self.side_to_move, m.gating_type())
        } else {
            self.piece_on(m.from())
        }
    }

    /// Returns true if the move takes an enemy piece. Castling is encoded
    /// as "king captures rook" and never counts.
    #[inline]
    #[must_use]
    pub fn capture(&self, m: Move) -> bool {
        (!self.empty(m.to()) && m.move_type() != MoveType::Castling)
            || m.move_type() == MoveType::EnPassant
    }

    #[inline]
    #[must_use]
    pub fn capture_or_promotion(&self, m: Move) -> bool {
        if m.move_type() == MoveType::Normal {
            !self.empty(m.to())
        } else {
            m.move_type() != MoveType::Castling && !m.is_setup()
        }
    }

    /// The piece taken by the last move, if any.
    #[inline]
    #[must_use]
    pub fn captured_piece(&self) -> Piece {
        self.st().captured_piece
    }

    /// True for a pawn move landing beyond its fourth rank.
    #[inline]
    #[must_use]
    pub fn advanced_pawn_push(&self, m: Move) -> bool {
        self.moved_piece(m).piece_type() == PieceType::PAWN
            && m.from().relative_rank(self.side_to_move) > 3
    }

    /// True when no enemy pawn can stop or capture the pawn on `s`.
    #[inline]
    #[must_use]
    pub fn pawn_passed(&self, c: Color, s: Square) -> bool {
        (self.pieces_ct(!c, PieceType::PAWN) & PASSED_PAWN_MASK[c.index()][s.index()]).is_empty()
    }

    #[must_use]
    pub fn opposite_bishops(&self) -> bool {
        self.count(Color::White, PieceType::BISHOP) == 1
            && self.count(Color::Black, PieceType::BISHOP) == 1
            && {
                let wb = self.squares(Color::White, PieceType::BISHOP)[0];
                let bb = self.squares(Color::Black, PieceType::BISHOP)[0];
                Bitboard::LIGHT_SQUARES.contains(wb) != Bitboard::LIGHT_SQUARES.contains(bb)
            }
    }

    /// The hash key after a normal move, for speculative prefetch.
    /// Special moves are not recognized.
    #[must_use]
    pub fn key_after(&self, m: Move) -> u64 {
        let from = m.from();
        let to = m.to();
        let pc = self.piece_on(from);
        let captured = self.piece_on(to);
        let mut k = self.st().key ^ ZOBRIST.side;

        if !captured.is_none() {
            k ^= ZOBRIST.psq[captured.index()][to.index()];
        }
        k ^ ZOBRIST.psq[pc.index()][to.index()] ^ ZOBRIST.psq[pc.index()][from.index()]
    }

    // --- Board bookkeeping ---

    pub(crate) fn put_piece(&mut self, pc: Piece, s: Square) {
        self.board[s.index()] = pc;
        self.by_type_bb[0] |= s;
        self.by_type_bb[pc.piece_type().index()] |= s;
        self.by_color_bb[pc.color().index()] |= s;
        self.index[s.index()] = self.piece_count[pc.index()];
        self.piece_list[pc.index()][self.index[s.index()] as usize] = s;
        self.piece_count[pc.index()] += 1;
    }

    /// Remove a piece. The piece list is a multiset: the last entry is
    /// swapped into the vacated slot, so list order is not preserved
    /// across a capture plus undo.
    pub(crate) fn remove_piece(&mut self, pc: Piece, s: Square) {
        self.by_type_bb[0] ^= s;
        self.by_type_bb[pc.piece_type().index()] ^= s;
        self.by_color_bb[pc.color().index()] ^= s;
        self.board[s.index()] = Piece::NONE;

        self.piece_count[pc.index()] -= 1;
        let last = self.piece_list[pc.index()][self.piece_count[pc.index()] as usize];
        self.index[last.index()] = self.index[s.index()];
        self.piece_list[pc.index()][self.index[last.index()] as usize] = last;
        self.piece_list[pc.index()][self.piece_count[pc.index()] as usize] = Square::NONE;
    }

    pub(crate) fn move_piece(&mut self, pc: Piece, from: Square, to: Square) {
        let from_to = Bitboard::from_square(from) ^ Bitboard::from_square(to);
        self.by_type_bb[0] ^= from_to;
        self.by_type_bb[pc.piece_type().index()] ^= from_to;
        self.by_color_bb[pc.color().index()] ^= from_to;
        self.board[from.index()] = Piece::NONE;
        self.board[to.index()] = pc;
        self.index[to.index()] = self.index[from.index()];
        self.piece_list[pc.index()][self.index[to.index()] as usize] = to;
    }

    // --- Gate bookkeeping ---

    pub(crate) fn set_gating_type(&mut self, pt: PieceType) {
        debug_assert!(self.gate_count.index() < Gate::NB - 1);
        self.gate_count = self.gate_count.next();
        self.gating_pieces[self.gate_count.index()] = pt;
    }

    pub(crate) fn unset_gating_type(&mut self) {
        debug_assert!(self.gate_count > Gate::NONE);
        self.gating_pieces[self.gate_count.index()] = PieceType::NONE;
        self.gate_count = self.gate_count.prev();
    }

    pub(crate) fn add_gate(&mut self, c: Color, s: Square, gate: Gate) {
        debug_assert!(gate > Gate::NONE && gate.index() < Gate::NB);
        debug_assert!(!self.gate_bb.contains(s));
        debug_assert_eq!(self.gate_board[s.index()], Gate::NONE);
        self.gate_board[s.index()] = gate;
        self.gating_squares[c.index()][gate.index()] = s;
        self.gate_bb |= s;
    }

    pub(crate) fn remove_gate(&mut self, c: Color, s: Square, gate: Gate) {
        debug_assert!(gate > Gate::NONE && gate.index() < Gate::NB);
        debug_assert!(self.gate_bb.contains(s));
        debug_assert!(self.gate_board[s.index()] > Gate::NONE);
        self.gate_board[s.index()] = Gate::NONE;
        self.gating_squares[c.index()][gate.index()] = Square::NONE;
        self.gate_bb ^= s;
    }

    pub(crate) fn put_gating_piece(&mut self, c: Color, s: Square) {
        self.setup_count[c.index()] = self.setup_count[c.index()].next();
        self.add_gate(c, s, self.setup_count[c.index()]);
    }

    pub(crate) fn remove_gating_piece(&mut self, c: Color, s: Square) {
        self.remove_gate(c, s, self.setup_count[c.index()]);
        self.setup_count[c.index()] = self.setup_count[c.index()].prev();
    }

    /// Take the gating piece on `s` off the board, remembering which gate
    /// fell so undo can restore it.
    pub(crate) fn capture_gate(&mut self, c: Color, s: Square) {
        let gate = self.gate_board[s.index()];
        debug_assert!(self.gating_pieces[gate.index()] > PieceType::NONE);
        self.st_mut().captured_gate = gate;
        self.remove_gate(c, s, gate);
    }

    pub(crate) fn uncapture_gate(&mut self, c: Color, s: Square) {
        debug_assert!(!self.board[s.index()].is_none());
        let gate = self.st().captured_gate;
        self.add_gate(c, s, gate);
    }

    /// Release the gating piece on `s` onto the board: the square was
    /// just vacated by its owner, so the gating piece materializes there.
    pub(crate) fn gate_piece(&mut self, c: Color, s: Square) {
        let gate = self.gate_board[s.index()];
        debug_assert!(self.gating_pieces[gate.index()] > PieceType::NONE);
        debug_assert!(self.board[s.index()].is_none());
        self.st_mut().gate = gate;
        self.put_piece(Piece::new(c, self.gating_pieces[gate.index()]), s);
        self.remove_gate(c, s, gate);
    }

    pub(crate) fn ungate_piece(&mut self, c: Color, s: Square) {
        debug_assert!(!self.board[s.index()].is_none());
        let gate = self.st().gate;
        debug_assert_eq!(
            self.gating_pieces[gate.index()],
            self.board[s.index()].piece_type()
        );
        self.add_gate(c, s, gate);
        self.remove_piece(Piece::new(c, self.gating_pieces[gate.index()]), s);
    }

    // --- State computation ---

    /// King attack info for fast check detection by `gives_check`.
    pub(crate) fn set_check_info(&mut self) {
        let (white_blockers, black_pinners) =
            self.slider_blockers(self.pieces_c(Color::Black), self.king_square(Color::White));
        let (black_blockers, white_pinners) =
            self.slider_blockers(self.pieces_c(Color::White), self.king_square(Color::Black));

        let them = !self.side_to_move;
        let ksq = self.king_square(them);
        let mut check_squares = [Bitboard::EMPTY; PieceType::NB];
        for idx in 1..PieceType::NB {
            let pt = PieceType::from_index(idx);
            if pt != PieceType::KING {
                check_squares[idx] = self.attacks_from(them, pt, ksq);
            }
        }

        let st = self.st_mut();
        st.blockers_for_king[Color::White.index()] = white_blockers;
        st.blockers_for_king[Color::Black.index()] = black_blockers;
        st.pinners[Color::White.index()] = white_pinners;
        st.pinners[Color::Black.index()] = black_pinners;
        st.check_squares = check_squares;
    }

    /// The position key recomputed from scratch; `do_move` keeps the
    /// incremental key equal to this at all times.
    pub(crate) fn compute_key(&self) -> u64 {
        let mut key = 0u64;

        for s in self.pieces().iter() {
            key ^= ZOBRIST.psq[self.piece_on(s).index()][s.index()];
        }

        for g in 1..=self.gate_count.index() {
            key ^= ZOBRIST.inhand[self.gating_pieces[g].index()][g];
        }

        for c in Color::BOTH {
            for g in 1..=self.setup_count[c.index()].index() {
                let s = self.gating_squares[c.index()][g];
                if s.is_ok() {
                    let pc = Piece::new(c, self.gating_pieces[g]);
                    key ^= ZOBRIST.psq_gate[pc.index()][s.file()];
                }
            }
        }

        if self.st().ep_square.is_ok() {
            key ^= ZOBRIST.enpassant[self.st().ep_square.file()];
        }
        if self.side_to_move == Color::Black {
            key ^= ZOBRIST.side;
        }
        key ^ ZOBRIST.castling[self.st().castling_rights as usize]
    }

    /// Compute from scratch the state fields that `do_move` otherwise
    /// maintains incrementally. Used on position setup and by the debug
    /// consistency check.
    pub(crate) fn set_state(&mut self) {
        let key = self.compute_key();

        let mut pawn_key = ZOBRIST.no_pawns;
        for s in self.pieces_t(PieceType::PAWN).iter() {
            pawn_key ^= ZOBRIST.psq[self.piece_on(s).index()][s.index()];
        }

        let mut material_key = 0u64;
        let mut non_pawn_material = [0i32; Color::NB];
        for c in Color::BOTH {
            for idx in 1..PieceType::NB {
                let pt = PieceType::from_index(idx);
                let pc = Piece::new(c, pt);
                let cnt = self.piece_count[pc.index()] as usize;
                if pt != PieceType::PAWN && pt != PieceType::KING {
                    non_pawn_material[c.index()] += cnt as i32 * pt.value();
                }
                for n in 0..cnt {
                    material_key ^= ZOBRIST.psq[pc.index()][n];
                }
            }
        }

        let mut psq = Score::ZERO;
        for s in self.pieces().iter() {
            psq += PSQ[self.piece_on(s).index()][s.index()];
        }
        for c in Color::BOTH {
            for g in 1..=self.setup_count[c.index()].index() {
                let s = self.gating_squares[c.index()][g];
                if s.is_ok() {
                    psq += PSQ_GATE[Piece::new(c, self.gating_pieces[g]).index()][s.file()];
                }
            }
        }

        let checkers =
            self.attackers_to(self.king_square(self.side_to_move)) & self.pieces_c(!self.side_to_move);

        let st = self.st_mut();
        st.key = key;
        st.pawn_key = pawn_key;
        st.material_key = material_key;
        st.non_pawn_material = non_pawn_material;
        st.psq = psq;
        st.checkers_bb = checkers;

        self.set_check_info();
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n +---+---+---+---+---+---+---+---+")?;
        for rank in (0..8).rev() {
            for file in 0..8 {
                write!(f, " | {}", self.piece_on(Square::new(rank, file)))?;
            }
            writeln!(f, " |\n +---+---+---+---+---+---+---+---+")?;
        }
        writeln!(f, "\nFen: {}", self.fen())?;
        write!(f, "Key: {:016X}\nCheckers:", self.key())?;
        for s in self.checkers().iter() {
            write!(f, " {s}")?;
        }
        writeln!(f)
    }
}

pub(crate) fn back_rank_bb(c: Color) -> Bitboard {
    match c {
        Color::White => Bitboard::rank_mask(RANK_1 as usize),
        Color::Black => Bitboard::rank_mask(RANK_8 as usize),
    }
}
