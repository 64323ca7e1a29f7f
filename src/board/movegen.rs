//! Pseudo-legal move generation.
//!
//! Generation is parameterized by a mode tag. During the variant's setup
//! phases the quiet modes produce selection and placement moves instead
//! of board moves; in normal play the playing-phase generators run. The
//! union of `Captures` and `Quiets` equals `NonEvasions`, and every mode
//! produces each move exactly once.

use super::attack_tables::{
    attacks_bb, between_bb, file_bb, leaper_attacks_bb, pawn_attacks_bb, pseudo_attacks_bb,
};
use super::betza;
use super::state::{back_rank_bb, Position};
use super::types::{
    Bitboard, CastlingRight, Color, Direction, Gate, GamePhase, Move, MoveList, MoveType,
    PieceType, Square, EAST, NORTH_EAST, NORTH_WEST, SOUTH_EAST, SOUTH_WEST, WEST,
};

/// Generation mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenType {
    /// Captures and queen promotions.
    Captures,
    /// Non-captures and underpromotions.
    Quiets,
    /// Non-captures giving direct or discovered check.
    QuietChecks,
    /// Moves resolving a check; only valid while in check.
    Evasions,
    /// All pseudo-legal moves while not in check.
    NonEvasions,
    /// Gating-type selection moves.
    Selections,
    /// Gating-piece placement moves.
    Placements,
    /// Fully legal moves.
    Legal,
}

/// Generate the mode-specific move set into a fresh list.
#[must_use]
pub fn generate(pos: &Position, gen: GenType) -> MoveList {
    let mut list = MoveList::new();
    match gen {
        GenType::Captures | GenType::Quiets | GenType::NonEvasions => {
            debug_assert!(pos.checkers().is_empty());

            if pos.game_phase() != GamePhase::Playing {
                // Setup moves count as quiet; the capture set is empty.
                if gen != GenType::Captures {
                    if pos.game_phase() == GamePhase::Selection {
                        generate_selections(&mut list);
                    } else {
                        generate_placements(pos, &mut list);
                    }
                }
                return list;
            }

            let us = pos.side_to_move();
            let target = match gen {
                GenType::Captures => pos.pieces_c(!us),
                GenType::Quiets => !pos.pieces(),
                _ => !pos.pieces_c(us),
            };
            generate_all(pos, &mut list, us, target, gen);
            list
        }

        GenType::QuietChecks => {
            if pos.game_phase() != GamePhase::Playing {
                return list;
            }
            debug_assert!(pos.checkers().is_empty());

            let us = pos.side_to_move();
            let ksq = pos.king_square(!us);

            // Discovered-check candidates first; pawns are handled
            // together with the direct checks below.
            let dc = pos.blockers_for_king(!us) & pos.pieces_c(us);
            for from in dc.iter() {
                let pt = pos.piece_on(from).piece_type();
                if pt == PieceType::PAWN {
                    continue;
                }
                let attacks = if pt.is_custom() {
                    betza::attacks(pt, from, pos.pieces(), false)
                } else {
                    pos.attacks_from(us, pt, from)
                };
                let mut b = attacks & !pos.pieces();
                if pt == PieceType::KING {
                    b &= !pseudo_attacks_bb(!us, PieceType::QUEEN, ksq);
                }
                for to in b.iter() {
                    list.push(Move::new(from, to));
                }
            }

            generate_all(pos, &mut list, us, !pos.pieces(), GenType::QuietChecks);
            list
        }

        GenType::Evasions => {
            if pos.game_phase() != GamePhase::Playing {
                return list;
            }
            debug_assert!(pos.checkers().any());

            let us = pos.side_to_move();
            let ksq = pos.king_square(us);

            // Squares attacked by slider checkers are removed from the
            // king's escapes up front, skipping known-illegal moves.
            let mut slider_attacks = Bitboard::EMPTY;
            for checksq in pos.checkers().iter() {
                slider_attacks |= attacks_bb(
                    !us,
                    pos.piece_on(checksq).piece_type(),
                    checksq,
                    pos.pieces() ^ ksq,
                );
            }

            let b = pos.attacks_from(us, PieceType::KING, ksq)
                & !pos.pieces_c(us)
                & !slider_attacks;
            for to in b.iter() {
                list.push(Move::new(ksq, to));
            }

            // Double check: only the king can move.
            if pos.checkers().more_than_one() {
                return list;
            }

            // Block the check or capture the checker. Leaper checks
            // cannot be blocked.
            let checksq = pos.checkers().lsb();
            let mut target = between_bb(checksq, ksq) | checksq;
            if (leaper_attacks_bb(!us, pos.piece_on(checksq).piece_type(), checksq) & ksq).any()
            {
                target = Bitboard::from_square(checksq);
            }

            generate_all(pos, &mut list, us, target, GenType::Evasions);
            list
        }

        GenType::Selections => {
            generate_selections(&mut list);
            list
        }

        GenType::Placements => {
            generate_placements(pos, &mut list);
            list
        }

        GenType::Legal => generate_legal(pos),
    }
}

/// Generate all legal moves: the pseudo-legal set with king-safety
/// offenders filtered out.
#[must_use]
pub fn generate_legal(pos: &Position) -> MoveList {
    let us = pos.side_to_move();
    let pinned = pos.blockers_for_king(us) & pos.pieces_c(us);
    let ksq = pos.king_square(us);

    let mut list = if pos.checkers().any() {
        generate(pos, GenType::Evasions)
    } else {
        generate(pos, GenType::NonEvasions)
    };

    // Only pinned pieces, king moves and en passant can turn out
    // illegal here.
    let mut i = 0;
    while i < list.len() {
        let m = list[i];
        if (pinned.any() || m.from() == ksq || m.move_type() == MoveType::EnPassant)
            && !pos.legal(m)
        {
            list.swap_remove(i);
        } else {
            i += 1;
        }
    }
    list
}

/// One selection move per musketeer piece type.
fn generate_selections(list: &mut MoveList) {
    for pt in PieceType::GATING {
        list.push(Move::make(MoveType::SetGatingType, Square::A1, Square::A1, pt));
    }
}

/// One placement move per gate-free first-rank square. King and rook
/// squares are mutually exclusive as gates.
fn generate_placements(pos: &Position, list: &mut MoveList) {
    let us = pos.side_to_move();
    debug_assert!(pos.setup_count(us).index() < Gate::NB - 1);

    let mut b = back_rank_bb(us) & !pos.gates();
    if (pos.pieces_ct(us, PieceType::KING) & pos.gates()).any() {
        b &= !pos.pieces_ct(us, PieceType::ROOK);
    } else if (pos.pieces_ct(us, PieceType::ROOK) & pos.gates()).any() {
        b &= !pos.pieces_ct(us, PieceType::KING);
    }

    let pt = pos.gating_piece(pos.setup_count(us).next());
    for to in b.iter() {
        list.push(Move::make(MoveType::PutGatingPiece, Square::A1, to, pt));
    }
}

fn generate_all(pos: &Position, list: &mut MoveList, us: Color, target: Bitboard, gen: GenType) {
    let checks = gen == GenType::QuietChecks;

    generate_pawn_moves(pos, list, us, target, gen);

    for idx in PieceType::KNIGHT.index()..PieceType::KING.index() {
        generate_piece_moves(pos, list, us, PieceType::from_index(idx), target, checks);
    }
    for idx in PieceType::CUSTOM_1.index()..=PieceType::CUSTOM_9.index() {
        generate_custom_moves(pos, list, us, PieceType::from_index(idx), target, checks);
    }

    if !checks && gen != GenType::Evasions {
        let ksq = pos.king_square(us);
        let b = pos.attacks_from(us, PieceType::KING, ksq) & target;
        for to in b.iter() {
            list.push(Move::new(ksq, to));
        }
    }

    if gen != GenType::Captures && gen != GenType::Evasions && pos.can_castle_any(us) {
        for king_side in [true, false] {
            generate_castling(pos, list, us, CastlingRight::new(us, king_side), checks);
        }
    }
}

fn generate_piece_moves(
    pos: &Position,
    list: &mut MoveList,
    us: Color,
    pt: PieceType,
    target: Bitboard,
    checks: bool,
) {
    for &from in pos.squares(us, pt) {
        // Discovered checks were generated already.
        if checks && (pos.blockers_for_king(!us) & from).any() {
            continue;
        }

        let mut b = pos.attacks_from(us, pt, from) & target;
        if checks {
            b &= pos.check_squares(pt);
        }
        for to in b.iter() {
            list.push(Move::new(from, to));
        }
    }
}

fn generate_custom_moves(
    pos: &Position,
    list: &mut MoveList,
    us: Color,
    pt: PieceType,
    target: Bitboard,
    checks: bool,
) {
    if pos.pieces_ct(us, pt).is_empty() {
        return;
    }

    for &from in pos.squares(us, pt) {
        if checks && (pos.blockers_for_king(!us) & from).any() {
            continue;
        }

        // Quiet and capture sub-patterns have separate polarities.
        let quiets = betza::attacks(pt, from, pos.pieces(), false) & !pos.pieces();
        let captures = betza::attacks(pt, from, pos.pieces(), true) & pos.pieces_c(!us);
        let mut b = (quiets | captures) & target;
        if checks {
            b &= pos.check_squares(pt);
        }
        for to in b.iter() {
            list.push(Move::new(from, to));
        }
    }
}

fn generate_castling(
    pos: &Position,
    list: &mut MoveList,
    us: Color,
    cr: CastlingRight,
    checks: bool,
) {
    if pos.castling_impeded(cr) || !pos.can_castle(cr) {
        return;
    }

    // The king and rook end on the same squares as in standard chess.
    let kfrom = pos.king_square(us);
    let rfrom = pos.castling_rook_square(cr);
    let kto = Square::new(us.back_rank(), if cr.king_side() { 6 } else { 2 });
    let enemies = pos.pieces_c(!us);

    debug_assert!(pos.checkers().is_empty());

    let step: Direction = if kto > kfrom { WEST } else { EAST };
    let mut s = kto;
    while s != kfrom {
        if (pos.attackers_to(s) & enemies).any() {
            return;
        }
        s = s.offset(step);
    }

    // In Chess960 the rook leaving its square may discover an attack on
    // the king's destination.
    if pos.is_chess960()
        && (pos.attackers_to_occ(kto, pos.pieces() ^ rfrom) & enemies).any()
    {
        return;
    }

    let m = Move::make(MoveType::Castling, kfrom, rfrom, PieceType::NONE);
    if checks && !pos.gives_check(m) {
        return;
    }
    list.push(m);
}

fn shift_up(us: Color, b: Bitboard) -> Bitboard {
    match us {
        Color::White => b.shift_north(),
        Color::Black => b.shift_south(),
    }
}

fn shift_up_east(us: Color, b: Bitboard) -> Bitboard {
    match us {
        Color::White => b.shift_north_east(),
        Color::Black => b.shift_south_west(),
    }
}

fn shift_up_west(us: Color, b: Bitboard) -> Bitboard {
    match us {
        Color::White => b.shift_north_west(),
        Color::Black => b.shift_south_east(),
    }
}

fn make_promotions(
    pos: &Position,
    list: &mut MoveList,
    gen: GenType,
    ty: MoveType,
    from: Square,
    to: Square,
    us: Color,
    ksq: Square,
) {
    if matches!(gen, GenType::Captures | GenType::Evasions | GenType::NonEvasions) {
        list.push(Move::make(ty, from, to, PieceType::QUEEN));
    }

    if matches!(gen, GenType::Quiets | GenType::Evasions | GenType::NonEvasions) {
        list.push(Move::make(ty, from, to, PieceType::ROOK));
        list.push(Move::make(ty, from, to, PieceType::BISHOP));
        list.push(Move::make(ty, from, to, PieceType::KNIGHT));
        // Promotion to each catalogued gating type as well.
        for g in 1..=pos.gate_count().index() {
            list.push(Move::make(ty, from, to, pos.gating_piece(Gate(g as u8))));
        }
    }

    // Knight promotion is the only promotion that can give a direct
    // check not already covered by the queen promotion.
    if gen == GenType::QuietChecks
        && (pseudo_attacks_bb(us, PieceType::KNIGHT, to) & ksq).any()
    {
        list.push(Move::make(ty, from, to, PieceType::KNIGHT));
    }
}

fn generate_pawn_moves(
    pos: &Position,
    list: &mut MoveList,
    us: Color,
    target: Bitboard,
    gen: GenType,
) {
    let them = !us;
    let up = us.pawn_push();
    let up_east: Direction = if us == Color::White { NORTH_EAST } else { SOUTH_WEST };
    let up_west: Direction = if us == Color::White { NORTH_WEST } else { SOUTH_EAST };

    let rank7 = match us {
        Color::White => Bitboard::RANK_7,
        Color::Black => Bitboard::RANK_2,
    };
    let rank3 = match us {
        Color::White => Bitboard::RANK_3,
        Color::Black => Bitboard::RANK_6,
    };
    let rank8 = match us {
        Color::White => Bitboard::RANK_8,
        Color::Black => Bitboard::RANK_1,
    };

    let pawns_on7 = pos.pieces_ct(us, PieceType::PAWN) & rank7;
    let pawns_not_on7 = pos.pieces_ct(us, PieceType::PAWN) & !rank7;

    let enemies = match gen {
        GenType::Evasions => pos.pieces_c(them) & target,
        GenType::Captures => target,
        _ => pos.pieces_c(them),
    };

    let mut empty_squares = Bitboard::EMPTY;

    // Single and double pushes, no promotions.
    if gen != GenType::Captures {
        empty_squares = if matches!(gen, GenType::Quiets | GenType::QuietChecks) {
            target
        } else {
            !pos.pieces()
        };

        let mut b1 = shift_up(us, pawns_not_on7) & empty_squares;
        let mut b2 = shift_up(us, b1 & rank3) & empty_squares;

        if gen == GenType::Evasions {
            // Consider only blocking squares.
            b1 &= target;
            b2 &= target;
        }

        if gen == GenType::QuietChecks {
            let ksq = pos.king_square(them);
            b1 &= pawn_attacks_bb(them, ksq);
            b2 &= pawn_attacks_bb(them, ksq);

            // Pawn pushes giving discovered check; possible only off the
            // enemy king's file since captures are not generated here.
            let dc_candidates = pos.blockers_for_king(them);
            if (pawns_not_on7 & dc_candidates).any() {
                let dc1 =
                    shift_up(us, pawns_not_on7 & dc_candidates) & empty_squares & !file_bb(ksq);
                let dc2 = shift_up(us, dc1 & rank3) & empty_squares;
                b1 |= dc1;
                b2 |= dc2;
            }
        }

        for to in b1.iter() {
            list.push(Move::new(to.offset(-up), to));
        }
        for to in b2.iter() {
            list.push(Move::new(to.offset(-2 * up), to));
        }
    }

    // Promotions and underpromotions.
    if pawns_on7.any() && (gen != GenType::Evasions || (target & rank8).any()) {
        if gen == GenType::Captures {
            empty_squares = !pos.pieces();
        }
        if gen == GenType::Evasions {
            empty_squares &= target;
        }

        let b1 = shift_up_east(us, pawns_on7) & enemies;
        let b2 = shift_up_west(us, pawns_on7) & enemies;
        let b3 = shift_up(us, pawns_on7) & empty_squares;
        let ksq = pos.king_square(them);

        for to in b1.iter() {
            make_promotions(pos, list, gen, MoveType::PromotionRight, to.offset(-up_east), to, us, ksq);
        }
        for to in b2.iter() {
            make_promotions(pos, list, gen, MoveType::PromotionLeft, to.offset(-up_west), to, us, ksq);
        }
        for to in b3.iter() {
            make_promotions(pos, list, gen, MoveType::PromotionStraight, to.offset(-up), to, us, ksq);
        }
    }

    // Standard and en-passant captures.
    if matches!(gen, GenType::Captures | GenType::Evasions | GenType::NonEvasions) {
        let b1 = shift_up_east(us, pawns_not_on7) & enemies;
        let b2 = shift_up_west(us, pawns_not_on7) & enemies;

        for to in b1.iter() {
            list.push(Move::new(to.offset(-up_east), to));
        }
        for to in b2.iter() {
            list.push(Move::new(to.offset(-up_west), to));
        }

        if pos.ep_square().is_ok() {
            debug_assert_eq!(pos.ep_square().relative_rank(us), 5);

            // An en-passant capture evades a check only when the checker
            // is the double-pushed pawn itself.
            if gen == GenType::Evasions && !(target & pos.ep_square().offset(-up)).any() {
                return;
            }

            let b = pawns_not_on7 & pawn_attacks_bb(them, pos.ep_square());
            for from in b.iter() {
                list.push(Move::make(
                    MoveType::EnPassant,
                    from,
                    pos.ep_square(),
                    PieceType::NONE,
                ));
            }
        }
    }
}

impl Position {
    /// Count leaf nodes of the legal move tree to the given depth.
    #[must_use]
    pub fn perft(&mut self, depth: usize) -> u64 {
        if depth == 0 {
            return 1;
        }

        let moves = generate_legal(self);
        if depth == 1 {
            return moves.len() as u64;
        }

        let mut nodes = 0;
        for &m in moves.iter() {
            self.do_move(m);
            nodes += self.perft(depth - 1);
            self.undo_move(m);
        }
        nodes
    }
}
