//! Selection, placement and gating-event tests.

use crate::board::{
    generate, generate_legal, Color, GamePhase, Gate, GenType, Move, MoveType, Piece, PieceType,
    Position, Square,
};

fn select(pt: PieceType) -> Move {
    Move::make(MoveType::SetGatingType, Square::A1, Square::A1, pt)
}

fn find_move(pos: &Position, uci: &str) -> Move {
    pos.parse_move(uci).expect("move should be legal")
}

#[test]
fn test_fresh_game_starts_in_selection() {
    let pos = Position::musketeer_start();
    assert!(pos.is_musketeer());
    assert_eq!(pos.game_phase(), GamePhase::Selection);

    let moves = generate(&pos, GenType::Legal);
    assert_eq!(moves.len(), 10);
    for &m in moves.iter() {
        assert_eq!(m.move_type(), MoveType::SetGatingType);
        assert!(m.gating_type().is_gating());
    }
    // The capture set is empty during setup.
    assert!(generate(&pos, GenType::Captures).is_empty());
}

#[test]
fn test_orthodox_position_skips_setup_phases() {
    let pos = Position::startpos();
    assert!(!pos.is_musketeer());
    assert_eq!(pos.game_phase(), GamePhase::Playing);
    assert_eq!(generate_legal(&pos).len(), 20);
}

#[test]
fn test_two_distinct_selections_reach_placement() {
    let mut pos = Position::musketeer_start();
    pos.do_move(select(PieceType::UNICORN));
    assert_eq!(pos.game_phase(), GamePhase::Selection);
    pos.do_move(select(PieceType::HAWK));

    assert_eq!(pos.gating_piece(Gate::G1), PieceType::UNICORN);
    assert_eq!(pos.gating_piece(Gate::G2), PieceType::HAWK);
    assert_eq!(pos.game_phase(), GamePhase::Placing);

    // The next placement offers the first catalogued type on every
    // first-rank square.
    let moves = generate(&pos, GenType::Legal);
    assert_eq!(moves.len(), 8);
    for &m in moves.iter() {
        assert_eq!(m.move_type(), MoveType::PutGatingPiece);
        assert_eq!(m.gating_type(), PieceType::UNICORN);
        assert_eq!(m.to().rank(), 0);
    }
}

#[test]
fn test_duplicate_selection_installs_fallback_pair() {
    let mut pos = Position::musketeer_start();
    let initial_key = pos.key();

    pos.do_move(select(PieceType::UNICORN));
    let after_first = pos.key();

    // Picking the same type again replaces the selection with the
    // cannon/leopard pair.
    pos.do_move(select(PieceType::UNICORN));
    assert_eq!(pos.gate_count(), Gate::G2);
    assert_eq!(pos.gating_piece(Gate::G1), PieceType::CANNON);
    assert_eq!(pos.gating_piece(Gate::G2), PieceType::LEOPARD);
    assert_eq!(pos.key(), pos.compute_key());

    // One undo per selection move restores the catalog step by step.
    pos.undo_move(select(PieceType::UNICORN));
    assert_eq!(pos.gate_count(), Gate::G1);
    assert_eq!(pos.gating_piece(Gate::G1), PieceType::UNICORN);
    assert_eq!(pos.key(), after_first);

    pos.undo_move(select(PieceType::UNICORN));
    assert_eq!(pos.gate_count(), Gate::NONE);
    assert_eq!(pos.gating_piece(Gate::G1), PieceType::NONE);
    assert_eq!(pos.key(), initial_key);
}

#[test]
fn test_placement_round_and_phase_transitions() {
    let mut pos = Position::musketeer_start();
    pos.do_move(select(PieceType::CANNON));
    pos.do_move(select(PieceType::DRAGON));

    // White and Black alternate placing their two gating pieces.
    let placements = ["b1", "b8", "g1", "g8"];
    for (i, sq) in placements.iter().enumerate() {
        assert_eq!(pos.game_phase(), GamePhase::Placing);
        let moves = generate(&pos, GenType::Legal);
        let m = moves
            .iter()
            .copied()
            .find(|m| m.to().to_string() == *sq)
            .expect("placement available");
        pos.do_move(m);
        assert_eq!(pos.gates().popcount(), i as u32 + 1);
        assert_eq!(pos.key(), pos.compute_key());
    }

    assert_eq!(pos.game_phase(), GamePhase::Playing);
    assert_eq!(pos.setup_count(Color::White), Gate::G2);
    assert_eq!(pos.setup_count(Color::Black), Gate::G2);
    assert_eq!(pos.gating_square(Color::White, Gate::G1), Square::B1);
    assert!(pos.gates().contains(Square::B1));

    // Gates sit underneath the back-rank pieces; the board itself is
    // still the classical array.
    assert_eq!(
        pos.piece_on(Square::B1),
        Piece::new(Color::White, PieceType::KNIGHT)
    );
}

#[test]
fn test_placement_king_rook_exclusion() {
    let mut pos = Position::musketeer_start();
    pos.do_move(select(PieceType::CANNON));
    pos.do_move(select(PieceType::DRAGON));

    // White gates the king square first.
    let moves = generate(&pos, GenType::Legal);
    let m = moves
        .iter()
        .copied()
        .find(|m| m.to() == Square::E1)
        .expect("king square placement");
    pos.do_move(m);

    // Black places anywhere.
    let m = generate(&pos, GenType::Legal)[0];
    pos.do_move(m);

    // With the king square gated, rook squares are no longer legal
    // gates for White: 8 squares minus e1, a1 and h1.
    let moves = generate(&pos, GenType::Legal);
    assert_eq!(moves.len(), 5);
    for &m in moves.iter() {
        assert_ne!(m.to(), Square::A1);
        assert_ne!(m.to(), Square::H1);
        assert_ne!(m.to(), Square::E1);
    }
}

#[test]
fn test_gate_releases_when_square_vacated() {
    let mut pos = Position::from_fen(
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR[CbLgcblg] w KQkq - 0 1",
    );
    assert_eq!(pos.game_phase(), GamePhase::Playing);
    assert!(pos.gates().contains(Square::B1));

    let before_key = pos.key();
    let before_fen = pos.fen();

    // Moving the knight off b1 gates the cannon in.
    let m = find_move(&pos, "b1c3");
    pos.do_move(m);

    assert_eq!(
        pos.piece_on(Square::B1),
        Piece::new(Color::White, PieceType::CANNON)
    );
    assert!(!pos.gates().contains(Square::B1));
    assert_eq!(pos.gating_square(Color::White, Gate::G1), Square::NONE);
    assert_eq!(pos.key(), pos.compute_key());
    assert!(pos.pos_is_ok_full());

    // Undo restores the gate exactly.
    pos.undo_move(m);
    assert!(pos.gates().contains(Square::B1));
    assert!(pos.piece_on(Square::B1).piece_type() == PieceType::KNIGHT);
    assert_eq!(pos.gating_square(Color::White, Gate::G1), Square::B1);
    assert_eq!(pos.key(), before_key);
    assert_eq!(pos.fen(), before_fen);
}

#[test]
fn test_capture_on_gate_square_takes_both() {
    let mut pos = Position::from_fen("r3k3/8/8/8/8/8/8/R3K3[CaLecale] b - - 0 1");
    assert!(pos.gates().contains(Square::A1));

    let before_key = pos.key();
    let before_fen = pos.fen();

    let m = find_move(&pos, "a8a1");
    pos.do_move(m);

    // Both the rook and the waiting cannon are gone.
    assert_eq!(
        pos.piece_on(Square::A1),
        Piece::new(Color::Black, PieceType::ROOK)
    );
    assert!(!pos.gates().contains(Square::A1));
    assert_eq!(pos.captured_piece(), Piece::new(Color::White, PieceType::ROOK));
    assert_eq!(pos.st().captured_gate, Gate::G1);
    assert_eq!(pos.count(Color::White, PieceType::CANNON), 0);
    assert_eq!(pos.key(), pos.compute_key());

    // Undo restores piece and gate.
    pos.undo_move(m);
    assert_eq!(
        pos.piece_on(Square::A1),
        Piece::new(Color::White, PieceType::ROOK)
    );
    assert!(pos.gates().contains(Square::A1));
    assert_eq!(pos.gating_square(Color::White, Gate::G1), Square::A1);
    assert_eq!(pos.key(), before_key);
    assert_eq!(pos.fen(), before_fen);
}

#[test]
fn test_castling_releases_gate_on_king_square() {
    let mut pos = Position::from_fen("r3k3/8/8/8/8/8/8/R3K2R[CeLhcale] w K - 0 1");
    assert!(pos.gates().contains(Square::E1));

    let before_fen = pos.fen();
    let m = find_move(&pos, "e1g1");
    assert_eq!(m.move_type(), MoveType::Castling);
    pos.do_move(m);

    // The cannon gates in on the vacated king square.
    assert_eq!(
        pos.piece_on(Square::E1),
        Piece::new(Color::White, PieceType::CANNON)
    );
    assert_eq!(pos.piece_on(Square::G1), Piece::new(Color::White, PieceType::KING));
    assert_eq!(pos.piece_on(Square::F1), Piece::new(Color::White, PieceType::ROOK));
    assert_eq!(pos.key(), pos.compute_key());

    pos.undo_move(m);
    assert_eq!(pos.fen(), before_fen);
    assert!(pos.gates().contains(Square::E1));
}

#[test]
fn test_promotion_to_catalogued_gating_type() {
    let mut pos =
        Position::from_fen("4k3/P7/8/8/8/8/8/4K3[C-D-c-d-] w - - 0 1");
    assert_eq!(pos.game_phase(), GamePhase::Playing);

    let moves = generate_legal(&pos);
    let promos: Vec<Move> = moves
        .iter()
        .copied()
        .filter(|m| m.is_promotion())
        .collect();
    // Queen, rook, bishop, knight plus the two catalogued types.
    assert_eq!(promos.len(), 6);
    assert!(promos
        .iter()
        .any(|m| m.promotion_type() == PieceType::DRAGON));

    let m = promos
        .iter()
        .copied()
        .find(|m| m.promotion_type() == PieceType::CANNON)
        .unwrap();
    let before_fen = pos.fen();
    pos.do_move(m);
    assert_eq!(
        pos.piece_on(Square::new(7, 0)),
        Piece::new(Color::White, PieceType::CANNON)
    );
    assert_eq!(pos.key(), pos.compute_key());
    pos.undo_move(m);
    assert_eq!(pos.fen(), before_fen);
}

#[test]
fn test_gated_piece_gives_check() {
    // The knight vacates b1 and the dragon gated in behind it checks
    // the enemy king straight up the b-file; the knight itself gives no
    // check from a3.
    let mut pos = Position::from_fen("8/8/1k6/8/8/8/8/1N2K3[DbLgdbl-] w - - 0 1");
    let m = find_move(&pos, "b1a3");
    assert!(pos.gives_check(m));
    pos.do_move(m);
    assert!(pos.checkers().any());
    assert!(pos.checkers().contains(Square::B1));
    assert_eq!(
        pos.piece_on(Square::B1),
        Piece::new(Color::White, PieceType::DRAGON)
    );
    pos.undo_move(m);
    assert!(pos.gates().contains(Square::B1));
}

#[test]
fn test_moved_piece_for_setup_moves() {
    let pos = Position::musketeer_start();
    let m = select(PieceType::SPIDER);
    assert_eq!(
        pos.moved_piece(m),
        Piece::new(Color::White, PieceType::SPIDER)
    );
}
