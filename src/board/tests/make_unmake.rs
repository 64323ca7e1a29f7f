//! Do/undo reversibility and hash consistency.

use crate::board::psqt::Score;
use crate::board::{generate_legal, Bitboard, Move, Position};
use rand::prelude::*;

/// Everything do/undo must leave bit-identical; the piece list's
/// interior order is explicitly exempt.
#[derive(PartialEq, Eq, Debug)]
struct Snapshot {
    fen: String,
    key: u64,
    pawn_key: u64,
    material_key: u64,
    psq: Score,
    non_pawn_material: [i32; 2],
    castling_rights: u8,
    rule50: i32,
    gate_bb: Bitboard,
    piece_count: [u8; 64],
    gate_count: u8,
}

fn snapshot(pos: &Position) -> Snapshot {
    Snapshot {
        fen: pos.fen(),
        key: pos.key(),
        pawn_key: pos.pawn_key(),
        material_key: pos.material_key(),
        psq: pos.psq_score(),
        non_pawn_material: [
            pos.non_pawn_material(crate::board::Color::White),
            pos.non_pawn_material(crate::board::Color::Black),
        ],
        castling_rights: pos.st().castling_rights,
        rule50: pos.rule50_count(),
        gate_bb: pos.gates(),
        piece_count: pos.piece_count,
        gate_count: pos.gate_count().index() as u8,
    }
}

fn find_move(pos: &Position, uci: &str) -> Move {
    pos.parse_move(uci).expect("move should be legal")
}

#[test]
fn test_en_passant_make_unmake() {
    let mut pos =
        Position::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
    let before = snapshot(&pos);
    let m = find_move(&pos, "e5f6");
    pos.do_move(m);
    assert!(pos.pos_is_ok_full());
    pos.undo_move(m);
    assert_eq!(snapshot(&pos), before);
}

#[test]
fn test_promotion_make_unmake() {
    let mut pos = Position::from_fen("8/P7/8/8/8/8/8/K1k5 w - - 0 1");
    let before = snapshot(&pos);
    let m = find_move(&pos, "a7a8q");
    pos.do_move(m);
    assert!(pos.pos_is_ok_full());
    pos.undo_move(m);
    assert_eq!(snapshot(&pos), before);
}

#[test]
fn test_castling_make_unmake() {
    let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    for uci in ["e1g1", "e1c1"] {
        let before = snapshot(&pos);
        let m = find_move(&pos, uci);
        pos.do_move(m);
        assert!(pos.pos_is_ok_full());
        pos.undo_move(m);
        assert_eq!(snapshot(&pos), before);
    }
}

#[test]
fn test_capture_make_unmake_restores_everything_but_list_order() {
    let mut pos = Position::from_fen(
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    );
    let before = snapshot(&pos);
    let m = find_move(&pos, "e5g6"); // NxP
    pos.do_move(m);
    pos.undo_move(m);
    assert_eq!(snapshot(&pos), before);
}

#[test]
fn test_null_move_make_unmake_restores_hash_and_ep() {
    let mut pos =
        Position::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
    let original_hash = pos.key();
    let original_ep = pos.ep_square();
    let original_side = pos.side_to_move();

    pos.do_null_move();
    assert!(!pos.ep_square().is_ok());
    assert_ne!(pos.key(), original_hash);
    assert_ne!(pos.side_to_move(), original_side);
    assert_eq!(pos.key(), pos.compute_key());

    pos.undo_null_move();
    assert_eq!(pos.key(), original_hash);
    assert_eq!(pos.ep_square(), original_ep);
    assert_eq!(pos.side_to_move(), original_side);
}

#[test]
fn test_null_move_preserves_castling_rights() {
    let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    let original = pos.st().castling_rights;
    pos.do_null_move();
    assert_eq!(pos.st().castling_rights, original);
    pos.undo_null_move();
    assert_eq!(pos.st().castling_rights, original);
}

#[test]
fn test_legal_moves_stable_after_make_unmake() {
    let mut pos = Position::startpos();
    let initial_moves = generate_legal(&pos);
    let mut initial_list: Vec<String> = initial_moves.iter().map(Move::to_string).collect();
    initial_list.sort();

    for &m in initial_moves.iter() {
        pos.do_move(m);
        pos.undo_move(m);
    }

    let after_moves = generate_legal(&pos);
    let mut after_list: Vec<String> = after_moves.iter().map(Move::to_string).collect();
    after_list.sort();

    assert_eq!(initial_list, after_list);
}

#[test]
fn test_hash_matches_recompute_after_random_moves() {
    let mut pos = Position::startpos();
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let mut history: Vec<Move> = Vec::new();

    for _ in 0..80 {
        let moves = generate_legal(&pos);
        if moves.is_empty() {
            break;
        }
        let m = moves[rng.gen_range(0..moves.len())];
        pos.do_move(m);
        history.push(m);

        assert_eq!(pos.key(), pos.compute_key());
        assert!(pos.pos_is_ok_full());
    }

    while let Some(m) = history.pop() {
        pos.undo_move(m);
        assert_eq!(pos.key(), pos.compute_key());
    }
}

#[test]
fn test_random_playout_round_trip_state() {
    let mut pos = Position::startpos();
    let before = snapshot(&pos);

    let mut rng = StdRng::seed_from_u64(0x5EED);
    let mut history: Vec<Move> = Vec::new();

    for _ in 0..200 {
        let moves = generate_legal(&pos);
        if moves.is_empty() {
            break;
        }
        let m = moves[rng.gen_range(0..moves.len())];
        pos.do_move(m);
        history.push(m);
    }

    while let Some(m) = history.pop() {
        pos.undo_move(m);
    }
    assert_eq!(snapshot(&pos), before);
}

#[test]
fn test_key_after_matches_do_move_for_normal_moves() {
    let mut pos = Position::from_fen(
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    );
    // Knight retreat and a capture: neither touches castling rights or
    // creates an en-passant square, so the speculative key is exact.
    for uci in ["c3b1", "e5g6"] {
        let m = find_move(&pos, uci);
        let predicted = pos.key_after(m);
        pos.do_move(m);
        assert_eq!(predicted, pos.key());
        pos.undo_move(m);
    }
}

#[test]
fn test_nodes_counter_increments() {
    let before = crate::board::nodes_visited();
    let mut pos = Position::startpos();
    let m = find_move(&pos, "e2e4");
    pos.do_move(m);
    assert!(crate::board::nodes_visited() > before);
}
