//! Board-state and move-generation core for a Musketeer-style gating
//! chess variant.
//!
//! The variant extends classical chess with a gating mechanism: before
//! the game each side agrees on extra piece types and places them on
//! first-rank home squares; a gating piece enters the board when its
//! square is first vacated, and can be captured while still waiting
//! there. A limited catalog of Betza-notation custom pieces is also
//! supported.
//!
//! The crate provides the position object with its undo stack and
//! incremental Zobrist hashing, the bitboard attack infrastructure
//! (magic bitboards included), the pseudo-legal move generator with its
//! legality filter, static exchange evaluation, and repetition/cycle
//! detection. Search, evaluation and protocol handling are deliberately
//! out of scope.
//!
//! # Quick Start
//!
//! ```
//! use musketeer_core::board::{generate_legal, Position};
//!
//! // Orthodox chess from the classical starting position.
//! let mut pos = Position::startpos();
//! assert_eq!(generate_legal(&pos).len(), 20);
//!
//! let m = pos.parse_move("e2e4").unwrap();
//! pos.do_move(m);
//! pos.undo_move(m);
//! assert_eq!(pos.fen(), musketeer_core::board::START_FEN);
//! ```
//!
//! # Variant games
//!
//! ```
//! use musketeer_core::board::{generate, GamePhase, GenType, Position};
//!
//! // A fresh variant game starts with the gating-type selection phase.
//! let pos = Position::musketeer_start();
//! assert_eq!(pos.game_phase(), GamePhase::Selection);
//! assert_eq!(generate(&pos, GenType::Legal).len(), 10);
//! ```

// Enable pedantic lints with sensible domain-specific exceptions
#![warn(clippy::pedantic)]
// Bitboard hex literals are clearer without separators (bit patterns visible)
#![allow(clippy::unreadable_literal)]
// Chess engines have intentionally similar names (pawn_key/material_key, etc.)
#![allow(clippy::similar_names)]
// Index casts are ubiquitous and safe here (board indices, square indices)
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
// Large arrays are needed for move lists and attack tables
#![allow(clippy::large_stack_arrays)]
// Module-level documentation is sufficient for this codebase
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod board;
pub mod zobrist;
