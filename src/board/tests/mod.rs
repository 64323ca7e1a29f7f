//! Board module tests.
//!
//! Tests are organized into separate files by category:
//! - `perft.rs` - move-generation node counts
//! - `draw.rs` - fifty-move rule, repetitions and upcoming cycles
//! - `make_unmake.rs` - do/undo reversibility and hash consistency
//! - `gating.rs` - the variant's selection, placement and gating events
//! - `fen.rs` - FEN round trips, gating encodings and flipping
//! - `movegen.rs` - generator mode invariants
//! - `proptest.rs` - property-based tests

mod gating;
mod make_unmake;
mod perft;
