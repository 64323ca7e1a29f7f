mod attack_tables;
mod betza;
mod debug;
mod error;
mod fen;
mod legality;
mod make_unmake;
mod movegen;
mod psqt;
mod repetition;
mod see;
mod state;
pub(crate) mod types;

#[cfg(test)]
mod tests;

pub use error::{FenError, MoveParseError, SquareError};
pub use fen::START_FEN;
pub use movegen::{generate, generate_legal, GenType};
pub use psqt::Score;
pub use state::{nodes_visited, Position, StateInfo};
pub use types::{
    distance, Bitboard, CastlingRight, Color, Gate, GamePhase, Move, MoveList, MoveType, Piece,
    PieceType, Square,
};
