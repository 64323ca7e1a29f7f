//! FEN input and output.
//!
//! The grammar extends classical FEN with the variant's piece letters
//! and two gating-piece encodings: a bracketed list appended to the
//! piece placement (`[CaLe...]`, each token a piece letter followed by a
//! home file, `-` for selected-but-unplaced or `?` mid-selection), and
//! an XBoard-style form that carries the gating pieces as extra `*` rows
//! above and below the board. Both are accepted on input; the bracketed
//! list is the canonical output. Castling accepts classical letters,
//! Shredder file letters and X-FEN mixes.

use std::str::FromStr;

use super::error::{FenError, MoveParseError};
use super::movegen::generate_legal;
use super::state::Position;
use super::types::{
    file_to_index, rank_to_index, CastlingRight, Color, Gate, Move, MoveType, Piece, PieceType,
    Square, EAST, WEST,
};

/// The classical starting position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Position {
    /// The classical starting position, gating disabled.
    #[must_use]
    pub fn startpos() -> Position {
        Position::from_fen(START_FEN)
    }

    /// A fresh variant game: the classical array, with the gating-type
    /// selection phase about to begin.
    #[must_use]
    pub fn musketeer_start() -> Position {
        Position::set(START_FEN, false, true).expect("start FEN is valid")
    }

    /// Parse a position from FEN. Gating data in the string switches the
    /// variant on; castling tokens outside `KQkq` switch Chess960 on.
    pub fn try_from_fen(fen: &str) -> Result<Position, FenError> {
        Position::set(fen, false, false)
    }

    /// Parse a position from FEN.
    ///
    /// # Panics
    /// Panics if the FEN string is invalid. Use `try_from_fen` for
    /// fallible parsing.
    #[must_use]
    pub fn from_fen(fen: &str) -> Position {
        Position::try_from_fen(fen).expect("Invalid FEN string")
    }

    /// Parse a position with explicit variant flags. The FEN is trusted
    /// to come from a conforming GUI: malformed input yields an error or
    /// a degenerate but internally consistent position.
    pub fn set(fen: &str, chess960: bool, musketeer: bool) -> Result<Position, FenError> {
        let mut pos = Position::blank();
        pos.chess960 = chess960;
        pos.musketeer = musketeer;

        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FenError::TooFewParts { found: parts.len() });
        }

        // 1. Piece placement, with either gating encoding.
        let placement = parts[0];
        if placement.contains('*') {
            pos.musketeer = true;
            parse_xboard_placement(&mut pos, placement)?;
        } else {
            let (board_part, gating_part) = match placement.find('[') {
                Some(i) => (&placement[..i], Some(&placement[i + 1..])),
                None => (placement, None),
            };
            let rows: Vec<&str> = board_part.split('/').collect();
            parse_board_rows(&mut pos, &rows)?;
            if let Some(gating) = gating_part {
                pos.musketeer = true;
                parse_gating_list(&mut pos, gating)?;
            }
        }

        if pos.count(Color::White, PieceType::KING) != 1
            || pos.count(Color::Black, PieceType::KING) != 1
        {
            return Err(FenError::MissingKing);
        }

        // 2. Active color.
        match parts[1] {
            "w" => pos.side_to_move = Color::White,
            "b" => pos.side_to_move = Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        }

        // 3. Castling availability: classical, Shredder or X-FEN.
        if parts[2].chars().any(|ch| !"KQkq-".contains(ch)) {
            pos.chess960 = true;
        }
        for ch in parts[2].chars() {
            if ch == '-' {
                continue;
            }
            let c = if ch.is_ascii_lowercase() {
                Color::Black
            } else {
                Color::White
            };
            let rook = Piece::new(c, PieceType::ROOK);
            let upper = ch.to_ascii_uppercase();

            let rsq = if upper == 'K' {
                let mut s = Square::new(c.back_rank(), 7);
                while pos.piece_on(s) != rook && s.file() > 0 {
                    s = s.offset(WEST);
                }
                s
            } else if upper == 'Q' {
                let mut s = Square::new(c.back_rank(), 0);
                while pos.piece_on(s) != rook && s.file() < 7 {
                    s = s.offset(EAST);
                }
                s
            } else if upper.is_ascii_uppercase() && ('A'..='H').contains(&upper) {
                Square::new(c.back_rank(), (upper as u8 - b'A') as usize)
            } else {
                return Err(FenError::InvalidCastling { char: ch });
            };

            if pos.piece_on(rsq) == rook {
                pos.set_castling_right(c, rsq);
            }
        }

        // 4. En passant square, kept only if a capture is possible.
        if parts[3] != "-" {
            let chars: Vec<char> = parts[3].chars().collect();
            if chars.len() != 2
                || !('a'..='h').contains(&chars[0])
                || !(chars[1] == '3' || chars[1] == '6')
            {
                return Err(FenError::InvalidEnPassant {
                    found: parts[3].to_string(),
                });
            }
            let ep = Square::new(rank_to_index(chars[1]), file_to_index(chars[0]));
            let stm = pos.side_to_move;
            let pushed = ep.offset((!stm).pawn_push());
            if (pos.attackers_to(ep) & pos.pieces_ct(stm, PieceType::PAWN)).any()
                && (pos.pieces_ct(!stm, PieceType::PAWN) & pushed).any()
            {
                pos.st_mut().ep_square = ep;
            }
        }

        // 5-6. Halfmove clock and fullmove number.
        pos.st_mut().rule50 = parts.get(4).and_then(|s| s.parse().ok()).unwrap_or(0);
        let fullmove: i32 = parts.get(5).and_then(|s| s.parse().ok()).unwrap_or(1);
        pos.game_ply =
            (2 * (fullmove - 1)).max(0) + i32::from(pos.side_to_move == Color::Black);

        pos.set_state();
        debug_assert!(pos.pos_is_ok());
        Ok(pos)
    }

    /// Helper while setting up: record one castling right given the
    /// rook's starting square.
    pub(crate) fn set_castling_right(&mut self, c: Color, rfrom: Square) {
        let kfrom = self.king_square(c);
        let king_side = kfrom < rfrom;
        let cr = CastlingRight::new(c, king_side);

        self.st_mut().castling_rights |= cr.0;
        self.castling_rights_mask[kfrom.index()] |= cr.0;
        self.castling_rights_mask[rfrom.index()] |= cr.0;
        self.castling_rook_square[cr.index()] = rfrom;

        let kto = Square::new(c.back_rank(), if king_side { 6 } else { 2 });
        let rto = Square::new(c.back_rank(), if king_side { 5 } else { 3 });

        for idx in rfrom.min(rto).index()..=rfrom.max(rto).index() {
            let s = Square::from_index(idx);
            if s != kfrom && s != rfrom {
                self.castling_path[cr.index()] |= s;
            }
        }
        for idx in kfrom.min(kto).index()..=kfrom.max(kto).index() {
            let s = Square::from_index(idx);
            if s != kfrom && s != rfrom {
                self.castling_path[cr.index()] |= s;
            }
        }
    }

    /// Emit the position as FEN; round-trips on everything this engine
    /// itself produces.
    #[must_use]
    pub fn fen(&self) -> String {
        let mut out = String::new();

        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                let pc = self.piece_on(Square::new(rank, file));
                if pc.is_none() {
                    empty += 1;
                } else {
                    if empty > 0 {
                        out.push_str(&empty.to_string());
                        empty = 0;
                    }
                    out.push(pc.to_char());
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }

        // Gating list, white tokens before black ones.
        if self.gate_count > Gate::NONE {
            out.push('[');
            for c in Color::BOTH {
                for g in 1..=self.gate_count.index() {
                    out.push(Piece::new(c, self.gating_pieces[g]).to_char());
                    let suffix = if self.setup_count[c.index()].index() < g {
                        '?'
                    } else if self.gating_squares[c.index()][g].is_ok() {
                        (b'a' + self.gating_squares[c.index()][g].file() as u8) as char
                    } else {
                        '-'
                    };
                    out.push(suffix);
                }
            }
            out.push(']');
        }

        out.push_str(if self.side_to_move == Color::White {
            " w "
        } else {
            " b "
        });

        let mut any_castling = false;
        for (cr, classic) in [
            (CastlingRight::WHITE_KING_SIDE, 'K'),
            (CastlingRight::WHITE_QUEEN_SIDE, 'Q'),
            (CastlingRight::BLACK_KING_SIDE, 'k'),
            (CastlingRight::BLACK_QUEEN_SIDE, 'q'),
        ] {
            if self.can_castle(cr) {
                any_castling = true;
                if self.chess960 {
                    let file = (b'a' + self.castling_rook_square(cr).file() as u8) as char;
                    out.push(if classic.is_ascii_uppercase() {
                        file.to_ascii_uppercase()
                    } else {
                        file
                    });
                } else {
                    out.push(classic);
                }
            }
        }
        if !any_castling {
            out.push('-');
        }

        let ep = if self.ep_square().is_ok() {
            self.ep_square().to_string()
        } else {
            "-".to_string()
        };
        let fullmove = 1 + (self.game_ply - i32::from(self.side_to_move == Color::Black)) / 2;
        out.push_str(&format!(" {} {} {}", ep, self.rule50_count(), fullmove));
        out
    }

    /// Parse a move in UCI long algebraic notation against the legal
    /// move list. Castling is accepted both as the king's two-square hop
    /// and as king-takes-rook.
    pub fn parse_move(&self, uci: &str) -> Result<Move, MoveParseError> {
        if uci.len() < 4 || uci.len() > 5 {
            return Err(MoveParseError::InvalidLength { len: uci.len() });
        }

        let chars: Vec<char> = uci.chars().collect();
        if !('a'..='h').contains(&chars[0])
            || !('1'..='8').contains(&chars[1])
            || !('a'..='h').contains(&chars[2])
            || !('1'..='8').contains(&chars[3])
        {
            return Err(MoveParseError::InvalidSquare {
                notation: uci.to_string(),
            });
        }

        let from = Square::new(rank_to_index(chars[1]), file_to_index(chars[0]));
        let to = Square::new(rank_to_index(chars[3]), file_to_index(chars[2]));

        let promotion = if uci.len() == 5 {
            let pt = PieceType::from_char(chars[4])
                .ok_or(MoveParseError::InvalidPromotion { char: chars[4] })?;
            if pt == PieceType::PAWN || pt == PieceType::KING {
                return Err(MoveParseError::InvalidPromotion { char: chars[4] });
            }
            pt
        } else {
            PieceType::NONE
        };

        for &m in generate_legal(self).iter() {
            if m.is_setup() || m.from() != from {
                continue;
            }
            let promo_matches = if m.is_promotion() {
                m.promotion_type() == promotion
            } else {
                promotion == PieceType::NONE
            };
            if !promo_matches {
                continue;
            }
            if m.to() == to {
                return Ok(m);
            }
            if m.move_type() == MoveType::Castling {
                let king_side = m.to() > m.from();
                let kto =
                    Square::new(self.side_to_move.back_rank(), if king_side { 6 } else { 2 });
                if to == kto {
                    return Ok(m);
                }
            }
        }

        Err(MoveParseError::IllegalMove {
            notation: uci.to_string(),
        })
    }

    /// Swap the two sides of the board; mainly useful to hunt symmetry
    /// bugs.
    pub fn flip(&mut self) {
        let fen = self.fen();
        let parts: Vec<&str> = fen.split_whitespace().collect();

        let placement = parts[0];
        let (board_part, gating_part) = match placement.find('[') {
            Some(i) => (&placement[..i], Some(&placement[i + 1..placement.len() - 1])),
            None => (placement, None),
        };

        let mut flipped: String = board_part
            .split('/')
            .rev()
            .map(swap_case)
            .collect::<Vec<_>>()
            .join("/");

        if let Some(gating) = gating_part {
            flipped.push('[');
            let chars: Vec<char> = gating.chars().collect();
            let mut i = 0;
            while i < chars.len() {
                // Token pairs: piece letter (case-swapped) plus suffix.
                flipped.push(swap_char(chars[i]));
                if i + 1 < chars.len() {
                    flipped.push(chars[i + 1]);
                }
                i += 2;
            }
            flipped.push(']');
        }

        let stm = if parts[1] == "w" { "b" } else { "w" };
        let castling = swap_case(parts[2]);
        let ep = if parts[3] == "-" {
            "-".to_string()
        } else {
            let mut chars: Vec<char> = parts[3].chars().collect();
            chars[1] = if chars[1] == '3' { '6' } else { '3' };
            chars.into_iter().collect()
        };

        let flipped_fen = format!(
            "{} {} {} {} {} {}",
            flipped,
            stm,
            castling,
            ep,
            parts.get(4).unwrap_or(&"0"),
            parts.get(5).unwrap_or(&"1"),
        );

        *self = Position::set(&flipped_fen, self.chess960, self.musketeer)
            .expect("flipped FEN is valid");
        debug_assert!(self.pos_is_ok());
    }
}

fn swap_char(ch: char) -> char {
    if ch.is_ascii_uppercase() {
        ch.to_ascii_lowercase()
    } else {
        ch.to_ascii_uppercase()
    }
}

fn swap_case(s: &str) -> String {
    s.chars()
        .map(|ch| if ch.is_ascii_alphabetic() { swap_char(ch) } else { ch })
        .collect()
}

fn parse_board_rows(pos: &mut Position, rows: &[&str]) -> Result<(), FenError> {
    for (i, row) in rows.iter().take(8).enumerate() {
        let rank = 7 - i;
        let mut file = 0;
        for ch in row.chars() {
            if let Some(d) = ch.to_digit(10) {
                file += d as usize;
            } else if let Some(pc) = Piece::from_char(ch) {
                if file >= 8 {
                    return Err(FenError::TooManyFiles {
                        rank,
                        files: file + 1,
                    });
                }
                pos.put_piece(pc, Square::new(rank, file));
                file += 1;
            } else {
                return Err(FenError::InvalidPiece { char: ch });
            }
        }
    }
    Ok(())
}

/// The bracketed list alternates per-token: piece letter (the white ones
/// define the catalog), then a home file, `-` for a consumed slot with
/// no square, or `?` while selection is still open.
fn parse_gating_list(pos: &mut Position, gating: &str) -> Result<(), FenError> {
    let mut chars = gating.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == ']' || ch == '/' {
            continue;
        }
        let Some(pc) = Piece::from_char(ch) else {
            return Err(FenError::InvalidGatingToken { char: ch });
        };
        let c = pc.color();

        if c == Color::White {
            if pos.gate_count.index() >= Gate::NB - 1 {
                return Err(FenError::TooManyGates);
            }
            pos.set_gating_type(pc.piece_type());
        }

        match chars.next() {
            Some(t @ 'a'..='h') => {
                pos.put_gating_piece(c, Square::new(c.back_rank(), file_to_index(t)));
                // Consume the optionally specified rank digit.
                if chars.peek().is_some_and(char::is_ascii_digit) {
                    chars.next();
                }
            }
            Some('-') => {
                let slot = pos.setup_count[c.index()].next();
                pos.setup_count[c.index()] = slot;
                pos.gating_squares[c.index()][slot.index()] = Square::NONE;
            }
            Some('?') | None => {}
            Some(other) => return Err(FenError::InvalidGatingToken { char: other }),
        }
    }
    Ok(())
}

/// XBoard form: a row of black gating pieces above the board, one of
/// white gating pieces below, empty slots as `*`. The black row defines
/// the catalog; the white row is matched against it.
fn parse_xboard_placement(pos: &mut Position, placement: &str) -> Result<(), FenError> {
    let rows: Vec<&str> = placement.split('/').collect();
    if rows.len() < 10 {
        return Err(FenError::TooFewParts { found: rows.len() });
    }

    let mut file = 0;
    for ch in rows[0].chars() {
        if ch == '*' {
            file += 1;
        } else if let Some(d) = ch.to_digit(10) {
            file += d as usize;
        } else if let Some(pc) = Piece::from_char(ch) {
            if pos.gate_count.index() >= Gate::NB - 1 {
                return Err(FenError::TooManyGates);
            }
            pos.set_gating_type(pc.piece_type());
            pos.put_gating_piece(Color::Black, Square::new(7, file));
            file += 1;
        } else {
            return Err(FenError::InvalidGatingToken { char: ch });
        }
    }

    parse_board_rows(pos, &rows[1..9])?;

    let mut s1 = Square::A1;
    let mut s2 = Square::A1;
    let mut file = 0;
    for ch in rows[9].chars() {
        if ch == '*' {
            file += 1;
        } else if let Some(d) = ch.to_digit(10) {
            file += d as usize;
        } else if let Some(pc) = Piece::from_char(ch) {
            if pc.piece_type() == pos.gating_piece(Gate::G1) {
                s1 = Square::new(0, file);
            } else {
                s2 = Square::new(0, file);
            }
            file += 1;
        } else {
            return Err(FenError::InvalidGatingToken { char: ch });
        }
    }
    pos.put_gating_piece(Color::White, s1);
    pos.put_gating_piece(Color::White, s2);

    Ok(())
}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::try_from_fen(s)
    }
}
