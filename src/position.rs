use crate::attacks;
use crate::board::Board;
use crate::color::Color;
use crate::error::{IllegalMove, ParseError};
use crate::fen;
use crate::pieces::PieceType;
use crate::r#move::{Move, MoveFlags, MoveRecord};
use crate::rules;
use crate::square::Square;
use std::fmt;
use std::str::FromStr;

/// Castling availability. Flags only ever go from `true` to `false` while a
/// game is played; they are set only when a position is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    pub(crate) white_kingside: bool,
    pub(crate) white_queenside: bool,
    pub(crate) black_kingside: bool,
    pub(crate) black_queenside: bool,
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::new()
    }
}

impl CastlingRights {
    pub fn new() -> Self {
        CastlingRights {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }

    pub fn none() -> Self {
        CastlingRights {
            white_kingside: false,
            white_queenside: false,
            black_kingside: false,
            black_queenside: false,
        }
    }

    pub fn has_kingside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    pub fn has_queenside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.white_kingside || self.white_queenside || self.black_kingside || self.black_queenside)
    }

    fn revoke_all(&mut self, color: Color) {
        self.revoke_kingside(color);
        self.revoke_queenside(color);
    }

    fn revoke_kingside(&mut self, color: Color) {
        match color {
            Color::White => self.white_kingside = false,
            Color::Black => self.black_kingside = false,
        }
    }

    fn revoke_queenside(&mut self, color: Color) {
        match color {
            Color::White => self.white_queenside = false,
            Color::Black => self.black_queenside = false,
        }
    }

    /// Drop the right tied to a rook home square, if `sq` is one.
    fn revoke_for_rook_square(&mut self, sq: Square) {
        for color in [Color::White, Color::Black] {
            if sq.rank() != color.home_rank() {
                continue;
            }
            match sq.file() {
                0 => self.revoke_queenside(color),
                7 => self.revoke_kingside(color),
                _ => {}
            }
        }
    }
}

/// Board plus everything needed to decide what may be played next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub(crate) board: Board,
    pub(crate) turn: Color,
    pub(crate) castling_rights: CastlingRights,
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
}

impl Position {
    pub fn new(
        board: Board,
        turn: Color,
        castling_rights: CastlingRights,
        en_passant: Option<Square>,
    ) -> Self {
        Position {
            board,
            turn,
            castling_rights,
            en_passant,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn standard() -> Self {
        Self::new(Board::standard(), Color::White, CastlingRights::new(), None)
    }

    pub fn from_fen(fen: &str) -> Result<Self, ParseError> {
        fen::from_fen(fen)
    }

    pub fn to_fen(&self) -> String {
        fen::to_fen(self)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn castling_rights(&self) -> &CastlingRights {
        &self.castling_rights
    }

    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        attacks::is_square_attacked(&self.board, sq, by)
    }

    /// False when `color` has no king on the board.
    pub fn is_in_check(&self, color: Color) -> bool {
        attacks::is_in_check(&self.board, color)
    }

    pub fn is_legal(&self, from: Square, to: Square) -> bool {
        rules::is_legal(self, from, to)
    }

    /// Validate `from -> to` and return the resulting position. `self` is
    /// never modified.
    pub fn play(&self, from: Square, to: Square) -> Result<Position, IllegalMove> {
        let flags = rules::check_move(self, from, to)?;
        let mut next = *self;
        next.apply(Move::new(from, to, flags));
        Ok(next)
    }

    /// Execute a move already classified by `rules::check_move`. No legality
    /// checking happens here.
    pub(crate) fn apply(&mut self, mv: Move) -> MoveRecord {
        let piece = match self.board.take(mv.from) {
            Some(p) => p,
            None => unreachable!("apply called without a piece on {}", mv.from),
        };
        let captured = self.board.get(mv.to);

        if mv.flags.contains(MoveFlags::EN_PASSANT) {
            if let Some(victim) = Square::from_coords(mv.to.file(), mv.from.rank()) {
                self.board.set(victim, None);
            }
        }

        if mv.flags.contains(MoveFlags::CASTLE) {
            let rank = mv.from.rank();
            let (rook_file, rook_dest_file) = if mv.to.file() > mv.from.file() {
                (7, mv.to.file() - 1)
            } else {
                (0, mv.to.file() + 1)
            };
            if let (Some(rook_from), Some(rook_to)) = (
                Square::from_coords(rook_file, rank),
                Square::from_coords(rook_dest_file, rank),
            ) {
                let rook = self.board.take(rook_from);
                self.board.set(rook_to, rook);
            }
        }

        self.board.set(mv.to, Some(piece));

        self.en_passant = if mv.flags.contains(MoveFlags::DOUBLE_PUSH) {
            mv.from.offset(0, piece.color.forward())
        } else {
            None
        };

        if piece.piece_type == PieceType::King {
            self.castling_rights.revoke_all(piece.color);
        }
        if piece.piece_type == PieceType::Rook {
            self.castling_rights.revoke_for_rook_square(mv.from);
        }
        // a rook captured at home takes its right with it
        self.castling_rights.revoke_for_rook_square(mv.to);

        if piece.piece_type == PieceType::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if self.turn == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }

        self.turn = self.turn.opposite();

        MoveRecord {
            piece,
            from: mv.from,
            to: mv.to,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::standard()
    }
}

impl FromStr for Position {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        fen::from_fen(s)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}
