use crate::color::Color;
use crate::error::ParseError;
use crate::pieces::{Piece, PieceType};
use crate::square::Square;
use std::fmt;

pub const FILES: usize = 8;
pub const RANKS: usize = 8;

pub const STANDARD_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// 64 cells in FEN scan order (a8 first, h1 last).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [Option<Piece>; Square::COUNT],
}

impl Board {
    pub fn empty() -> Self {
        Board {
            squares: [None; Square::COUNT],
        }
    }

    pub fn standard() -> Self {
        Self::from_placement(STANDARD_PLACEMENT).expect("standard placement is valid")
    }

    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()]
    }

    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.squares[sq.index()] = piece;
    }

    pub fn take(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()].take()
    }

    pub fn is_empty(&self, sq: Square) -> bool {
        self.squares[sq.index()].is_none()
    }

    pub fn clear(&mut self) {
        self.squares = [None; Square::COUNT];
    }

    pub fn pieces(&self, color: Color) -> Vec<(Square, Piece)> {
        Square::all()
            .filter_map(|sq| self.get(sq).map(|p| (sq, p)))
            .filter(|(_, p)| p.color == color)
            .collect()
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        Square::all().find(|&sq| {
            self.get(sq)
                .is_some_and(|p| p.is(PieceType::King, color))
        })
    }

    /// Piece placement field of a FEN string.
    pub fn to_placement(&self) -> String {
        let mut fen = String::new();

        for (row, cells) in self.squares.chunks(FILES).enumerate() {
            let mut empty_count = 0;

            for cell in cells {
                if let Some(piece) = cell {
                    if empty_count > 0 {
                        fen.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    fen.push(piece.to_char());
                } else {
                    empty_count += 1;
                }
            }

            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }

            if row + 1 < RANKS {
                fen.push('/');
            }
        }

        fen
    }

    /// Parse the piece placement field of a FEN string. Nothing is returned
    /// unless every rank describes exactly eight files.
    pub fn from_placement(placement: &str) -> Result<Self, ParseError> {
        let mut board = Board::empty();

        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != RANKS {
            return Err(ParseError::RankCount(ranks.len()));
        }

        for (row_idx, rank_str) in ranks.iter().enumerate() {
            let rank = (RANKS - 1 - row_idx) as u8;
            let mut files = 0usize;

            for c in rank_str.chars() {
                match c {
                    '0' => return Err(ParseError::PieceLetter(c)),
                    '1'..='9' => files += (c as u8 - b'0') as usize,
                    _ => {
                        let piece = Piece::from_char(c).ok_or(ParseError::PieceLetter(c))?;
                        if let Some(sq) = Square::from_coords(files as u8, rank).filter(|_| files < FILES) {
                            board.set(sq, Some(piece));
                        }
                        files += 1;
                    }
                }
            }

            if files != FILES {
                return Err(ParseError::RankWidth {
                    rank: rank + 1,
                    files,
                });
            }
        }

        Ok(board)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (row, cells) in self.squares.chunks(FILES).enumerate() {
            write!(f, "{} ", RANKS - row)?;
            for cell in cells {
                match cell {
                    Some(piece) => write!(f, "{} ", piece.to_char())?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }

        write!(f, "  a b c d e f g h")
    }
}
