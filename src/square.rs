use crate::error::ParseError;
use std::fmt;
use std::str::FromStr;

/// One of the 64 board cells, indexed in FEN scan order: 0 is a8, 7 is h8,
/// 56 is a1, 63 is h1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub const COUNT: usize = 64;

    pub fn new(index: u8) -> Option<Self> {
        (index < 64).then_some(Square(index))
    }

    /// `file` 0..8 is a..h, `rank` 0..8 is rank 1..8.
    pub fn from_coords(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Square((7 - rank) * 8 + file))
        } else {
            None
        }
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..64).map(Square)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }

    pub fn file(&self) -> u8 {
        self.0 % 8
    }

    pub fn rank(&self) -> u8 {
        7 - self.0 / 8
    }

    /// The square `df` files and `dr` ranks away, if it is on the board.
    pub fn offset(&self, df: i8, dr: i8) -> Option<Square> {
        let file = self.file() as i8 + df;
        let rank = self.rank() as i8 + dr;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Square::from_coords(file as u8, rank as u8)
        } else {
            None
        }
    }

    pub fn to_algebraic(&self) -> String {
        format!("{}{}", (b'a' + self.file()) as char, self.rank() + 1)
    }

    pub fn from_algebraic(s: &str) -> Result<Self, ParseError> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ParseError::Square(s.to_string()));
        }
        let (file, rank) = (bytes[0], bytes[1]);
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(ParseError::Square(s.to_string()));
        }
        Square::from_coords(file - b'a', rank - b'1').ok_or_else(|| ParseError::Square(s.to_string()))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

impl FromStr for Square {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::from_algebraic(s)
    }
}
