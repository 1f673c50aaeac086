use crate::error::ParseError;
use crate::pieces::Piece;
use crate::square::Square;
use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MoveFlags: u8 {
        const CAPTURE = 0b00000001;
        const DOUBLE_PUSH = 0b00000010;
        const EN_PASSANT = 0b00000100;
        const CASTLE = 0b00001000;
    }
}

/// A classified move. Flags are filled in by the rules module; a move built
/// from user input starts out with none.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub flags: MoveFlags,
}

impl Move {
    pub fn new(from: Square, to: Square, flags: MoveFlags) -> Self {
        Move { from, to, flags }
    }

    pub fn from_lan(lan: &str) -> Result<Self, ParseError> {
        if lan.len() != 4 || !lan.is_ascii() {
            return Err(ParseError::Move(lan.to_string()));
        }

        let from = Square::from_algebraic(&lan[0..2])?;
        let to = Square::from_algebraic(&lan[2..4])?;

        Ok(Move::new(from, to, MoveFlags::empty()))
    }

    pub fn to_lan(&self) -> String {
        format!("{}{}", self.from, self.to)
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lan())
    }
}

/// One executed move, as kept in the game history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MoveRecord {
    pub piece: Piece,
    pub from: Square,
    pub to: Square,
}

impl MoveRecord {
    /// Piece letter (none for pawns) followed by the destination, e.g. `Nf3`, `e4`.
    pub fn label(&self) -> String {
        match self.piece.piece_type.move_letter() {
            Some(letter) => format!("{}{}", letter, self.to),
            None => self.to.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::pieces::PieceType;

    #[test]
    fn test_move_from_lan() {
        let mv = Move::from_lan("e2e4").expect("valid LAN");
        assert_eq!(mv.from.to_algebraic(), "e2");
        assert_eq!(mv.to.to_algebraic(), "e4");
        assert!(mv.flags.is_empty());
        assert_eq!(mv.to_lan(), "e2e4");
        assert_eq!(mv.to_string(), "e2e4");
    }

    #[test]
    fn test_move_from_lan_rejects() {
        assert!(Move::from_lan("e2e").is_err());
        assert!(Move::from_lan("e7e8q").is_err());
        assert!(Move::from_lan("z2e4").is_err());
        assert!(Move::from_lan("e2é4").is_err());
    }

    #[test]
    fn test_record_label() {
        let from = Square::from_algebraic("g1").expect("g1");
        let to = Square::from_algebraic("f3").expect("f3");
        let knight = MoveRecord {
            piece: Piece::new(PieceType::Knight, Color::White),
            from,
            to,
        };
        assert_eq!(knight.label(), "Nf3");

        let pawn = MoveRecord {
            piece: Piece::new(PieceType::Pawn, Color::Black),
            from: Square::from_algebraic("e7").expect("e7"),
            to: Square::from_algebraic("e5").expect("e5"),
        };
        assert_eq!(pawn.label(), "e5");
    }
}
