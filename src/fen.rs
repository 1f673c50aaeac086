use arrayvec::ArrayVec;

use crate::board::Board;
use crate::color::Color;
use crate::error::ParseError;
use crate::position::{CastlingRights, Position};
use crate::square::Square;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub fn to_fen(position: &Position) -> String {
    let mut fen = position.board.to_placement();

    fen.push(' ');
    fen.push(position.turn.to_fen_char());

    fen.push(' ');
    fen.push_str(&castling_to_fen(&position.castling_rights));

    fen.push(' ');
    match position.en_passant {
        Some(ep) => fen.push_str(&ep.to_algebraic()),
        None => fen.push('-'),
    }

    fen.push(' ');
    fen.push_str(&position.halfmove_clock.to_string());

    fen.push(' ');
    fen.push_str(&position.fullmove_number.to_string());

    fen
}

fn castling_to_fen(rights: &CastlingRights) -> String {
    if rights.is_empty() {
        return "-".to_string();
    }

    [
        (rights.white_kingside, 'K'),
        (rights.white_queenside, 'Q'),
        (rights.black_kingside, 'k'),
        (rights.black_queenside, 'q'),
    ]
    .iter()
    .filter(|(available, _)| *available)
    .map(|(_, c)| *c)
    .collect()
}

/// Parse a FEN string. The clock fields may be left off, in which case they
/// default to `0 1`.
pub fn from_fen(fen: &str) -> Result<Position, ParseError> {
    let mut fields = fen.split_whitespace();
    let parts: ArrayVec<&str, 6> = fields.by_ref().take(6).collect();
    let field_count = parts.len() + fields.count();
    if field_count != 4 && field_count != 6 {
        return Err(ParseError::FieldCount(field_count));
    }

    let board = Board::from_placement(parts[0])?;

    let turn = Color::from_fen_str(parts[1])
        .ok_or_else(|| ParseError::SideToMove(parts[1].to_string()))?;

    let castling_rights = castling_from_fen(parts[2])?;

    let en_passant = match parts[3] {
        "-" => None,
        s => {
            let sq = Square::from_algebraic(s).map_err(|_| ParseError::EnPassant(s.to_string()))?;
            // only the rank a pawn skips over can hold the target
            let expected_rank = turn.opposite().pawn_rank() as i8 + turn.opposite().forward();
            if sq.rank() as i8 != expected_rank {
                return Err(ParseError::EnPassant(s.to_string()));
            }
            Some(sq)
        }
    };

    let (halfmove_clock, fullmove_number) = if parts.len() == 6 {
        (parse_clock(parts[4])?, parse_clock(parts[5])?)
    } else {
        (0, 1)
    };

    Ok(Position {
        board,
        turn,
        castling_rights,
        en_passant,
        halfmove_clock,
        fullmove_number,
    })
}

fn castling_from_fen(field: &str) -> Result<CastlingRights, ParseError> {
    let mut rights = CastlingRights::none();
    if field == "-" {
        return Ok(rights);
    }

    for c in field.chars() {
        let slot = match c {
            'K' => &mut rights.white_kingside,
            'Q' => &mut rights.white_queenside,
            'k' => &mut rights.black_kingside,
            'q' => &mut rights.black_queenside,
            _ => return Err(ParseError::Castling(field.to_string())),
        };
        if *slot {
            return Err(ParseError::Castling(field.to_string()));
        }
        *slot = true;
    }

    Ok(rights)
}

fn parse_clock(s: &str) -> Result<u32, ParseError> {
    s.parse().map_err(|_| ParseError::Clock(s.to_string()))
}
