use crate::attacks::{self, can_king_attack, can_knight_attack, is_diagonal, is_straight};
use crate::board::Board;
use crate::color::Color;
use crate::error::{IllegalMove, IllegalReason};
use crate::pieces::{Piece, PieceType};
use crate::position::Position;
use crate::r#move::{Move, MoveFlags};
use crate::square::Square;

pub use crate::attacks::is_path_clear;

#[hotpath::measure]
pub fn is_legal(position: &Position, from: Square, to: Square) -> bool {
    check_move(position, from, to).is_ok()
}

/// Decide whether `from -> to` may be played in `position`, returning the
/// move's classification when it may.
///
/// Gates run in order: ownership and turn, destination occupancy, castling,
/// piece geometry, then king safety. King safety is tested on a scratch
/// copy of the board through `attacks`, never through this function.
pub fn check_move(position: &Position, from: Square, to: Square) -> Result<MoveFlags, IllegalMove> {
    let reject = |reason| IllegalMove { from, to, reason };
    let board = &position.board;

    let piece = board.get(from).ok_or(reject(IllegalReason::NoPiece))?;
    if piece.color != position.turn {
        return Err(reject(IllegalReason::WrongTurn));
    }

    let target = board.get(to);
    if target.is_some_and(|t| t.color == piece.color) {
        return Err(reject(IllegalReason::OwnPieceOnTarget));
    }

    if is_castling_attempt(&piece, from, to) {
        return if can_castle(position, from, to, piece.color) {
            Ok(MoveFlags::CASTLE)
        } else {
            Err(reject(IllegalReason::CastlingNotAllowed))
        };
    }

    let mut flags = match piece.piece_type {
        PieceType::Pawn => pawn_move_flags(position, from, to, piece.color).map_err(reject)?,
        PieceType::Knight if can_knight_attack(from, to) => MoveFlags::empty(),
        PieceType::King if can_king_attack(from, to) => MoveFlags::empty(),
        PieceType::Bishop if is_diagonal(from, to) => sliding_flags(board, from, to).map_err(reject)?,
        PieceType::Rook if is_straight(from, to) => sliding_flags(board, from, to).map_err(reject)?,
        PieceType::Queen if is_diagonal(from, to) || is_straight(from, to) => {
            sliding_flags(board, from, to).map_err(reject)?
        }
        _ => return Err(reject(IllegalReason::InvalidGeometry)),
    };

    if target.is_some() {
        flags |= MoveFlags::CAPTURE;
    }

    if leaves_king_in_check(board, Move::new(from, to, flags), piece.color) {
        return Err(reject(IllegalReason::LeavesKingInCheck));
    }

    Ok(flags)
}

fn is_castling_attempt(piece: &Piece, from: Square, to: Square) -> bool {
    piece.piece_type == PieceType::King
        && from.rank() == to.rank()
        && (to.file() as i8 - from.file() as i8).abs() == 2
}

fn sliding_flags(board: &Board, from: Square, to: Square) -> Result<MoveFlags, IllegalReason> {
    if is_path_clear(board, from, to) {
        Ok(MoveFlags::empty())
    } else {
        Err(IllegalReason::PathBlocked)
    }
}

fn pawn_move_flags(
    position: &Position,
    from: Square,
    to: Square,
    color: Color,
) -> Result<MoveFlags, IllegalReason> {
    let board = &position.board;
    let forward = color.forward();
    let df = to.file() as i8 - from.file() as i8;
    let dr = to.rank() as i8 - from.rank() as i8;

    if df == 0 && dr == forward {
        return if board.is_empty(to) {
            Ok(MoveFlags::empty())
        } else {
            Err(IllegalReason::PathBlocked)
        };
    }

    if df == 0 && dr == 2 * forward && from.rank() == color.pawn_rank() {
        let skipped = from.offset(0, forward).ok_or(IllegalReason::InvalidGeometry)?;
        return if board.is_empty(skipped) && board.is_empty(to) {
            Ok(MoveFlags::DOUBLE_PUSH)
        } else {
            Err(IllegalReason::PathBlocked)
        };
    }

    if df.abs() == 1 && dr == forward {
        if board.get(to).is_some_and(|t| t.color != color) {
            return Ok(MoveFlags::empty());
        }
        if position.en_passant == Some(to) && en_passant_victim(board, from, to, color).is_some() {
            return Ok(MoveFlags::CAPTURE | MoveFlags::EN_PASSANT);
        }
    }

    Err(IllegalReason::InvalidGeometry)
}

/// The enemy pawn an en passant capture onto `to` takes: beside `from`, on
/// the rank the capturing pawn starts from.
fn en_passant_victim(board: &Board, from: Square, to: Square, color: Color) -> Option<Square> {
    Square::from_coords(to.file(), from.rank())
        .filter(|&sq| board.get(sq).is_some_and(|p| p.is(PieceType::Pawn, color.opposite())))
}

/// The king and rook must both be untouched, the squares between them empty,
/// and the king's start, crossing and landing squares unattacked. Each of
/// those squares is tested with the king alone standing on it.
fn can_castle(position: &Position, from: Square, to: Square, color: Color) -> bool {
    let board = &position.board;
    let kingside = to.file() > from.file();

    let has_right = if kingside {
        position.castling_rights.has_kingside(color)
    } else {
        position.castling_rights.has_queenside(color)
    };
    if !has_right || from != home_square(color, 4) {
        return false;
    }

    let rook_home = home_square(color, if kingside { 7 } else { 0 });
    if !board.get(rook_home).is_some_and(|p| p.is(PieceType::Rook, color)) {
        return false;
    }

    let step: i8 = if kingside { 1 } else { -1 };
    let between_clear = (1..)
        .map_while(|i| from.offset(step * i, 0).filter(|&sq| sq != rook_home))
        .all(|sq| board.is_empty(sq));
    if !between_clear {
        return false;
    }

    let king = Piece::new(PieceType::King, color);
    [Some(from), from.offset(step, 0), Some(to)]
        .into_iter()
        .all(|sq| sq.is_some_and(|sq| !king_attacked_on(board, from, sq, king)))
}

fn home_square(color: Color, file: u8) -> Square {
    match Square::from_coords(file, color.home_rank()) {
        Some(sq) => sq,
        None => unreachable!("file {file} is on the board"),
    }
}

fn king_attacked_on(board: &Board, origin: Square, sq: Square, king: Piece) -> bool {
    let mut scratch = *board;
    scratch.set(origin, None);
    scratch.set(sq, Some(king));
    attacks::is_square_attacked(&scratch, sq, king.color.opposite())
}

/// Play `mv` on a throwaway copy of the board and ask whether `color`'s king
/// is attacked afterwards.
fn leaves_king_in_check(board: &Board, mv: Move, color: Color) -> bool {
    let mut scratch = *board;

    if mv.flags.contains(MoveFlags::EN_PASSANT) {
        if let Some(victim) = Square::from_coords(mv.to.file(), mv.from.rank()) {
            scratch.set(victim, None);
        }
    }

    let piece = scratch.take(mv.from);
    scratch.set(mv.to, piece);

    attacks::is_in_check(&scratch, color)
}

/// Every legal move of the piece on `from`, found by testing each of the 64
/// destinations.
pub fn legal_moves_from(position: &Position, from: Square) -> Vec<Move> {
    Square::all()
        .filter_map(|to| {
            check_move(position, from, to)
                .ok()
                .map(|flags| Move::new(from, to, flags))
        })
        .collect()
}

#[hotpath::measure]
pub fn legal_moves(position: &Position) -> Vec<Move> {
    position
        .board
        .pieces(position.turn)
        .into_iter()
        .flat_map(|(from, _)| legal_moves_from(position, from))
        .collect()
}

pub fn has_legal_move(position: &Position) -> bool {
    position
        .board
        .pieces(position.turn)
        .into_iter()
        .any(|(from, _)| Square::all().any(|to| check_move(position, from, to).is_ok()))
}
