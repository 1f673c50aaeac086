//! Which squares a side attacks. Nothing in here asks whether the attacking
//! move would itself be legal, so the legality checks in `rules` can call it
//! freely without recursing.

use crate::board::Board;
use crate::color::Color;
use crate::pieces::{Piece, PieceType};
use crate::square::Square;

pub(crate) const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

pub fn is_square_attacked(board: &Board, square: Square, by_color: Color) -> bool {
    board
        .pieces(by_color)
        .iter()
        .any(|(src, piece)| can_piece_attack(board, *src, piece, square))
}

pub fn is_in_check(board: &Board, color: Color) -> bool {
    match board.find_king(color) {
        Some(king) => is_square_attacked(board, king, color.opposite()),
        None => false,
    }
}

/// Whether `piece` standing on `src` hits `dst`. Pawns hit both forward
/// diagonals whether or not anything stands there.
pub(crate) fn can_piece_attack(board: &Board, src: Square, piece: &Piece, dst: Square) -> bool {
    if src == dst {
        return false;
    }
    match piece.piece_type {
        PieceType::Pawn => can_pawn_attack(src, piece.color, dst),
        PieceType::Knight => can_knight_attack(src, dst),
        PieceType::Bishop => is_diagonal(src, dst) && is_path_clear(board, src, dst),
        PieceType::Rook => is_straight(src, dst) && is_path_clear(board, src, dst),
        PieceType::Queen => {
            (is_diagonal(src, dst) || is_straight(src, dst)) && is_path_clear(board, src, dst)
        }
        PieceType::King => can_king_attack(src, dst),
    }
}

fn deltas(src: Square, dst: Square) -> (i8, i8) {
    (
        dst.file() as i8 - src.file() as i8,
        dst.rank() as i8 - src.rank() as i8,
    )
}

fn can_pawn_attack(src: Square, color: Color, dst: Square) -> bool {
    let (df, dr) = deltas(src, dst);
    df.abs() == 1 && dr == color.forward()
}

pub(crate) fn can_knight_attack(src: Square, dst: Square) -> bool {
    let (df, dr) = deltas(src, dst);
    KNIGHT_OFFSETS.contains(&(df, dr))
}

pub(crate) fn can_king_attack(src: Square, dst: Square) -> bool {
    let (df, dr) = deltas(src, dst);
    df.abs() <= 1 && dr.abs() <= 1 && (df, dr) != (0, 0)
}

pub(crate) fn is_diagonal(src: Square, dst: Square) -> bool {
    let (df, dr) = deltas(src, dst);
    df != 0 && df.abs() == dr.abs()
}

pub(crate) fn is_straight(src: Square, dst: Square) -> bool {
    let (df, dr) = deltas(src, dst);
    (df == 0) != (dr == 0)
}

/// True when every square strictly between `from` and `to` is empty. Squares
/// that do not share a rank, file or diagonal have no path.
pub fn is_path_clear(board: &Board, from: Square, to: Square) -> bool {
    if !is_straight(from, to) && !is_diagonal(from, to) {
        return false;
    }

    let (df, dr) = deltas(from, to);
    let (step_f, step_r) = (df.signum(), dr.signum());
    let distance = df.abs().max(dr.abs());

    (1..distance).all(|i| {
        from.offset(step_f * i, step_r * i)
            .is_some_and(|sq| board.is_empty(sq))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).expect("valid square")
    }

    fn board(placement: &str) -> Board {
        Board::from_placement(placement).expect("valid placement")
    }

    #[test]
    fn test_rook_attack_patterns() {
        let mut b = Board::empty();
        let rook = Piece::new(PieceType::Rook, Color::White);
        b.set(sq("e5"), Some(rook));

        assert!(can_piece_attack(&b, sq("e5"), &rook, sq("e1")));
        assert!(can_piece_attack(&b, sq("e5"), &rook, sq("e8")));
        assert!(can_piece_attack(&b, sq("e5"), &rook, sq("a5")));
        assert!(can_piece_attack(&b, sq("e5"), &rook, sq("h5")));
        assert!(!can_piece_attack(&b, sq("e5"), &rook, sq("f6")));

        b.set(sq("e7"), Some(Piece::new(PieceType::Pawn, Color::Black)));
        assert!(!can_piece_attack(&b, sq("e5"), &rook, sq("e8")));
        assert!(can_piece_attack(&b, sq("e5"), &rook, sq("e7")));
    }

    #[test]
    fn test_bishop_attack_patterns() {
        let mut b = Board::empty();
        let bishop = Piece::new(PieceType::Bishop, Color::White);
        b.set(sq("e5"), Some(bishop));

        assert!(can_piece_attack(&b, sq("e5"), &bishop, sq("a1")));
        assert!(can_piece_attack(&b, sq("e5"), &bishop, sq("h8")));
        assert!(can_piece_attack(&b, sq("e5"), &bishop, sq("b8")));
        assert!(can_piece_attack(&b, sq("e5"), &bishop, sq("h2")));
        assert!(!can_piece_attack(&b, sq("e5"), &bishop, sq("e1")));

        b.set(sq("g7"), Some(Piece::new(PieceType::Pawn, Color::Black)));
        assert!(!can_piece_attack(&b, sq("e5"), &bishop, sq("h8")));
        assert!(can_piece_attack(&b, sq("e5"), &bishop, sq("g7")));
    }

    #[test]
    fn test_pawn_attacks_diagonals_only() {
        let b = board("8/8/8/8/4P3/8/8/8");
        assert!(is_square_attacked(&b, sq("d5"), Color::White));
        assert!(is_square_attacked(&b, sq("f5"), Color::White));
        assert!(!is_square_attacked(&b, sq("e5"), Color::White));
        assert!(!is_square_attacked(&b, sq("d3"), Color::White));

        let b = board("8/8/8/4p3/8/8/8/8");
        assert!(is_square_attacked(&b, sq("d4"), Color::Black));
        assert!(!is_square_attacked(&b, sq("d6"), Color::Black));
    }

    #[test]
    fn test_pawn_on_edge_file_does_not_wrap() {
        let b = board("8/8/8/8/7P/8/8/8");
        assert!(is_square_attacked(&b, sq("g5"), Color::White));
        assert!(!is_square_attacked(&b, sq("a6"), Color::White));
        assert!(!is_square_attacked(&b, sq("a5"), Color::White));
    }

    #[test]
    fn test_knight_ignores_blockers() {
        let b = board("8/8/8/8/8/PPP5/PNP5/PPP5");
        assert!(is_square_attacked(&b, sq("c4"), Color::White));
        assert!(is_square_attacked(&b, sq("d3"), Color::White));
        assert!(is_square_attacked(&b, sq("d1"), Color::White));
    }

    #[test]
    fn test_king_adjacency() {
        let b = board("8/8/8/8/3k4/8/8/8");
        assert!(is_square_attacked(&b, sq("e5"), Color::Black));
        assert!(is_square_attacked(&b, sq("c3"), Color::Black));
        assert!(!is_square_attacked(&b, sq("d4"), Color::Black));
        assert!(!is_square_attacked(&b, sq("f4"), Color::Black));
    }

    #[test]
    fn test_is_in_check() {
        let b = board("4k3/8/8/8/8/8/8/4R1K1");
        assert!(is_in_check(&b, Color::Black));
        assert!(!is_in_check(&b, Color::White));

        let b = board("4k3/8/8/8/4p3/8/8/4R1K1");
        assert!(!is_in_check(&b, Color::Black));
    }

    #[test]
    fn test_is_in_check_without_king() {
        let b = board("8/8/8/8/8/8/8/4R3");
        assert!(!is_in_check(&b, Color::Black));
    }

    #[test]
    fn test_is_path_clear() {
        let b = board("8/8/8/8/3p4/8/8/R7");
        assert!(is_path_clear(&b, sq("a1"), sq("h1")));
        assert!(is_path_clear(&b, sq("a1"), sq("a8")));
        assert!(is_path_clear(&b, sq("a1"), sq("d4")));
        assert!(!is_path_clear(&b, sq("a1"), sq("e5")));
        assert!(is_path_clear(&b, sq("a1"), sq("b2")));
        assert!(!is_path_clear(&b, sq("a1"), sq("b3")));
        assert!(!is_path_clear(&b, sq("a1"), sq("a1")));
    }
}
