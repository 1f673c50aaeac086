use crate::square::Square;
use thiserror::Error;

/// Why a proposed move was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IllegalReason {
    NoPiece,
    WrongTurn,
    OwnPieceOnTarget,
    InvalidGeometry,
    PathBlocked,
    CastlingNotAllowed,
    LeavesKingInCheck,
}

impl IllegalReason {
    pub fn describe(&self) -> &'static str {
        match self {
            IllegalReason::NoPiece => "no piece on the origin square",
            IllegalReason::WrongTurn => "piece does not belong to the side to move",
            IllegalReason::OwnPieceOnTarget => "destination holds a piece of the same color",
            IllegalReason::InvalidGeometry => "piece cannot move that way",
            IllegalReason::PathBlocked => "path is blocked",
            IllegalReason::CastlingNotAllowed => "castling is not allowed",
            IllegalReason::LeavesKingInCheck => "move leaves the king in check",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("illegal move {from}{to}: {}", .reason.describe())]
pub struct IllegalMove {
    pub from: Square,
    pub to: Square,
    pub reason: IllegalReason,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid FEN: expected 4 or 6 fields, got {0}")]
    FieldCount(usize),
    #[error("invalid FEN: expected 8 ranks, got {0}")]
    RankCount(usize),
    #[error("invalid FEN: rank {rank} describes {files} files")]
    RankWidth { rank: u8, files: usize },
    #[error("invalid FEN character: {0:?}")]
    PieceLetter(char),
    #[error("invalid side to move: {0:?}")]
    SideToMove(String),
    #[error("invalid castling rights: {0:?}")]
    Castling(String),
    #[error("invalid en passant square: {0:?}")]
    EnPassant(String),
    #[error("invalid square: {0:?}")]
    Square(String),
    #[error("invalid move clock: {0:?}")]
    Clock(String),
    #[error("invalid move: {0:?}")]
    Move(String),
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to start engine {path:?}: {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("engine i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("engine finished without reporting a score")]
    NoScore,
    #[error("invalid position: {0}")]
    Position(#[from] ParseError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A move given as text that either does not parse or is not legal.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlayError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Illegal(#[from] IllegalMove),
}
