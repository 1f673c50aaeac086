use crate::color::Color;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOutcome {
    WhiteWin,
    BlackWin,
    Stalemate,
}

impl GameOutcome {
    /// Outcome when `color` is checkmated.
    pub fn checkmated(color: Color) -> Self {
        match color {
            Color::White => GameOutcome::BlackWin,
            Color::Black => GameOutcome::WhiteWin,
        }
    }

    pub fn winner(&self) -> Option<Color> {
        match self {
            GameOutcome::WhiteWin => Some(Color::White),
            GameOutcome::BlackWin => Some(Color::Black),
            GameOutcome::Stalemate => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        !matches!(self, GameOutcome::WhiteWin | GameOutcome::BlackWin)
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameOutcome::WhiteWin => "white_win",
            GameOutcome::BlackWin => "black_win",
            GameOutcome::Stalemate => "stalemate",
        };
        write!(f, "{}", s)
    }
}
