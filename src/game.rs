use log::debug;

use crate::board::Board;
use crate::color::Color;
use crate::error::{IllegalMove, ParseError, PlayError};
use crate::notation;
use crate::outcome::GameOutcome;
use crate::position::Position;
use crate::r#move::{Move, MoveRecord};
use crate::rules;
use crate::square::Square;

/// `position` with `color` to move. Switching sides forfeits any en passant
/// target, which only ever belongs to the side actually on move.
fn with_side_to_move(position: &Position, color: Color) -> Position {
    let mut view = *position;
    if view.turn != color {
        view.turn = color;
        view.en_passant = None;
    }
    view
}

/// `color` is in check and has no legal move. A side without a king is never
/// checkmated.
#[hotpath::measure]
pub fn is_checkmate(position: &Position, color: Color) -> bool {
    position.is_in_check(color) && !rules::has_legal_move(&with_side_to_move(position, color))
}

/// `color` is not in check but has no legal move.
pub fn is_stalemate(position: &Position, color: Color) -> bool {
    !position.is_in_check(color) && !rules::has_legal_move(&with_side_to_move(position, color))
}

/// A game in progress: the live position plus the moves that led to it.
#[derive(Clone, Debug)]
pub struct Game {
    start: Position,
    position: Position,
    history: Vec<MoveRecord>,
}

impl Game {
    pub fn new(position: Position) -> Self {
        Game {
            start: position,
            position,
            history: Vec::new(),
        }
    }

    pub fn standard() -> Self {
        Self::new(Position::standard())
    }

    pub fn from_fen(fen: &str) -> Result<Self, ParseError> {
        Position::from_fen(fen).map(Self::new)
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn board(&self) -> &Board {
        self.position.board()
    }

    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn move_count(&self) -> usize {
        self.history.len()
    }

    pub fn is_legal(&self, from: Square, to: Square) -> bool {
        rules::is_legal(&self.position, from, to)
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        rules::legal_moves(&self.position)
    }

    /// Play `from -> to` if it is legal. On rejection the game is unchanged.
    pub fn propose_move(&mut self, from: Square, to: Square) -> Result<MoveRecord, IllegalMove> {
        let flags = rules::check_move(&self.position, from, to).inspect_err(|e| {
            debug!("rejected {}: {}", e, self.position.to_fen());
        })?;

        let record = self.position.apply(Move::new(from, to, flags));
        self.history.push(record);
        Ok(record)
    }

    /// Play a move given in long algebraic form, e.g. `e2e4`.
    pub fn propose_lan(&mut self, lan: &str) -> Result<MoveRecord, PlayError> {
        let mv = Move::from_lan(lan)?;
        Ok(self.propose_move(mv.from, mv.to)?)
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        self.position.is_in_check(color)
    }

    pub fn is_check(&self) -> bool {
        self.is_in_check(self.turn())
    }

    pub fn is_checkmate(&self) -> bool {
        is_checkmate(&self.position, self.turn())
    }

    pub fn is_stalemate(&self) -> bool {
        is_stalemate(&self.position, self.turn())
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        if rules::has_legal_move(&self.position) {
            None
        } else if self.is_check() {
            Some(GameOutcome::checkmated(self.turn()))
        } else {
            Some(GameOutcome::Stalemate)
        }
    }

    pub fn is_over(&self) -> bool {
        self.outcome().is_some()
    }

    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    pub fn start_fen(&self) -> String {
        self.start.to_fen()
    }

    /// Numbered move list of everything played so far.
    pub fn move_list(&self) -> String {
        notation::move_list_from(&self.history, self.start.fullmove_number(), self.start.turn())
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Game(current_player: {}, outcome: {:?})\n{}",
            self.turn(),
            self.outcome(),
            self.board()
        )
    }
}
