pub mod analysis;
pub mod attacks;
pub mod board;
pub mod color;
pub mod error;
pub mod fen;
pub mod game;
pub mod r#move;
pub mod notation;
pub mod outcome;
pub mod pieces;
pub mod position;
pub mod rules;
pub mod serde_support;
pub mod square;

pub use color::Color;
pub use error::{AnalysisError, IllegalMove, IllegalReason, ParseError, PlayError};
pub use game::Game;
pub use outcome::GameOutcome;
pub use pieces::{Piece, PieceType};
pub use position::{CastlingRights, Position};
pub use r#move::{Move, MoveFlags, MoveRecord};
pub use square::Square;

#[cfg(feature = "python")]
extern crate pyo3;

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule(gil_used = false)]
fn chess_referee(m: &Bound<'_, PyModule>) -> PyResult<()> {
    use python_bindings::*;
    m.add_class::<PyGame>()?;
    m.add("STARTING_FEN", fen::STARTING_FEN)?;
    Ok(())
}

#[cfg(feature = "python")]
mod python_bindings {
    use super::*;

    fn value_error(e: impl std::fmt::Display) -> PyErr {
        PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string())
    }

    fn square(name: &str) -> PyResult<Square> {
        Square::from_algebraic(name).map_err(value_error)
    }

    #[pyclass(name = "Game")]
    pub struct PyGame {
        game: Game,
    }

    #[pymethods]
    impl PyGame {
        #[new]
        #[pyo3(signature = (fen=None))]
        pub fn new(fen: Option<&str>) -> PyResult<Self> {
            let game = match fen {
                Some(fen) => Game::from_fen(fen).map_err(value_error)?,
                None => Game::standard(),
            };
            Ok(PyGame { game })
        }

        #[staticmethod]
        pub fn from_fen(fen: &str) -> PyResult<Self> {
            Self::new(Some(fen))
        }

        /// "white" or "black".
        pub fn turn(&self) -> String {
            self.game.turn().to_string().to_lowercase()
        }

        /// Play `from -> to` given as algebraic squares. Returns the move label.
        pub fn propose_move(&mut self, from: &str, to: &str) -> PyResult<String> {
            let record = self
                .game
                .propose_move(square(from)?, square(to)?)
                .map_err(value_error)?;
            Ok(record.label())
        }

        pub fn propose_lan(&mut self, lan: &str) -> PyResult<String> {
            let record = self.game.propose_lan(lan).map_err(value_error)?;
            Ok(record.label())
        }

        pub fn is_legal(&self, from: &str, to: &str) -> PyResult<bool> {
            Ok(self.game.is_legal(square(from)?, square(to)?))
        }

        pub fn legal_moves(&self) -> Vec<String> {
            self.game
                .legal_moves()
                .into_iter()
                .map(|m| m.to_lan())
                .collect()
        }

        pub fn is_check(&self) -> bool {
            self.game.is_check()
        }

        pub fn is_checkmate(&self) -> bool {
            self.game.is_checkmate()
        }

        pub fn is_stalemate(&self) -> bool {
            self.game.is_stalemate()
        }

        pub fn is_over(&self) -> bool {
            self.game.is_over()
        }

        pub fn outcome(&self) -> Option<String> {
            self.game.outcome().map(|o| o.to_string())
        }

        pub fn move_list(&self) -> String {
            self.game.move_list()
        }

        pub fn to_fen(&self) -> String {
            self.game.to_fen()
        }

        pub fn clone(&self) -> PyGame {
            PyGame {
                game: self.game.clone(),
            }
        }

        pub fn __hash__(&self) -> u64 {
            use std::hash::{Hash, Hasher};
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            self.game.position().hash(&mut hasher);
            hasher.finish()
        }

        pub fn __str__(&self) -> String {
            self.game.to_string()
        }

        pub fn __repr__(&self) -> String {
            format!("Game(fen=\"{}\")", self.game.to_fen())
        }
    }
}
