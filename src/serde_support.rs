use crate::game::Game;
use crate::position::Position;
use crate::r#move::Move;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Serialize Position as FEN string
impl Serialize for Position {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_fen())
    }
}

/// Deserialize Position from FEN string
impl<'de> Deserialize<'de> for Position {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fen = String::deserialize(deserializer)?;
        Position::from_fen(&fen).map_err(serde::de::Error::custom)
    }
}

/// Serialize Move as LAN string. Flags are not written; they are recomputed
/// when the move is validated against a position.
impl Serialize for Move {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_lan())
    }
}

impl<'de> Deserialize<'de> for Move {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let lan = String::deserialize(deserializer)?;
        Move::from_lan(&lan).map_err(serde::de::Error::custom)
    }
}

/// A game is its starting position plus the moves played, so the history
/// survives a round trip.
impl Serialize for Game {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let moves: Vec<String> = self
            .history()
            .iter()
            .map(|record| format!("{}{}", record.from, record.to))
            .collect();

        let mut state = serializer.serialize_struct("Game", 2)?;
        state.serialize_field("start", &self.start_fen())?;
        state.serialize_field("moves", &moves)?;
        state.end()
    }
}

#[derive(Deserialize)]
struct GameRepr {
    start: Position,
    #[serde(default)]
    moves: Vec<Move>,
}

impl<'de> Deserialize<'de> for Game {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = GameRepr::deserialize(deserializer)?;
        let mut game = Game::new(repr.start);
        for mv in repr.moves {
            game.propose_move(mv.from, mv.to)
                .map_err(serde::de::Error::custom)?;
        }
        Ok(game)
    }
}
