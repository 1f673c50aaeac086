//! Candidate-move analysis backed by an external engine.
//!
//! The rules core never searches. [`analyze`] enumerates the legal moves of a
//! position, asks an [`Evaluator`] to score the position after each one and
//! renders the best of them as text lines such as
//! `Move Qh5 - Evaluation: 0.35`.

use std::fmt;
use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::AnalysisError;
use crate::game;
use crate::position::Position;
use crate::r#move::MoveRecord;
use crate::rules;

pub const DEFAULT_DEPTH: u32 = 15;
pub const DEFAULT_MOVES: usize = 10;
pub const DEFAULT_ENGINE: &str = "stockfish";

fn default_depth() -> u32 {
    DEFAULT_DEPTH
}

fn default_moves() -> usize {
    DEFAULT_MOVES
}

/// Wire request: `{"fen": .., "depth": .., "moves": ..}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub fen: String,
    #[serde(default = "default_depth")]
    pub depth: u32,
    #[serde(default = "default_moves")]
    pub moves: usize,
}

impl AnalysisRequest {
    pub fn from_position(position: &Position, config: &AnalysisConfig) -> Self {
        AnalysisRequest {
            fen: position.to_fen(),
            depth: config.depth,
            moves: config.moves,
        }
    }
}

/// Wire response: one line per candidate, newline separated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub result: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub depth: u32,
    pub moves: usize,
    pub engine_path: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            depth: DEFAULT_DEPTH,
            moves: DEFAULT_MOVES,
            engine_path: DEFAULT_ENGINE.to_string(),
        }
    }
}

/// Engine verdict on a position, always from White's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Evaluation {
    Centipawns(i32),
    /// Forced mate in `n` moves; positive when White mates. Never zero.
    Mate(i32),
    /// The position is already checkmate; holds the mated side.
    Checkmate(Color),
}

impl Evaluation {
    /// Sort key in pawns. Mates sit far outside any material score, shorter
    /// mates further out.
    pub fn score(&self) -> f64 {
        match *self {
            Evaluation::Centipawns(cp) => f64::from(cp) / 100.0,
            Evaluation::Mate(n) => 10_000.0 / f64::from(n),
            Evaluation::Checkmate(Color::White) => -20_000.0,
            Evaluation::Checkmate(Color::Black) => 20_000.0,
        }
    }

    /// Flip an engine score given for `side` to White's point of view.
    fn for_white(self, side: Color) -> Self {
        match (self, side) {
            (e, Color::White) => e,
            (Evaluation::Centipawns(cp), Color::Black) => Evaluation::Centipawns(cp.saturating_neg()),
            (Evaluation::Mate(n), Color::Black) => Evaluation::Mate(n.saturating_neg()),
            (e @ Evaluation::Checkmate(_), Color::Black) => e,
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Centipawns(_) => write!(f, "{:.2}", self.score()),
            Evaluation::Mate(n) => write!(f, "Mate in {}", n),
            Evaluation::Checkmate(_) => write!(f, "Checkmate"),
        }
    }
}

/// Anything that can score a FEN position to a given depth.
pub trait Evaluator {
    fn evaluate(&mut self, fen: &str, depth: u32) -> Result<Evaluation, AnalysisError>;
}

/// Read the `score cp N` / `score mate N` part of a UCI `info` line. The
/// engine reports for the side to move; the result is for White.
fn parse_score(line: &str, side: Color) -> Option<Evaluation> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("info") {
        return None;
    }
    tokens.find(|&t| t == "score")?;

    let kind = tokens.next()?;
    let value: i32 = tokens.next()?.parse().ok()?;
    let evaluation = match (kind, value) {
        ("cp", cp) => Evaluation::Centipawns(cp),
        ("mate", 0) => return Some(Evaluation::Checkmate(side)),
        ("mate", n) => Evaluation::Mate(n),
        _ => return None,
    };
    Some(evaluation.for_white(side))
}

/// A UCI engine running as a child process for the lifetime of the value.
pub struct UciEvaluator {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl UciEvaluator {
    pub fn spawn(path: &str) -> Result<Self, AnalysisError> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| AnalysisError::Spawn {
                path: path.to_string(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("engine stdin unavailable"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("engine stdout unavailable"))?;

        let mut engine = UciEvaluator {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        };
        engine.send("uci")?;
        engine.wait_for("uciok")?;
        engine.send("isready")?;
        engine.wait_for("readyok")?;
        Ok(engine)
    }

    fn send(&mut self, command: &str) -> io::Result<()> {
        debug!("uci > {}", command);
        writeln!(self.stdin, "{}", command)?;
        self.stdin.flush()
    }

    fn read_line(&mut self) -> Result<String, AnalysisError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "engine closed its output").into());
        }
        let line = line.trim_end().to_string();
        debug!("uci < {}", line);
        Ok(line)
    }

    fn wait_for(&mut self, token: &str) -> Result<(), AnalysisError> {
        while self.read_line()? != token {}
        Ok(())
    }
}

impl Evaluator for UciEvaluator {
    fn evaluate(&mut self, fen: &str, depth: u32) -> Result<Evaluation, AnalysisError> {
        let side = Position::from_fen(fen)?.turn();
        self.send(&format!("position fen {}", fen))?;
        self.send(&format!("go depth {}", depth))?;

        let mut last = None;
        loop {
            let line = self.read_line()?;
            if line.starts_with("bestmove") {
                break;
            }
            if let Some(evaluation) = parse_score(&line, side) {
                last = Some(evaluation);
            }
        }

        last.ok_or_else(|| {
            warn!("engine returned no score for {}", fen);
            AnalysisError::NoScore
        })
    }
}

impl Drop for UciEvaluator {
    fn drop(&mut self) {
        if self.send("quit").is_err() {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

/// One legal move of the analysed position with the score after it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub record: MoveRecord,
    pub evaluation: Evaluation,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move {} - Evaluation: {}", self.record.label(), self.evaluation)
    }
}

/// Score every legal move of `position`, best first for the side to move.
pub fn candidates(
    position: &Position,
    evaluator: &mut dyn Evaluator,
    depth: u32,
) -> Result<Vec<Candidate>, AnalysisError> {
    let mut scored = Vec::new();
    for mv in rules::legal_moves(position) {
        let mut next = *position;
        let record = next.apply(mv);
        let evaluation = if game::is_checkmate(&next, next.turn()) {
            Evaluation::Checkmate(next.turn())
        } else {
            evaluator.evaluate(&next.to_fen(), depth)?
        };
        scored.push(Candidate { record, evaluation });
    }

    match position.turn() {
        Color::White => scored.sort_by(|a, b| b.evaluation.score().total_cmp(&a.evaluation.score())),
        Color::Black => scored.sort_by(|a, b| a.evaluation.score().total_cmp(&b.evaluation.score())),
    }
    Ok(scored)
}

#[hotpath::measure]
pub fn analyze(
    position: &Position,
    evaluator: &mut dyn Evaluator,
    request: &AnalysisRequest,
) -> Result<AnalysisResponse, AnalysisError> {
    let started = Instant::now();

    let mut scored = candidates(position, evaluator, request.depth)?;
    scored.truncate(request.moves);
    let result = scored
        .iter()
        .map(Candidate::to_string)
        .collect::<Vec<_>>()
        .join("\n");

    info!(
        "analyzed {} at depth {} in {}",
        position.to_fen(),
        request.depth,
        format_elapsed(started.elapsed())
    );
    Ok(AnalysisResponse { result })
}

/// Parse the request's FEN and analyze it.
pub fn analyze_request(
    evaluator: &mut dyn Evaluator,
    request: &AnalysisRequest,
) -> Result<AnalysisResponse, AnalysisError> {
    let position = Position::from_fen(&request.fen)?;
    analyze(&position, evaluator, request)
}

fn format_elapsed(elapsed: Duration) -> String {
    let ms = elapsed.as_millis();
    format!("{}m {}s {}ms", ms / 60_000, ms / 1000 % 60, ms % 1000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::square::Square;
    use rstest::rstest;
    use std::collections::HashMap;

    /// Answers from a table keyed by FEN, 0.00 for anything else.
    #[derive(Default)]
    struct ScriptedEvaluator {
        scores: HashMap<String, Evaluation>,
        calls: Vec<(String, u32)>,
    }

    impl ScriptedEvaluator {
        fn after(mut self, position: &Position, lan: &str, evaluation: Evaluation) -> Self {
            let from = Square::from_algebraic(&lan[0..2]).expect("valid square");
            let to = Square::from_algebraic(&lan[2..4]).expect("valid square");
            let next = position.play(from, to).expect("legal move");
            self.scores.insert(next.to_fen(), evaluation);
            self
        }
    }

    impl Evaluator for ScriptedEvaluator {
        fn evaluate(&mut self, fen: &str, depth: u32) -> Result<Evaluation, AnalysisError> {
            self.calls.push((fen.to_string(), depth));
            Ok(self
                .scores
                .get(fen)
                .copied()
                .unwrap_or(Evaluation::Centipawns(0)))
        }
    }

    struct SilentEngine;

    impl Evaluator for SilentEngine {
        fn evaluate(&mut self, _fen: &str, _depth: u32) -> Result<Evaluation, AnalysisError> {
            Err(AnalysisError::NoScore)
        }
    }

    const PAWN_ENDING: &str = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1";

    fn request(fen: &str, depth: u32, moves: usize) -> AnalysisRequest {
        AnalysisRequest {
            fen: fen.to_string(),
            depth,
            moves,
        }
    }

    #[test]
    fn test_white_sorts_descending_and_truncates() {
        let position = Position::from_fen(PAWN_ENDING).expect("valid FEN");
        let mut engine = ScriptedEvaluator::default()
            .after(&position, "e2e4", Evaluation::Centipawns(120))
            .after(&position, "e2e3", Evaluation::Centipawns(35))
            .after(&position, "e1d1", Evaluation::Centipawns(-40));

        let response = analyze(&position, &mut engine, &request(PAWN_ENDING, 12, 2)).expect("analysis");
        assert_eq!(
            response.result,
            "Move e4 - Evaluation: 1.20\nMove e3 - Evaluation: 0.35"
        );
        assert_eq!(engine.calls.len(), 6);
        assert!(engine.calls.iter().all(|(_, depth)| *depth == 12));
    }

    #[test]
    fn test_black_sorts_ascending() {
        let fen = "4k3/4p3/8/8/8/8/8/4K3 b - - 0 1";
        let position = Position::from_fen(fen).expect("valid FEN");
        let mut engine = ScriptedEvaluator::default()
            .after(&position, "e7e5", Evaluation::Mate(-3))
            .after(&position, "e8d8", Evaluation::Centipawns(50));

        let response = analyze(&position, &mut engine, &request(fen, 10, 10)).expect("analysis");
        let lines: Vec<&str> = response.result.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "Move e5 - Evaluation: Mate in -3");
        assert_eq!(lines[5], "Move Kd8 - Evaluation: 0.50");
    }

    #[test]
    fn test_mating_move_is_scored_without_engine() {
        let fen = "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2";
        let position = Position::from_fen(fen).expect("valid FEN");
        let mut engine = ScriptedEvaluator::default();

        let response = analyze(&position, &mut engine, &request(fen, 15, 1)).expect("analysis");
        assert_eq!(response.result, "Move Qh4 - Evaluation: Checkmate");
        assert_eq!(engine.calls.len(), rules::legal_moves(&position).len() - 1);
    }

    #[test]
    fn test_engine_failure_propagates() {
        let position = Position::standard();
        let result = analyze(&position, &mut SilentEngine, &request("", 5, 3));
        assert!(matches!(result, Err(AnalysisError::NoScore)));
    }

    #[test]
    fn test_analyze_request_rejects_bad_fen() {
        let mut engine = ScriptedEvaluator::default();
        let result = analyze_request(&mut engine, &request("not a fen", 5, 3));
        assert!(matches!(result, Err(AnalysisError::Position(_))));
        assert!(engine.calls.is_empty());
    }

    #[test]
    fn test_no_legal_moves_gives_empty_result() {
        let fen = "K7/8/1q6/8/8/8/8/2k5 w - - 0 1";
        let mut engine = ScriptedEvaluator::default();
        let response = analyze_request(&mut engine, &request(fen, 5, 3)).expect("analysis");
        assert_eq!(response.result, "");
    }

    #[rstest]
    #[case("info depth 12 seldepth 18 multipv 1 score cp 35 nodes 1000 pv e2e4", Color::White, Some(Evaluation::Centipawns(35)))]
    #[case("info depth 12 score cp 35 lowerbound", Color::Black, Some(Evaluation::Centipawns(-35)))]
    #[case("info depth 20 score mate 2 pv d8h4", Color::Black, Some(Evaluation::Mate(-2)))]
    #[case("info depth 20 score mate -4", Color::White, Some(Evaluation::Mate(-4)))]
    #[case("info depth 1 score cp -2147483648", Color::Black, Some(Evaluation::Centipawns(i32::MAX)))]
    #[case("info depth 1 score mate -2147483648", Color::Black, Some(Evaluation::Mate(i32::MAX)))]
    #[case("info depth 0 score mate 0", Color::White, Some(Evaluation::Checkmate(Color::White)))]
    #[case("info string NNUE evaluation using nn.nnue", Color::White, None)]
    #[case("bestmove e2e4 ponder e7e5", Color::White, None)]
    fn test_parse_score(#[case] line: &str, #[case] side: Color, #[case] expected: Option<Evaluation>) {
        assert_eq!(parse_score(line, side), expected);
    }

    #[rstest]
    #[case(Evaluation::Centipawns(35), "0.35")]
    #[case(Evaluation::Centipawns(-120), "-1.20")]
    #[case(Evaluation::Mate(2), "Mate in 2")]
    #[case(Evaluation::Checkmate(Color::Black), "Checkmate")]
    fn test_evaluation_display(#[case] evaluation: Evaluation, #[case] expected: &str) {
        assert_eq!(evaluation.to_string(), expected);
    }

    #[test]
    fn test_mate_outranks_material() {
        assert!(Evaluation::Mate(5).score() > Evaluation::Centipawns(5000).score());
        assert!(Evaluation::Mate(1).score() > Evaluation::Mate(3).score());
        assert!(Evaluation::Checkmate(Color::Black).score() > Evaluation::Mate(1).score());
        assert!(Evaluation::Mate(-1).score() < Evaluation::Centipawns(-5000).score());
    }

    #[test]
    fn test_request_wire_format() {
        let request: AnalysisRequest =
            serde_json::from_str(r#"{"fen": "8/8/8/8/8/8/8/K6k w - - 0 1", "depth": 12, "moves": 3}"#)
                .expect("valid request");
        assert_eq!(request.depth, 12);
        assert_eq!(request.moves, 3);

        let defaults: AnalysisRequest =
            serde_json::from_str(r#"{"fen": "8/8/8/8/8/8/8/K6k w - - 0 1"}"#).expect("valid request");
        assert_eq!(defaults.depth, DEFAULT_DEPTH);
        assert_eq!(defaults.moves, DEFAULT_MOVES);

        let response = AnalysisResponse {
            result: "Move e4 - Evaluation: 0.35".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&response).expect("serializable"),
            r#"{"result":"Move e4 - Evaluation: 0.35"}"#
        );
    }

    #[test]
    fn test_config_defaults_and_overrides() {
        let config: AnalysisConfig = serde_json::from_str(r#"{"depth": 8}"#).expect("valid config");
        assert_eq!(
            config,
            AnalysisConfig {
                depth: 8,
                ..AnalysisConfig::default()
            }
        );
        assert_eq!(config.engine_path, "stockfish");

        let request = AnalysisRequest::from_position(&Position::standard(), &config);
        assert_eq!(request.fen, Position::standard().to_fen());
        assert_eq!(request.moves, DEFAULT_MOVES);
    }

    #[test]
    fn test_spawn_missing_engine() {
        let result = UciEvaluator::spawn("/nonexistent/uci-engine");
        assert!(matches!(result, Err(AnalysisError::Spawn { .. })));
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(125_042)), "2m 5s 42ms");
    }
}
