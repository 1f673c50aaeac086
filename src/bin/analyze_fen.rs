//! Rank the legal moves of a position with an external UCI engine.
//!
//! Usage: cargo run --release --bin analyze_fen -- \
//!          --fen "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1" \
//!          --depth 15 --moves 10 --engine stockfish
//!
//! With `--json`, reads `{"fen", "depth", "moves"}` from stdin and writes
//! `{"result"}` to stdout.

use std::io::{self, Read};
use std::path::PathBuf;

use chess_referee::analysis::{self, AnalysisConfig, AnalysisRequest, AnalysisResponse, UciEvaluator};
use chess_referee::fen::STARTING_FEN;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "analyze_fen")]
#[command(about = "List the best moves of a FEN position according to a UCI engine")]
struct Args {
    /// Position to analyze
    #[arg(long, default_value = STARTING_FEN)]
    fen: String,

    /// Search depth per candidate move
    #[arg(short, long)]
    depth: Option<u32>,

    /// Number of candidate moves to print
    #[arg(short, long)]
    moves: Option<usize>,

    /// Path to the UCI engine binary
    #[arg(long)]
    engine: Option<String>,

    /// JSON file with default depth, moves and engine_path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read an analysis request from stdin and answer in JSON
    #[arg(long)]
    json: bool,
}

fn load_config(args: &Args) -> Result<AnalysisConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => AnalysisConfig::default(),
    };
    if let Some(depth) = args.depth {
        config.depth = depth;
    }
    if let Some(moves) = args.moves {
        config.moves = moves;
    }
    if let Some(engine) = &args.engine {
        config.engine_path = engine.clone();
    }
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let request = if args.json {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;
        serde_json::from_str::<AnalysisRequest>(&input)?
    } else {
        AnalysisRequest {
            fen: args.fen.clone(),
            depth: config.depth,
            moves: config.moves,
        }
    };

    let mut engine = UciEvaluator::spawn(&config.engine_path)?;
    let response: AnalysisResponse = analysis::analyze_request(&mut engine, &request)?;

    if args.json {
        println!("{}", serde_json::to_string(&response)?);
    } else {
        println!("{}", response.result);
    }

    Ok(())
}
