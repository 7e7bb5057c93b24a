//! Hex-Engine: an alpha-beta Hex player.
//!
//! ## Usage
//!
//! - `hex-engine` - Show a demo
//! - `hex-engine htp` - Start the HTP server for GUI integration
//! - `hex-engine selfplay --games 10` - Minimax against a random player
//! - `hex-engine demo` - Search one position and print the result

use std::io;

use anyhow::{Context, Result, ensure};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use hex_engine::board::{Board, Player};
use hex_engine::constants::{
    DEFAULT_BOARD_SIZE, DEFAULT_DEPTH, DEFAULT_SEED, MAX_BOARD_SIZE, MIN_BOARD_SIZE,
};
use hex_engine::game::Game;
use hex_engine::heuristic::Evaluation;
use hex_engine::htp::HtpEngine;
use hex_engine::player::PlayerKind;
use hex_engine::search::{SearchConfig, Searcher};
use hex_engine::tt::DepthFallback;

/// Hex-Engine: an alpha-beta Hex player
#[derive(Parser)]
#[command(name = "hex-engine")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log search statistics and game results to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTP (Hex Text Protocol) server for use with GUI applications
    Htp(EngineArgs),
    /// Play minimax (as A) against a random player and report the tally
    Selfplay {
        #[command(flatten)]
        engine: EngineArgs,
        /// Number of games to play
        #[arg(long, default_value_t = 10)]
        games: u32,
    },
    /// Run a simple demo of the engine
    Demo(EngineArgs),
}

#[derive(Args, Clone)]
struct EngineArgs {
    /// Board side length
    #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
    size: usize,
    /// Search depth in plies
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    depth: u8,
    /// Seed for move-order and random-player randomness
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Leaf evaluation strategy
    #[arg(long, value_enum, default_value_t = EvaluationArg::Mixed)]
    evaluation: EvaluationArg,
    /// Only accept transposition entries stored at the probed depth
    #[arg(long)]
    exact_tt: bool,
}

#[derive(ValueEnum, Clone, Copy)]
enum EvaluationArg {
    /// Shortest-path gap everywhere
    Shortest,
    /// Two-distance gap everywhere
    TwoDistance,
    /// Two-distance near the root, shortest path deeper
    Mixed,
}

impl EngineArgs {
    fn search_config(&self) -> Result<SearchConfig> {
        ensure!(
            (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&self.size),
            "board size must be between {MIN_BOARD_SIZE} and {MAX_BOARD_SIZE}, got {}",
            self.size
        );
        let mut config = SearchConfig::with_depth(self.depth);
        config.seed = self.seed;
        config.eval.evaluation = match self.evaluation {
            EvaluationArg::Shortest => Evaluation::ShortestPath,
            EvaluationArg::TwoDistance => Evaluation::TwoDistance,
            EvaluationArg::Mixed => Evaluation::default(),
        };
        if self.exact_tt {
            config.depth_fallback = DepthFallback::ExactOnly;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match cli.command {
        Some(Commands::Htp(args)) => run_htp(&args),
        Some(Commands::Selfplay { engine, games }) => run_selfplay(&engine, games),
        Some(Commands::Demo(args)) => run_demo(&args),
        None => run_demo(&EngineArgs {
            size: DEFAULT_BOARD_SIZE,
            depth: DEFAULT_DEPTH,
            seed: DEFAULT_SEED,
            evaluation: EvaluationArg::Mixed,
            exact_tt: false,
        }),
    }
}

fn run_htp(args: &EngineArgs) -> Result<()> {
    let config = args.search_config()?;
    let mut engine = HtpEngine::with_config(args.size, config);
    engine
        .run(io::stdin().lock(), io::stdout().lock())
        .context("HTP session failed")
}

fn run_selfplay(args: &EngineArgs, games: u32) -> Result<()> {
    let config = args.search_config()?;
    let mut game = Game::new(
        args.size,
        PlayerKind::minimax(config),
        PlayerKind::random(args.seed),
    );
    let stats = game.run_match(games);

    println!("{} games on {}x{}", stats.games, args.size, args.size);
    for player in [Player::A, Player::B] {
        println!(
            "  {player}: {} wins ({:.1}%)",
            stats.wins[player.index()],
            stats.win_rate(player) * 100.0
        );
    }
    if stats.games > 0 {
        println!(
            "  average length: {:.1} moves",
            stats.total_moves as f64 / f64::from(stats.games)
        );
    }
    Ok(())
}

fn run_demo(args: &EngineArgs) -> Result<()> {
    let config = args.search_config()?;
    println!("Hex-Engine: alpha-beta Hex player\n");

    let mut board = Board::new(args.size);
    let mut searcher = Searcher::new(config);
    let mut to_move = Player::A;

    println!("=== Opening ({} plies deep) ===", config.max_depth);
    for _ in 0..4 {
        let result = searcher.search(&mut board, to_move);
        let Some(tile) = result.best_move else {
            break;
        };
        board
            .apply_move(tile, to_move)
            .context("search proposed an illegal move")?;
        println!(
            "{to_move} plays {tile} (score {:.2}, {} nodes, {} cutoffs)",
            result.score, result.stats.nodes, result.stats.cutoffs
        );
        to_move = to_move.opponent();
    }
    println!("\n{board}");
    println!(
        "Transposition table: {} positions",
        searcher.transposition_table().len()
    );
    Ok(())
}
