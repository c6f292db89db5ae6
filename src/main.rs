use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use flexi_logger::{AdaptiveFormat, Logger};
use indicatif::{ProgressBar, ProgressStyle};
use mc_2048::rollout::best_branch;
use mc_2048::{initialize, simple_best_move, Board, EngineError, MonteCarlo, Move, Policy, RolloutConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "mc2048", version, about = "Monte Carlo move advisor for 2048")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
    /// Log level spec (e.g. "info", "mc_2048=debug"); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play a game, taking every move from the Monte Carlo advisor
    Play {
        #[command(flatten)]
        rollout: RolloutArgs,
        /// Do not print the board after each move
        #[arg(long)]
        quiet: bool,
        /// Stop after this many moves
        #[arg(long)]
        max_moves: Option<u64>,
    },
    /// Print per-direction scores for one board as JSON
    Scores {
        /// Raw packed board, hex (with or without 0x)
        #[arg(long, value_parser = parse_board)]
        board: Board,
        #[command(flatten)]
        rollout: RolloutArgs,
        /// Write the JSON here instead of stdout
        #[arg(short = 'o', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Compare the greedy policies over many games
    BenchPolicies {
        /// Games per policy
        #[arg(long, default_value_t = 100)]
        games: u32,
        /// Policies to compare (names or ids, comma separated); all by default
        #[arg(long, value_delimiter = ',')]
        policies: Vec<Policy>,
        /// Base seed; games use seed + game index
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Debug, Args)]
struct RolloutArgs {
    /// Trials per legal direction
    #[arg(long, default_value_t = RolloutConfig::default().samples)]
    samples: u32,
    /// Policy moves per trial after the evaluated move
    #[arg(long, default_value_t = RolloutConfig::default().max_depth)]
    depth: u32,
    /// Policy used inside trials (name or id)
    #[arg(long, default_value_t = RolloutConfig::default().policy)]
    policy: Policy,
    /// Run trials on the current thread only
    #[arg(long)]
    sequential: bool,
    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

impl RolloutArgs {
    fn config(&self) -> RolloutConfig {
        RolloutConfig {
            samples: self.samples,
            max_depth: self.depth,
            policy: self.policy,
            parallel: !self.sequential,
        }
    }

    fn rng(&self) -> StdRng { seeded_rng(self.seed) }
}

#[derive(Debug, Serialize)]
struct ScoresReport {
    board: String,
    config: RolloutConfig,
    /// Illegal directions serialize as null.
    scores: [f64; 4],
    best_move: Option<Move>,
    trials: u64,
    plies: u64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _logger = Logger::try_with_env_or_str(&cli.log_level)?
        .log_to_stderr()
        .adaptive_format_for_stderr(AdaptiveFormat::Default)
        .start()?;
    initialize();

    let result = match cli.cmd {
        Command::Play { rollout, quiet, max_moves } => play(&rollout, quiet, max_moves),
        Command::Scores { board, rollout, out } => scores(board, &rollout, out),
        Command::BenchPolicies { games, policies, seed } => bench_policies(games, policies, seed),
    };
    if let Err(e) = &result {
        log::error!("fatal error: {e:#}");
    }
    result
}

fn play(args: &RolloutArgs, quiet: bool, max_moves: Option<u64>) -> anyhow::Result<()> {
    let mut rng = args.rng();
    let mut advisor = MonteCarlo::with_config(args.config());
    let mut board = Board::EMPTY.spawn_tile(&mut rng)?.spawn_tile(&mut rng)?;
    if !quiet {
        println!("{}", board);
    }

    let start = Instant::now();
    let mut move_count: u64 = 0;
    let mut score: u64 = 0;
    while !board.is_terminal() {
        let Some(dir) = advisor.best_move(board, &mut rng) else { break };
        let (next, gain) = board.apply(dir);
        board = next.spawn_tile(&mut rng)?;
        score += gain as u64;
        move_count += 1;
        log::info!("move {move_count}: {dir} (+{gain}), trials={}", advisor.last_stats().trials);
        if !quiet {
            println!("{dir}\n{board}");
        }
        if max_moves.is_some_and(|limit| move_count >= limit) {
            break;
        }
    }

    let elapsed = start.elapsed().as_secs_f64().max(1e-6);
    println!(
        "Moves: {} | score: {} | highest tile: {} | moves/sec: {:.1}",
        move_count,
        score,
        board.highest_tile(),
        move_count as f64 / elapsed
    );
    Ok(())
}

fn scores(board: Board, args: &RolloutArgs, out: Option<PathBuf>) -> anyhow::Result<()> {
    let mut rng = args.rng();
    let mut mc = MonteCarlo::with_config(args.config());
    let evals = mc.branch_evals(board, &mut rng);
    let stats = mc.last_stats();
    let report = ScoresReport {
        board: format!("{:#018x}", board.raw()),
        config: *mc.config(),
        scores: evals.map(|eval| eval.score),
        best_move: best_branch(&evals),
        trials: stats.trials,
        plies: stats.plies,
    };
    let json = serde_json::to_string_pretty(&report)?;
    match out {
        Some(path) => std::fs::write(&path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

#[derive(Debug, Default, Clone, Copy)]
struct GameSummary {
    score: u64,
    moves: u64,
    highest_tile: u32,
}

fn bench_policies(games: u32, policies: Vec<Policy>, seed: Option<u64>) -> anyhow::Result<()> {
    let policies = if policies.is_empty() { Policy::ALL.to_vec() } else { policies };
    let base_seed = seed.unwrap_or_else(|| rand::thread_rng().gen());

    let pb = ProgressBar::new(games as u64 * policies.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} games ({eta})")?
            .progress_chars("=>-"),
    );
    pb.enable_steady_tick(Duration::from_millis(120));

    let mut rows = Vec::with_capacity(policies.len());
    for policy in policies {
        let summaries = (0..games as u64)
            .into_par_iter()
            .map(|game| {
                let summary = play_greedy(policy, base_seed.wrapping_add(game));
                pb.inc(1);
                summary
            })
            .collect::<Result<Vec<GameSummary>, EngineError>>()?;
        rows.push((policy, summaries));
    }
    pb.finish_and_clear();

    println!("{:<12} {:>12} {:>10} {:>10}", "policy", "mean score", "mean moves", "best tile");
    for (policy, summaries) in rows {
        let n = summaries.len().max(1) as f64;
        let mean_score = summaries.iter().map(|s| s.score as f64).sum::<f64>() / n;
        let mean_moves = summaries.iter().map(|s| s.moves as f64).sum::<f64>() / n;
        let best_tile = summaries.iter().map(|s| s.highest_tile).max().unwrap_or(0);
        println!("{:<12} {:>12.1} {:>10.1} {:>10}", policy.name(), mean_score, mean_moves, best_tile);
    }
    Ok(())
}

fn play_greedy(policy: Policy, seed: u64) -> Result<GameSummary, EngineError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut board = Board::EMPTY.spawn_tile(&mut rng)?.spawn_tile(&mut rng)?;
    let mut summary = GameSummary::default();
    while let Some(dir) = simple_best_move(board, policy) {
        let (next, gain) = board.make_move(dir, &mut rng);
        board = next;
        summary.score += gain as u64;
        summary.moves += 1;
    }
    summary.highest_tile = board.highest_tile();
    Ok(summary)
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn parse_board(s: &str) -> Result<Board, String> {
    let digits = s.trim().trim_start_matches("0x").trim_start_matches("0X");
    u64::from_str_radix(digits, 16)
        .map(Board::from_raw)
        .map_err(|e| format!("invalid board {s:?}: {e}"))
}
