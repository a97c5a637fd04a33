//! Recon: sample agents for Reconnaissance Chess.
//!
//! ## Usage
//!
//! - `recon replay game.json` - Replay a scripted game through the greedy agent
//! - `recon replay game.json --preset minimax --board` - Same, drawing the belief board
//! - `recon config --preset minimax` - Print a preset configuration as TOML

mod display;
mod script;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use recon_agents::{AgentConfig, Player, RandomAgent, ReconAgent, Turn};
use recon_core::{Board, Color};
use script::GameScript;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Recon: heuristic Reconnaissance Chess agents
#[derive(Parser)]
#[command(name = "recon")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed a JSON game script to an agent and print its decisions
    Replay {
        script: PathBuf,
        #[arg(long, value_enum, default_value_t = Preset::Greedy)]
        preset: Preset,
        /// TOML agent configuration, replaces the preset
        #[arg(long)]
        config: Option<PathBuf>,
        /// Seed for the agent's random choices
        #[arg(long)]
        seed: Option<u64>,
        /// Draw the belief board after every turn
        #[arg(long)]
        board: bool,
    },
    /// Print an agent configuration as TOML
    Config {
        #[arg(long, value_enum, default_value_t = Preset::Greedy)]
        preset: Preset,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Preset {
    Greedy,
    Minimax,
    Random,
}

impl Preset {
    fn config(self) -> Option<AgentConfig> {
        match self {
            Preset::Greedy => Some(AgentConfig::greedy()),
            Preset::Minimax => Some(AgentConfig::minimax()),
            Preset::Random => None,
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Replay {
            script,
            preset,
            config,
            seed,
            board,
        } => run_replay(&script, preset, config.as_deref(), seed, board),
        Commands::Config { preset } => {
            let Some(config) = preset.config() else {
                bail!("the random agent has no configuration");
            };
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn run_replay(
    path: &Path,
    preset: Preset,
    config_path: Option<&Path>,
    seed: Option<u64>,
    show_board: bool,
) -> Result<()> {
    let script = GameScript::load(path)?;
    info!(
        script = %path.display(),
        color = %script.color,
        turns = script.turns.len(),
        "replaying"
    );

    let config = match config_path {
        Some(config_path) => Some(
            AgentConfig::load(config_path)
                .with_context(|| format!("failed to load {}", config_path.display()))?,
        ),
        None => preset.config(),
    };

    match config {
        Some(mut config) => {
            config.seed = seed.or(config.seed);
            let mut agent = ReconAgent::try_new(config).context("invalid agent configuration")?;
            let color = script.color;
            script::replay(&mut agent, &script, |agent, number, turn| {
                print_turn(agent.name(), number, turn);
                if show_board {
                    if let Some(board) = agent.board() {
                        draw(board, color, turn);
                    }
                }
            })?;
        }
        None => {
            let mut agent = match seed {
                Some(seed) => RandomAgent::with_seed(seed),
                None => RandomAgent::new(),
            };
            script::replay(&mut agent, &script, |agent, number, turn| {
                print_turn(agent.name(), number, turn);
            })?;
        }
    }

    if let Some(result) = &script.result {
        let winner = result
            .winner
            .map_or_else(|| "nobody".to_string(), |color| color.to_string());
        let reason = result
            .reason
            .map_or_else(|| "unknown reason".to_string(), |reason| reason.to_string());
        println!("Game over: {winner} wins by {reason}");
    }
    Ok(())
}

fn print_turn(name: &str, number: usize, turn: &Turn) {
    let show = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
    let sense = show(turn.sense.map(|square| square.to_string()));
    let requested = show(turn.requested_move.map(|mv| mv.to_string()));
    let taken = show(turn.taken_move.map(|mv| mv.to_string()));

    print!("{name} turn {number}: sense {sense}, move {requested}");
    if turn.requested_move != turn.taken_move {
        print!(" (taken {taken})");
    }
    if let Some(square) = turn.capture_square {
        print!(" captures on {square}");
    }
    println!();
}

fn draw(board: &Board, color: Color, turn: &Turn) {
    let mut stdout = io::stdout();
    if let Err(err) = display::draw_board(&mut stdout, board, color, turn.sense) {
        tracing::warn!(%err, "failed to draw board");
    }
}
