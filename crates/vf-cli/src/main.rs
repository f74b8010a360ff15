//! VarianceForge command line
//!
//! Usage:
//!   varianceforge summary --winrate 2.5 --std-dev 80 --trials 100000
//!   varianceforge cash --winrate 2.5 --std-dev 80 --trials 100000 --mode accurate
//!   varianceforge downswing --winrate 2.5 --std-dev 80 --trials 100000 --threshold 1000
//!   varianceforge tournament --field 1000 --paid 20 --buy-in 22 --fee 2 --top 50 --roi 10
//!   varianceforge request job.json      (or - for stdin; prints one message per line)
//!
//! Set RUST_LOG=info to see progress on stderr.

use std::fs;
use std::io::{self, Read};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use vf_engine::{
    Dispatcher, EngineMessage, EngineRequest, GameParameters, SimulationMode,
    TournamentParameters, execute,
};

#[derive(Parser)]
#[command(name = "varianceforge", version, about = "Variance, downswing and bankroll calculator")]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Closed-form statistics for a cash game
    Summary {
        #[command(flatten)]
        game: GameArgs,
    },
    /// Sample paths and downswing statistics for a cash game
    Cash {
        #[command(flatten)]
        game: GameArgs,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Probability of a drawdown of at least THRESHOLD
    Downswing {
        #[command(flatten)]
        game: GameArgs,
        /// Drawdown size in value units
        #[arg(long)]
        threshold: f64,
        /// Number of simulated runs (defaults to the mode preset)
        #[arg(long)]
        simulations: Option<u64>,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Fit a tournament model; add --tournaments to simulate it
    Tournament {
        #[command(flatten)]
        structure: TournamentArgs,
        /// Tournaments per simulated trial
        #[arg(long)]
        tournaments: Option<u64>,
        /// Simulated trials (defaults to the mode preset)
        #[arg(long)]
        trials: Option<u64>,
        /// Starting bankroll for the bust probability
        #[arg(long, default_value_t = 0.0)]
        bankroll: f64,
        /// Drawdown thresholds, comma separated
        #[arg(long, value_delimiter = ',')]
        thresholds: Vec<f64>,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Run a JSON request document
    Request {
        /// Request file, or - for stdin
        path: PathBuf,
    },
}

#[derive(Args)]
struct GameArgs {
    /// Value won per 100 trials
    #[arg(long, allow_negative_numbers = true)]
    winrate: f64,
    /// Standard deviation per 100 trials
    #[arg(long)]
    std_dev: f64,
    /// Number of trials
    #[arg(long)]
    trials: u64,
}

impl GameArgs {
    fn params(&self) -> GameParameters {
        GameParameters::new(self.winrate, self.std_dev, self.trials)
    }
}

#[derive(Args)]
struct TournamentArgs {
    /// Number of entrants
    #[arg(long)]
    field: u32,
    /// Percentage of the field paid
    #[arg(long)]
    paid: f64,
    /// Buy-in (prize-pool contribution)
    #[arg(long)]
    buy_in: f64,
    /// Fee per entry
    #[arg(long, default_value_t = 0.0)]
    fee: f64,
    /// First prize as a multiple of the buy-in
    #[arg(long)]
    top: f64,
    /// Target ROI in percent
    #[arg(long, allow_negative_numbers = true)]
    roi: f64,
}

impl TournamentArgs {
    fn params(&self) -> TournamentParameters {
        TournamentParameters {
            field_size: self.field,
            percent_paid: self.paid,
            buy_in: self.buy_in,
            fee: self.fee,
            top_prize_multiple: self.top,
            roi_target_percent: self.roi,
        }
    }
}

#[derive(Args)]
struct RunArgs {
    /// Precision preset
    #[arg(long, value_enum, default_value_t = Mode::Fast)]
    mode: Mode,
    /// Seed (0..=4294967295); random when omitted
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Turbo,
    Fast,
    Accurate,
}

impl From<Mode> for SimulationMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Turbo => SimulationMode::Turbo,
            Mode::Fast => SimulationMode::Fast,
            Mode::Accurate => SimulationMode::Accurate,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let request = match cli.command {
        Commands::Request { path } => return run_document(&path),
        Commands::Summary { game } => EngineRequest::CashSummary { params: game.params() },
        Commands::Cash { game, run } => EngineRequest::CashGame {
            params: game.params(),
            mode: run.mode.into(),
            config: None,
            seed: run.seed,
        },
        Commands::Downswing { game, threshold, simulations, run } => EngineRequest::Downswing {
            trials: game.trials,
            winrate: game.winrate,
            std_dev: game.std_dev,
            threshold,
            num_simulations: simulations,
            mode: run.mode.into(),
            config: None,
            seed: run.seed,
        },
        Commands::Tournament { structure, tournaments: None, .. } => {
            EngineRequest::TournamentModel { params: structure.params() }
        }
        Commands::Tournament {
            structure,
            tournaments: Some(tournaments),
            trials,
            bankroll,
            thresholds,
            run,
        } => EngineRequest::TournamentSimulation {
            params: structure.params(),
            tournaments,
            num_trials: trials,
            bankroll,
            thresholds,
            mode: run.mode.into(),
            config: None,
            seed: run.seed,
        },
    };

    let mut next_report = 0.1;
    let mut report = |fraction: f64| {
        if fraction >= next_report {
            log::info!("{:.0}%", fraction * 100.0);
            next_report = (fraction * 10.0).floor() / 10.0 + 0.1;
        }
        ControlFlow::Continue(())
    };
    let response = execute(&request, &mut report).context("engine operation failed")?;
    print_json(&response, cli.pretty)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

/// Stream every message of a JSON request, one per line
fn run_document(path: &Path) -> Result<()> {
    let text = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).context("Failed to read request from stdin")?;
        buffer
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path.display()))?
    };

    let mut failed = None;
    let mut output = Ok(());
    Dispatcher::new().dispatch_json(&text, |message| {
        if let EngineMessage::Error { message } = &message {
            failed = Some(message.clone());
        }
        if output.is_ok() {
            output = message.to_json().map(|line| println!("{line}"));
        }
    });
    output.context("Failed to serialize message")?;

    if let Some(message) = failed {
        bail!("request failed: {message}");
    }
    Ok(())
}
