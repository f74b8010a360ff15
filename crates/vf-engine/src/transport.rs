//! Request/message envelope for host transports
//!
//! A host posts one [`EngineRequest`] and receives zero or more
//! `Progress` messages followed by exactly one `Result` or `Error`.
//!
//! ```text
//! {"type":"downswing","trials":100000,"winrate":2.5,"std_dev":80,"threshold":1000,"seed":42}
//!   -> {"type":"progress","fraction":0.01}
//!   -> ...
//!   -> {"type":"result","result":{"kind":"downswing","data":{...}}}
//! ```

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use vf_core::{Checkpoint, VfError, VfResult};
use vf_stats::{CashGameSummary, GameParameters};

use crate::cash::{
    CashGameSimulation, DownswingEstimateResult, run_cash_game_simulation, run_downswing_estimate,
};
use crate::config::{ModeConfig, SimulationMode};
use crate::params::{TournamentParameters, resolve_seed};
use crate::tournament::{
    TournamentModel, TournamentSimulation, build_tournament_model, run_tournament_simulation,
};

/// Operation requested by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineRequest {
    /// Closed-form statistics only
    CashSummary { params: GameParameters },
    CashGame {
        params: GameParameters,
        #[serde(default)]
        mode: SimulationMode,
        /// Overrides the preset selected by `mode`
        #[serde(default)]
        config: Option<ModeConfig>,
        #[serde(default)]
        seed: Option<u64>,
    },
    Downswing {
        trials: u64,
        winrate: f64,
        std_dev: f64,
        threshold: f64,
        /// Defaults to the mode's downswing simulation count
        #[serde(default)]
        num_simulations: Option<u64>,
        #[serde(default)]
        mode: SimulationMode,
        #[serde(default)]
        config: Option<ModeConfig>,
        #[serde(default)]
        seed: Option<u64>,
    },
    TournamentModel { params: TournamentParameters },
    TournamentSimulation {
        params: TournamentParameters,
        tournaments: u64,
        /// Defaults to the mode's tournament trial count
        #[serde(default)]
        num_trials: Option<u64>,
        bankroll: f64,
        #[serde(default)]
        thresholds: Vec<f64>,
        #[serde(default)]
        mode: SimulationMode,
        #[serde(default)]
        config: Option<ModeConfig>,
        #[serde(default)]
        seed: Option<u64>,
    },
}

/// Successful outcome of a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum EngineResponse {
    CashSummary(CashGameSummary),
    CashGame(CashGameSimulation),
    Downswing(DownswingEstimateResult),
    TournamentModel(TournamentModel),
    TournamentSimulation(TournamentSimulation),
}

/// Message sent back to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineMessage {
    Progress { fraction: f64 },
    Result { result: Box<EngineResponse> },
    Error { message: String },
}

impl EngineRequest {
    /// Parse a JSON request document
    pub fn from_json(text: &str) -> VfResult<Self> {
        serde_json::from_str(text).map_err(|e| VfError::invalid(format!("malformed request: {e}")))
    }
}

impl EngineMessage {
    pub fn to_json(&self) -> VfResult<String> {
        serde_json::to_string(self).map_err(|e| VfError::Serialization(e.to_string()))
    }
}

fn resolve_config(mode: SimulationMode, config: &Option<ModeConfig>) -> ModeConfig {
    config.clone().unwrap_or_else(|| ModeConfig::from_mode(mode))
}

/// Run one request to completion
pub fn execute<C>(request: &EngineRequest, checkpoint: &mut C) -> VfResult<EngineResponse>
where
    C: Checkpoint + ?Sized,
{
    match request {
        EngineRequest::CashSummary { params } => {
            params.validate()?;
            Ok(EngineResponse::CashSummary(CashGameSummary::compute(params)))
        }
        EngineRequest::CashGame { params, mode, config, seed } => {
            let config = resolve_config(*mode, config);
            let seed = resolve_seed(*seed)?;
            run_cash_game_simulation(params, &config, seed, checkpoint).map(EngineResponse::CashGame)
        }
        EngineRequest::Downswing {
            trials,
            winrate,
            std_dev,
            threshold,
            num_simulations,
            mode,
            config,
            seed,
        } => {
            let config = resolve_config(*mode, config);
            let seed = resolve_seed(*seed)?;
            run_downswing_estimate(
                *trials,
                *winrate,
                *std_dev,
                *threshold,
                num_simulations.unwrap_or(config.downswing_simulations),
                &config,
                seed,
                checkpoint,
            )
            .map(EngineResponse::Downswing)
        }
        EngineRequest::TournamentModel { params } => {
            build_tournament_model(params).map(EngineResponse::TournamentModel)
        }
        EngineRequest::TournamentSimulation {
            params,
            tournaments,
            num_trials,
            bankroll,
            thresholds,
            mode,
            config,
            seed,
        } => {
            let config = resolve_config(*mode, config);
            let seed = resolve_seed(*seed)?;
            let model = build_tournament_model(params)?;
            run_tournament_simulation(
                &model,
                *tournaments,
                num_trials.unwrap_or(config.tournament_trials),
                *bankroll,
                thresholds,
                seed,
                checkpoint,
            )
            .map(EngineResponse::TournamentSimulation)
        }
    }
}

/// Forwards progress to a message sink and honours a shared cancel flag
struct MessageCheckpoint<'a, F> {
    emit: &'a mut F,
    last: f64,
    cancelled: &'a AtomicBool,
}

impl<F: FnMut(EngineMessage)> Checkpoint for MessageCheckpoint<'_, F> {
    fn checkpoint(&mut self, fraction: f64) -> ControlFlow<()> {
        self.last = self.last.max(fraction);
        (self.emit)(EngineMessage::Progress { fraction: self.last });
        if self.cancelled.load(Ordering::Relaxed) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

/// Runs requests and reports through [`EngineMessage`]s
#[derive(Debug, Default, Clone)]
pub struct Dispatcher {
    cancelled: Arc<AtomicBool>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get cancel flag for sharing with another thread
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Stop the running request at its next progress report
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Run `request`, emitting progress and then one result or error message
    pub fn dispatch<F>(&self, request: &EngineRequest, mut emit: F)
    where
        F: FnMut(EngineMessage),
    {
        let outcome = {
            let mut checkpoint =
                MessageCheckpoint { emit: &mut emit, last: 0.0, cancelled: &self.cancelled };
            execute(request, &mut checkpoint)
        };
        match outcome {
            Ok(response) => emit(EngineMessage::Result { result: Box::new(response) }),
            Err(error) => {
                log::warn!("request failed: {error}");
                emit(EngineMessage::Error { message: error.to_string() })
            }
        }
    }

    /// Parse and run a JSON request; parse failures become an error message
    pub fn dispatch_json<F>(&self, text: &str, mut emit: F)
    where
        F: FnMut(EngineMessage),
    {
        match EngineRequest::from_json(text) {
            Ok(request) => self.dispatch(&request, emit),
            Err(error) => emit(EngineMessage::Error { message: error.to_string() }),
        }
    }
}

/// Run `request` on a fresh [`Dispatcher`]
pub fn dispatch<F>(request: &EngineRequest, emit: F)
where
    F: FnMut(EngineMessage),
{
    Dispatcher::new().dispatch(request, emit)
}
