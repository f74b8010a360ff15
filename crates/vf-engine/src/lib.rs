//! # vf-engine — VarianceForge operations
//!
//! Validated entry points over the statistics and Monte Carlo crates. Every
//! operation takes explicit parameters, a [`ModeConfig`], a seed and a
//! [`Checkpoint`](vf_core::Checkpoint) for progress and cancellation.
//!
//! ## Operations
//!
//! - [`run_cash_game_simulation`]: analytic summary, display paths, downswing batch
//! - [`run_downswing_estimate`]: early-exit single-threshold probability
//! - [`build_tournament_model`]: fitted payout/skill curves and outcome set
//! - [`run_tournament_simulation`]: tournament Monte Carlo with a bust track
//!
//! Hosts that exchange messages instead of calling functions use
//! [`transport`]: an [`EngineRequest`] in, progress/result/error
//! [`EngineMessage`]s out.

pub mod cash;
pub mod config;
pub mod params;
pub mod tournament;
pub mod transport;

mod stage;

pub use cash::*;
pub use config::*;
pub use params::*;
pub use tournament::*;
pub use transport::{Dispatcher, EngineMessage, EngineRequest, EngineResponse, dispatch, execute};

pub use vf_core::{Checkpoint, ProgressTracker, Unobserved, VfError, VfResult, Warning, WarningKind};
pub use vf_stats::{CashGameSummary, GameParameters};
