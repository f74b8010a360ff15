//! vf-core: Shared types, traits, and utilities for VarianceForge
//!
//! This crate provides the foundational pieces used across all VarianceForge
//! crates: the error type, the seeded PRNG, the bisection solver, progress
//! checkpoints, sample-path bookkeeping and quantile summaries.

mod error;
mod path;
mod progress;
mod quantile;
mod rng;
mod solve;

pub mod serde_float;

pub use error::*;
pub use path::*;
pub use progress::*;
pub use quantile::*;
pub use rng::*;
pub use solve::*;

/// Trials per rate unit: winrates and standard deviations are quoted per 100 trials
pub const TRIALS_PER_UNIT: f64 = 100.0;
