//! # vf-sim — cash-game Monte Carlo
//!
//! Block-sampled sample paths and drawdown statistics for the fixed-edge
//! model in [`vf_stats`](../vf_stats/index.html).
//!
//! ## Architecture
//!
//! ```text
//! Mulberry32 (seeded)
//!     │
//!     ├── PathSimulator ──> SimulationPath (points, final value, max drawdown)
//!     │
//!     ├── batch_analysis ──> DownswingStats (per-threshold crossings, recovery)
//!     │
//!     └── single_threshold_probability ──> DownswingEstimate (early exit)
//! ```
//!
//! Every routine is deterministic for a given generator state and reports
//! progress through a [`vf_core::Checkpoint`].

pub mod downswing;
pub mod path;

pub use downswing::*;
pub use path::*;
