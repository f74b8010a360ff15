//! # vf-stats — closed-form variance statistics
//!
//! ## Modules
//!
//! - [`normal`]: standard normal CDF / inverse CDF approximations
//! - [`cash`]: expected value, confidence bands, risk of ruin, downswing
//!   probability and bankroll sizing for the fixed-edge cash-game model
//!
//! ```rust,ignore
//! use vf_stats::{GameParameters, CashGameSummary};
//!
//! let summary = CashGameSummary::compute(&GameParameters::new(2.5, 75.0, 10_000));
//! assert_eq!(summary.expected_value, 250.0);
//! ```

pub mod cash;
pub mod normal;

pub use cash::*;
pub use normal::{Z_70, Z_95};
