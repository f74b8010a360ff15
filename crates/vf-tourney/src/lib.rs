//! # vf-tourney — tournament variance model
//!
//! ## Modules
//!
//! - [`payout`]: power-law prize ladder fitted to a requested top prize
//! - [`skill`]: exponential-tilt finish distribution fitted to a target ROI
//! - [`outcome`]: "bust" plus one outcome per paid place
//! - [`monte_carlo`]: repeated sampling with a profit track and a bust track
//!
//! ## Architecture
//!
//! ```text
//! PayoutModel ──┐
//!               ├──> OutcomeSet ──> OutcomeSampler ──> MonteCarloResult
//! SkillModel ───┘
//! ```

pub mod monte_carlo;
pub mod outcome;
pub mod payout;
pub mod skill;

pub use monte_carlo::*;
pub use outcome::*;
pub use payout::*;
pub use skill::*;
