//! Error types for VarianceForge

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum VfError {
    /// Input rejected before any simulation work started
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A checkpoint asked the running computation to stop
    #[error("Computation cancelled")]
    Cancelled,

    #[error("Root not bracketed on [{lo}, {hi}]: f(lo) = {f_lo}, f(hi) = {f_hi}")]
    RootNotBracketed {
        lo: f64,
        hi: f64,
        f_lo: f64,
        f_hi: f64,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl VfError {
    /// Shorthand for a validation failure
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Result type alias
pub type VfResult<T> = Result<T, VfError>;

/// Reject non-finite values with a descriptive message.
pub fn ensure_finite(name: &str, value: f64) -> VfResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(VfError::invalid(format!("{name} must be a finite number, got {value}")))
    }
}

/// Largest accepted run count (simulations, trials, paths) per request
pub const MAX_RUN_COUNT: u64 = 10_000_000;

/// Require `1 <= count <= limit`.
pub fn ensure_count(name: &str, count: u64, limit: u64) -> VfResult<u64> {
    if count == 0 {
        Err(VfError::invalid(format!("{name} must be at least 1")))
    } else if count > limit {
        Err(VfError::invalid(format!("{name} must be at most {limit}, got {count}")))
    } else {
        Ok(count)
    }
}

/// Kinds of non-fatal fitting problems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Requested top prize was outside what the payout curve family can pay
    TopPrizeClamped,
    /// Requested ROI exceeded what always finishing first can return
    RoiAboveMaximum,
    /// Requested ROI was below what the skill bound allows
    RoiBelowMinimum,
    /// Bisection ran out of iterations before reaching tolerance
    NotConverged,
}

/// Convergence warning attached to a fitted model or result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        let message = message.into();
        log::warn!("{message}");
        Self { kind, message }
    }
}
