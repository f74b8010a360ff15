//! Power-law payout curve
//!
//! Paid place `i` (1-based) receives weight `i^-α`; prizes are the weights
//! normalised to the prize pool. α is fitted so the winner receives the
//! requested top prize.

use serde::{Deserialize, Serialize};

use vf_core::{VfError, VfResult, Warning, WarningKind, ensure_finite, solve};

/// Search range for the curve exponent
pub const ALPHA_MIN: f64 = 0.0;
pub const ALPHA_MAX: f64 = 10.0;
const MAX_ITERATIONS: u32 = 60;
const RELATIVE_TOLERANCE: f64 = 1e-12;

/// Fitted payout structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutModel {
    pub field_size: u32,
    pub percent_paid: f64,
    pub buy_in: f64,
    pub num_paid: u32,
    pub prize_pool: f64,
    /// Fitted curve exponent
    pub alpha: f64,
    /// Top prize after clamping to the feasible range
    pub target_top_prize: f64,
    /// Prize per paid place, best first
    pub prizes: Vec<f64>,
    pub warnings: Vec<Warning>,
}

/// `Σ_{i=1..n} i^-α`
fn weight_sum(alpha: f64, num_paid: u32) -> f64 {
    (1..=num_paid).map(|place| (place as f64).powf(-alpha)).sum()
}

/// Number of paid places: `floor(field · pct / 100)` clamped to `[1, field]`
pub fn paid_places(field_size: u32, percent_paid: f64) -> u32 {
    let raw = (field_size as f64 * percent_paid / 100.0).floor();
    (raw as u32).clamp(1, field_size.max(1))
}

impl PayoutModel {
    /// Fit the curve exponent to `top_prize_multiple · buy_in`.
    ///
    /// Targets outside `[pool / num_paid, top prize at α = ALPHA_MAX]` are
    /// clamped and reported as a [`WarningKind::TopPrizeClamped`] warning. The
    /// upper end sits just below winner-take-all whenever more than one place
    /// is paid.
    pub fn fit(
        field_size: u32,
        percent_paid: f64,
        buy_in: f64,
        top_prize_multiple: f64,
    ) -> VfResult<Self> {
        if field_size < 2 {
            return Err(VfError::invalid(format!(
                "field size must be at least 2, got {field_size}"
            )));
        }
        ensure_finite("percent paid", percent_paid)?;
        if percent_paid <= 0.0 || percent_paid > 100.0 {
            return Err(VfError::invalid(format!(
                "percent paid must be in (0, 100], got {percent_paid}"
            )));
        }
        ensure_finite("buy-in", buy_in)?;
        if buy_in <= 0.0 {
            return Err(VfError::invalid(format!("buy-in must be positive, got {buy_in}")));
        }
        ensure_finite("top prize multiple", top_prize_multiple)?;
        if top_prize_multiple <= 0.0 {
            return Err(VfError::invalid(format!(
                "top prize multiple must be positive, got {top_prize_multiple}"
            )));
        }

        let num_paid = paid_places(field_size, percent_paid);
        let prize_pool = field_size as f64 * buy_in;
        let top_at = |alpha: f64| prize_pool / weight_sum(alpha, num_paid);

        let mut warnings = Vec::new();
        let requested = top_prize_multiple * buy_in;
        let equal_split = top_at(ALPHA_MIN);
        let steepest = top_at(ALPHA_MAX);
        let target = requested.clamp(equal_split, steepest);
        if target != requested {
            warnings.push(Warning::new(
                WarningKind::TopPrizeClamped,
                format!(
                    "top prize {requested:.2} is outside the feasible range \
                     [{equal_split:.2}, {steepest:.2}]; using {target:.2}"
                ),
            ));
        }

        let alpha = if target <= equal_split {
            ALPHA_MIN
        } else if target >= steepest {
            ALPHA_MAX
        } else {
            let fit = solve(
                |alpha| top_at(alpha) - target,
                ALPHA_MIN,
                ALPHA_MAX,
                MAX_ITERATIONS,
                target * RELATIVE_TOLERANCE,
            )?;
            if !fit.converged {
                warnings.push(Warning::new(
                    WarningKind::NotConverged,
                    format!(
                        "payout exponent search stopped after {} iterations (residual {:.3e})",
                        fit.iterations, fit.residual
                    ),
                ));
            }
            fit.root
        };

        let total = weight_sum(alpha, num_paid);
        let prizes = (1..=num_paid)
            .map(|place| (place as f64).powf(-alpha) / total * prize_pool)
            .collect();

        log::debug!(
            "payout fit: field {field_size}, {num_paid} paid, pool {prize_pool}, alpha {alpha:.6}"
        );

        Ok(Self {
            field_size,
            percent_paid,
            buy_in,
            num_paid,
            prize_pool,
            alpha,
            target_top_prize: target,
            prizes,
            warnings,
        })
    }

    /// Prize for first place
    pub fn top_prize(&self) -> f64 {
        self.prizes.first().copied().unwrap_or(0.0)
    }

    /// Smallest paid prize
    pub fn min_cash(&self) -> f64 {
        self.prizes.last().copied().unwrap_or(0.0)
    }

    /// Prize for a 1-based finishing place; 0 outside the money
    pub fn prize_for_place(&self, place: u32) -> f64 {
        match place {
            0 => 0.0,
            p => self.prizes.get(p as usize - 1).copied().unwrap_or(0.0),
        }
    }
}
