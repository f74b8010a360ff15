//! Cash-game statistics
//!
//! Fixed-edge model: each trial is an independent draw whose mean and
//! standard deviation are quoted per 100 trials (`winrate`, `std_dev`). All
//! functions are pure and return documented sentinels (0, 1, infinity) for
//! degenerate inputs instead of failing. Callers validate finiteness first,
//! see [`GameParameters::validate`].

use serde::{Deserialize, Serialize};

use vf_core::{TRIALS_PER_UNIT, VfError, VfResult, ensure_finite};

use crate::normal::{Z_70, Z_95, cdf, inverse_cdf};

/// Parameters of the fixed-edge model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameParameters {
    /// Mean value per 100 trials (signed)
    pub winrate: f64,
    /// Standard deviation per 100 trials
    pub std_dev: f64,
    /// Number of trials
    pub trials: u64,
}

impl GameParameters {
    pub fn new(winrate: f64, std_dev: f64, trials: u64) -> Self {
        Self { winrate, std_dev, trials }
    }

    /// Reject non-finite values and negative standard deviations
    pub fn validate(&self) -> VfResult<()> {
        ensure_finite("winrate", self.winrate)?;
        ensure_finite("standard deviation", self.std_dev)?;
        if self.std_dev < 0.0 {
            return Err(VfError::invalid(format!(
                "standard deviation must not be negative, got {}",
                self.std_dev
            )));
        }
        Ok(())
    }
}

/// Closed interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    #[serde(with = "vf_core::serde_float")]
    pub lower: f64,
    #[serde(with = "vf_core::serde_float")]
    pub upper: f64,
}

impl Interval {
    pub fn centered(center: f64, half_width: f64) -> Self {
        Self { lower: center - half_width, upper: center + half_width }
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.lower..=self.upper).contains(&value)
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

#[inline]
fn units(trials: u64) -> f64 {
    trials as f64 / TRIALS_PER_UNIT
}

/// `winrate * trials / 100`
pub fn expected_value(trials: u64, winrate: f64) -> f64 {
    winrate * units(trials)
}

/// `std_dev * sqrt(trials / 100)`
pub fn value_std_dev(trials: u64, std_dev: f64) -> f64 {
    std_dev * units(trials).sqrt()
}

/// Standard error of the observed winrate, `std_dev / sqrt(trials / 100)`.
/// Infinite when `trials == 0`.
pub fn standard_error(trials: u64, std_dev: f64) -> f64 {
    if trials == 0 {
        return f64::INFINITY;
    }
    std_dev / units(trials).sqrt()
}

/// `EV ± z * value_std_dev`
pub fn confidence_interval(trials: u64, winrate: f64, std_dev: f64, z: f64) -> Interval {
    Interval::centered(
        expected_value(trials, winrate),
        z * value_std_dev(trials, std_dev),
    )
}

/// P(total value < 0) after `trials`
pub fn probability_of_loss(trials: u64, winrate: f64, std_dev: f64) -> f64 {
    let ev = expected_value(trials, winrate);
    let sd = value_std_dev(trials, std_dev);
    if ev == 0.0 {
        return 0.5;
    }
    if sd == 0.0 {
        return if ev < 0.0 { 1.0 } else { 0.0 };
    }
    cdf(-ev / sd)
}

/// Probability of ever losing `bankroll`, `exp(-2 * winrate * bankroll / std_dev^2)`.
///
/// Brownian motion with drift; the per-100 scaling of mean and variance
/// cancels. 1 for `winrate <= 0` or `bankroll <= 0`.
pub fn risk_of_ruin(winrate: f64, bankroll: f64, std_dev: f64) -> f64 {
    if winrate <= 0.0 || bankroll <= 0.0 {
        return 1.0;
    }
    if std_dev == 0.0 {
        return 0.0;
    }
    (-2.0 * winrate * bankroll / (std_dev * std_dev))
        .exp()
        .clamp(0.0, 1.0)
}

/// Bankroll whose risk of ruin equals `target_ror`.
/// Infinite for `winrate <= 0` or `target_ror <= 0`, zero for `target_ror >= 1`.
pub fn bankroll_for_risk_of_ruin(winrate: f64, target_ror: f64, std_dev: f64) -> f64 {
    if winrate <= 0.0 || target_ror <= 0.0 {
        return f64::INFINITY;
    }
    if target_ror >= 1.0 {
        return 0.0;
    }
    -(std_dev * std_dev) * target_ror.ln() / (2.0 * winrate)
}

/// Probability of ever falling `threshold` below a running peak.
///
/// Same functional form as [`risk_of_ruin`], with the threshold playing the
/// bankroll.
pub fn downswing_probability(threshold: f64, winrate: f64, std_dev: f64) -> f64 {
    risk_of_ruin(winrate, threshold, std_dev)
}

/// Outcome at quantile `q` of the total-value distribution
pub fn percentile_outcome(trials: u64, winrate: f64, std_dev: f64, q: f64) -> f64 {
    let ev = expected_value(trials, winrate);
    let sd = value_std_dev(trials, std_dev);
    if sd == 0.0 {
        return ev;
    }
    ev + inverse_cdf(q) * sd
}

/// Quantile of `outcome` in the total-value distribution
pub fn outcome_percentile(trials: u64, winrate: f64, std_dev: f64, outcome: f64) -> f64 {
    let ev = expected_value(trials, winrate);
    let sd = value_std_dev(trials, std_dev);
    if sd == 0.0 {
        return if outcome < ev { 0.0 } else { 1.0 };
    }
    cdf((outcome - ev) / sd)
}

/// Interval for the true winrate given an observed one.
///
/// Uses the sampling distribution of the observed winrate as a stand-in for a
/// flat-prior posterior.
pub fn winrate_confidence_interval(
    trials: u64,
    observed_winrate: f64,
    std_dev: f64,
    z: f64,
) -> Interval {
    Interval::centered(observed_winrate, z * standard_error(trials, std_dev))
}

/// P(true winrate > threshold) under the same sampling-distribution
/// approximation as [`winrate_confidence_interval`].
pub fn probability_true_value_above(
    trials: u64,
    observed_winrate: f64,
    std_dev: f64,
    threshold: f64,
) -> f64 {
    let se = standard_error(trials, std_dev);
    if !se.is_finite() {
        return 0.5;
    }
    if se == 0.0 {
        return match observed_winrate.partial_cmp(&threshold) {
            Some(std::cmp::Ordering::Greater) => 1.0,
            Some(std::cmp::Ordering::Less) => 0.0,
            _ => 0.5,
        };
    }
    1.0 - cdf((threshold - observed_winrate) / se)
}

/// Trials needed for the expected value to sit `z` standard deviations above
/// zero, `100 * (z * std_dev / winrate)^2`. Infinite for `winrate <= 0`.
pub fn trials_for_confidence(winrate: f64, std_dev: f64, z: f64) -> f64 {
    if winrate <= 0.0 {
        return f64::INFINITY;
    }
    TRIALS_PER_UNIT * (z * std_dev / winrate).powi(2)
}

/// Every closed-form statistic for one parameter set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashGameSummary {
    pub params: GameParameters,
    pub expected_value: f64,
    pub value_std_dev: f64,
    /// Infinite with zero trials
    #[serde(with = "vf_core::serde_float")]
    pub standard_error: f64,
    pub interval_70: Interval,
    pub interval_95: Interval,
    pub probability_of_loss: f64,
    /// 95% interval for the true winrate, treating the input winrate as observed
    pub winrate_interval_95: Interval,
    /// P(true winrate > 0), same approximation
    pub probability_winner: f64,
    /// Trials for the 95% lower band to clear zero; infinite for `winrate <= 0`
    #[serde(with = "vf_core::serde_float")]
    pub trials_for_confidence_95: f64,
}

impl CashGameSummary {
    pub fn compute(params: &GameParameters) -> Self {
        let GameParameters { winrate, std_dev, trials } = *params;
        Self {
            params: *params,
            expected_value: expected_value(trials, winrate),
            value_std_dev: value_std_dev(trials, std_dev),
            standard_error: standard_error(trials, std_dev),
            interval_70: confidence_interval(trials, winrate, std_dev, Z_70),
            interval_95: confidence_interval(trials, winrate, std_dev, Z_95),
            probability_of_loss: probability_of_loss(trials, winrate, std_dev),
            winrate_interval_95: winrate_confidence_interval(trials, winrate, std_dev, Z_95),
            probability_winner: probability_true_value_above(trials, winrate, std_dev, 0.0),
            trials_for_confidence_95: trials_for_confidence(winrate, std_dev, Z_95),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_defining_formulas() {
        assert_eq!(expected_value(10_000, 2.5), 250.0);
        assert_eq!(value_std_dev(10_000, 75.0), 750.0);
        assert_eq!(standard_error(10_000, 75.0), 7.5);
        assert_eq!(standard_error(0, 75.0), f64::INFINITY);
    }

    #[test]
    fn test_confidence_interval() {
        let band = confidence_interval(10_000, 2.5, 75.0, Z_95);
        assert_abs_diff_eq!(band.lower, 250.0 - 1.959964 * 750.0, epsilon = 1e-9);
        assert_abs_diff_eq!(band.upper, 250.0 + 1.959964 * 750.0, epsilon = 1e-9);
        assert!(band.contains(250.0));
        let narrow = confidence_interval(10_000, 2.5, 75.0, Z_70);
        assert!(narrow.width() < band.width());
    }

    #[test]
    fn test_probability_of_loss() {
        for trials in [1, 100, 12_345, 1_000_000] {
            assert_eq!(probability_of_loss(trials, 0.0, 80.0), 0.5);
        }
        let p = probability_of_loss(10_000, 2.5, 75.0);
        assert_abs_diff_eq!(p, cdf(-250.0 / 750.0), epsilon = 1e-15);
        assert!(p < 0.5);
        assert!(probability_of_loss(10_000, -2.5, 75.0) > 0.5);
        assert_eq!(probability_of_loss(10_000, 2.5, 0.0), 0.0);
        assert_eq!(probability_of_loss(10_000, -2.5, 0.0), 1.0);
        assert_eq!(probability_of_loss(0, 2.5, 75.0), 0.5);
    }

    #[test]
    fn test_risk_of_ruin_edges() {
        assert_eq!(risk_of_ruin(0.0, 1000.0, 80.0), 1.0);
        assert_eq!(risk_of_ruin(-1.0, 1000.0, 80.0), 1.0);
        assert_eq!(risk_of_ruin(5.0, 0.0, 80.0), 1.0);
        assert_eq!(risk_of_ruin(5.0, 1000.0, 0.0), 0.0);
        assert_abs_diff_eq!(
            risk_of_ruin(5.0, 3000.0, 100.0),
            (-2.0 * 5.0 * 3000.0 / 10_000.0_f64).exp(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_risk_of_ruin_monotonicity() {
        let mut prev = 1.0;
        for winrate in [0.5, 1.0, 2.0, 4.0, 8.0] {
            let ror = risk_of_ruin(winrate, 2000.0, 90.0);
            assert!(ror < prev);
            prev = ror;
        }
        let mut prev = 0.0;
        for sd in [40.0, 60.0, 80.0, 120.0] {
            let ror = risk_of_ruin(3.0, 2000.0, sd);
            assert!(ror > prev);
            prev = ror;
        }
    }

    #[test]
    fn test_downswing_probability_matches_ruin_form() {
        assert_eq!(downswing_probability(500.0, 0.0, 80.0), 1.0);
        assert_eq!(downswing_probability(0.0, 5.0, 80.0), 1.0);
        assert_eq!(
            downswing_probability(1500.0, 4.0, 85.0),
            risk_of_ruin(4.0, 1500.0, 85.0)
        );
        assert!(downswing_probability(1000.0, 4.0, 85.0) > downswing_probability(2000.0, 4.0, 85.0));
    }

    #[test]
    fn test_bankroll_inverts_risk_of_ruin() {
        let bankroll = bankroll_for_risk_of_ruin(3.0, 0.05, 90.0);
        assert_abs_diff_eq!(risk_of_ruin(3.0, bankroll, 90.0), 0.05, epsilon = 1e-12);
        assert_eq!(bankroll_for_risk_of_ruin(0.0, 0.05, 90.0), f64::INFINITY);
        assert_eq!(bankroll_for_risk_of_ruin(3.0, 0.0, 90.0), f64::INFINITY);
        assert_eq!(bankroll_for_risk_of_ruin(3.0, 1.0, 90.0), 0.0);
    }

    #[test]
    fn test_percentile_round_trip() {
        let (trials, winrate, sd) = (50_000, 3.0, 95.0);
        for q in [0.05, 0.25, 0.5, 0.75, 0.95] {
            let outcome = percentile_outcome(trials, winrate, sd, q);
            assert_abs_diff_eq!(outcome_percentile(trials, winrate, sd, outcome), q, epsilon = 1e-6);
        }
        assert_abs_diff_eq!(
            percentile_outcome(trials, winrate, sd, 0.5),
            expected_value(trials, winrate),
            epsilon = 1e-9
        );
        assert_eq!(percentile_outcome(trials, winrate, 0.0, 0.05), 1500.0);
        assert_eq!(outcome_percentile(trials, winrate, 0.0, 1499.0), 0.0);
    }

    #[test]
    fn test_winrate_interval_and_probability_above() {
        let interval = winrate_confidence_interval(10_000, 2.5, 75.0, Z_95);
        assert_abs_diff_eq!(interval.lower, 2.5 - Z_95 * 7.5, epsilon = 1e-12);
        let p = probability_true_value_above(10_000, 2.5, 75.0, 0.0);
        assert_abs_diff_eq!(p, 1.0 - probability_of_loss(10_000, 2.5, 75.0), epsilon = 1e-12);
        assert_eq!(probability_true_value_above(0, 2.5, 75.0, 0.0), 0.5);
        assert_eq!(probability_true_value_above(100, 2.5, 0.0, 0.0), 1.0);
        assert_eq!(probability_true_value_above(100, 2.5, 0.0, 2.5), 0.5);
    }

    #[test]
    fn test_trials_for_confidence() {
        let n = trials_for_confidence(2.5, 75.0, Z_95);
        assert_abs_diff_eq!(n, 100.0 * (Z_95 * 30.0_f64).powi(2), epsilon = 1e-6);
        // At that volume the lower 95% band sits at zero
        let band = confidence_interval(n.round() as u64, 2.5, 75.0, Z_95);
        assert_abs_diff_eq!(band.lower, 0.0, epsilon = 0.5);
        assert_eq!(trials_for_confidence(-1.0, 75.0, Z_95), f64::INFINITY);
    }

    #[test]
    fn test_validate() {
        assert!(GameParameters::new(2.5, 75.0, 1000).validate().is_ok());
        assert!(GameParameters::new(2.5, 0.0, 1000).validate().is_ok());
        assert!(GameParameters::new(f64::NAN, 75.0, 1000).validate().is_err());
        assert!(GameParameters::new(2.5, -1.0, 1000).validate().is_err());
    }

    #[test]
    fn test_summary() {
        let summary = CashGameSummary::compute(&GameParameters::new(2.5, 75.0, 10_000));
        assert_eq!(summary.expected_value, 250.0);
        assert_eq!(summary.value_std_dev, 750.0);
        assert!(summary.probability_winner > 0.5);
        assert!(summary.interval_70.width() < summary.interval_95.width());
    }
}
