//! Skill-tilted finish distribution
//!
//! Finishing rank `k = 0..field-1` (0 is first place) has probability
//! proportional to `exp(a·k)` with `a = -β / (field - 1)`. β = 0 is a
//! uniformly random finish; larger β pushes mass toward the top. β is fitted
//! so the expected return over the paid places matches a target ROI.

use serde::{Deserialize, Serialize};

use vf_core::{VfError, VfResult, Warning, WarningKind, ensure_finite, solve};

use crate::payout::PayoutModel;

const MAX_ITERATIONS: u32 = 70;
const MAX_EXPANSIONS: u32 = 64;
/// Absolute ROI tolerance (ROI as a fraction of cost)
pub const ROI_TOLERANCE: f64 = 1e-9;
/// `exp(a · field)` must stay below `exp(700)`
const EXPONENT_LIMIT: f64 = 700.0;

/// Most negative β that keeps the tilt finite for a field
pub fn beta_lower_bound(field_size: u32) -> f64 {
    let n = field_size as f64;
    -EXPONENT_LIMIT * (n - 1.0) / n
}

/// Normalised `exp(a·k)` over `k = 0..field-1`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankDistribution {
    slope: f64,
    norm: f64,
}

impl RankDistribution {
    pub fn new(beta: f64, field_size: u32) -> Self {
        let n = field_size as f64;
        let slope = if field_size > 1 { -beta / (n - 1.0) } else { 0.0 };
        // Σ exp(a·k) = expm1(a·n) / expm1(a)
        let norm = if slope == 0.0 { 1.0 / n } else { slope.exp_m1() / (slope * n).exp_m1() };
        Self { slope, norm }
    }

    /// Probability of finishing at 0-based rank `k`
    #[inline]
    pub fn probability(&self, rank: u32) -> f64 {
        (self.slope * rank as f64).exp() * self.norm
    }
}

/// Expected prize for a given β
fn expected_prize(beta: f64, payout: &PayoutModel) -> f64 {
    let ranks = RankDistribution::new(beta, payout.field_size);
    payout
        .prizes
        .iter()
        .enumerate()
        .map(|(rank, prize)| ranks.probability(rank as u32) * prize)
        .sum()
}

/// Fitted skill tilt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillModel {
    pub beta: f64,
    /// Entry cost (buy-in plus fee)
    pub cost: f64,
    /// ROI as requested, before clamping (fraction of cost)
    pub roi_target: f64,
    pub achieved_roi: f64,
    /// ROI of always finishing first
    pub max_roi: f64,
    /// ROI at the most negative admissible β
    pub min_roi: f64,
    /// Probability of each paid place, best first
    pub place_probabilities: Vec<f64>,
    pub itm_probability: f64,
    pub bust_probability: f64,
    pub iterations: u32,
    pub warnings: Vec<Warning>,
}

impl SkillModel {
    /// Fit β so the expected ROI equals `roi_target` (a fraction: 0.2 is +20%).
    pub fn fit(payout: &PayoutModel, cost: f64, roi_target: f64) -> VfResult<Self> {
        ensure_finite("entry cost", cost)?;
        if cost <= 0.0 {
            return Err(VfError::invalid(format!("entry cost must be positive, got {cost}")));
        }
        ensure_finite("ROI target", roi_target)?;

        let roi = |beta: f64| expected_prize(beta, payout) / cost - 1.0;
        let max_roi = payout.top_prize() / cost - 1.0;
        let beta_min = beta_lower_bound(payout.field_size);
        let min_roi = roi(beta_min);

        let mut warnings = Vec::new();
        let mut target = roi_target;
        if target > max_roi {
            warnings.push(Warning::new(
                WarningKind::RoiAboveMaximum,
                format!(
                    "ROI target {:.2}% exceeds the maximum {:.2}% (always finishing first)",
                    roi_target * 100.0,
                    max_roi * 100.0
                ),
            ));
            target = max_roi;
        } else if target < min_roi {
            warnings.push(Warning::new(
                WarningKind::RoiBelowMinimum,
                format!(
                    "ROI target {:.2}% is below the minimum {:.2}% for this field",
                    roi_target * 100.0,
                    min_roi * 100.0
                ),
            ));
            target = min_roi;
        }

        let gap = |beta: f64| roi(beta) - target;
        let (beta, iterations) = fit_beta(gap, beta_min, &mut warnings)?;

        let ranks = RankDistribution::new(beta, payout.field_size);
        let place_probabilities: Vec<f64> =
            (0..payout.num_paid).map(|rank| ranks.probability(rank)).collect();
        let itm_probability = place_probabilities.iter().sum::<f64>().min(1.0);
        let achieved_roi = roi(beta);

        log::debug!(
            "skill fit: beta {beta:.6}, ROI {:.4}% (target {:.4}%), {iterations} iterations",
            achieved_roi * 100.0,
            target * 100.0
        );

        Ok(Self {
            beta,
            cost,
            roi_target,
            achieved_roi,
            max_roi,
            min_roi,
            place_probabilities,
            itm_probability,
            bust_probability: 1.0 - itm_probability,
            iterations,
            warnings,
        })
    }

    /// Probability of a 1-based paid place; 0 outside the money
    pub fn place_probability(&self, place: u32) -> f64 {
        match place {
            0 => 0.0,
            p => self.place_probabilities.get(p as usize - 1).copied().unwrap_or(0.0),
        }
    }
}

/// ROI is increasing in β: check β = 0, grow the bracket geometrically in
/// the needed direction, then bisect.
fn fit_beta<F>(mut gap: F, beta_min: f64, warnings: &mut Vec<Warning>) -> VfResult<(f64, u32)>
where
    F: FnMut(f64) -> f64,
{
    let at_zero = gap(0.0);
    if at_zero.abs() <= ROI_TOLERANCE {
        return Ok((0.0, 0));
    }

    let (mut lo, mut hi) = (0.0, 0.0);
    let mut step = 1.0;
    let mut expansions = 0;
    if at_zero < 0.0 {
        loop {
            lo = hi;
            hi = step;
            let g = gap(hi);
            expansions += 1;
            if g.abs() <= ROI_TOLERANCE {
                return Ok((hi, expansions));
            }
            if g > 0.0 || expansions >= MAX_EXPANSIONS {
                break;
            }
            step *= 2.0;
        }
    } else {
        loop {
            hi = lo;
            lo = (-step).max(beta_min);
            let g = gap(lo);
            expansions += 1;
            if g.abs() <= ROI_TOLERANCE {
                return Ok((lo, expansions));
            }
            if g < 0.0 || lo == beta_min || expansions >= MAX_EXPANSIONS {
                break;
            }
            step *= 2.0;
        }
    }

    let fit = match solve(&mut gap, lo, hi, MAX_ITERATIONS, ROI_TOLERANCE) {
        Ok(fit) => fit,
        // Target sits on the edge of what the curve reaches
        Err(VfError::RootNotBracketed { .. }) => {
            let edge = if at_zero < 0.0 { hi } else { lo };
            warnings.push(Warning::new(
                WarningKind::NotConverged,
                format!("skill search could not bracket the ROI target; using beta = {edge}"),
            ));
            return Ok((edge, expansions));
        }
        Err(other) => return Err(other),
    };
    if !fit.converged {
        warnings.push(Warning::new(
            WarningKind::NotConverged,
            format!(
                "skill search stopped after {} iterations (ROI residual {:.3e})",
                fit.iterations, fit.residual
            ),
        ));
    }
    Ok((fit.root, expansions + fit.iterations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn payout() -> PayoutModel {
        PayoutModel::fit(1000, 20.0, 22.0, 50.0).unwrap()
    }

    #[test]
    fn test_rank_distribution_sums_to_one() {
        for beta in [-600.0, -3.0, 0.0, 1e-9, 2.5, 40.0, 5000.0] {
            let ranks = RankDistribution::new(beta, 1000);
            let total: f64 = (0..1000).map(|k| ranks.probability(k)).sum();
            assert_abs_diff_eq!(total, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_positive_beta_favours_top_ranks() {
        let ranks = RankDistribution::new(3.0, 100);
        assert!(ranks.probability(0) > ranks.probability(50));
        assert!(ranks.probability(50) > ranks.probability(99));
        let flat = RankDistribution::new(0.0, 100);
        assert_eq!(flat.probability(0), 0.01);
        assert_eq!(flat.probability(99), 0.01);
    }

    #[test]
    fn test_hits_target_roi() {
        let payout = payout();
        for target in [-0.3, -0.05, 0.0, 0.2, 1.5] {
            let skill = SkillModel::fit(&payout, 24.0, target).unwrap();
            assert!(skill.warnings.is_empty(), "target {target}");
            assert_abs_diff_eq!(skill.achieved_roi, target, epsilon = 1e-6);
            assert_abs_diff_eq!(skill.itm_probability + skill.bust_probability, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_beta_increases_with_target() {
        let payout = payout();
        let low = SkillModel::fit(&payout, 24.0, 0.0).unwrap();
        let high = SkillModel::fit(&payout, 24.0, 0.5).unwrap();
        assert!(high.beta > low.beta);
        assert!(high.itm_probability > low.itm_probability);
    }

    #[test]
    fn test_uniform_finish_returns_pool_share() {
        // β = 0: expected prize is pool / field = buy-in, so ROI = -fee / cost
        let payout = payout();
        let skill = SkillModel::fit(&payout, 24.0, 22.0 / 24.0 - 1.0).unwrap();
        assert_abs_diff_eq!(skill.beta, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(skill.itm_probability, 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_target_above_maximum_is_clamped() {
        let payout = payout();
        let skill = SkillModel::fit(&payout, 24.0, 100.0).unwrap();
        assert_eq!(skill.warnings[0].kind, WarningKind::RoiAboveMaximum);
        assert_abs_diff_eq!(skill.max_roi, 1100.0 / 24.0 - 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(skill.achieved_roi, skill.max_roi, epsilon = 1e-6);
        assert_abs_diff_eq!(skill.place_probability(1), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_target_below_minimum_is_clamped() {
        let payout = payout();
        let skill = SkillModel::fit(&payout, 24.0, -1.5).unwrap();
        assert_eq!(skill.warnings[0].kind, WarningKind::RoiBelowMinimum);
        assert!(skill.beta < 0.0 && skill.beta >= beta_lower_bound(1000));
        assert_abs_diff_eq!(skill.achieved_roi, skill.min_roi, epsilon = 1e-6);
        assert!(skill.bust_probability > 0.999);
    }

    #[test]
    fn test_lower_bound_keeps_distribution_finite() {
        for field in [2, 10, 1000, 100_000] {
            let ranks = RankDistribution::new(beta_lower_bound(field), field);
            let last = ranks.probability(field - 1);
            assert!(last.is_finite() && last > 0.0 && last <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn test_rejects_bad_cost() {
        let payout = payout();
        assert!(matches!(SkillModel::fit(&payout, 0.0, 0.1), Err(VfError::Validation(_))));
        assert!(SkillModel::fit(&payout, 24.0, f64::NAN).is_err());
    }
}
