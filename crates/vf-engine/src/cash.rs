//! Cash-game operations

use serde::{Deserialize, Serialize};

use vf_core::{
    Cadence, Checkpoint, Mulberry32, Quantiles, SimulationPath, VfResult, derive_seed,
    ensure_finite,
};
use vf_sim::{DownswingEstimate, DownswingStats, PathSimulator, batch_analysis, single_threshold_probability};
use vf_stats::{CashGameSummary, GameParameters, downswing_probability};

use crate::config::{ModeConfig, SimulationMode};
use crate::stage::Stage;

/// Seed offset between display paths
pub const PATH_SEED_STRIDE: u32 = 1_000_003;
/// Offset of the downswing stream from the base seed
pub const DOWNSWING_SEED_OFFSET: u32 = 0x9E37_79B9;

/// Share of progress spent drawing display paths
const PATH_STAGE_WEIGHT: f64 = 0.2;

/// Result of [`run_cash_game_simulation`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashGameSimulation {
    pub seed: u32,
    pub mode: SimulationMode,
    pub summary: CashGameSummary,
    pub paths: Vec<SimulationPath>,
    /// Index of the path with the highest final value
    pub best_path: usize,
    /// Index of the path with the lowest final value
    pub worst_path: usize,
    pub final_value_quantiles: Quantiles,
    pub downswings: DownswingStats,
}

/// Analytic summary, display paths and downswing statistics for one
/// parameter set.
///
/// Path `i` uses seed `derive_seed(seed, i, PATH_SEED_STRIDE)`; the batch
/// analysis runs on its own stream offset from `seed`.
pub fn run_cash_game_simulation<C>(
    params: &GameParameters,
    config: &ModeConfig,
    seed: u32,
    checkpoint: &mut C,
) -> VfResult<CashGameSimulation>
where
    C: Checkpoint + ?Sized,
{
    params.validate()?;
    config.validate()?;

    log::info!(
        "cash game simulation: {} trials, winrate {}, sd {}, mode {:?}, seed {seed}",
        params.trials,
        params.winrate,
        params.std_dev,
        config.mode
    );

    let summary = CashGameSummary::compute(params);
    let simulator =
        PathSimulator::with_max_points(config.path_block_size, params.trials, config.max_points)?;

    let mut paths = Vec::with_capacity(config.path_count);
    {
        let mut stage = Stage::new(&mut *checkpoint, 0.0, PATH_STAGE_WEIGHT);
        let cadence = Cadence::percent(config.path_count as u64);
        for index in 0..config.path_count {
            let mut rng = Mulberry32::new(derive_seed(seed, index as u64, PATH_SEED_STRIDE));
            paths.push(simulator.simulate(params.trials, params.winrate, params.std_dev, &mut rng));
            cadence.tick(index as u64 + 1, &mut stage)?;
        }
    }

    let finals: Vec<f64> = paths.iter().map(|p| p.final_value).collect();
    let best_path =
        finals.iter().enumerate().max_by(|a, b| a.1.total_cmp(b.1)).map_or(0, |(i, _)| i);
    let worst_path =
        finals.iter().enumerate().min_by(|a, b| a.1.total_cmp(b.1)).map_or(0, |(i, _)| i);

    let downswings = {
        let mut stage = Stage::new(&mut *checkpoint, PATH_STAGE_WEIGHT, 1.0 - PATH_STAGE_WEIGHT);
        let mut rng = Mulberry32::new(seed.wrapping_add(DOWNSWING_SEED_OFFSET));
        batch_analysis(
            params.trials,
            params.winrate,
            params.std_dev,
            config.downswing_simulations,
            &mut rng,
            &config.cash_thresholds,
            &mut stage,
        )?
    };

    Ok(CashGameSimulation {
        seed,
        mode: config.mode,
        summary,
        paths,
        best_path,
        worst_path,
        final_value_quantiles: Quantiles::from_values(&finals),
        downswings,
    })
}

/// Result of [`run_downswing_estimate`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DownswingEstimateResult {
    pub seed: u32,
    #[serde(flatten)]
    pub estimate: DownswingEstimate,
    /// `exp(-2·winrate·threshold / sd²)`, comparable with
    /// `below_start_probability`
    pub closed_form: f64,
}

/// Probability of a drawdown of at least `threshold` within `trials`.
#[allow(clippy::too_many_arguments)]
pub fn run_downswing_estimate<C>(
    trials: u64,
    winrate: f64,
    std_dev: f64,
    threshold: f64,
    num_simulations: u64,
    config: &ModeConfig,
    seed: u32,
    checkpoint: &mut C,
) -> VfResult<DownswingEstimateResult>
where
    C: Checkpoint + ?Sized,
{
    GameParameters::new(winrate, std_dev, trials).validate()?;
    ensure_finite("drawdown threshold", threshold)?;
    config.validate()?;

    log::info!(
        "downswing estimate: threshold {threshold} over {trials} trials, {num_simulations} runs, seed {seed}"
    );

    let mut rng = Mulberry32::new(seed);
    let estimate = single_threshold_probability(
        trials,
        winrate,
        std_dev,
        threshold,
        num_simulations,
        &mut rng,
        config.downswing_block_size,
        checkpoint,
    )?;

    Ok(DownswingEstimateResult {
        seed,
        estimate,
        closed_form: downswing_probability(threshold, winrate, std_dev),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vf_core::{ProgressTracker, Unobserved, VfError};

    fn small() -> ModeConfig {
        ModeConfig { path_count: 8, downswing_simulations: 200, ..ModeConfig::turbo() }
    }

    #[test]
    fn test_best_and_worst_paths() {
        let params = GameParameters::new(2.5, 80.0, 20_000);
        let result = run_cash_game_simulation(&params, &small(), 42, &mut Unobserved).unwrap();
        assert_eq!(result.paths.len(), 8);
        let best = result.paths[result.best_path].final_value;
        let worst = result.paths[result.worst_path].final_value;
        assert!(result.paths.iter().all(|p| p.final_value <= best && p.final_value >= worst));
        assert!(result.final_value_quantiles.p5 >= worst);
        assert!(result.final_value_quantiles.p95 <= best);
        assert_eq!(result.summary.expected_value, 500.0);
        assert_eq!(result.downswings.num_simulations, 200);
    }

    #[test]
    fn test_progress_spans_both_stages() {
        let params = GameParameters::new(2.5, 80.0, 10_000);
        let mut seen = Vec::new();
        let mut record = |f: f64| {
            seen.push(f);
            std::ops::ControlFlow::Continue(())
        };
        run_cash_game_simulation(&params, &small(), 7, &mut record).unwrap();
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert!(seen.contains(&PATH_STAGE_WEIGHT));
        assert_eq!(*seen.last().unwrap(), 1.0);
    }

    #[test]
    fn test_cancel_before_start() {
        let params = GameParameters::new(2.5, 80.0, 10_000);
        let mut tracker = ProgressTracker::new();
        tracker.cancel();
        let result = run_cash_game_simulation(&params, &small(), 7, &mut tracker);
        assert!(matches!(result, Err(VfError::Cancelled)));
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let params = GameParameters::new(f64::NAN, 80.0, 10_000);
        let result = run_cash_game_simulation(&params, &small(), 7, &mut Unobserved);
        assert!(matches!(result, Err(VfError::Validation(_))));
        let result = run_downswing_estimate(10_000, 2.0, -1.0, 100.0, 10, &small(), 1, &mut Unobserved);
        assert!(matches!(result, Err(VfError::Validation(_))));
    }

    #[test]
    fn test_downswing_estimate_carries_closed_form() {
        let result =
            run_downswing_estimate(50_000, 3.0, 90.0, 1_000.0, 300, &small(), 5, &mut Unobserved).unwrap();
        assert_eq!(result.estimate.block_size, 500);
        assert_eq!(result.estimate.num_simulations, 300);
        assert_eq!(result.closed_form, downswing_probability(1_000.0, 3.0, 90.0));
        assert!((0.0..=1.0).contains(&result.estimate.probability));
        assert!(result.estimate.below_start_probability <= result.estimate.probability);
    }
}
