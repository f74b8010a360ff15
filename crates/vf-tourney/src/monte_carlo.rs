//! Tournament Monte Carlo
//!
//! Each trial plays `tournaments` entries drawn from an [`OutcomeSet`] and
//! advances two tracks on the same sampled sequence:
//!
//! 1. the unconditional profit path (cumulative, peak, drawdown), which never
//!    stops;
//! 2. a bankroll walk for the finite-horizon bust probability. Once the
//!    bankroll cannot cover another entry the trial is busted for good, but
//!    track 1 keeps sampling.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use vf_core::{
    Cadence, Checkpoint, DrawdownTracker, Mulberry32, Quantiles, SimulationPath, VfError,
    MAX_RUN_COUNT, VfResult, derive_seed, ensure_count, ensure_finite, is_recorded, record_stride,
    uniform,
};

use crate::outcome::OutcomeSet;

/// Seed offset between consecutive trials
pub const TRIAL_SEED_STRIDE: u32 = 7919;

/// Inverse-CDF sampler over an outcome set
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeSampler {
    cumulative: Vec<f64>,
    profits: Vec<f64>,
}

impl OutcomeSampler {
    pub fn new(outcomes: &OutcomeSet) -> Self {
        Self {
            cumulative: outcomes.cumulative(),
            profits: outcomes.outcomes.iter().map(|o| o.profit).collect(),
        }
    }

    /// Index of the first cumulative entry `>= u`
    #[inline]
    pub fn index_for(&self, u: f64) -> usize {
        self.cumulative
            .partition_point(|&c| c < u)
            .min(self.cumulative.len().saturating_sub(1))
    }

    /// Draw one outcome index (one uniform consumed)
    #[inline]
    pub fn sample<R: RngCore + ?Sized>(&self, rng: &mut R) -> usize {
        self.index_for(uniform(rng))
    }

    #[inline]
    pub fn profit(&self, index: usize) -> f64 {
        self.profits[index]
    }
}

/// Run settings for [`simulate_tournaments`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentRun {
    /// Tournaments per trial
    pub tournaments: u64,
    /// Independent trials
    pub num_trials: u64,
    /// Starting bankroll for the bust track
    pub bankroll: f64,
    /// Drawdown thresholds (value units)
    pub thresholds: Vec<f64>,
    /// Trials whose profit path is kept
    pub sample_paths: usize,
    /// Upper bound on recorded points per kept path
    pub max_points: u64,
    pub seed: u32,
}

impl TournamentRun {
    pub fn validate(&self) -> VfResult<()> {
        if self.tournaments == 0 {
            return Err(VfError::invalid("tournament count must be at least 1"));
        }
        ensure_count("number of trials", self.num_trials, MAX_RUN_COUNT)?;
        ensure_finite("bankroll", self.bankroll)?;
        if self.bankroll < 0.0 {
            return Err(VfError::invalid(format!(
                "bankroll must not be negative, got {}",
                self.bankroll
            )));
        }
        if self.thresholds.iter().any(|t| t.is_nan()) {
            return Err(VfError::invalid("drawdown thresholds must be numbers"));
        }
        Ok(())
    }
}

/// Probability that a trial's drawdown reached a threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdProbability {
    pub threshold: f64,
    pub probability: f64,
}

/// Aggregated Monte Carlo output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub tournaments: u64,
    pub num_trials: u64,
    pub bankroll: f64,
    /// Final profit of every trial, in trial order
    pub final_profits: Vec<f64>,
    pub bust_probability: f64,
    /// Mean tournaments played before busting, over busted trials
    pub mean_tournaments_to_bust: Option<f64>,
    pub thresholds: Vec<ThresholdProbability>,
    pub profit_quantiles: Quantiles,
    /// Profit over total entry cost
    pub roi_quantiles: Quantiles,
    pub mean_profit: f64,
    pub mean_roi: f64,
    pub probability_of_profit: f64,
    pub average_max_drawdown: f64,
    pub worst_max_drawdown: f64,
    pub sample_paths: Vec<SimulationPath>,
}

/// Simulate `run.num_trials` independent sequences of tournaments.
///
/// Trial `t` draws from its own generator seeded with
/// `derive_seed(run.seed, t, TRIAL_SEED_STRIDE)`. Progress is reported about
/// every 1% of trials.
pub fn simulate_tournaments<C>(
    outcomes: &OutcomeSet,
    run: &TournamentRun,
    checkpoint: &mut C,
) -> VfResult<MonteCarloResult>
where
    C: Checkpoint + ?Sized,
{
    run.validate()?;
    if outcomes.is_empty() {
        return Err(VfError::invalid("outcome set is empty"));
    }

    log::debug!(
        "tournament monte carlo: {} trials x {} tournaments, bankroll {}, seed {}",
        run.num_trials,
        run.tournaments,
        run.bankroll,
        run.seed
    );

    let sampler = OutcomeSampler::new(outcomes);
    let cost = outcomes.cost;
    let stride = record_stride(run.tournaments, run.max_points);
    let cadence = Cadence::percent(run.num_trials);

    let mut final_profits = Vec::with_capacity(run.num_trials as usize);
    let mut crossings = vec![0u64; run.thresholds.len()];
    let mut sample_paths = Vec::with_capacity(run.sample_paths.min(run.num_trials as usize));
    let mut busted_trials = 0u64;
    let mut tournaments_to_bust = 0u64;
    let mut max_drawdown_sum = 0.0;
    let mut worst_max_drawdown: f64 = 0.0;

    for trial in 0..run.num_trials {
        let mut rng = Mulberry32::new(derive_seed(run.seed, trial, TRIAL_SEED_STRIDE));
        let keep_path = (trial as usize) < run.sample_paths;

        let mut tracker = DrawdownTracker::new();
        let mut points = Vec::new();
        if keep_path {
            points.push(tracker.point(0));
        }

        let mut bankroll = run.bankroll;
        let mut busted_after = (bankroll < cost).then_some(0);

        for played in 1..=run.tournaments {
            let profit = sampler.profit(sampler.sample(&mut rng));
            tracker.advance(profit);

            if busted_after.is_none() {
                bankroll += profit;
                if bankroll < cost {
                    busted_after = Some(played);
                }
            }
            if keep_path && is_recorded(played, run.tournaments, stride) {
                points.push(tracker.point(played));
            }
        }

        if let Some(played) = busted_after {
            busted_trials += 1;
            tournaments_to_bust += played;
        }
        for (count, &threshold) in crossings.iter_mut().zip(&run.thresholds) {
            if tracker.max_drawdown() >= threshold {
                *count += 1;
            }
        }
        max_drawdown_sum += tracker.max_drawdown();
        worst_max_drawdown = worst_max_drawdown.max(tracker.max_drawdown());
        final_profits.push(tracker.cumulative());
        if keep_path {
            sample_paths.push(SimulationPath {
                points,
                final_value: tracker.cumulative(),
                max_drawdown: tracker.max_drawdown(),
            });
        }

        cadence.tick(trial + 1, checkpoint)?;
    }

    let n = run.num_trials as f64;
    let total_cost = cost * run.tournaments as f64;
    let mean_profit = final_profits.iter().sum::<f64>() / n;
    let profit_quantiles = Quantiles::from_values(&final_profits);
    let winners = final_profits.iter().filter(|&&p| p > 0.0).count();

    let thresholds = run
        .thresholds
        .iter()
        .zip(&crossings)
        .map(|(&threshold, &count)| ThresholdProbability {
            threshold,
            probability: count as f64 / n,
        })
        .collect();

    log::info!(
        "tournament monte carlo done: bust {:.4}, mean profit {:.2}",
        busted_trials as f64 / n,
        mean_profit
    );

    Ok(MonteCarloResult {
        tournaments: run.tournaments,
        num_trials: run.num_trials,
        bankroll: run.bankroll,
        bust_probability: busted_trials as f64 / n,
        mean_tournaments_to_bust: (busted_trials > 0)
            .then(|| tournaments_to_bust as f64 / busted_trials as f64),
        thresholds,
        profit_quantiles,
        roi_quantiles: profit_quantiles.map(|p| p / total_cost),
        mean_profit,
        mean_roi: mean_profit / total_cost,
        probability_of_profit: winners as f64 / n,
        average_max_drawdown: max_drawdown_sum / n,
        worst_max_drawdown,
        sample_paths,
        final_profits,
    })
}
