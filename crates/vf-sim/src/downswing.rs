//! Downswing analysis
//!
//! Batch estimation of drawdown-threshold crossing probabilities and recovery
//! statistics over many independent cash-game paths, plus a faster
//! single-threshold estimator that abandons each path as soon as the
//! threshold is crossed.
//!
//! A *drawdown episode* starts at the last peak before the path dips below
//! it and ends at the first block where the path is back at (or above) that
//! peak; its recovery length is the number of trials in between.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use vf_core::{
    Cadence, Checkpoint, DrawdownTracker, MAX_RUN_COUNT, VfError, VfResult, ensure_count,
};

use crate::path::{BlockDraw, DEFAULT_BLOCK_SIZE};

/// Crossing statistics for one drawdown threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdStats {
    /// Drawdown size (value units)
    pub threshold: f64,
    /// Fraction of runs whose drawdown reached the threshold
    pub probability: f64,
    /// Fraction of runs that fell `threshold` below their starting point
    pub below_start_probability: f64,
    /// Episodes at least this deep that recovered
    pub recovered_episodes: u64,
    /// Mean recovery length of those episodes, in trials
    pub average_recovery_trials: Option<f64>,
}

/// Aggregate result of [`batch_analysis`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownswingStats {
    pub num_simulations: u64,
    pub total_trials: u64,
    /// One entry per requested threshold, in request order
    pub thresholds: Vec<ThresholdStats>,
    pub average_max_drawdown: f64,
    pub worst_max_drawdown: f64,
    /// Completed drawdown episodes across all runs
    pub recovered_episodes: u64,
    pub average_recovery_trials: Option<f64>,
    pub longest_recovery_trials: u64,
    /// Fraction of runs that ended below their peak
    pub unrecovered_fraction: f64,
}

impl DownswingStats {
    /// Crossing probability for an exact threshold from the request
    pub fn probability_at(&self, threshold: f64) -> Option<f64> {
        self.thresholds
            .iter()
            .find(|t| t.threshold == threshold)
            .map(|t| t.probability)
    }
}

/// Result of [`single_threshold_probability`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DownswingEstimate {
    /// Fraction of runs whose drawdown from the running peak reached the threshold
    pub probability: f64,
    /// Fraction of runs that fell `threshold` below their starting point
    pub below_start_probability: f64,
    pub num_simulations: u64,
    pub block_size: u64,
}

#[derive(Debug, Clone, Copy, Default)]
struct ThresholdTally {
    crossings: u64,
    below_start: u64,
    recovered: u64,
    recovery_trials: u64,
}

fn validate_run_shape(num_simulations: u64, block_size: u64) -> VfResult<()> {
    ensure_count("number of simulations", num_simulations, MAX_RUN_COUNT)?;
    if block_size == 0 {
        return Err(VfError::invalid("block size must be at least 1"));
    }
    Ok(())
}

fn validate_threshold(threshold: f64) -> VfResult<()> {
    if threshold.is_nan() {
        return Err(VfError::invalid("drawdown threshold must be a number"));
    }
    Ok(())
}

/// Estimate crossing probabilities for every threshold plus drawdown and
/// recovery statistics.
///
/// Each of the `num_simulations` runs walks `total_trials` in blocks of 100
/// trials drawn from `rng` in sequence. Thresholds `<= 0` count as crossed in
/// every run. Progress is reported about every 1% of runs; a cancelled
/// checkpoint aborts with [`VfError::Cancelled`].
#[allow(clippy::too_many_arguments)]
pub fn batch_analysis<R, C>(
    total_trials: u64,
    winrate: f64,
    std_dev: f64,
    num_simulations: u64,
    rng: &mut R,
    thresholds: &[f64],
    checkpoint: &mut C,
) -> VfResult<DownswingStats>
where
    R: RngCore + ?Sized,
    C: Checkpoint + ?Sized,
{
    validate_run_shape(num_simulations, DEFAULT_BLOCK_SIZE)?;
    for &threshold in thresholds {
        validate_threshold(threshold)?;
    }

    log::debug!(
        "downswing batch: {num_simulations} runs x {total_trials} trials, {} thresholds",
        thresholds.len()
    );

    let block_size = DEFAULT_BLOCK_SIZE;
    let blocks = total_trials.div_ceil(block_size);
    let full = BlockDraw::new(block_size, winrate, std_dev);
    let cadence = Cadence::percent(num_simulations);

    let mut tallies = vec![ThresholdTally::default(); thresholds.len()];
    let mut crossed = vec![false; thresholds.len()];
    let mut fell_below_start = vec![false; thresholds.len()];

    let mut max_drawdown_sum = 0.0;
    let mut worst_max_drawdown: f64 = 0.0;
    let mut recovered_episodes = 0u64;
    let mut recovery_trials_sum = 0u64;
    let mut longest_recovery = 0u64;
    let mut unrecovered_runs = 0u64;

    for run in 0..num_simulations {
        let mut tracker = DrawdownTracker::new();
        let mut trough: f64 = 0.0;
        let mut episode: Option<(u64, f64)> = None; // (start trial, depth)
        let mut done = 0;

        for (i, &threshold) in thresholds.iter().enumerate() {
            crossed[i] = threshold <= 0.0;
            fell_below_start[i] = threshold <= 0.0;
        }

        for _ in 0..blocks {
            let size = block_size.min(total_trials - done);
            let delta = if size == block_size {
                full.sample(rng)
            } else {
                BlockDraw::new(size, winrate, std_dev).sample(rng)
            };
            let start = done;
            let drawdown = tracker.advance(delta);
            done += size;
            trough = trough.min(tracker.cumulative());

            if drawdown > 0.0 {
                let (_, depth) = episode.get_or_insert((start, 0.0));
                *depth = depth.max(drawdown);
            } else if let Some((episode_start, depth)) = episode.take() {
                let length = done - episode_start;
                recovered_episodes += 1;
                recovery_trials_sum += length;
                longest_recovery = longest_recovery.max(length);
                for (tally, &threshold) in tallies.iter_mut().zip(thresholds) {
                    if depth >= threshold {
                        tally.recovered += 1;
                        tally.recovery_trials += length;
                    }
                }
            }

            for (i, &threshold) in thresholds.iter().enumerate() {
                if !crossed[i] && drawdown >= threshold {
                    crossed[i] = true;
                }
                if !fell_below_start[i] && -trough >= threshold {
                    fell_below_start[i] = true;
                }
            }
        }

        if episode.is_some() {
            unrecovered_runs += 1;
        }
        for (i, tally) in tallies.iter_mut().enumerate() {
            tally.crossings += crossed[i] as u64;
            tally.below_start += fell_below_start[i] as u64;
        }
        max_drawdown_sum += tracker.max_drawdown();
        worst_max_drawdown = worst_max_drawdown.max(tracker.max_drawdown());

        cadence.tick(run + 1, checkpoint)?;
    }

    let n = num_simulations as f64;
    let thresholds = thresholds
        .iter()
        .zip(&tallies)
        .map(|(&threshold, tally)| ThresholdStats {
            threshold,
            probability: tally.crossings as f64 / n,
            below_start_probability: tally.below_start as f64 / n,
            recovered_episodes: tally.recovered,
            average_recovery_trials: (tally.recovered > 0)
                .then(|| tally.recovery_trials as f64 / tally.recovered as f64),
        })
        .collect();

    Ok(DownswingStats {
        num_simulations,
        total_trials,
        thresholds,
        average_max_drawdown: max_drawdown_sum / n,
        worst_max_drawdown,
        recovered_episodes,
        average_recovery_trials: (recovered_episodes > 0)
            .then(|| recovery_trials_sum as f64 / recovered_episodes as f64),
        longest_recovery_trials: longest_recovery,
        unrecovered_fraction: unrecovered_runs as f64 / n,
    })
}

/// Probability that a drawdown of at least `threshold` occurs within
/// `total_trials`, both from the running peak and below the starting point.
///
/// Only "did it cross" matters here, so each run stops drawing as soon as it
/// falls `threshold` below its start: the peak never sits below the start, so
/// both criteria are settled then. The below-start estimate is the one that
/// converges to `exp(-2·winrate·threshold / sd²)` as the horizon grows.
/// `threshold <= 0` returns 1 for both without simulating.
#[allow(clippy::too_many_arguments)]
pub fn single_threshold_probability<R, C>(
    total_trials: u64,
    winrate: f64,
    std_dev: f64,
    threshold: f64,
    num_simulations: u64,
    rng: &mut R,
    block_size: u64,
    checkpoint: &mut C,
) -> VfResult<DownswingEstimate>
where
    R: RngCore + ?Sized,
    C: Checkpoint + ?Sized,
{
    validate_run_shape(num_simulations, block_size)?;
    validate_threshold(threshold)?;

    if threshold <= 0.0 {
        return Ok(DownswingEstimate {
            probability: 1.0,
            below_start_probability: 1.0,
            num_simulations,
            block_size,
        });
    }

    let blocks = total_trials.div_ceil(block_size);
    let full = BlockDraw::new(block_size, winrate, std_dev);
    let cadence = Cadence::percent(num_simulations);
    let mut crossings = 0u64;
    let mut below_start = 0u64;

    for run in 0..num_simulations {
        let mut tracker = DrawdownTracker::new();
        let mut crossed = false;
        let mut done = 0;
        for _ in 0..blocks {
            let size = block_size.min(total_trials - done);
            let delta = if size == block_size {
                full.sample(rng)
            } else {
                BlockDraw::new(size, winrate, std_dev).sample(rng)
            };
            done += size;
            crossed |= tracker.advance(delta) >= threshold;
            if -tracker.cumulative() >= threshold {
                below_start += 1;
                break;
            }
        }
        crossings += crossed as u64;
        cadence.tick(run + 1, checkpoint)?;
    }

    let n = num_simulations as f64;
    let probability = crossings as f64 / n;
    let below_start_probability = below_start as f64 / n;
    log::debug!(
        "single threshold {threshold}: {crossings}/{num_simulations} runs crossed from the peak, \
         {below_start} below the start"
    );
    Ok(DownswingEstimate { probability, below_start_probability, num_simulations, block_size })
}
