//! Single-path Monte Carlo walk for the cash-game model
//!
//! Trials are grouped into blocks and each block is drawn as one normal
//! variate with mean `winrate * block / 100` and standard deviation
//! `std_dev * sqrt(block / 100)`. This keeps long horizons cheap while
//! preserving the mean and variance of the total at every block boundary.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use vf_core::{
    DrawdownTracker, SimulationPath, TRIALS_PER_UNIT, VfError, VfResult, is_recorded,
    normal_variate, record_stride,
};

/// Block size used by the batch analyzers
pub const DEFAULT_BLOCK_SIZE: u64 = 100;

/// Mean and standard deviation of one block of trials
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BlockDraw {
    mean: f64,
    sd: f64,
}

impl BlockDraw {
    pub(crate) fn new(trials: u64, winrate: f64, std_dev: f64) -> Self {
        let units = trials as f64 / TRIALS_PER_UNIT;
        Self { mean: winrate * units, sd: std_dev * units.sqrt() }
    }

    #[inline]
    pub(crate) fn sample<R: RngCore + ?Sized>(&self, rng: &mut R) -> f64 {
        normal_variate(rng, self.mean, self.sd)
    }
}

/// Walks `total_trials` in blocks of `block_size`; the final block holds the
/// remainder when `total_trials` is not a multiple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSimulator {
    /// Trials per normal draw
    pub block_size: u64,
    /// Record every n-th block boundary (the last one is always recorded)
    pub record_every: u64,
}

impl PathSimulator {
    /// Record every block boundary
    pub fn new(block_size: u64) -> VfResult<Self> {
        if block_size == 0 {
            return Err(VfError::invalid("block size must be at least 1"));
        }
        Ok(Self { block_size, record_every: 1 })
    }

    /// Pick a record stride so at most `max_points` boundaries are recorded
    pub fn with_max_points(block_size: u64, total_trials: u64, max_points: u64) -> VfResult<Self> {
        let mut simulator = Self::new(block_size)?;
        simulator.record_every = record_stride(simulator.blocks(total_trials), max_points);
        Ok(simulator)
    }

    /// Number of blocks covering `total_trials`
    pub fn blocks(&self, total_trials: u64) -> u64 {
        total_trials.div_ceil(self.block_size.max(1))
    }

    /// Simulate one path.
    ///
    /// Consumes exactly two uniforms per block. The origin `(0, 0, 0, 0)` is
    /// always the first point and `total_trials` the last.
    pub fn simulate<R>(&self, total_trials: u64, winrate: f64, std_dev: f64, rng: &mut R) -> SimulationPath
    where
        R: RngCore + ?Sized,
    {
        let block_size = self.block_size.max(1);
        let record_every = self.record_every.max(1);
        let blocks = self.blocks(total_trials);
        let full = BlockDraw::new(block_size, winrate, std_dev);

        let mut tracker = DrawdownTracker::new();
        let mut points = Vec::with_capacity((blocks / record_every) as usize + 2);
        points.push(tracker.point(0));

        let mut done = 0;
        for block in 1..=blocks {
            let size = block_size.min(total_trials - done);
            let delta = if size == block_size {
                full.sample(rng)
            } else {
                BlockDraw::new(size, winrate, std_dev).sample(rng)
            };
            tracker.advance(delta);
            done += size;
            if is_recorded(block, blocks, record_every) {
                points.push(tracker.point(done));
            }
        }

        SimulationPath {
            points,
            final_value: tracker.cumulative(),
            max_drawdown: tracker.max_drawdown(),
        }
    }
}

/// Simulate one path recording every block boundary
pub fn simulate_path<R>(
    total_trials: u64,
    winrate: f64,
    std_dev: f64,
    rng: &mut R,
    block_size: u64,
) -> VfResult<SimulationPath>
where
    R: RngCore + ?Sized,
{
    Ok(PathSimulator::new(block_size)?.simulate(total_trials, winrate, std_dev, rng))
}
