//! Sample paths and drawdown bookkeeping

use serde::{Deserialize, Serialize};

/// One recorded point of a cumulative-value walk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    /// Trials (or tournaments) played so far
    pub trial: u64,
    /// Cumulative value after `trial`
    pub cumulative: f64,
    /// Highest cumulative value seen so far (starts at 0)
    pub peak: f64,
    /// `peak - cumulative`
    pub drawdown: f64,
}

/// Recorded walk plus scalar summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationPath {
    pub points: Vec<PathPoint>,
    pub final_value: f64,
    /// Maximum drawdown over every step, recorded or not
    pub max_drawdown: f64,
}

impl SimulationPath {
    /// Trial index of the last recorded point
    pub fn total_trials(&self) -> u64 {
        self.points.last().map_or(0, |p| p.trial)
    }
}

/// Running cumulative value, peak and drawdown
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DrawdownTracker {
    cumulative: f64,
    peak: f64,
    max_drawdown: f64,
}

impl DrawdownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to the walk and return the current drawdown.
    #[inline]
    pub fn advance(&mut self, delta: f64) -> f64 {
        self.cumulative += delta;
        if self.cumulative > self.peak {
            self.peak = self.cumulative;
        }
        let drawdown = self.peak - self.cumulative;
        if drawdown > self.max_drawdown {
            self.max_drawdown = drawdown;
        }
        drawdown
    }

    pub fn cumulative(&self) -> f64 {
        self.cumulative
    }

    pub fn peak(&self) -> f64 {
        self.peak
    }

    pub fn drawdown(&self) -> f64 {
        self.peak - self.cumulative
    }

    pub fn max_drawdown(&self) -> f64 {
        self.max_drawdown
    }

    /// Snapshot as a path point
    pub fn point(&self, trial: u64) -> PathPoint {
        PathPoint {
            trial,
            cumulative: self.cumulative,
            peak: self.peak,
            drawdown: self.drawdown(),
        }
    }
}

/// Record stride that keeps a walk of `steps` steps within `max_points`
/// recorded points (plus the origin).
pub fn record_stride(steps: u64, max_points: u64) -> u64 {
    if max_points == 0 {
        return steps.max(1);
    }
    steps.div_ceil(max_points).max(1)
}

/// Whether step `step` (1-based) of `steps` is recorded at `stride`.
/// The last step is always recorded.
#[inline]
pub fn is_recorded(step: u64, steps: u64, stride: u64) -> bool {
    step == steps || step % stride == 0
}
