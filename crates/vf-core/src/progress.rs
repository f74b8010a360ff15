//! Progress reporting and cooperative cancellation
//!
//! Long Monte Carlo loops call a [`Checkpoint`] at a fixed cadence (about
//! every 1% of trials). The checkpoint sees the completed fraction and may ask
//! the loop to stop by returning `ControlFlow::Break`. Checkpoints observe the
//! computation only: a run that completes produces the same numbers whichever
//! checkpoint was attached.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{VfError, VfResult};

/// Periodic progress/cancellation hook
pub trait Checkpoint {
    /// `fraction` is in [0, 1] and never decreases within one computation.
    fn checkpoint(&mut self, fraction: f64) -> ControlFlow<()>;
}

impl<F> Checkpoint for F
where
    F: FnMut(f64) -> ControlFlow<()>,
{
    fn checkpoint(&mut self, fraction: f64) -> ControlFlow<()> {
        self(fraction)
    }
}

/// Checkpoint that ignores progress and never cancels
#[derive(Debug, Clone, Copy, Default)]
pub struct Unobserved;

impl Checkpoint for Unobserved {
    #[inline]
    fn checkpoint(&mut self, _fraction: f64) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// Progress tracker with a shareable cancel flag
#[derive(Debug, Default)]
pub struct ProgressTracker {
    /// Last reported fraction (0.0 - 1.0)
    fraction: f64,
    /// Number of checkpoints received
    reports: u64,
    /// Cancel flag
    cancelled: Arc<AtomicBool>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last reported fraction
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Checkpoints received so far
    pub fn reports(&self) -> u64 {
        self.reports
    }

    /// Get cancel flag for sharing
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Request cancellation at the next checkpoint
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Check if cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl Checkpoint for ProgressTracker {
    fn checkpoint(&mut self, fraction: f64) -> ControlFlow<()> {
        self.fraction = self.fraction.max(fraction.clamp(0.0, 1.0));
        self.reports += 1;
        if self.is_cancelled() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

/// Fires a checkpoint roughly every 1% of `total` units of work
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    total: u64,
    interval: u64,
}

impl Cadence {
    /// About one hundred checkpoints over `total` units (one per unit when
    /// `total < 100`).
    pub fn percent(total: u64) -> Self {
        Self::every(total, (total / 100).max(1))
    }

    pub fn every(total: u64, interval: u64) -> Self {
        Self { total, interval: interval.max(1) }
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// Report that `done` units are complete.
    ///
    /// Calls the checkpoint when `done` hits the cadence or the final unit and
    /// maps a `Break` to [`VfError::Cancelled`].
    #[inline]
    pub fn tick<C>(&self, done: u64, checkpoint: &mut C) -> VfResult<()>
    where
        C: Checkpoint + ?Sized,
    {
        if done % self.interval != 0 && done != self.total {
            return Ok(());
        }
        let fraction = if self.total == 0 { 1.0 } else { done as f64 / self.total as f64 };
        match checkpoint.checkpoint(fraction) {
            ControlFlow::Continue(()) => Ok(()),
            ControlFlow::Break(()) => {
                log::info!("cancelled at {:.1}% ({done}/{})", fraction * 100.0, self.total);
                Err(VfError::Cancelled)
            }
        }
    }
}
