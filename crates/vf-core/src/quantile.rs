//! Interpolated quantiles of Monte Carlo terminal values

use serde::{Deserialize, Serialize};

/// Quantile of ascending `sorted` data with linear interpolation between
/// order statistics (position `q * (n - 1)`). NaN for empty input.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// 5/25/50/75/95 summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantiles {
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
}

impl Quantiles {
    /// Summarise ascending data
    pub fn from_sorted(sorted: &[f64]) -> Self {
        Self {
            p5: quantile_sorted(sorted, 0.05),
            p25: quantile_sorted(sorted, 0.25),
            p50: quantile_sorted(sorted, 0.50),
            p75: quantile_sorted(sorted, 0.75),
            p95: quantile_sorted(sorted, 0.95),
        }
    }

    /// Sort a copy of `values` and summarise it
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted)
    }

    /// Apply a monotone increasing transform to every quantile
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            p5: f(self.p5),
            p25: f(self.p25),
            p50: f(self.p50),
            p75: f(self.p75),
            p95: f(self.p95),
        }
    }
}
