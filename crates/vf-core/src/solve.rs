//! Bisection root finder shared by the payout and skill curve fits

use serde::{Deserialize, Serialize};

use crate::error::{VfError, VfResult};

/// Outcome of a bisection search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bisection {
    /// Best estimate of the root
    pub root: f64,
    /// f(root)
    pub residual: f64,
    /// Midpoint evaluations performed
    pub iterations: u32,
    /// |f(root)| reached the tolerance or the bracket collapsed to one ulp
    pub converged: bool,
}

/// Find `x` in `[lo, hi]` with `f(x) ≈ 0`.
///
/// `f` must change sign over the bracket (a zero at either end counts).
/// Stops when `|f(mid)| <= tolerance`, when the bracket cannot be halved any
/// further, or after `max_iterations` midpoints.
pub fn solve<F>(mut f: F, lo: f64, hi: f64, max_iterations: u32, tolerance: f64) -> VfResult<Bisection>
where
    F: FnMut(f64) -> f64,
{
    let (mut lo, mut hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let mut f_lo = f(lo);
    if f_lo == 0.0 {
        return Ok(Bisection { root: lo, residual: 0.0, iterations: 0, converged: true });
    }
    let f_hi = f(hi);
    if f_hi == 0.0 {
        return Ok(Bisection { root: hi, residual: 0.0, iterations: 0, converged: true });
    }
    if f_lo.is_nan() || f_hi.is_nan() || f_lo.signum() == f_hi.signum() {
        return Err(VfError::RootNotBracketed { lo, hi, f_lo, f_hi });
    }

    let mut mid = 0.5 * (lo + hi);
    let mut f_mid = f(mid);
    let mut iterations = 1;
    loop {
        let collapsed = mid <= lo || mid >= hi;
        if f_mid.abs() <= tolerance || collapsed {
            return Ok(Bisection { root: mid, residual: f_mid, iterations, converged: true });
        }
        if iterations >= max_iterations {
            log::debug!(
                "bisection stopped after {iterations} iterations at x = {mid}, f(x) = {f_mid}"
            );
            return Ok(Bisection { root: mid, residual: f_mid, iterations, converged: false });
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
        f_mid = f(mid);
        iterations += 1;
    }
}
