//! Standard normal approximations
//!
//! - [`cdf`]: Abramowitz & Stegun 26.2.17, |error| < 7.5e-8
//! - [`inverse_cdf`]: Acklam's rational approximation, relative error < 1.15e-9
//!
//! Both are total over their domain and never panic.

use std::f64::consts::PI;

/// z for a two-sided 70% band
pub const Z_70: f64 = 1.036433;

/// z for a two-sided 95% band
pub const Z_95: f64 = 1.959964;

/// Beyond this |z| the CDF is reported as exactly 0 or 1
const CDF_CLAMP: f64 = 8.0;

// A&S 26.2.17
const AS_P: f64 = 0.231_641_9;
const AS_B: [f64; 5] = [
    0.319_381_530,
    -0.356_563_782,
    1.781_477_937,
    -1.821_255_978,
    1.330_274_429,
];

// Acklam
const ACKLAM_A: [f64; 6] = [
    -3.969_683_028_665_376e1,
    2.209_460_984_245_205e2,
    -2.759_285_104_469_687e2,
    1.383_577_518_672_690e2,
    -3.066_479_806_614_716e1,
    2.506_628_277_459_239,
];
const ACKLAM_B: [f64; 5] = [
    -5.447_609_879_822_406e1,
    1.615_858_368_580_409e2,
    -1.556_989_798_598_866e2,
    6.680_131_188_771_972e1,
    -1.328_068_155_288_572e1,
];
const ACKLAM_C: [f64; 6] = [
    -7.784_894_002_430_293e-3,
    -3.223_964_580_411_365e-1,
    -2.400_758_277_161_838,
    -2.549_732_539_343_734,
    4.374_664_141_464_968,
    2.938_163_982_698_783,
];
const ACKLAM_D: [f64; 4] = [
    7.784_695_709_041_462e-3,
    3.224_671_290_700_398e-1,
    2.445_134_137_142_996,
    3.754_408_661_907_416,
];
const ACKLAM_P_LOW: f64 = 0.02425;

/// Standard normal density
#[inline]
pub fn pdf(z: f64) -> f64 {
    (-0.5 * z * z).exp() / (2.0 * PI).sqrt()
}

/// P(Z <= z) for a standard normal Z
pub fn cdf(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    if z == 0.0 {
        return 0.5;
    }
    if z > CDF_CLAMP {
        return 1.0;
    }
    if z < -CDF_CLAMP {
        return 0.0;
    }

    let x = z.abs();
    let t = 1.0 / (1.0 + AS_P * x);
    let poly = t * (AS_B[0] + t * (AS_B[1] + t * (AS_B[2] + t * (AS_B[3] + t * AS_B[4]))));
    let upper_tail = pdf(x) * poly;

    if z > 0.0 { 1.0 - upper_tail } else { upper_tail }
}

/// z such that `cdf(z) == p`
///
/// -inf at 0, +inf at 1, exactly 0 at 0.5, NaN outside [0, 1].
pub fn inverse_cdf(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }
    if p == 0.5 {
        return 0.0;
    }

    let (a, b, c, d) = (&ACKLAM_A, &ACKLAM_B, &ACKLAM_C, &ACKLAM_D);

    if p < ACKLAM_P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((c[0] * q + c[1]) * q + c[2]) * q + c[3]) * q + c[4]) * q + c[5])
            / ((((d[0] * q + d[1]) * q + d[2]) * q + d[3]) * q + 1.0)
    } else if p <= 1.0 - ACKLAM_P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((a[0] * r + a[1]) * r + a[2]) * r + a[3]) * r + a[4]) * r + a[5]) * q
            / (((((b[0] * r + b[1]) * r + b[2]) * r + b[3]) * r + b[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((c[0] * q + c[1]) * q + c[2]) * q + c[3]) * q + c[4]) * q + c[5])
            / ((((d[0] * q + d[1]) * q + d[2]) * q + d[3]) * q + 1.0)
    }
}
