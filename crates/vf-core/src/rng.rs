//! Seeded pseudo-random streams
//!
//! Every Monte Carlo loop in VarianceForge draws from [`Mulberry32`]: a 32-bit
//! generator whose sequence for a given seed is identical on every platform.
//! Downstream tests pin literal seeded values, so the state transition and the
//! `u32 -> f64` mapping below must never change.
//!
//! Samplers are generic over [`RngCore`] so any `rand` generator can drive
//! them; with [`Mulberry32`] the output is bit-identical to calling
//! [`Mulberry32::next_uniform`] directly.

use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// Weyl increment added to the state on every step
const MULBERRY_INCREMENT: u32 = 0x6D2B_79F5;

/// 2^32, maps a `u32` onto [0, 1)
const U32_SCALE: f64 = 4_294_967_296.0;

/// Smallest positive subnormal, substituted for a zero draw before `ln`
const SMALLEST_POSITIVE: f64 = f64::from_bits(1);

/// Mulberry32 generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    /// Create a stream from a 32-bit seed
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Current internal state
    pub fn state(&self) -> u32 {
        self.state
    }

    #[inline]
    fn step(&mut self) -> u32 {
        self.state = self.state.wrapping_add(MULBERRY_INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next uniform value in [0, 1)
    #[inline]
    pub fn next_uniform(&mut self) -> f64 {
        self.step() as f64 / U32_SCALE
    }
}

impl RngCore for Mulberry32 {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let lo = self.step() as u64;
        let hi = self.step() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

impl SeedableRng for Mulberry32 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }

    /// Truncates to the low 32 bits so `seed_from_u64(s) == new(s as u32)`.
    fn seed_from_u64(state: u64) -> Self {
        Self::new(state as u32)
    }
}

/// Uniform draw in [0, 1) from any generator (one `u32` consumed).
#[inline]
pub fn uniform<R: RngCore + ?Sized>(rng: &mut R) -> f64 {
    rng.next_u32() as f64 / U32_SCALE
}

/// Normal variate via Box–Muller, consuming exactly two uniform draws.
#[inline]
pub fn normal_variate<R: RngCore + ?Sized>(rng: &mut R, mean: f64, sd: f64) -> f64 {
    let mut u1 = uniform(rng);
    if u1 == 0.0 {
        u1 = SMALLEST_POSITIVE;
    }
    let u2 = uniform(rng);
    let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
    mean + sd * z
}

/// Derive the seed of stream `index` from a base seed.
///
/// Wrapping arithmetic: every `(base, index)` pair maps to a valid seed.
#[inline]
pub fn derive_seed(base: u32, index: u64, stride: u32) -> u32 {
    base.wrapping_add((index as u32).wrapping_mul(stride))
}

/// Fresh seed for callers that did not supply one
pub fn entropy_seed() -> u32 {
    let seed = rand::rng().next_u32();
    log::debug!("no seed supplied, using entropy seed {seed}");
    seed
}
