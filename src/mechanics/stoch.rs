/// Stochastic mechanics: uniform draws for landmark generation.
/// Generic over `RngCore`; the landmark controller owns a `bevy_prng::WyRand`.
use rand_core::RngCore;

use crate::AXES;

/// Uniform [0,1) with 53 bits of precision.
#[inline]
pub fn uniform01<R: RngCore>(rng: &mut R) -> f64 {
    ((rng.next_u64() >> 11) as f64) / ((1u64 << 53) as f64)
}

/// Uniform in [lo, hi).
#[inline]
pub fn uniform_in<R: RngCore>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    lo + (hi - lo) * uniform01(rng)
}

/// Uniform axis index in `0..AXES`.
#[inline]
pub fn pick_axis<R: RngCore>(rng: &mut R) -> usize {
    ((uniform01(rng) * AXES as f64) as usize).min(AXES - 1)
}

/// Uniform in `[lo, hi]` minus the open band `(center - gap, center + gap)`.
///
/// Returns `None` when the band swallows the whole interval.
#[inline]
pub fn uniform_excluding<R: RngCore>(
    rng: &mut R,
    lo: f64,
    hi: f64,
    center: f64,
    gap: f64,
) -> Option<f64> {
    let left = ((center - gap).min(hi) - lo).max(0.0);
    let right = (hi - (center + gap).max(lo)).max(0.0);
    let total = left + right;
    if total <= 0.0 {
        return None;
    }
    let u = uniform01(rng) * total;
    if u < left {
        Some(lo + u)
    } else {
        Some((center + gap).max(lo) + (u - left))
    }
}
