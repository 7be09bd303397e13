/// Clamp mechanics: scalar bounds and grid-coordinate clamping.

/// Clamp `x` into `[lo, hi]`, reporting whether it moved. NaN lands on `lo`.
#[inline]
pub fn clamp_flag(x: f64, lo: f64, hi: f64) -> (f64, bool) {
    if x.is_nan() {
        return (lo, true);
    }
    let c = x.clamp(lo, hi);
    (c, c != x)
}

/// Margin kept below the last grid index so `floor` never lands on it.
pub const GRID_EPS: f64 = 1e-9;

/// Continuous grid coordinate of `x` in `[lo, hi]` over `n` samples,
/// clamped to `[0, n-1-ε]` so cell `floor(g)+1` always exists.
#[inline]
pub fn grid_coord(x: f64, lo: f64, hi: f64, n: usize) -> f64 {
    let last = (n - 1) as f64;
    let g = (x - lo) / (hi - lo) * last;
    g.clamp(0.0, last - GRID_EPS)
}

/// World value of sample `i` of `n` spanning `[lo, hi]`.
#[inline]
pub fn grid_value(i: usize, lo: f64, hi: f64, n: usize) -> f64 {
    lo + (hi - lo) * (i as f64) / ((n - 1) as f64)
}
