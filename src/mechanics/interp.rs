/// Interpolation mechanics: linear and trilinear blends.

#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Blend the 8 corners of a unit cell.
///
/// `c[dz][dy][dx]`, blended along x, then y, then z.
#[inline]
pub fn trilinear(c: &[[[f64; 2]; 2]; 2], tx: f64, ty: f64, tz: f64) -> f64 {
    let x00 = lerp(c[0][0][0], c[0][0][1], tx);
    let x10 = lerp(c[0][1][0], c[0][1][1], tx);
    let x01 = lerp(c[1][0][0], c[1][0][1], tx);
    let x11 = lerp(c[1][1][0], c[1][1][1], tx);
    let y0 = lerp(x00, x10, ty);
    let y1 = lerp(x01, x11, ty);
    lerp(y0, y1, tz)
}
