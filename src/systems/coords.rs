//! Parameter ranges and the parameter <-> display transform.
//!
//! Axis `i` of a `ParameterPoint` maps to axis `i` of a `DisplayPoint` and to
//! grid dimension `i` of the loss-field grids. Nothing reorders axes.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::{AXES, DisplayPoint, ParameterPoint};

/// Closed interval `[lo, hi]` with `lo < hi`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub lo: f64,
    pub hi: f64,
}

impl AxisRange {
    /// Checked constructor; `axis` only labels the error.
    pub fn checked(axis: usize, lo: f64, hi: f64) -> Result<Self, ConfigurationError> {
        let r = Self { lo, hi };
        r.validate(axis)?;
        Ok(r)
    }

    pub fn validate(&self, axis: usize) -> Result<(), ConfigurationError> {
        if !(self.lo.is_finite() && self.hi.is_finite()) {
            return Err(ConfigurationError::NonFiniteRange { axis });
        }
        if self.hi <= self.lo {
            return Err(ConfigurationError::DegenerateRange { axis, lo: self.lo, hi: self.hi });
        }
        Ok(())
    }

    /// Range covering two values (e.g. a parameter before and after training),
    /// padded by `padding * span` on each side and widened to at least `min_span`.
    /// Fails like [`checked`](Self::checked) when the result is still degenerate.
    pub fn spanning(
        axis: usize,
        a: f64,
        b: f64,
        padding: f64,
        min_span: f64,
    ) -> Result<Self, ConfigurationError> {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let pad = (hi - lo) * padding.max(0.0);
        let (mut lo, mut hi) = (lo - pad, hi + pad);
        let short = min_span - (hi - lo);
        if short > 0.0 {
            lo -= short * 0.5;
            hi += short * 0.5;
        }
        Self::checked(axis, lo, hi)
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.hi - self.lo
    }

    #[inline]
    pub fn mid(&self) -> f64 {
        0.5 * (self.lo + self.hi)
    }

    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        v >= self.lo && v <= self.hi
    }
}

/// One range per parameter axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisRanges(pub [AxisRange; AXES]);

impl AxisRanges {
    pub fn new(ranges: [AxisRange; AXES]) -> Result<Self, ConfigurationError> {
        let r = Self(ranges);
        r.validate()?;
        Ok(r)
    }

    /// Two weight axes sharing one range, bias axis on its own.
    pub fn weight_bias(weight: AxisRange, bias: AxisRange) -> Result<Self, ConfigurationError> {
        Self::new([weight, weight, bias])
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (axis, r) in self.0.iter().enumerate() {
            r.validate(axis)?;
        }
        Ok(())
    }

    #[inline]
    pub fn axis(&self, axis: usize) -> AxisRange {
        self.0[axis]
    }

    /// Centre of the volume.
    pub fn center(&self) -> ParameterPoint {
        ParameterPoint(std::array::from_fn(|a| self.0[a].mid()))
    }

    pub fn contains(&self, p: &ParameterPoint) -> bool {
        (0..AXES).all(|a| self.0[a].contains(p.axis(a)))
    }
}

/// Bidirectional parameter <-> display transform.
///
/// Per axis: `n = (v - lo) / (hi - lo)`, `d = (n - 0.5) * size`, so the
/// volume spans `[-size/2, size/2]` in display space.
#[derive(Clone, Debug)]
pub struct CoordinateMapper {
    ranges: AxisRanges,
    axis_size: f64,
}

impl CoordinateMapper {
    pub fn new(ranges: AxisRanges, half_size: f64) -> Result<Self, ConfigurationError> {
        ranges.validate()?;
        if !(half_size.is_finite() && half_size > 0.0) {
            return Err(ConfigurationError::InvalidVolume { half_size });
        }
        Ok(Self { ranges, axis_size: 2.0 * half_size })
    }

    pub fn ranges(&self) -> &AxisRanges {
        &self.ranges
    }

    pub fn half_size(&self) -> f64 {
        0.5 * self.axis_size
    }

    /// Replace the ranges; degenerate ranges are rejected and leave the
    /// mapper unchanged.
    pub fn set_ranges(&mut self, ranges: AxisRanges) -> Result<(), ConfigurationError> {
        ranges.validate()?;
        self.ranges = ranges;
        Ok(())
    }

    pub fn to_display(&self, p: &ParameterPoint) -> DisplayPoint {
        DisplayPoint(std::array::from_fn(|a| {
            let r = self.ranges.axis(a);
            let n = (p.axis(a) - r.lo) / r.span();
            (n - 0.5) * self.axis_size
        }))
    }

    pub fn to_parameters(&self, d: &DisplayPoint) -> ParameterPoint {
        ParameterPoint(std::array::from_fn(|a| {
            let r = self.ranges.axis(a);
            let n = d.axis(a) / self.axis_size + 0.5;
            r.lo + n * r.span()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges() -> AxisRanges {
        AxisRanges::weight_bias(AxisRange { lo: -3.0, hi: 3.0 }, AxisRange { lo: -2.0, hi: 2.0 })
            .unwrap()
    }

    #[test]
    fn corners_map_to_volume_faces() {
        let m = CoordinateMapper::new(ranges(), 5.0).unwrap();
        let d = m.to_display(&ParameterPoint::new(-3.0, 3.0, 0.0));
        assert_eq!(d, DisplayPoint::new(-5.0, 5.0, 0.0));
    }

    #[test]
    fn degenerate_range_rejected() {
        let bad = AxisRanges([
            AxisRange { lo: 0.0, hi: 1.0 },
            AxisRange { lo: 2.0, hi: 2.0 },
            AxisRange { lo: 0.0, hi: 1.0 },
        ]);
        assert!(matches!(
            CoordinateMapper::new(bad, 5.0),
            Err(ConfigurationError::DegenerateRange { axis: 1, .. })
        ));
    }

    #[test]
    fn set_ranges_keeps_old_on_error() {
        let mut m = CoordinateMapper::new(ranges(), 5.0).unwrap();
        let bad = AxisRanges([AxisRange { lo: 1.0, hi: 0.0 }; AXES]);
        assert!(m.set_ranges(bad).is_err());
        assert_eq!(*m.ranges(), ranges());
    }

    #[test]
    fn spanning_pads_and_widens() {
        let r = AxisRange::spanning(0, 1.0, -1.0, 0.5, 0.0).unwrap();
        assert_eq!(r, AxisRange { lo: -2.0, hi: 2.0 });
        let r = AxisRange::spanning(0, 0.3, 0.3, 0.5, 2.0).unwrap();
        assert!((r.lo - -0.7).abs() < 1e-12 && (r.hi - 1.3).abs() < 1e-12);
    }

    #[test]
    fn spanning_reports_degenerate_and_nan_inputs() {
        assert_eq!(
            AxisRange::spanning(2, 0.3, 0.3, 0.5, 0.0),
            Err(ConfigurationError::DegenerateRange { axis: 2, lo: 0.3, hi: 0.3 })
        );
        assert_eq!(
            AxisRange::spanning(1, f64::NAN, 1.0, 0.5, 2.0),
            Err(ConfigurationError::NonFiniteRange { axis: 1 })
        );
    }

    #[test]
    fn nan_bound_is_reported() {
        assert_eq!(
            AxisRange::checked(0, f64::NAN, 1.0),
            Err(ConfigurationError::NonFiniteRange { axis: 0 })
        );
    }
}
