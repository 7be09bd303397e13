//! Keeps a navigated point inside the valid volume.
//!
//! The constraint only reports whether it had to clamp; resetting any motion
//! state after a clamp is the host's business.

use crate::error::ConfigurationError;
use crate::mechanics::control;
use crate::systems::coords::{AxisRange, AxisRanges, CoordinateMapper};
use crate::{AXES, DisplayPoint, ParameterPoint};

/// Result of a clamp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Clamped<P> {
    pub point: P,
    pub was_clamped: bool,
}

/// Per-axis box constraint.
#[derive(Clone, Debug)]
pub struct BoundaryConstraint {
    ranges: AxisRanges,
}

impl BoundaryConstraint {
    /// Constraint over parameter space; degenerate ranges are rejected here
    /// rather than at clamp time.
    pub fn new(ranges: AxisRanges) -> Result<Self, ConfigurationError> {
        ranges.validate()?;
        Ok(Self { ranges })
    }

    /// Constraint over display space: the cube `[-half, half]^3` of `mapper`.
    pub fn display(mapper: &CoordinateMapper) -> Self {
        let h = mapper.half_size();
        Self { ranges: AxisRanges([AxisRange { lo: -h, hi: h }; AXES]) }
    }

    pub fn ranges(&self) -> &AxisRanges {
        &self.ranges
    }

    /// Keeps the old ranges on error.
    pub fn set_ranges(&mut self, ranges: AxisRanges) -> Result<(), ConfigurationError> {
        ranges.validate()?;
        self.ranges = ranges;
        Ok(())
    }

    fn clamp_axes(&self, v: &[f64; AXES]) -> ([f64; AXES], bool) {
        let mut any = false;
        let out = std::array::from_fn(|a| {
            let r = self.ranges.axis(a);
            let (c, moved) = control::clamp_flag(v[a], r.lo, r.hi);
            any |= moved;
            c
        });
        (out, any)
    }

    pub fn clamp(&self, p: &ParameterPoint) -> Clamped<ParameterPoint> {
        let (v, was_clamped) = self.clamp_axes(&p.0);
        Clamped { point: ParameterPoint(v), was_clamped }
    }

    pub fn clamp_display(&self, d: &DisplayPoint) -> Clamped<DisplayPoint> {
        let (v, was_clamped) = self.clamp_axes(&d.0);
        Clamped { point: DisplayPoint(v), was_clamped }
    }

    pub fn in_bounds(&self, p: &ParameterPoint) -> bool {
        self.ranges.contains(p)
    }

    pub fn display_in_bounds(&self, d: &DisplayPoint) -> bool {
        (0..AXES).all(|a| self.ranges.axis(a).contains(d.axis(a)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> BoundaryConstraint {
        BoundaryConstraint::new(AxisRanges([AxisRange { lo: -1.0, hi: 1.0 }; AXES])).unwrap()
    }

    #[test]
    fn inverted_or_nan_ranges_are_rejected() {
        let inverted = AxisRanges([AxisRange { lo: 1.0, hi: 0.0 }; AXES]);
        assert_eq!(
            BoundaryConstraint::new(inverted).unwrap_err(),
            ConfigurationError::DegenerateRange { axis: 0, lo: 1.0, hi: 0.0 }
        );

        let mut b = unit();
        let mut nan = *b.ranges();
        nan.0[1].hi = f64::NAN;
        assert_eq!(b.set_ranges(nan), Err(ConfigurationError::NonFiniteRange { axis: 1 }));
        // still clamps against the previous box
        let c = b.clamp(&ParameterPoint::new(0.0, 5.0, 0.0));
        assert_eq!(c.point, ParameterPoint::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn inside_point_is_untouched() {
        let b = unit();
        let p = ParameterPoint::new(0.5, -1.0, 1.0);
        let c = b.clamp(&p);
        assert_eq!(c.point, p);
        assert!(!c.was_clamped);
    }

    #[test]
    fn each_axis_clamps_independently() {
        let c = unit().clamp(&ParameterPoint::new(2.0, 0.25, -7.0));
        assert_eq!(c.point, ParameterPoint::new(1.0, 0.25, -1.0));
        assert!(c.was_clamped);
    }

    #[test]
    fn display_cube_follows_mapper() {
        let m = CoordinateMapper::new(AxisRanges([AxisRange { lo: 0.0, hi: 4.0 }; AXES]), 2.5).unwrap();
        let b = BoundaryConstraint::display(&m);
        let c = b.clamp_display(&DisplayPoint::new(3.0, 0.0, -2.5));
        assert_eq!(c.point, DisplayPoint::new(2.5, 0.0, -2.5));
        assert!(c.was_clamped);
        assert!(b.display_in_bounds(&c.point));
    }
}
