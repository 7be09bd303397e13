/*!
`loss_landscape` — the navigation core of an interactive loss-landscape explorer.

What it does
- Caches an opaque scalar cost function `L(w1, w2, b)` over a bounded
  3-parameter volume as a coarse whole-volume grid plus a fine local grid,
  both filled incrementally under a per-call evaluation budget.
- Maps bidirectionally between parameter coordinates and display coordinates.
- Clamps a navigated point into the valid volume.
- Drives a staged landmark progression toward the known optimum.

How to use (call surface only)
- Supply a `LossEvaluator` (any `Fn(ParameterPoint) -> f64` works), an
  `AxisRangeProvider` and an `OptimalPointProvider`.
- Build a `session::Explorer` from an `ExplorerConfig`; setup fails with a
  `ConfigurationError` instead of limping along.
- Call `Explorer::step(display_point, &mut sink)` once per host frame.

What it does NOT do
- No rendering, no input handling, no training. The cost function is an oracle.
*/

use serde::{Deserialize, Serialize};

/// Number of axes in parameter space (two weights, one bias).
pub const AXES: usize = 3;

/// A point in the cost function's domain: `[w1, w2, b]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterPoint(pub [f64; AXES]);

impl ParameterPoint {
    #[inline]
    pub const fn new(p1: f64, p2: f64, p3: f64) -> Self {
        Self([p1, p2, p3])
    }

    #[inline]
    pub fn axis(&self, axis: usize) -> f64 {
        self.0[axis]
    }

    /// Copy with one axis replaced.
    #[inline]
    pub fn with_axis(mut self, axis: usize, value: f64) -> Self {
        self.0[axis] = value;
        self
    }

    /// Euclidean distance in parameter units.
    #[inline]
    pub fn distance(&self, other: &ParameterPoint) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

/// A point in display space, centred on the volume origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayPoint(pub [f64; AXES]);

impl DisplayPoint {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self([x, y, z])
    }

    #[inline]
    pub fn axis(&self, axis: usize) -> f64 {
        self.0[axis]
    }
}

pub mod config;
pub mod error;
pub mod mechanics;
pub mod session;
pub mod systems;

pub use config::{ExplorerConfig, FieldConfig, LandmarkConfig, VolumeConfig};
pub use error::{ConfigurationError, EvaluatorError};
pub use systems::boundary::{BoundaryConstraint, Clamped};
pub use systems::coords::{AxisRange, AxisRanges, CoordinateMapper};
pub use systems::sdk::{
    AxisRangeProvider, LandmarkEvent, LandmarkSink, LossEvaluator, OptimalPointProvider,
};
