//! Error types.
//!
//! `ConfigurationError` is raised while setting things up and is meant to stop
//! the host from starting the subsystem at all. `EvaluatorError` is the only
//! error that can come out of the per-frame path; it is fatal for the session
//! and never retried.

use thiserror::Error;

use crate::ParameterPoint;

/// The cost-function evaluator could not produce a usable value.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EvaluatorError {
    #[error("evaluator returned a non-finite value {value} at {point:?}")]
    NonFinite { point: ParameterPoint, value: f64 },
    #[error("evaluator failed at {point:?}: {reason}")]
    Failed { point: ParameterPoint, reason: String },
}

impl EvaluatorError {
    pub fn point(&self) -> ParameterPoint {
        match self {
            Self::NonFinite { point, .. } | Self::Failed { point, .. } => *point,
        }
    }
}

/// Invalid setup detected before the loop starts.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("{grid} grid resolution must be at least 2 per axis (got {resolution})")]
    ResolutionTooSmall { grid: &'static str, resolution: usize },
    #[error("{grid} grid resolution {resolution} exceeds the limit of {max} per axis")]
    ResolutionTooLarge { grid: &'static str, resolution: usize, max: usize },
    #[error("axis {axis} range is degenerate: lo={lo} must be below hi={hi}")]
    DegenerateRange { axis: usize, lo: f64, hi: f64 },
    #[error("axis {axis} range has a non-finite bound")]
    NonFiniteRange { axis: usize },
    #[error("volume half-size must be positive and finite (got {half_size})")]
    InvalidVolume { half_size: f64 },
    #[error("{what} must be positive and finite (got {value})")]
    InvalidRadius { what: &'static str, value: f64 },
    #[error("per-tick evaluation budget must be at least 1")]
    InvalidBudget,
    #[error("axis index {axis} is out of range")]
    InvalidAxis { axis: usize },
    #[error("optimum has a non-finite coordinate: {point:?}")]
    NonFiniteOptimum { point: ParameterPoint },
    #[error(transparent)]
    Evaluator(#[from] EvaluatorError),
    #[error("config parse error: {0}")]
    Parse(String),
    #[error("config io error: {0}")]
    Io(String),
}

impl ConfigurationError {
    /// Short code for logging.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ResolutionTooSmall { .. } => "RESOLUTION_TOO_SMALL",
            Self::ResolutionTooLarge { .. } => "RESOLUTION_TOO_LARGE",
            Self::DegenerateRange { .. } => "DEGENERATE_RANGE",
            Self::NonFiniteRange { .. } => "NON_FINITE_RANGE",
            Self::InvalidVolume { .. } => "INVALID_VOLUME",
            Self::InvalidRadius { .. } => "INVALID_RADIUS",
            Self::InvalidBudget => "INVALID_BUDGET",
            Self::InvalidAxis { .. } => "INVALID_AXIS",
            Self::NonFiniteOptimum { .. } => "NON_FINITE_OPTIMUM",
            Self::Evaluator(_) => "EVALUATOR_FAILURE",
            Self::Parse(_) => "PARSE",
            Self::Io(_) => "IO",
        }
    }
}
