//! Configuration for the explorer and its systems.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Display volume geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    /// Half-extent of the display cube along every axis.
    pub half_size: f64,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self { half_size: 5.0 }
    }
}

/// Loss-field cache configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Coarse grid cells per axis (whole volume)
    pub coarse_resolution: usize,

    /// Fine grid cells per axis (local cube around the focus)
    pub fine_resolution: usize,

    /// Fine grid half-width in parameter units
    pub fine_radius: f64,

    /// Evaluations per job per tick
    pub tick_budget: usize,

    /// Evaluate directly when the enclosing coarse cells are not filled yet
    pub evaluate_on_miss: bool,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            coarse_resolution: 50, // 125k cells
            fine_resolution: 16,
            fine_radius: 0.5,
            tick_budget: 2_000,
            evaluate_on_miss: false,
        }
    }
}

/// Per-axis resolution cap; keeps `res^3` cell counts allocatable.
pub const MAX_RESOLUTION: usize = 1024;

fn check_resolution(grid: &'static str, resolution: usize) -> Result<(), ConfigurationError> {
    if resolution < 2 {
        return Err(ConfigurationError::ResolutionTooSmall { grid, resolution });
    }
    if resolution > MAX_RESOLUTION {
        return Err(ConfigurationError::ResolutionTooLarge { grid, resolution, max: MAX_RESOLUTION });
    }
    Ok(())
}

impl FieldConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        check_resolution("coarse", self.coarse_resolution)?;
        check_resolution("fine", self.fine_resolution)?;
        if !(self.fine_radius.is_finite() && self.fine_radius > 0.0) {
            return Err(ConfigurationError::InvalidRadius {
                what: "fine radius",
                value: self.fine_radius,
            });
        }
        if self.tick_budget == 0 {
            return Err(ConfigurationError::InvalidBudget);
        }
        Ok(())
    }

    /// Number of cells in the coarse grid (saturates for unvalidated configs).
    pub fn coarse_cells(&self) -> usize {
        self.coarse_resolution.checked_pow(3).unwrap_or(usize::MAX)
    }

    /// Worst-case ticks until the coarse grid is full.
    pub fn ticks_to_fill(&self) -> usize {
        self.coarse_cells().div_ceil(self.tick_budget.max(1))
    }
}

/// Landmark progression configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkConfig {
    /// Distance (parameter units) at which a landmark counts as reached
    pub snap_radius: f64,

    /// Fixed RNG seed; `None` seeds from OS entropy
    pub seed: Option<u64>,
}

impl Default for LandmarkConfig {
    fn default() -> Self {
        Self { snap_radius: 0.3, seed: None }
    }
}

impl LandmarkConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.snap_radius.is_finite() && self.snap_radius > 0.0) {
            return Err(ConfigurationError::InvalidRadius {
                what: "snap radius",
                value: self.snap_radius,
            });
        }
        Ok(())
    }
}

/// Full explorer configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub volume: VolumeConfig,
    pub field: FieldConfig,
    pub landmarks: LandmarkConfig,
}

impl ExplorerConfig {
    /// Reject anything that would fail deep inside the loop.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let h = self.volume.half_size;
        if !(h.is_finite() && h > 0.0) {
            return Err(ConfigurationError::InvalidVolume { half_size: h });
        }
        self.field.validate()?;
        self.landmarks.validate()
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &std::path::Path) -> Result<Self, ConfigurationError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigurationError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Load and validate configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigurationError> {
        let cfg: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigurationError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String, ConfigurationError> {
        serde_yaml::to_string(self).map_err(|e| ConfigurationError::Parse(e.to_string()))
    }
}
