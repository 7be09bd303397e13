//! Progressive landmarks: three increasingly constrained targets that lead
//! the navigator to the known optimum.
//!
//! On (re)initialisation a random `first_axis` fixes the rotation
//! `[first, first+1, first+2] (mod 3)`. At stage `s` the first `s` axes of
//! that rotation are locked to the optimum; the rest are drawn uniformly from
//! their range, outside a band of `snap_radius` around the optimum so a free
//! axis never gives the optimum away. Each stage re-draws its free axes.
//!
//! Transitions are strictly forward: `Stage(1) -> Stage(2) -> Stage(3) ->
//! Completed`; only `reset` goes back.
//!
//! Reaching is edge triggered: a stage fires only when the position enters the
//! snap radius of the active target. If the position that completed a stage is
//! already inside the radius of the next target, it has to leave and come back.

use bevy_prng::WyRand;
use log::{debug, info, warn};
use rand_core::SeedableRng;

use crate::config::LandmarkConfig;
use crate::error::ConfigurationError;
use crate::mechanics::stoch;
use crate::systems::coords::AxisRanges;
use crate::systems::sdk::LandmarkSink;
use crate::{AXES, ParameterPoint};

/// Number of stages before completion.
pub const STAGES: u8 = 3;

/// One target configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landmark {
    /// 1..=3
    pub stage: u8,
    pub target: ParameterPoint,
    /// Axes held at their optimal value.
    pub locked: [bool; AXES],
}

impl Landmark {
    pub fn locked_count(&self) -> usize {
        self.locked.iter().filter(|&&l| l).count()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    Stage(u8),
    Completed,
}

/// Snapshot of the progression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LandmarkGameState {
    pub stage: u8,
    pub completed: bool,
    pub first_axis: usize,
}

pub struct LandmarkController {
    optimum: ParameterPoint,
    ranges: AxisRanges,
    exclusion: f64,
    first_axis: usize,
    stage: u8,
    completed: bool,
    active: Landmark,
    /// Last checked position was within snap of `active`.
    inside: bool,
    rng: WyRand,
}

fn seeded(cfg: &LandmarkConfig) -> WyRand {
    match cfg.seed {
        Some(seed) => WyRand::from_seed(seed.to_le_bytes()),
        None => WyRand::from_os_rng(),
    }
}

/// Optimum pulled inside the volume so every stage stays reachable.
fn reachable_optimum(optimum: ParameterPoint, ranges: &AxisRanges) -> ParameterPoint {
    let clamped = ParameterPoint(std::array::from_fn(|a| {
        let r = ranges.axis(a);
        optimum.axis(a).clamp(r.lo, r.hi)
    }));
    if clamped != optimum {
        warn!("optimum {:?} lies outside the volume; using {:?}", optimum, clamped);
    }
    clamped
}

impl LandmarkController {
    /// Random `first_axis`; seeded from `cfg.seed` or OS entropy.
    pub fn new(
        optimum: ParameterPoint,
        ranges: AxisRanges,
        cfg: &LandmarkConfig,
    ) -> Result<Self, ConfigurationError> {
        let mut rng = seeded(cfg);
        let first_axis = stoch::pick_axis(&mut rng);
        Self::build(optimum, ranges, cfg, first_axis, rng)
    }

    /// Pinned `first_axis`, for deterministic setups.
    pub fn with_first_axis(
        optimum: ParameterPoint,
        ranges: AxisRanges,
        cfg: &LandmarkConfig,
        first_axis: usize,
    ) -> Result<Self, ConfigurationError> {
        if first_axis >= AXES {
            return Err(ConfigurationError::InvalidAxis { axis: first_axis });
        }
        Self::build(optimum, ranges, cfg, first_axis, seeded(cfg))
    }

    fn build(
        optimum: ParameterPoint,
        ranges: AxisRanges,
        cfg: &LandmarkConfig,
        first_axis: usize,
        rng: WyRand,
    ) -> Result<Self, ConfigurationError> {
        cfg.validate()?;
        ranges.validate()?;
        if !optimum.is_finite() {
            return Err(ConfigurationError::NonFiniteOptimum { point: optimum });
        }
        let optimum = reachable_optimum(optimum, &ranges);
        let mut ctl = Self {
            optimum,
            ranges,
            exclusion: cfg.snap_radius,
            first_axis,
            stage: 1,
            completed: false,
            active: Landmark { stage: 1, target: optimum, locked: [true; AXES] },
            inside: false,
            rng,
        };
        ctl.active = ctl.generate(1);
        Ok(ctl)
    }

    pub fn optimum(&self) -> ParameterPoint {
        self.optimum
    }

    pub fn first_axis(&self) -> usize {
        self.first_axis
    }

    /// Axis order in which stages lock onto the optimum.
    pub fn rotation(&self) -> [usize; AXES] {
        std::array::from_fn(|i| (self.first_axis + i) % AXES)
    }

    pub fn stage(&self) -> u8 {
        self.stage
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn progress(&self) -> Progress {
        if self.completed { Progress::Completed } else { Progress::Stage(self.stage) }
    }

    pub fn state(&self) -> LandmarkGameState {
        LandmarkGameState {
            stage: self.stage,
            completed: self.completed,
            first_axis: self.first_axis,
        }
    }

    /// Target to reach, `None` once completed.
    pub fn active(&self) -> Option<&Landmark> {
        (!self.completed).then_some(&self.active)
    }

    fn generate(&mut self, stage: u8) -> Landmark {
        let rotation = self.rotation();
        let mut locked = [false; AXES];
        for &a in rotation.iter().take(stage as usize) {
            locked[a] = true;
        }
        let mut target = self.optimum;
        for a in 0..AXES {
            if locked[a] {
                continue;
            }
            let r = self.ranges.axis(a);
            let opt = self.optimum.axis(a);
            let v = match stoch::uniform_excluding(&mut self.rng, r.lo, r.hi, opt, self.exclusion) {
                Some(v) => v,
                None => {
                    // band covers the axis: take the end farthest from the optimum
                    warn!("axis {} range {:?} too narrow to hide the optimum", a, r);
                    if opt - r.lo > r.hi - opt { r.lo } else { r.hi }
                }
            };
            target = target.with_axis(a, v);
        }
        debug!("landmark stage {} target {:?} locked {:?}", stage, target, locked);
        Landmark { stage, target, locked }
    }

    /// Whether `position` reached the active target; on success advances the
    /// stage (or completes) and notifies `sink` exactly once. Staying inside
    /// the snap radius never fires twice.
    pub fn check_reached<S: LandmarkSink + ?Sized>(
        &mut self,
        position: &ParameterPoint,
        snap_radius: f64,
        sink: &mut S,
    ) -> bool {
        if self.completed {
            return false;
        }
        let within = position.distance(&self.active.target) <= snap_radius;
        let entered = within && !self.inside;
        self.inside = within;
        if !entered {
            return false;
        }
        let reached = self.stage;
        info!("landmark stage {} reached", reached);
        sink.stage_reached(reached);
        if reached < STAGES {
            self.stage = reached + 1;
            self.active = self.generate(self.stage);
            self.inside = position.distance(&self.active.target) <= snap_radius;
            if self.inside {
                debug!("position already within snap of stage {}; waiting for re-entry", self.stage);
            }
        } else {
            self.completed = true;
            info!("landmark progression completed");
            sink.game_completed();
        }
        true
    }

    /// Re-roll `first_axis` and go back to stage 1.
    pub fn reset(&mut self) {
        self.first_axis = stoch::pick_axis(&mut self.rng);
        self.stage = 1;
        self.completed = false;
        self.inside = false;
        self.active = self.generate(1);
        debug!("landmarks reset, first axis {}", self.first_axis);
    }

    /// Reset against a new optimum and/or new ranges.
    pub fn reset_with(
        &mut self,
        optimum: ParameterPoint,
        ranges: AxisRanges,
    ) -> Result<(), ConfigurationError> {
        ranges.validate()?;
        if !optimum.is_finite() {
            return Err(ConfigurationError::NonFiniteOptimum { point: optimum });
        }
        self.ranges = ranges;
        self.optimum = reachable_optimum(optimum, &ranges);
        self.reset();
        Ok(())
    }
}
