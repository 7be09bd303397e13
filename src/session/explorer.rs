//! # Explorer
//!
//! One host frame, in order:
//! 1. pick up range changes (rebuild mapper and boundary, invalidate the
//!    field, reset landmarks) and evaluator revisions (invalidate);
//! 2. map the navigated display point to parameters and clamp it;
//! 3. recentre the fine grid on it and run one budgeted `tick`;
//! 4. sample the field there;
//! 5. create the landmark progression once the optimum is known, then check
//!    whether the active landmark was reached.
//!
//! Construction validates the whole setup, so a host that gets an `Explorer`
//! back will not hit a `ConfigurationError` inside the loop. Mid-session the
//! only error is an `EvaluatorError`, which is fatal for the session.

use log::{debug, info, warn};

use crate::config::ExplorerConfig;
use crate::error::{ConfigurationError, EvaluatorError};
use crate::systems::boundary::BoundaryConstraint;
use crate::systems::coords::{AxisRanges, CoordinateMapper};
use crate::systems::landmarks::{LandmarkController, Progress};
use crate::systems::loss_field::{LossFieldCache, TickReport};
use crate::systems::sdk::{AxisRangeProvider, LandmarkSink, LossEvaluator, OptimalPointProvider};
use crate::{DisplayPoint, ParameterPoint};

/// What one `step` produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    /// Clamped parameters of the navigated point.
    pub parameters: ParameterPoint,
    /// Display position of `parameters` (inside the volume).
    pub display: DisplayPoint,
    /// The host should stop any motion when this is set.
    pub was_clamped: bool,
    pub loss: f64,
    /// `None` until the optimum is available.
    pub progress: Option<Progress>,
    /// A landmark was reached during this step.
    pub reached: bool,
    pub tick: TickReport,
}

pub struct Explorer<E, R, O> {
    cfg: ExplorerConfig,
    range_source: R,
    optimum_source: O,
    ranges: AxisRanges,
    mapper: CoordinateMapper,
    boundary: BoundaryConstraint,
    field: LossFieldCache<E>,
    landmarks: Option<LandmarkController>,
    first_axis: Option<usize>,
    revision: u64,
    /// Code of the last reason the landmarks could not start; repeats log at
    /// debug level.
    landmark_failure: Option<&'static str>,
}

impl<E, R, O> Explorer<E, R, O>
where
    E: LossEvaluator,
    R: AxisRangeProvider,
    O: OptimalPointProvider,
{
    pub fn new(
        cfg: ExplorerConfig,
        evaluator: E,
        range_source: R,
        optimum_source: O,
    ) -> Result<Self, ConfigurationError> {
        Self::build(cfg, evaluator, range_source, optimum_source, None)
    }

    /// Like [`new`](Self::new) with the first landmark axis pinned.
    pub fn with_first_axis(
        cfg: ExplorerConfig,
        evaluator: E,
        range_source: R,
        optimum_source: O,
        first_axis: usize,
    ) -> Result<Self, ConfigurationError> {
        Self::build(cfg, evaluator, range_source, optimum_source, Some(first_axis))
    }

    fn build(
        cfg: ExplorerConfig,
        evaluator: E,
        range_source: R,
        optimum_source: O,
        first_axis: Option<usize>,
    ) -> Result<Self, ConfigurationError> {
        cfg.validate()?;
        let ranges = range_source.ranges();
        let mapper = CoordinateMapper::new(ranges, cfg.volume.half_size)?;
        let boundary = BoundaryConstraint::new(ranges)?;
        let field = LossFieldCache::new(evaluator, ranges, &cfg.field)?;
        let revision = field.evaluator().revision();
        let mut explorer = Self {
            cfg,
            range_source,
            optimum_source,
            ranges,
            mapper,
            boundary,
            field,
            landmarks: None,
            first_axis,
            revision,
            landmark_failure: None,
        };
        if let Some(opt) = explorer.optimum_source.optimal() {
            explorer.landmarks = Some(explorer.make_landmarks(opt)?);
        }
        info!(
            "explorer ready: ranges {:?}, {} ticks to fill coarse grid",
            ranges,
            explorer.cfg.field.ticks_to_fill()
        );
        Ok(explorer)
    }

    fn make_landmarks(&self, optimum: ParameterPoint) -> Result<LandmarkController, ConfigurationError> {
        match self.first_axis {
            Some(axis) => {
                LandmarkController::with_first_axis(optimum, self.ranges, &self.cfg.landmarks, axis)
            }
            None => LandmarkController::new(optimum, self.ranges, &self.cfg.landmarks),
        }
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.cfg
    }

    pub fn ranges(&self) -> &AxisRanges {
        &self.ranges
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn boundary(&self) -> &BoundaryConstraint {
        &self.boundary
    }

    pub fn field(&self) -> &LossFieldCache<E> {
        &self.field
    }

    pub fn landmarks(&self) -> Option<&LandmarkController> {
        self.landmarks.as_ref()
    }

    /// The host knows the evaluator's outputs changed.
    pub fn invalidate_field(&mut self) {
        self.field.invalidate();
    }

    /// Start the landmark progression over with a fresh first axis.
    pub fn reset_landmarks(&mut self) {
        if let Some(l) = self.landmarks.as_mut() {
            l.reset();
        }
    }

    /// Tick until the coarse grid is full or `max_ticks` ran out; returns the
    /// ticks used. For hosts that show a loading phase before navigation.
    pub fn fill(&mut self, max_ticks: usize) -> Result<usize, EvaluatorError> {
        let budget = self.cfg.field.tick_budget;
        let mut used = 0;
        while used < max_ticks && !self.field.is_coarse_complete() {
            self.field.tick(budget)?;
            used += 1;
        }
        Ok(used)
    }

    fn sync_ranges(&mut self) {
        let next = self.range_source.ranges();
        if next == self.ranges {
            return;
        }
        if let Err(e) = self.mapper.set_ranges(next) {
            warn!("ignoring invalid range update ({}): {}", e.code(), e);
            return;
        }
        if let Err(e) = self.boundary.set_ranges(next).and_then(|_| self.field.set_ranges(next)) {
            warn!("ignoring invalid range update ({}): {}", e.code(), e);
            let _ = self.mapper.set_ranges(self.ranges);
            let _ = self.boundary.set_ranges(self.ranges);
            return;
        }
        self.ranges = next;
        if let Some(l) = self.landmarks.as_mut() {
            let opt = self.optimum_source.optimal().unwrap_or_else(|| l.optimum());
            if let Err(e) = l.reset_with(opt, next) {
                warn!("landmark reset failed ({}): {}", e.code(), e);
            }
        }
        info!("axis ranges changed to {:?}", next);
    }

    fn sync_revision(&mut self) {
        let rev = self.field.evaluator().revision();
        if rev != self.revision {
            debug!("evaluator revision {} -> {}", self.revision, rev);
            self.revision = rev;
            self.field.invalidate();
        }
    }

    fn sync_landmarks(&mut self) {
        if self.landmarks.is_some() {
            return;
        }
        if let Some(opt) = self.optimum_source.optimal() {
            match self.make_landmarks(opt) {
                Ok(l) => {
                    info!("optimum available, landmarks start at first axis {}", l.first_axis());
                    self.landmarks = Some(l);
                    self.landmark_failure = None;
                }
                Err(e) if self.landmark_failure == Some(e.code()) => {
                    debug!("landmarks still unavailable ({})", e.code());
                }
                Err(e) => {
                    warn!("cannot start landmarks ({}): {}", e.code(), e);
                    self.landmark_failure = Some(e.code());
                }
            }
        }
    }

    /// Run one host frame for the navigated display point.
    pub fn step<S: LandmarkSink + ?Sized>(
        &mut self,
        position: &DisplayPoint,
        sink: &mut S,
    ) -> Result<Frame, EvaluatorError> {
        self.sync_ranges();
        self.sync_revision();

        let clamped = self.boundary.clamp(&self.mapper.to_parameters(position));
        let p = clamped.point;

        self.field.recenter_fine(&p);
        let tick = self.field.tick(self.cfg.field.tick_budget)?;
        let loss = if self.cfg.field.evaluate_on_miss {
            self.field.sample_or_evaluate(&p)?
        } else {
            self.field.sample(&p)
        };

        self.sync_landmarks();
        let snap = self.cfg.landmarks.snap_radius;
        let (reached, progress) = match self.landmarks.as_mut() {
            Some(l) => (l.check_reached(&p, snap, sink), Some(l.progress())),
            None => (false, None),
        };

        Ok(Frame {
            parameters: p,
            display: self.mapper.to_display(&p),
            was_clamped: clamped.was_clamped,
            loss,
            progress,
            reached,
            tick,
        })
    }
}
