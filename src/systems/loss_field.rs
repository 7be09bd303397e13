//! Cached, incrementally filled discretisation of the loss function.
//!
//! Two grids sit over the same evaluator:
//! - the **coarse** grid covers the whole volume at `coarse_resolution`
//!   samples per axis, with a per-cell "computed" flag;
//! - the **fine** grid covers a cube of half-width `fine_radius` around a
//!   moving centre (clipped to the volume) and is rebuilt wholesale when the
//!   centre drifts more than half a radius.
//!
//! Both are filled by [`LossFieldCache::tick`], each job spending at most
//! `budget` evaluations per call, so a 50³ grid never stalls the host loop.
//! A cell is written in one go and flagged afterwards; `sample` only ever sees
//! the pre-fill default (0, or the last value before an invalidation) or the
//! final value.
//!
//! Grid sample `i` of `n` on an axis `[lo, hi]` sits at `lo + i*(hi-lo)/(n-1)`,
//! so the outer samples lie on the volume faces. Cells are stored x-fastest:
//! `idx = i + n*(j + n*k)`, which is also the fill order.

use log::{debug, info, trace};

use crate::config::FieldConfig;
use crate::error::{ConfigurationError, EvaluatorError};
use crate::mechanics::{control, interp};
use crate::systems::coords::{AxisRange, AxisRanges};
use crate::systems::sdk::{FillCursor, LossEvaluator};
use crate::{AXES, ParameterPoint};

#[inline]
fn cell_index(n: usize, i: usize, j: usize, k: usize) -> usize {
    i + n * (j + n * k)
}

#[inline]
fn cell_coords(n: usize, idx: usize) -> [usize; AXES] {
    [idx % n, (idx / n) % n, idx / (n * n)]
}

/// Parameter point of grid sample `idx` for a grid spanning `bounds`.
#[inline]
fn cell_point(bounds: &AxisRanges, n: usize, idx: usize) -> ParameterPoint {
    let c = cell_coords(n, idx);
    ParameterPoint(std::array::from_fn(|a| {
        let r = bounds.axis(a);
        control::grid_value(c[a], r.lo, r.hi, n)
    }))
}

/// Lower corner index and fractional offset per axis for `p`.
#[inline]
fn locate(bounds: &AxisRanges, n: usize, p: &ParameterPoint) -> ([usize; AXES], [f64; AXES]) {
    let mut base = [0usize; AXES];
    let mut frac = [0.0; AXES];
    for a in 0..AXES {
        let r = bounds.axis(a);
        let g = control::grid_coord(p.axis(a), r.lo, r.hi, n);
        let g0 = g.floor();
        base[a] = g0 as usize;
        frac[a] = g - g0;
    }
    (base, frac)
}

/// Indices of the 8 cells enclosing `base`, laid out `[dz][dy][dx]`.
#[inline]
fn corner_indices(n: usize, base: [usize; AXES]) -> [[[usize; 2]; 2]; 2] {
    std::array::from_fn(|dz| {
        std::array::from_fn(|dy| {
            std::array::from_fn(|dx| cell_index(n, base[0] + dx, base[1] + dy, base[2] + dz))
        })
    })
}

fn interpolate(values: &[f64], bounds: &AxisRanges, n: usize, p: &ParameterPoint) -> f64 {
    let (base, t) = locate(bounds, n, p);
    let idx = corner_indices(n, base);
    let corners = idx.map(|plane| plane.map(|row| row.map(|i| values[i])));
    interp::trilinear(&corners, t[0], t[1], t[2])
}

/// Whole-volume grid with per-cell computed flags.
#[derive(Clone, Debug)]
struct CoarseGrid {
    res: usize,
    values: Vec<f64>,
    computed: Vec<bool>,
    filled: usize,
    cursor: FillCursor,
}

impl CoarseGrid {
    fn new(res: usize) -> Self {
        let len = res.pow(3);
        Self {
            res,
            values: vec![0.0; len],
            computed: vec![false; len],
            filled: 0,
            cursor: FillCursor::new(len),
        }
    }

    fn invalidate(&mut self) {
        self.computed.fill(false);
        self.filled = 0;
        self.cursor.restart();
    }

    fn is_complete(&self) -> bool {
        self.filled == self.values.len()
    }
}

/// Local high-resolution grid. No per-cell flags: it is either fully
/// rebuilt for its anchor (`ready`) or not used at all.
#[derive(Clone, Debug)]
struct FineGrid {
    res: usize,
    radius: f64,
    anchor: Option<ParameterPoint>,
    bounds: AxisRanges,
    values: Vec<f64>,
    cursor: FillCursor,
    ready: bool,
}

impl FineGrid {
    fn new(res: usize, radius: f64, volume: &AxisRanges) -> Self {
        let len = res.pow(3);
        Self {
            res,
            radius,
            anchor: None,
            bounds: *volume,
            values: vec![0.0; len],
            cursor: FillCursor::new(len),
            ready: false,
        }
    }

    /// Restart the rebuild around `center`, discarding any job in flight.
    fn start(&mut self, center: ParameterPoint, volume: &AxisRanges) {
        let r = self.radius;
        self.bounds = AxisRanges(std::array::from_fn(|a| {
            let v = volume.axis(a);
            let c = center.axis(a);
            AxisRange { lo: (c - r).max(v.lo), hi: (c + r).min(v.hi) }
        }));
        self.anchor = Some(center);
        self.cursor.restart();
        self.ready = false;
    }

    fn serves(&self, p: &ParameterPoint) -> bool {
        match self.anchor {
            Some(a) if self.ready => a.distance(p) <= self.radius,
            _ => false,
        }
    }
}

/// Work done by one [`LossFieldCache::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub coarse_evaluated: usize,
    pub fine_evaluated: usize,
    pub coarse_complete: bool,
    pub fine_ready: bool,
}

/// Coarse + fine cache over an injected evaluator.
pub struct LossFieldCache<E> {
    evaluator: E,
    ranges: AxisRanges,
    coarse: CoarseGrid,
    fine: FineGrid,
}

impl<E: LossEvaluator> LossFieldCache<E> {
    /// Validates the configuration and ranges, then evaluates once as a startup check
    /// at the volume centre so a broken evaluator fails setup, not the loop.
    pub fn new(
        evaluator: E,
        ranges: AxisRanges,
        cfg: &FieldConfig,
    ) -> Result<Self, ConfigurationError> {
        cfg.validate()?;
        ranges.validate()?;
        evaluator.evaluate(ranges.center())?;
        debug!(
            "loss field: coarse {}^3, fine {}^3 radius {}",
            cfg.coarse_resolution, cfg.fine_resolution, cfg.fine_radius
        );
        Ok(Self {
            coarse: CoarseGrid::new(cfg.coarse_resolution),
            fine: FineGrid::new(cfg.fine_resolution, cfg.fine_radius, &ranges),
            evaluator,
            ranges,
        })
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn ranges(&self) -> &AxisRanges {
        &self.ranges
    }

    pub fn coarse_resolution(&self) -> usize {
        self.coarse.res
    }

    pub fn fine_resolution(&self) -> usize {
        self.fine.res
    }

    pub fn fine_radius(&self) -> f64 {
        self.fine.radius
    }

    /// Centre the fine grid is (being) built around.
    pub fn fine_center(&self) -> Option<ParameterPoint> {
        self.fine.anchor
    }

    /// Region covered by the fine grid, once it has a centre.
    pub fn fine_bounds(&self) -> Option<AxisRanges> {
        self.fine.anchor.map(|_| self.fine.bounds)
    }

    /// `(computed, total)` coarse cells.
    pub fn coarse_progress(&self) -> (usize, usize) {
        (self.coarse.filled, self.coarse.values.len())
    }

    pub fn is_coarse_complete(&self) -> bool {
        self.coarse.is_complete()
    }

    pub fn is_fine_ready(&self) -> bool {
        self.fine.ready
    }

    /// Stored coarse value, `None` until computed.
    pub fn coarse_value(&self, i: usize, j: usize, k: usize) -> Option<f64> {
        let n = self.coarse.res;
        if i >= n || j >= n || k >= n {
            return None;
        }
        let idx = cell_index(n, i, j, k);
        self.coarse.computed[idx].then(|| self.coarse.values[idx])
    }

    /// Parameter point of coarse sample `(i, j, k)`.
    pub fn coarse_point(&self, i: usize, j: usize, k: usize) -> ParameterPoint {
        let n = self.coarse.res;
        cell_point(&self.ranges, n, cell_index(n, i, j, k))
    }

    /// Interpolated loss at `p`. Uses the fine grid when it is ready and `p`
    /// is within its radius of the fine centre, the coarse grid otherwise.
    pub fn sample(&self, p: &ParameterPoint) -> f64 {
        if self.fine.serves(p) {
            interpolate(&self.fine.values, &self.fine.bounds, self.fine.res, p)
        } else {
            interpolate(&self.coarse.values, &self.ranges, self.coarse.res, p)
        }
    }

    /// Like [`sample`](Self::sample), but evaluates `p` directly when the
    /// coarse cells around it are not computed yet.
    pub fn sample_or_evaluate(&self, p: &ParameterPoint) -> Result<f64, EvaluatorError> {
        if self.fine.serves(p) {
            return Ok(self.sample(p));
        }
        let n = self.coarse.res;
        let (base, _) = locate(&self.ranges, n, p);
        let all_computed = corner_indices(n, base)
            .iter()
            .flatten()
            .flatten()
            .all(|&i| self.coarse.computed[i]);
        if all_computed {
            Ok(interpolate(&self.coarse.values, &self.ranges, n, p))
        } else {
            trace!("sampling miss at {:?}", p);
            self.evaluator.evaluate(*p)
        }
    }

    /// Advance both fill jobs by up to `budget` evaluations each.
    ///
    /// An evaluator error stops the job on the failing cell; the caller
    /// should treat it as fatal.
    pub fn tick(&mut self, budget: usize) -> Result<TickReport, EvaluatorError> {
        let was_complete = self.coarse.is_complete();
        let coarse_evaluated = self.tick_coarse(budget)?;
        let fine_evaluated = self.tick_fine(budget)?;

        let coarse_complete = self.coarse.is_complete();
        if coarse_complete && !was_complete {
            info!("coarse loss grid complete ({} cells)", self.coarse.values.len());
        }
        trace!(
            "tick: coarse +{} ({}/{}), fine +{}",
            coarse_evaluated,
            self.coarse.filled,
            self.coarse.values.len(),
            fine_evaluated
        );
        Ok(TickReport {
            coarse_evaluated,
            fine_evaluated,
            coarse_complete,
            fine_ready: self.fine.ready,
        })
    }

    fn tick_coarse(&mut self, budget: usize) -> Result<usize, EvaluatorError> {
        let CoarseGrid { res, values, computed, filled, cursor } = &mut self.coarse;
        let n = *res;
        let ranges = &self.ranges;
        let evaluator = &self.evaluator;
        cursor.advance(budget, |idx| {
            if computed[idx] {
                return Ok(false);
            }
            let v = evaluator.evaluate(cell_point(ranges, n, idx))?;
            values[idx] = v;
            computed[idx] = true;
            *filled += 1;
            Ok(true)
        })
    }

    fn tick_fine(&mut self, budget: usize) -> Result<usize, EvaluatorError> {
        if self.fine.anchor.is_none() || self.fine.ready {
            return Ok(0);
        }
        let FineGrid { res, bounds, values, cursor, ready, .. } = &mut self.fine;
        let n = *res;
        let evaluator = &self.evaluator;
        let spent = cursor.advance::<EvaluatorError>(budget, |idx| {
            values[idx] = evaluator.evaluate(cell_point(bounds, n, idx))?;
            Ok(true)
        })?;
        if cursor.is_done() {
            *ready = true;
            debug!("fine loss grid ready around {:?}", self.fine.anchor);
        }
        Ok(spent)
    }

    /// Move the fine grid's focus. Rebuilds (over subsequent ticks) only when
    /// `center` is more than half a radius from the current centre; returns
    /// whether a rebuild was started.
    pub fn recenter_fine(&mut self, center: &ParameterPoint) -> bool {
        let center = ParameterPoint(std::array::from_fn(|a| {
            let r = self.ranges.axis(a);
            center.axis(a).clamp(r.lo, r.hi)
        }));
        if let Some(anchor) = self.fine.anchor {
            if anchor.distance(&center) <= self.fine.radius * 0.5 {
                return false;
            }
        }
        debug!("fine loss grid recentred to {:?}", center);
        self.fine.start(center, &self.ranges);
        true
    }

    /// Drop every cached value's authority; both grids refill from scratch.
    pub fn invalidate(&mut self) {
        debug!("loss field invalidated");
        self.coarse.invalidate();
        if let Some(anchor) = self.fine.anchor {
            self.fine.start(anchor, &self.ranges);
        }
    }

    /// Switch to new ranges. Unchanged ranges are a no-op; anything else
    /// invalidates the cache and re-anchors the fine grid inside the new volume.
    pub fn set_ranges(&mut self, ranges: AxisRanges) -> Result<(), ConfigurationError> {
        ranges.validate()?;
        if ranges == self.ranges {
            return Ok(());
        }
        self.ranges = ranges;
        self.coarse.invalidate();
        if let Some(anchor) = self.fine.anchor {
            let clamped = ParameterPoint(std::array::from_fn(|a| {
                let r = ranges.axis(a);
                anchor.axis(a).clamp(r.lo, r.hi)
            }));
            self.fine.start(clamped, &self.ranges);
        }
        info!("loss field ranges changed to {:?}", ranges);
        Ok(())
    }
}
