// src/systems/sdk.rs

//! # Systems SDK
//!
//! Seams between the systems and the host application, plus the incremental
//! job cursor shared by every budgeted fill.
//!
//! ## Injection instead of ambient state
//! Systems never reach for a global model or network handle. The host passes
//! in implementations of:
//! - [`LossEvaluator`]: `L(p)` for a parameter point. Deterministic for a fixed
//!   model state; `revision()` changes whenever that state changes.
//! - [`OptimalPointProvider`]: the best known parameters, once available.
//! - [`AxisRangeProvider`]: the current per-axis ranges.
//! - [`LandmarkSink`]: receives stage / completion notifications.
//!
//! Closures work for the common cases: `Fn(ParameterPoint) -> f64` is an
//! evaluator, `AxisRanges` and `Option<ParameterPoint>` are constant providers,
//! `()` is a no-op sink and `Vec<LandmarkEvent>` records events.
//!
//! ## Incremental jobs
//! Anything that walks a large grid does it through a [`FillCursor`]: a
//! resumable position in a fixed scan order, advanced by at most `budget`
//! work items per call. Restarting a job is just resetting its cursor; there
//! is no separate cancellation path.

use crate::error::EvaluatorError;
use crate::systems::coords::AxisRanges;
use crate::ParameterPoint;

/// The externally supplied cost function.
pub trait LossEvaluator {
    fn evaluate(&self, p: ParameterPoint) -> Result<f64, EvaluatorError>;

    /// Bumped whenever previously returned values stop being comparable
    /// (e.g. the evaluated model was updated).
    fn revision(&self) -> u64 {
        0
    }
}

impl<F> LossEvaluator for F
where
    F: Fn(ParameterPoint) -> f64,
{
    fn evaluate(&self, p: ParameterPoint) -> Result<f64, EvaluatorError> {
        let value = self(p);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvaluatorError::NonFinite { point: p, value })
        }
    }
}

/// Best known parameters; `None` until available.
pub trait OptimalPointProvider {
    fn optimal(&self) -> Option<ParameterPoint>;
}

impl OptimalPointProvider for Option<ParameterPoint> {
    fn optimal(&self) -> Option<ParameterPoint> {
        *self
    }
}

impl OptimalPointProvider for ParameterPoint {
    fn optimal(&self) -> Option<ParameterPoint> {
        Some(*self)
    }
}

/// Current per-axis parameter ranges.
pub trait AxisRangeProvider {
    fn ranges(&self) -> AxisRanges;
}

impl AxisRangeProvider for AxisRanges {
    fn ranges(&self) -> AxisRanges {
        *self
    }
}

/// Landmark notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LandmarkEvent {
    /// Stage `n` (1..=3) was reached.
    StageReached(u8),
    /// Stage 3 was reached; fires once per progression.
    GameCompleted,
}

/// Receives landmark notifications. Both methods default to no-ops.
pub trait LandmarkSink {
    fn stage_reached(&mut self, _stage: u8) {}
    fn game_completed(&mut self) {}
}

impl LandmarkSink for () {}

impl LandmarkSink for Vec<LandmarkEvent> {
    fn stage_reached(&mut self, stage: u8) {
        self.push(LandmarkEvent::StageReached(stage));
    }
    fn game_completed(&mut self) {
        self.push(LandmarkEvent::GameCompleted);
    }
}

/// Resumable position in a linear scan over `len` work items.
#[derive(Clone, Debug)]
pub struct FillCursor {
    next: usize,
    len: usize,
}

impl FillCursor {
    pub fn new(len: usize) -> Self {
        Self { next: 0, len }
    }

    pub fn restart(&mut self) {
        self.next = 0;
    }

    pub fn is_done(&self) -> bool {
        self.next >= self.len
    }

    pub fn position(&self) -> usize {
        self.next
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Visit items in order until `budget` of them report work done.
    ///
    /// `work(idx)` returns `Ok(true)` when it spent an evaluation and
    /// `Ok(false)` when the item needed nothing. On error the cursor stays on
    /// the failing item. Returns the number of items that did work.
    pub fn advance<E>(
        &mut self,
        budget: usize,
        mut work: impl FnMut(usize) -> Result<bool, E>,
    ) -> Result<usize, E> {
        let mut spent = 0;
        while spent < budget && self.next < self.len {
            if work(self.next)? {
                spent += 1;
            }
            self.next += 1;
        }
        Ok(spent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_respects_budget_and_resumes() {
        let mut c = FillCursor::new(10);
        let mut seen = Vec::new();
        let n = c
            .advance::<()>(4, |i| {
                seen.push(i);
                Ok(true)
            })
            .unwrap();
        assert_eq!(n, 4);
        assert_eq!(c.position(), 4);
        let n = c.advance::<()>(100, |_| Ok(true)).unwrap();
        assert_eq!(n, 6);
        assert!(c.is_done());
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn skipped_items_do_not_consume_budget() {
        let mut c = FillCursor::new(10);
        let n = c.advance::<()>(2, |i| Ok(i % 3 == 0)).unwrap();
        assert_eq!(n, 2);
        // 0 and 3 did work; cursor sits after 3
        assert_eq!(c.position(), 4);
    }

    #[test]
    fn error_leaves_cursor_on_failing_item() {
        let mut c = FillCursor::new(10);
        let r = c.advance(5, |i| if i == 2 { Err("boom") } else { Ok(true) });
        assert_eq!(r, Err("boom"));
        assert_eq!(c.position(), 2);
    }

    #[test]
    fn closure_evaluator_rejects_nan() {
        let f = |_p: ParameterPoint| f64::NAN;
        assert!(matches!(
            f.evaluate(ParameterPoint::default()),
            Err(EvaluatorError::NonFinite { .. })
        ));
        assert_eq!(f.revision(), 0);
    }

    #[test]
    fn vec_sink_records_events() {
        let mut events: Vec<LandmarkEvent> = Vec::new();
        events.stage_reached(3);
        events.game_completed();
        assert_eq!(events, vec![LandmarkEvent::StageReached(3), LandmarkEvent::GameCompleted]);
    }
}
