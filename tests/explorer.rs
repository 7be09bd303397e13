// tests/explorer.rs
#![cfg(feature = "session-explorer")]

use std::cell::Cell;
use std::rc::Rc;

use loss_landscape::session::Explorer;
use loss_landscape::systems::landmarks::Progress;
use loss_landscape::{
    AxisRange, AxisRangeProvider, AxisRanges, ConfigurationError, DisplayPoint, EvaluatorError,
    ExplorerConfig, LandmarkEvent, LossEvaluator, OptimalPointProvider, ParameterPoint,
};

fn scenario_ranges() -> AxisRanges {
    AxisRanges::weight_bias(AxisRange { lo: -3.0, hi: 3.0 }, AxisRange { lo: -2.0, hi: 2.0 }).unwrap()
}

fn small_cfg() -> ExplorerConfig {
    let mut cfg = ExplorerConfig::default();
    cfg.field.coarse_resolution = 8;
    cfg.field.fine_resolution = 5;
    cfg.field.fine_radius = 0.5;
    cfg.field.tick_budget = 128;
    cfg.landmarks.seed = Some(2024);
    cfg
}

/// Evaluator whose "model" can be swapped mid-session.
#[derive(Clone)]
struct Model {
    offset: Rc<Cell<f64>>,
    revision: Rc<Cell<u64>>,
}

impl LossEvaluator for Model {
    fn evaluate(&self, p: ParameterPoint) -> Result<f64, EvaluatorError> {
        Ok(self.offset.get() + p.axis(0) * p.axis(0))
    }
    fn revision(&self) -> u64 {
        self.revision.get()
    }
}

#[derive(Clone)]
struct SharedRanges(Rc<Cell<AxisRanges>>);

impl AxisRangeProvider for SharedRanges {
    fn ranges(&self) -> AxisRanges {
        self.0.get()
    }
}

#[derive(Clone)]
struct LateOptimum(Rc<Cell<Option<ParameterPoint>>>);

impl OptimalPointProvider for LateOptimum {
    fn optimal(&self) -> Option<ParameterPoint> {
        self.0.get()
    }
}

/* ──────────────────────────────────────────────────────────────────────────
1) Startup — configuration errors are caught before the loop
────────────────────────────────────────────────────────────────────────── */

#[test]
fn broken_setups_refuse_to_start() {
    let flat = AxisRanges([AxisRange { lo: 1.0, hi: 1.0 }; 3]);
    let r = Explorer::new(small_cfg(), |_p: ParameterPoint| 0.0, flat, None::<ParameterPoint>);
    assert!(matches!(r, Err(ConfigurationError::DegenerateRange { axis: 0, .. })));

    let r = Explorer::new(small_cfg(), |_p: ParameterPoint| f64::NAN, scenario_ranges(), None::<ParameterPoint>);
    assert!(matches!(r, Err(ConfigurationError::Evaluator(_))));

    let r = Explorer::with_first_axis(
        small_cfg(),
        |_p: ParameterPoint| 0.0,
        scenario_ranges(),
        Some(ParameterPoint::new(0.0, 0.0, 0.0)),
        7,
    );
    assert!(matches!(r, Err(ConfigurationError::InvalidAxis { axis: 7 })));
}

/* ──────────────────────────────────────────────────────────────────────────
2) Host loop — fill proceeds under navigation, landmarks fire via the sink
────────────────────────────────────────────────────────────────────────── */

#[test]
fn walking_the_landmarks_completes_the_game() {
    let opt = ParameterPoint::new(1.5, -0.5, 0.2);
    let mut ex = Explorer::with_first_axis(small_cfg(), |p: ParameterPoint| p.distance(&opt), scenario_ranges(), opt, 1)
        .unwrap();
    let mut events: Vec<LandmarkEvent> = Vec::new();

    let mut frames = 0;
    while let Some(target) = ex.landmarks().and_then(|l| l.active()).map(|l| l.target) {
        let d = ex.mapper().to_display(&target);
        let f = ex.step(&d, &mut events).unwrap();
        assert!(f.reached);
        assert!(!f.was_clamped);
        assert!((f.parameters.distance(&target)) < 1e-9);
        frames += 1;
        assert!(frames <= 3);
    }
    assert_eq!(frames, 3);
    assert_eq!(ex.landmarks().unwrap().progress(), Progress::Completed);
    assert_eq!(events.last(), Some(&LandmarkEvent::GameCompleted));
    assert_eq!(events.len(), 4);

    // Standing on the optimum afterwards fires nothing.
    let f = ex.step(&ex.mapper().to_display(&opt), &mut events).unwrap();
    assert!(!f.reached);
    assert_eq!(f.progress, Some(Progress::Completed));
    assert_eq!(events.len(), 4);
}

#[test]
fn coarse_grid_fills_while_navigating() {
    let mut ex = Explorer::new(small_cfg(), |_p: ParameterPoint| 2.5, scenario_ranges(), None::<ParameterPoint>)
        .unwrap();
    let ticks = small_cfg().field.ticks_to_fill();
    let mut last = None;
    for i in 0..ticks {
        let x = -5.0 + 10.0 * i as f64 / ticks as f64;
        last = Some(ex.step(&DisplayPoint::new(x, 0.0, 0.0), &mut ()).unwrap());
    }
    let last = last.unwrap();
    assert!(last.tick.coarse_complete);
    assert!(ex.field().is_coarse_complete());
    assert_eq!(ex.field().sample(&ParameterPoint::new(-1.0, 2.0, 0.5)), 2.5);
}

#[test]
fn fill_runs_to_completion_up_front() {
    let mut ex = Explorer::new(small_cfg(), |_p: ParameterPoint| 1.0, scenario_ranges(), None::<ParameterPoint>)
        .unwrap();
    let used = ex.fill(1_000).unwrap();
    assert_eq!(used, small_cfg().field.ticks_to_fill());
    assert_eq!(ex.fill(1_000).unwrap(), 0);
}

#[test]
fn evaluate_on_miss_gives_exact_values_before_fill() {
    let mut cfg = small_cfg();
    cfg.field.evaluate_on_miss = true;
    cfg.field.tick_budget = 1;
    let f = |p: ParameterPoint| p.axis(0) + 2.0 * p.axis(1) - p.axis(2);
    let mut ex = Explorer::new(cfg, f, scenario_ranges(), None::<ParameterPoint>).unwrap();
    let d = DisplayPoint::new(1.0, -2.0, 0.5);
    let frame = ex.step(&d, &mut ()).unwrap();
    assert!((frame.loss - f(frame.parameters)).abs() < 1e-12);
}

/* ──────────────────────────────────────────────────────────────────────────
3) Providers — late optimum, range changes, model revisions
────────────────────────────────────────────────────────────────────────── */

#[test]
fn landmarks_start_once_optimum_arrives() {
    let optimum = LateOptimum(Rc::new(Cell::new(None)));
    let mut ex = Explorer::new(small_cfg(), |_p: ParameterPoint| 0.0, scenario_ranges(), optimum.clone()).unwrap();
    assert!(ex.step(&DisplayPoint::default(), &mut ()).unwrap().progress.is_none());

    optimum.0.set(Some(ParameterPoint::new(0.5, 0.5, 0.5)));
    let f = ex.step(&DisplayPoint::default(), &mut ()).unwrap();
    assert!(matches!(f.progress, Some(Progress::Stage(_))));
    assert!(ex.landmarks().is_some());
}

#[test]
fn range_change_invalidates_and_resets() {
    let shared = SharedRanges(Rc::new(Cell::new(scenario_ranges())));
    let opt = ParameterPoint::new(1.0, 1.0, 0.0);
    let mut ex = Explorer::with_first_axis(small_cfg(), |_p: ParameterPoint| 1.0, shared.clone(), opt, 0).unwrap();
    ex.fill(1_000).unwrap();
    assert!(ex.field().is_coarse_complete());

    // advance one stage
    let t = ex.landmarks().unwrap().active().unwrap().target;
    assert!(ex.step(&ex.mapper().to_display(&t), &mut ()).unwrap().reached);
    assert_eq!(ex.landmarks().unwrap().stage(), 2);

    let wider = AxisRanges::weight_bias(AxisRange { lo: -6.0, hi: 6.0 }, AxisRange { lo: -2.0, hi: 2.0 }).unwrap();
    shared.0.set(wider);
    let f = ex.step(&DisplayPoint::new(5.0, 0.0, 0.0), &mut ()).unwrap();
    assert_eq!(*ex.ranges(), wider);
    assert_eq!(f.parameters.axis(0), 6.0);
    assert_eq!(ex.landmarks().unwrap().stage(), 1);
    let (done, total) = ex.field().coarse_progress();
    assert!(done < total);

    // A degenerate update is ignored rather than tearing the session down.
    shared.0.set(AxisRanges([AxisRange { lo: 0.0, hi: 0.0 }; 3]));
    ex.step(&DisplayPoint::default(), &mut ()).unwrap();
    assert_eq!(*ex.ranges(), wider);
}

#[test]
fn model_revision_triggers_refill() {
    let model = Model { offset: Rc::new(Cell::new(0.0)), revision: Rc::new(Cell::new(0)) };
    let mut ex = Explorer::new(small_cfg(), model.clone(), scenario_ranges(), None::<ParameterPoint>).unwrap();
    ex.fill(1_000).unwrap();
    let p = ParameterPoint::new(-3.0, -3.0, -2.0);
    assert_eq!(ex.field().sample(&p), 9.0);

    model.offset.set(10.0);
    model.revision.set(1);
    ex.step(&DisplayPoint::new(4.0, 4.0, 4.0), &mut ()).unwrap();
    ex.fill(1_000).unwrap();
    assert_eq!(ex.field().sample(&p), 19.0);
}

#[test]
fn evaluator_failure_mid_session_is_returned() {
    let broken = Rc::new(Cell::new(false));
    let eval = {
        let broken = Rc::clone(&broken);
        move |_p: ParameterPoint| if broken.get() { f64::INFINITY } else { 0.0 }
    };
    let mut ex = Explorer::new(small_cfg(), eval, scenario_ranges(), None::<ParameterPoint>).unwrap();
    ex.step(&DisplayPoint::default(), &mut ()).unwrap();
    broken.set(true);
    let err = ex.step(&DisplayPoint::default(), &mut ()).unwrap_err();
    assert!(matches!(err, EvaluatorError::NonFinite { .. }));
}
