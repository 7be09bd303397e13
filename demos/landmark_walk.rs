// demos/landmark_walk.rs
// Run with:
//   cargo run --example landmark_walk --no-default-features --features system-landmarks

use loss_landscape::systems::landmarks::LandmarkController;
use loss_landscape::{AxisRange, AxisRanges, LandmarkConfig, LandmarkSink, ParameterPoint};

/// Prints notifications as they arrive.
struct Console;

impl LandmarkSink for Console {
    fn stage_reached(&mut self, stage: u8) {
        println!("  -> stage {} reached", stage);
    }
    fn game_completed(&mut self) {
        println!("  -> all landmarks reached");
    }
}

fn main() {
    let ranges = AxisRanges::weight_bias(AxisRange { lo: -3.0, hi: 3.0 }, AxisRange { lo: -2.0, hi: 2.0 })
        .expect("ranges");
    let optimum = ParameterPoint::new(1.5, -0.5, 0.2);
    let cfg = LandmarkConfig { snap_radius: 0.3, seed: Some(42) };

    let mut ctl = match LandmarkController::new(optimum, ranges, &cfg) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };
    println!("rotation {:?}", ctl.rotation());

    let mut sink = Console;
    while let Some(l) = ctl.active().copied() {
        println!("stage {} target {:?} locked {:?}", l.stage, l.target.0, l.locked);
        ctl.check_reached(&l.target, cfg.snap_radius, &mut sink);
    }
    println!("final state {:?}", ctl.state());
}
