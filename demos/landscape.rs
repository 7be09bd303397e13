// demos/landscape.rs
// Run with:
//   RUST_LOG=info cargo run --example landscape

use loss_landscape::session::Explorer;
use loss_landscape::{
    AxisRange, AxisRanges, DisplayPoint, ExplorerConfig, LandmarkEvent, ParameterPoint,
};

/// Squared error of a 2-input linear neuron over a tiny fixed dataset.
fn mse(p: ParameterPoint) -> f64 {
    const DATA: [([f64; 2], f64); 4] = [
        ([0.0, 0.0], 0.2),
        ([1.0, 0.0], 1.7),
        ([0.0, 1.0], -0.3),
        ([1.0, 1.0], 1.2),
    ];
    let [w1, w2, b] = p.0;
    DATA.iter()
        .map(|([x1, x2], y)| {
            let e = w1 * x1 + w2 * x2 + b - y;
            e * e
        })
        .sum::<f64>()
        / DATA.len() as f64
}

fn main() {
    env_logger::init();

    let ranges = AxisRanges::weight_bias(
        AxisRange::spanning(0, -0.4, 1.5, 0.5, 2.0).expect("weight range"),
        AxisRange::spanning(2, 0.0, 0.2, 0.5, 2.0).expect("bias range"),
    )
    .expect("ranges");
    let optimum = ParameterPoint::new(1.5, -0.5, 0.2);

    let mut cfg = ExplorerConfig::default();
    cfg.landmarks.seed = Some(7);

    let mut explorer = match Explorer::new(cfg, mse, ranges, optimum) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("refusing to start ({}): {}", e.code(), e);
            return;
        }
    };

    // Walk straight toward each landmark in display space.
    let mut events: Vec<LandmarkEvent> = Vec::new();
    let mut pos = DisplayPoint::default();
    for frame in 0..2_000 {
        let Some(target) = explorer.landmarks().and_then(|l| l.active()).map(|l| l.target) else {
            break;
        };
        let goal = explorer.mapper().to_display(&target);
        pos = DisplayPoint(std::array::from_fn(|a| {
            let d = goal.axis(a) - pos.axis(a);
            pos.axis(a) + d.clamp(-0.05, 0.05)
        }));
        let f = explorer.step(&pos, &mut events).expect("evaluator");
        if f.reached || frame % 100 == 0 {
            let (done, total) = explorer.field().coarse_progress();
            println!(
                "frame {:4}  θ=({:+.2},{:+.2},{:+.2})  loss={:.4}  {:?}  grid {}/{}",
                frame, f.parameters.0[0], f.parameters.0[1], f.parameters.0[2], f.loss, f.progress, done, total
            );
        }
    }

    println!("== events ==");
    for e in &events {
        println!("{:?}", e);
    }
}
