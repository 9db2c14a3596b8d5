//! End-to-end demo: a synthetic camera, a scripted walker, and one
//! forbidden zone. Prints the intrusion flags the transport layer would
//! stream.
//!
//! Run with: RUST_LOG=info cargo run --example simulated_intrusion

use std::thread;
use std::time::Duration;
use zonewatch::{
    DistanceMap, Engine, EngineConfig, ReferencePoint, ScriptedDetector, SyntheticSource,
    TrackedDetection,
};

fn main() -> zonewatch::Result<()> {
    env_logger::init();

    let mut engine = Engine::new(EngineConfig::default());

    // A 2 m square floor patch seen head-on: pixel square, unit-ish sides.
    let points = vec![
        ReferencePoint::new((100.0, 80.0), 1),
        ReferencePoint::new((540.0, 80.0), 2),
        ReferencePoint::new((540.0, 420.0), 3),
        ReferencePoint::new((100.0, 420.0), 4),
    ];
    let mut distances = DistanceMap::new();
    distances.insert(1, 2, 2.0);
    distances.insert(2, 3, 2.0);
    distances.insert(3, 4, 2.0);
    distances.insert(1, 4, 2.0);
    distances.insert(1, 3, 8f64.sqrt());
    distances.insert(2, 4, 8f64.sqrt());
    engine.set_calibration(points, distances)?;

    // Forbidden zone in the middle of the canvas.
    engine.replace_zone(vec![(300.0, 300.0), (500.0, 300.0), (500.0, 500.0), (300.0, 500.0)])?;

    // A walker crossing the floor toward the zone.
    let script: Vec<Vec<TrackedDetection>> = (0..120)
        .map(|i| {
            let x = 120.0 + i as f64 * 3.5;
            vec![TrackedDetection::new((x, 220.0), (40.0, 90.0), 1)]
        })
        .collect();

    engine.start(
        Box::new(SyntheticSource::new(640, 480)),
        Box::new(ScriptedDetector::new(script)),
    )?;

    for _ in 0..100 {
        if let Some(out) = engine.latest_output() {
            println!(
                "canvas {}x{}  hit={} (track {:?})  predicted hit={} (track {:?})",
                out.image.width(),
                out.image.height(),
                out.is_hit,
                out.is_hit_id,
                out.is_pred_hit,
                out.is_pred_hit_id,
            );
            if out.is_hit {
                println!("intrusion detected, stopping");
                break;
            }
        }
        thread::sleep(Duration::from_millis(100));
    }

    engine.stop();
    let stats = engine.stats();
    println!(
        "captured {} frames ({} dropped), {} detector batches, {} cycles, {:.1} fps",
        stats.frames_captured, stats.frames_dropped, stats.detector_batches, stats.cycles, stats.fps,
    );
    Ok(())
}
