//! Streaming engine: three workers around the latest-wins channels
//!
//! The engine owns the operator-facing state (calibration store, zone
//! manager) and publishes an immutable [`SceneSnapshot`] the streaming path
//! reads lock-free per cycle. Three workers run while streaming: capture
//! feeds the frame channel, the detector busy-polls it, and the consumer
//! assembles the annotated canvas plus intrusion flags at ~30 fps.

use crate::calibration::{Calibration, CalibrationStore};
use crate::capture::FrameSource;
use crate::channels::{FrameChannel, LatestSlot, DEFAULT_FRAME_CAPACITY};
use crate::detector::Detector;
use crate::error::{Result, ZoneWatchError};
use crate::predictor::{DisplayTracker, PredictorConfig, TrackPredictor};
use crate::render;
use crate::types::{DistanceMap, Frame, ReferencePoint, StreamFrame, TrackedDetection};
use crate::zones::{zones_containing, ZoneManager};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Engine tuning. Intervals are injectable so tests run fast.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Frame ring depth between capture and detector
    pub frame_capacity: usize,
    /// Capture loop pacing (~30 fps)
    pub capture_interval: Duration,
    /// Detector busy-poll sleep
    pub detector_poll_interval: Duration,
    /// Consumer emit pacing (~30 fps)
    pub emit_interval: Duration,
    /// Grid cell size on the canvas, pixels; 0 disables the grid
    pub grid_spacing: u32,
    /// Consumer cycles between periodic stats log lines
    pub stats_interval: u64,
    pub predictor: PredictorConfig,
    /// Calibration persistence file; `None` keeps state in memory
    pub calibration_file: Option<PathBuf>,
    /// Zone persistence file; `None` keeps state in memory
    pub zones_file: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_capacity: DEFAULT_FRAME_CAPACITY,
            capture_interval: Duration::from_millis(33),
            detector_poll_interval: Duration::from_millis(1),
            emit_interval: Duration::from_millis(33),
            grid_spacing: 100,
            stats_interval: 300,
            predictor: PredictorConfig::default(),
            calibration_file: None,
            zones_file: None,
        }
    }
}

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No valid calibration
    Idle,
    /// Calibration valid, workers not running
    Calibrated,
    /// Workers running, output being produced
    Streaming,
}

/// Immutable view of the scene shared with the streaming path. The control
/// path builds a fresh snapshot on every mutation and swaps the `Arc`.
#[derive(Debug, Clone, Default)]
pub struct SceneSnapshot {
    pub calibration: Option<Calibration>,
    pub zones: Vec<Vec<(f64, f64)>>,
}

/// Counters exposed by [`Engine::stats`]
#[derive(Debug, Clone, Default)]
pub struct EngineStats {
    pub frames_captured: u64,
    pub frames_dropped: u64,
    pub detector_batches: u64,
    pub cycles: u64,
    pub errors: u64,
    /// Capture rate over the last 30-frame window
    pub fps: f64,
}

#[derive(Default)]
struct SharedCounters {
    frames_captured: AtomicU64,
    detector_batches: AtomicU64,
    cycles: AtomicU64,
    errors: AtomicU64,
    fps: Mutex<f64>,
}

type SharedSnapshot = Arc<RwLock<Arc<SceneSnapshot>>>;

/// One intrusion-monitoring pipeline instance.
///
/// Control methods mutate calibration and zone state and take effect on the
/// next streaming cycle. `start` spawns the workers; `stop` joins them and
/// releases the frame source, and runs again from `Drop`.
pub struct Engine {
    config: EngineConfig,
    store: CalibrationStore,
    zones: ZoneManager,
    snapshot: SharedSnapshot,
    frames: FrameChannel,
    detections: LatestSlot<Vec<TrackedDetection>>,
    output: LatestSlot<StreamFrame>,
    running: Arc<AtomicBool>,
    clear_display: Arc<AtomicBool>,
    counters: Arc<SharedCounters>,
    source: Arc<Mutex<Option<Box<dyn FrameSource>>>>,
    workers: Vec<JoinHandle<()>>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let store = match &config.calibration_file {
            Some(path) => CalibrationStore::with_file(path),
            None => CalibrationStore::new(),
        };
        let zones = match &config.zones_file {
            Some(path) => ZoneManager::with_file(path),
            None => ZoneManager::new(),
        };
        let frames = FrameChannel::new(config.frame_capacity);

        let mut engine = Self {
            config,
            store,
            zones,
            snapshot: Arc::new(RwLock::new(Arc::new(SceneSnapshot::default()))),
            frames,
            detections: LatestSlot::new(),
            output: LatestSlot::new(),
            running: Arc::new(AtomicBool::new(false)),
            clear_display: Arc::new(AtomicBool::new(false)),
            counters: Arc::new(SharedCounters::default()),
            source: Arc::new(Mutex::new(None)),
            workers: Vec::new(),
        };
        engine.publish_snapshot();
        engine
    }

    fn publish_snapshot(&self) {
        let snapshot = Arc::new(SceneSnapshot {
            calibration: self.store.calibration().cloned(),
            zones: self.zones.zones().to_vec(),
        });
        *self.snapshot.write().unwrap() = snapshot;
    }

    pub fn state(&self) -> EngineState {
        if self.running.load(Ordering::SeqCst) {
            EngineState::Streaming
        } else if self.store.calibration().is_some() {
            EngineState::Calibrated
        } else {
            EngineState::Idle
        }
    }

    // ---- calibration control path ----

    /// Replace all 4 reference points and 6 distances in one operation
    pub fn set_calibration(
        &mut self,
        points: Vec<ReferencePoint>,
        distances: DistanceMap,
    ) -> Result<()> {
        self.store.replace(points, distances)?;
        self.publish_snapshot();
        Ok(())
    }

    /// Replace the distance map, keeping the current points
    pub fn set_distances(&mut self, distances: DistanceMap) -> Result<()> {
        self.store.set_distances(distances)?;
        self.publish_snapshot();
        Ok(())
    }

    /// Place a reference point; returns its id, or `None` once 4 exist
    pub fn place_point(&mut self, x: f64, y: f64) -> Option<u32> {
        let id = self.store.add_point(x, y);
        self.publish_snapshot();
        id
    }

    /// Toggle selection of the point near `(x, y)`
    pub fn select_point_near(&mut self, x: f64, y: f64) -> Option<u32> {
        self.store.select_near(x, y)
    }

    pub fn delete_selected_point(&mut self) -> bool {
        let removed = self.store.delete_selected();
        if removed {
            self.publish_snapshot();
        }
        removed
    }

    pub fn clear_points(&mut self) {
        self.store.clear();
        self.publish_snapshot();
    }

    pub fn points(&self) -> &[ReferencePoint] {
        self.store.points()
    }

    pub fn calibration(&self) -> Option<&Calibration> {
        self.store.calibration()
    }

    // ---- zone control path ----

    pub fn add_zone_vertex(&mut self, x: f64, y: f64) {
        self.zones.add_vertex(x, y);
    }

    pub fn complete_zone(&mut self) -> bool {
        let completed = self.zones.complete_polygon();
        if completed {
            self.publish_snapshot();
        }
        completed
    }

    pub fn clear_pending_zone(&mut self) {
        self.zones.clear_pending();
    }

    /// Replace every zone with one polygon, closing the ring
    pub fn replace_zone(&mut self, vertices: Vec<(f64, f64)>) -> Result<()> {
        self.zones.replace_all_zones(vertices)?;
        self.publish_snapshot();
        Ok(())
    }

    pub fn delete_zone(&mut self, index: usize) -> bool {
        let deleted = self.zones.delete_zone(index);
        if deleted {
            self.publish_snapshot();
        }
        deleted
    }

    pub fn zones(&self) -> &[Vec<(f64, f64)>] {
        self.zones.zones()
    }

    // ---- streaming lifecycle ----

    /// Spawn the capture, detector, and consumer workers. Requires a valid
    /// calibration; fails if already streaming.
    pub fn start(
        &mut self,
        source: Box<dyn FrameSource>,
        detector: Box<dyn Detector>,
    ) -> Result<()> {
        if self.running.load(Ordering::SeqCst) {
            return Err(ZoneWatchError::state("engine is already streaming"));
        }
        if self.store.calibration().is_none() {
            return Err(ZoneWatchError::state(
                "cannot start streaming without a valid calibration",
            ));
        }

        log::info!(
            "starting engine: source={}, detector={}",
            source.name(),
            detector.name()
        );
        *self.source.lock().unwrap() = Some(source);
        self.running.store(true, Ordering::SeqCst);

        let mut spawned = Vec::with_capacity(3);

        let capture = {
            let running = Arc::clone(&self.running);
            let frames = self.frames.clone();
            let source = Arc::clone(&self.source);
            let counters = Arc::clone(&self.counters);
            let interval = self.config.capture_interval;
            thread::Builder::new()
                .name("zw-capture".into())
                .spawn(move || capture_loop(running, frames, source, counters, interval))
        };
        match capture {
            Ok(worker) => spawned.push(worker),
            Err(e) => return Err(self.abort_start(spawned, "capture", e)),
        }

        let detect = {
            let running = Arc::clone(&self.running);
            let frames = self.frames.clone();
            let detections = self.detections.clone();
            let counters = Arc::clone(&self.counters);
            let interval = self.config.detector_poll_interval;
            thread::Builder::new()
                .name("zw-detector".into())
                .spawn(move || detector_loop(running, frames, detections, detector, counters, interval))
        };
        match detect {
            Ok(worker) => spawned.push(worker),
            Err(e) => return Err(self.abort_start(spawned, "detector", e)),
        }

        let consume = {
            let workers = ConsumerHandles {
                running: Arc::clone(&self.running),
                clear_display: Arc::clone(&self.clear_display),
                frames: self.frames.clone(),
                detections: self.detections.clone(),
                output: self.output.clone(),
                snapshot: Arc::clone(&self.snapshot),
                counters: Arc::clone(&self.counters),
            };
            let config = self.config.clone();
            thread::Builder::new()
                .name("zw-consumer".into())
                .spawn(move || consumer_loop(workers, config))
        };
        match consume {
            Ok(worker) => spawned.push(worker),
            Err(e) => return Err(self.abort_start(spawned, "consumer", e)),
        }

        self.workers = spawned;
        Ok(())
    }

    /// Roll back a partially started engine: stop and join the workers that
    /// did spawn, release the source, and report the failed spawn.
    fn abort_start(
        &mut self,
        spawned: Vec<JoinHandle<()>>,
        name: &str,
        e: std::io::Error,
    ) -> ZoneWatchError {
        self.running.store(false, Ordering::SeqCst);
        for worker in spawned {
            if worker.join().is_err() {
                log::warn!("worker thread panicked during start rollback");
            }
        }
        if let Some(mut source) = self.source.lock().unwrap().take() {
            source.release();
        }
        ZoneWatchError::state(format!("spawn {name}: {e}"))
    }

    /// Stop all workers, join them, then release the frame source.
    /// Idempotent.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        for worker in self.workers.drain(..) {
            let name = worker.thread().name().unwrap_or("worker").to_string();
            if worker.join().is_err() {
                log::warn!("{name} thread panicked");
            }
        }
        if let Some(mut source) = self.source.lock().unwrap().take() {
            source.release();
            log::info!("engine stopped, source released");
        }
    }

    /// Drop all mapped-point display entries on the next streaming cycle
    pub fn clear_display_predictions(&self) {
        self.clear_display.store(true, Ordering::SeqCst);
    }

    /// Most recent streaming output, non-consuming
    pub fn latest_output(&self) -> Option<StreamFrame> {
        self.output.latest()
    }

    /// Handle for a transport layer polling on its own thread
    pub fn output_slot(&self) -> LatestSlot<StreamFrame> {
        self.output.clone()
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            frames_captured: self.counters.frames_captured.load(Ordering::Relaxed),
            frames_dropped: self.frames.dropped(),
            detector_batches: self.counters.detector_batches.load(Ordering::Relaxed),
            cycles: self.counters.cycles.load(Ordering::Relaxed),
            errors: self.counters.errors.load(Ordering::Relaxed),
            fps: *self.counters.fps.lock().unwrap(),
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}

fn capture_loop(
    running: Arc<AtomicBool>,
    frames: FrameChannel,
    source: Arc<Mutex<Option<Box<dyn FrameSource>>>>,
    counters: Arc<SharedCounters>,
    interval: Duration,
) {
    log::info!("capture worker started");
    let mut window_start = Instant::now();
    let mut window_count = 0u64;

    while running.load(Ordering::SeqCst) {
        let next = match source.lock().unwrap().as_mut() {
            Some(source) => source.next_frame(),
            None => break,
        };
        match next {
            Ok(Some(frame)) => {
                frames.publish(frame);
                counters.frames_captured.fetch_add(1, Ordering::Relaxed);
                window_count += 1;
                if window_count == 30 {
                    let fps = 30.0 / window_start.elapsed().as_secs_f64();
                    *counters.fps.lock().unwrap() = fps;
                    window_start = Instant::now();
                    window_count = 0;
                }
            }
            Ok(None) => {
                log::info!("frame source exhausted, capture worker finishing");
                break;
            }
            Err(e) => {
                counters.errors.fetch_add(1, Ordering::Relaxed);
                log::warn!("frame capture failed: {e}");
            }
        }
        thread::sleep(interval);
    }
    log::info!("capture worker stopped");
}

fn detector_loop(
    running: Arc<AtomicBool>,
    frames: FrameChannel,
    detections: LatestSlot<Vec<TrackedDetection>>,
    mut detector: Box<dyn Detector>,
    counters: Arc<SharedCounters>,
    interval: Duration,
) {
    log::info!("detector worker started ({})", detector.name());
    while running.load(Ordering::SeqCst) {
        if let Some(frame) = frames.next_for_detector() {
            match detector.detect(&frame) {
                Ok(batch) => {
                    log::debug!("detector produced {} tracked boxes", batch.len());
                    detections.publish(batch);
                    counters.detector_batches.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    counters.errors.fetch_add(1, Ordering::Relaxed);
                    log::warn!("detection failed, skipping frame: {e}");
                }
            }
        }
        thread::sleep(interval);
    }
    log::info!("detector worker stopped");
}

/// Channel and state handles the consumer worker carries
struct ConsumerHandles {
    running: Arc<AtomicBool>,
    clear_display: Arc<AtomicBool>,
    frames: FrameChannel,
    detections: LatestSlot<Vec<TrackedDetection>>,
    output: LatestSlot<StreamFrame>,
    snapshot: SharedSnapshot,
    counters: Arc<SharedCounters>,
}

fn consumer_loop(handles: ConsumerHandles, config: EngineConfig) {
    let ConsumerHandles {
        running,
        clear_display,
        frames,
        detections,
        output,
        snapshot,
        counters,
    } = handles;

    log::info!("consumer worker started");
    let epoch = Instant::now();
    let mut predictor = TrackPredictor::new(config.predictor.clone());
    let mut display = DisplayTracker::new();

    while running.load(Ordering::SeqCst) {
        if clear_display.swap(false, Ordering::SeqCst) {
            log::debug!("clearing {} mapped-point display entries", display.len());
            display.clear();
        }
        let scene = Arc::clone(&snapshot.read().unwrap());
        if let Some(frame) = frames.latest() {
            let batch = detections.latest().unwrap_or_default();
            let now = epoch.elapsed().as_secs_f64();

            let message = process_cycle(
                &frame,
                &batch,
                &scene,
                &mut predictor,
                &mut display,
                now,
                config.grid_spacing,
            );
            output.publish(message);

            predictor.evict_stale(now);
            display.prune(now);

            let cycles = counters.cycles.fetch_add(1, Ordering::Relaxed) + 1;
            if config.stats_interval > 0 && cycles % config.stats_interval == 0 {
                log::info!(
                    "stats: cycles={cycles} captured={} dropped={} batches={} errors={} fps={:.1}",
                    counters.frames_captured.load(Ordering::Relaxed),
                    frames.dropped(),
                    counters.detector_batches.load(Ordering::Relaxed),
                    counters.errors.load(Ordering::Relaxed),
                    *counters.fps.lock().unwrap(),
                );
            }
        }
        thread::sleep(config.emit_interval);
    }
    log::info!("consumer worker stopped");
}

/// One streaming cycle: warp, annotate, predict, and run the intrusion
/// queries. Without a calibration the raw frame passes through untouched.
///
/// The first track found inside a zone supplies the reported id, for the
/// current and predicted queries independently.
pub fn process_cycle(
    frame: &Frame,
    detections: &[TrackedDetection],
    scene: &SceneSnapshot,
    predictor: &mut TrackPredictor,
    display: &mut DisplayTracker,
    now: f64,
    grid_spacing: u32,
) -> StreamFrame {
    let Some(calibration) = &scene.calibration else {
        return StreamFrame::quiet(frame.clone());
    };

    let mut canvas = render::warp_frame(frame, calibration);
    render::draw_grid(&mut canvas, grid_spacing);
    render::draw_zone_fill(&mut canvas, &scene.zones);
    render::draw_zone_outlines(&mut canvas, &scene.zones);

    let mut is_hit = false;
    let mut is_hit_id = None;
    let mut is_pred_hit = false;
    let mut is_pred_hit_id = None;

    for det in detections {
        let ground = det.ground_point();

        // Predict against the previous observation before recording the
        // current one; the reverse order degenerates to identity.
        let raw_predicted = predictor.predict(det.track_id, ground, now);
        predictor.update(det.track_id, ground, now);
        log::debug!(
            "track {}: ground ({:.1}, {:.1}) velocity prediction ({:.1}, {:.1})",
            det.track_id,
            ground.0,
            ground.1,
            raw_predicted.0,
            raw_predicted.1,
        );

        display.observe(det.track_id, det.center, now);
        let predicted_pixel = display.predict(det.track_id, ground);

        let mapped = calibration.forward.apply(ground);
        let track_hit = !zones_containing(&scene.zones, mapped).is_empty();
        if track_hit && !is_hit {
            is_hit = true;
            is_hit_id = Some(det.track_id);
        }

        let mapped_predicted = predicted_pixel.map(|p| calibration.forward.apply(p));
        let track_pred_hit = mapped_predicted
            .map(|p| !zones_containing(&scene.zones, p).is_empty())
            .unwrap_or(false);
        if track_pred_hit && !is_pred_hit {
            is_pred_hit = true;
            is_pred_hit_id = Some(det.track_id);
        }

        render::draw_track_marker(&mut canvas, mapped, mapped_predicted, track_hit, track_pred_hit);
    }

    StreamFrame {
        image: canvas,
        is_hit,
        is_hit_id,
        is_pred_hit,
        is_pred_hit_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::SyntheticSource;
    use crate::detector::ScriptedDetector;
    use crate::testutil::{unit_square_calibration, unit_square_distances, unit_square_points};

    fn calibrated_scene() -> SceneSnapshot {
        SceneSnapshot {
            calibration: Some(unit_square_calibration()),
            // Canvas-space square zone, stored closed.
            zones: vec![vec![
                (300.0, 300.0),
                (500.0, 300.0),
                (500.0, 500.0),
                (300.0, 500.0),
                (300.0, 300.0),
            ]],
        }
    }

    #[test]
    fn cycle_without_calibration_passes_frame_through() {
        let frame = Frame::new(32, 32);
        let scene = SceneSnapshot::default();
        let mut predictor = TrackPredictor::default();
        let mut display = DisplayTracker::new();

        let out = process_cycle(&frame, &[], &scene, &mut predictor, &mut display, 0.0, 100);
        assert_eq!((out.image.width(), out.image.height()), (32, 32));
        assert!(!out.is_hit && !out.is_pred_hit);
    }

    #[test]
    fn cycle_flags_current_and_predicted_intrusion() {
        let frame = Frame::new(101, 101);
        let scene = calibrated_scene();
        let mut predictor = TrackPredictor::default();
        let mut display = DisplayTracker::new();

        // Ground point (50, 50) maps to canvas (400, 400), inside the zone.
        let first = [TrackedDetection::new((50.0, 45.0), (10.0, 10.0), 7)];
        let out = process_cycle(
            &frame, &first, &scene, &mut predictor, &mut display, 0.0, 100,
        );
        assert!(out.is_hit);
        assert_eq!(out.is_hit_id, Some(7));
        // One observation: no display prediction yet.
        assert!(!out.is_pred_hit);

        let second = [TrackedDetection::new((51.0, 45.0), (10.0, 10.0), 7)];
        let out = process_cycle(
            &frame, &second, &scene, &mut predictor, &mut display, 0.1, 100,
        );
        assert!(out.is_hit);
        // Displacement (1, 0), scale floors at 3: predicted pixel (54, 50)
        // maps to canvas (432, 400), still inside.
        assert!(out.is_pred_hit);
        assert_eq!(out.is_pred_hit_id, Some(7));
    }

    #[test]
    fn cycle_reports_no_hit_outside_zones() {
        let frame = Frame::new(101, 101);
        let scene = calibrated_scene();
        let mut predictor = TrackPredictor::default();
        let mut display = DisplayTracker::new();

        // Ground point (10, 10) maps to canvas (80, 80), outside the zone.
        let batch = [TrackedDetection::new((10.0, 5.0), (4.0, 10.0), 3)];
        let out = process_cycle(&frame, &batch, &scene, &mut predictor, &mut display, 0.0, 100);
        assert!(!out.is_hit && out.is_hit_id.is_none());
    }

    #[test]
    fn start_requires_calibration() {
        let mut engine = Engine::new(EngineConfig::default());
        assert_eq!(engine.state(), EngineState::Idle);

        let err = engine
            .start(
                Box::new(SyntheticSource::new(32, 32)),
                Box::new(ScriptedDetector::empty()),
            )
            .unwrap_err();
        assert!(matches!(err, ZoneWatchError::InvalidState(_)));
    }

    #[test]
    fn calibration_moves_state_to_calibrated() {
        let mut engine = Engine::new(EngineConfig::default());
        engine
            .set_calibration(unit_square_points(), unit_square_distances())
            .unwrap();
        assert_eq!(engine.state(), EngineState::Calibrated);

        engine.clear_points();
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn failed_spawn_rolls_back_streaming_state() {
        let mut engine = Engine::new(EngineConfig::default());
        engine
            .set_calibration(unit_square_points(), unit_square_distances())
            .unwrap();

        // Simulate a spawn failure after the source was stored and the
        // running flag raised, as start() does before spawning.
        *engine.source.lock().unwrap() = Some(Box::new(SyntheticSource::new(8, 8)));
        engine.running.store(true, Ordering::SeqCst);

        let err = engine.abort_start(Vec::new(), "detector", std::io::Error::other("thread limit"));
        assert!(matches!(err, ZoneWatchError::InvalidState(_)));
        assert!(!engine.running.load(Ordering::SeqCst));
        assert!(engine.source.lock().unwrap().is_none());
        assert_eq!(engine.state(), EngineState::Calibrated);

        // A rolled-back engine starts cleanly afterwards.
        engine
            .start(
                Box::new(SyntheticSource::new(32, 32)),
                Box::new(ScriptedDetector::empty()),
            )
            .unwrap();
        assert_eq!(engine.state(), EngineState::Streaming);
        engine.stop();
        assert_eq!(engine.state(), EngineState::Calibrated);
    }

    #[test]
    fn streams_end_to_end_and_flags_intrusion() {
        let config = EngineConfig {
            capture_interval: Duration::from_millis(2),
            emit_interval: Duration::from_millis(2),
            stats_interval: 0,
            ..EngineConfig::default()
        };
        let mut engine = Engine::new(config);
        engine
            .set_calibration(unit_square_points(), unit_square_distances())
            .unwrap();
        engine
            .replace_zone(vec![(300.0, 300.0), (500.0, 300.0), (500.0, 500.0), (300.0, 500.0)])
            .unwrap();

        // Track 7 walks through canvas (400, 400), inside the zone.
        let detector = ScriptedDetector::new(vec![
            vec![TrackedDetection::new((49.0, 45.0), (10.0, 10.0), 7)],
            vec![TrackedDetection::new((50.0, 45.0), (10.0, 10.0), 7)],
        ]);
        engine
            .start(
                Box::new(SyntheticSource::new(101, 101)),
                Box::new(detector),
            )
            .unwrap();
        assert_eq!(engine.state(), EngineState::Streaming);

        let deadline = Instant::now() + Duration::from_secs(5);
        let hit = loop {
            if let Some(out) = engine.latest_output() {
                if out.is_hit {
                    break out;
                }
            }
            if Instant::now() > deadline {
                panic!("no intrusion flagged before deadline");
            }
            thread::sleep(Duration::from_millis(5));
        };
        assert_eq!(hit.is_hit_id, Some(7));
        assert_eq!(
            (hit.image.width(), hit.image.height()),
            (800, 800)
        );

        engine.stop();
        assert_eq!(engine.state(), EngineState::Calibrated);
        let stats = engine.stats();
        assert!(stats.frames_captured > 0);
        assert!(stats.cycles > 0);

        // Idempotent.
        engine.stop();
    }
}
