//! Short-horizon motion prediction for tracked subjects
//!
//! Two independent models live here. [`TrackPredictor`] is the raw tracking
//! model: per-track position history with velocity extrapolation and an
//! adaptive look-ahead horizon. [`DisplayTracker`] is the lighter heuristic
//! used for on-canvas markers: displacement between consecutive bbox-center
//! observations, scaled and applied to the ground-contact point. Both operate
//! in camera pixel space; the caller transforms the results.

use std::collections::HashMap;

/// Tuning for the velocity-based track predictor
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    /// Observations retained per track
    pub max_history: usize,
    /// Elapsed-time floor below which prediction degrades to identity
    pub min_dt: f64,
    /// Velocity magnitude divisor for the adaptive horizon
    pub look_ahead_divisor: f64,
    /// Horizon clamp, seconds
    pub look_ahead_min: f64,
    pub look_ahead_max: f64,
    /// Tracks older than this are removed by [`TrackPredictor::evict_stale`]
    pub max_track_age: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            max_history: 2,
            min_dt: 1e-4,
            look_ahead_divisor: 100.0,
            look_ahead_min: 0.1,
            look_ahead_max: 2.0,
            max_track_age: 2.0,
        }
    }
}

/// Velocity-based predictor over bounded per-track position history.
///
/// `update` records an observation; `predict` extrapolates from the most
/// recent stored observation to the current coordinate and projects that
/// velocity forward by the adaptive horizon. Stale tracks accumulate until
/// the owner calls `evict_stale`; eviction is never implicit.
#[derive(Debug, Default)]
pub struct TrackPredictor {
    config: PredictorConfig,
    history: HashMap<u32, Vec<((f64, f64), f64)>>,
}

impl TrackPredictor {
    pub fn new(config: PredictorConfig) -> Self {
        Self {
            config,
            history: HashMap::new(),
        }
    }

    /// Record an observed position for a track
    pub fn update(&mut self, track_id: u32, position: (f64, f64), timestamp: f64) {
        let history = self.history.entry(track_id).or_default();
        history.push((position, timestamp));
        if history.len() > self.config.max_history {
            history.remove(0);
        }
    }

    /// Extrapolated position for a track, or `current` unchanged when the
    /// history is too short or the elapsed time is degenerate.
    pub fn predict(&self, track_id: u32, current: (f64, f64), timestamp: f64) -> (f64, f64) {
        let Some(history) = self.history.get(&track_id) else {
            return current;
        };
        if history.len() < 2 {
            return current;
        }

        let ((last_x, last_y), last_time) = history[history.len() - 1];
        let dt = timestamp - last_time;
        if dt < self.config.min_dt {
            return current;
        }

        let vx = (current.0 - last_x) / dt;
        let vy = (current.1 - last_y) / dt;

        let magnitude = (vx * vx + vy * vy).sqrt();
        let look_ahead = (magnitude / self.config.look_ahead_divisor)
            .clamp(self.config.look_ahead_min, self.config.look_ahead_max);

        (current.0 + vx * look_ahead, current.1 + vy * look_ahead)
    }

    /// Drop tracks whose newest observation is older than `max_track_age`
    pub fn evict_stale(&mut self, now: f64) {
        let max_age = self.config.max_track_age;
        self.history.retain(|_, history| {
            history
                .last()
                .is_some_and(|&(_, timestamp)| now - timestamp <= max_age)
        });
    }

    pub fn track_count(&self) -> usize {
        self.history.len()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

/// Marker-prediction scale divisor over the per-frame displacement magnitude
pub const DISPLAY_SCALE_DIVISOR: f64 = 10.0;
/// Marker-prediction scale clamp
pub const DISPLAY_SCALE_MIN: f64 = 3.0;
pub const DISPLAY_SCALE_MAX: f64 = 15.0;
/// Marker entries not refreshed within this window are pruned
pub const DISPLAY_MAX_AGE_SECS: f64 = 1.0;

#[derive(Debug, Clone)]
struct DisplayEntry {
    center: (f64, f64),
    prev_center: Option<(f64, f64)>,
    last_update: f64,
}

/// Displacement-based marker prediction over consecutive bbox centers.
///
/// A track needs two observations before it yields an offset; the offset is
/// the last center displacement scaled by `clamp(speed / 10, 3, 15)` and is
/// added to the ground-contact point by `predict`. Entries are pruned on
/// every batch, not on a timer.
#[derive(Debug, Default)]
pub struct DisplayTracker {
    entries: HashMap<u32, DisplayEntry>,
}

impl DisplayTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the bbox center seen for a track this batch
    pub fn observe(&mut self, track_id: u32, center: (f64, f64), now: f64) {
        match self.entries.get_mut(&track_id) {
            Some(entry) => {
                entry.prev_center = Some(entry.center);
                entry.center = center;
                entry.last_update = now;
            }
            None => {
                self.entries.insert(
                    track_id,
                    DisplayEntry {
                        center,
                        prev_center: None,
                        last_update: now,
                    },
                );
            }
        }
    }

    /// Predicted marker position for a track, anchored at its ground-contact
    /// point. `None` until the track has two observations.
    pub fn predict(&self, track_id: u32, ground_point: (f64, f64)) -> Option<(f64, f64)> {
        let entry = self.entries.get(&track_id)?;
        let prev = entry.prev_center?;

        let dx = entry.center.0 - prev.0;
        let dy = entry.center.1 - prev.1;
        let speed = (dx * dx + dy * dy).sqrt();
        let scale = (speed / DISPLAY_SCALE_DIVISOR).clamp(DISPLAY_SCALE_MIN, DISPLAY_SCALE_MAX);

        Some((ground_point.0 + dx * scale, ground_point.1 + dy * scale))
    }

    /// Drop entries not refreshed within [`DISPLAY_MAX_AGE_SECS`]
    pub fn prune(&mut self, now: f64) {
        self.entries
            .retain(|_, entry| now - entry.last_update <= DISPLAY_MAX_AGE_SECS);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
