//! Detector seam between the runtime and whatever produces tracked boxes
//!
//! The engine only needs per-frame tracked boxes for a single target class;
//! everything about the model behind them stays outside this crate. The
//! scripted implementation drives deterministic pipeline tests and the demo.

use crate::error::Result;
use crate::types::{Frame, TrackedDetection};

/// Common interface for tracked-object detectors.
///
/// Implementations are expected to assign stable `track_id`s to the same
/// subject across frames; the engine builds its motion models on top of
/// those ids.
pub trait Detector: Send {
    /// Detect and track subjects in a single frame
    fn detect(&mut self, frame: &Frame) -> Result<Vec<TrackedDetection>>;

    /// Detector name, for logging
    fn name(&self) -> &str {
        "detector"
    }
}

/// Detector that replays a fixed script of detection batches, one per call,
/// repeating the final batch once the script runs out.
pub struct ScriptedDetector {
    script: Vec<Vec<TrackedDetection>>,
    cursor: usize,
}

impl ScriptedDetector {
    pub fn new(script: Vec<Vec<TrackedDetection>>) -> Self {
        Self { script, cursor: 0 }
    }

    /// A detector that reports nothing, for pipeline plumbing tests
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl Detector for ScriptedDetector {
    fn detect(&mut self, _frame: &Frame) -> Result<Vec<TrackedDetection>> {
        if self.script.is_empty() {
            return Ok(Vec::new());
        }
        let batch = self.script[self.cursor.min(self.script.len() - 1)].clone();
        if self.cursor < self.script.len() {
            self.cursor += 1;
        }
        Ok(batch)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
