//! Camera intrusion-detection runtime.
//!
//! Pairs a ground-plane calibration (see the `floormap` crate) with a
//! three-worker streaming pipeline: a capture loop feeding a latest-wins
//! frame channel, a detector loop producing tracked boxes, and a consumer
//! that warps each frame to a top-down canvas, predicts short-horizon
//! motion per track, and flags intrusions into operator-drawn zones.
//!
//! [`engine::Engine`] is the entry point; detectors and frame sources plug
//! in through the [`detector::Detector`] and [`capture::FrameSource`]
//! traits.

pub mod calibration;
pub mod capture;
pub mod channels;
pub mod detector;
pub mod engine;
pub mod error;
pub mod predictor;
pub mod render;
pub mod types;
pub mod zones;

#[cfg(test)]
mod testutil;

pub use calibration::{Calibration, CalibrationStore, MAX_POINTS};
pub use capture::{FrameSource, SyntheticSource};
pub use channels::{FrameChannel, LatestSlot, DEFAULT_FRAME_CAPACITY};
pub use detector::{Detector, ScriptedDetector};
pub use engine::{Engine, EngineConfig, EngineState, EngineStats, SceneSnapshot};
pub use error::{Result, ZoneWatchError};
pub use predictor::{DisplayTracker, PredictorConfig, TrackPredictor};
pub use types::{
    CalibrationFile, DistanceMap, Frame, ReferencePoint, StreamFrame, TrackedDetection,
};
pub use zones::{zones_containing, ZoneFile, ZoneManager};
