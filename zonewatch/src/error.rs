//! Error types for the intrusion-monitoring runtime

use thiserror::Error;

/// Result type alias for the runtime crate
pub type Result<T> = std::result::Result<T, ZoneWatchError>;

/// Errors that can occur in the calibration, zone, and streaming paths
#[derive(Error, Debug)]
pub enum ZoneWatchError {
    #[error("exactly 4 reference points required, got {0}")]
    InvalidPointCount(usize),

    #[error("missing distance for pair {0}")]
    MissingDistance(String),

    #[error("degenerate calibration geometry: {0}")]
    DegenerateGeometry(#[from] floormap::GeometryError),

    #[error("invalid engine state: {0}")]
    InvalidState(String),

    #[error("persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ZoneWatchError {
    pub fn state<S: Into<String>>(msg: S) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn missing_distance<S: Into<String>>(pair: S) -> Self {
        Self::MissingDistance(pair.into())
    }
}
