//! Error types for geometry and calibration math

use thiserror::Error;

/// Result type alias for the geometry crate
pub type Result<T> = std::result::Result<T, GeometryError>;

/// Failures produced while deriving or applying a planar calibration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("nonpositive distance: {0}")]
    NonpositiveDistance(f64),

    #[error("triangle inequality violated (radicand {0})")]
    NegativeRadicand(f64),

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("singular linear system: {0}")]
    Singular(String),
}

impl GeometryError {
    pub fn degenerate<S: Into<String>>(msg: S) -> Self {
        Self::Degenerate(msg.into())
    }

    pub fn singular<S: Into<String>>(msg: S) -> Self {
        Self::Singular(msg.into())
    }
}
