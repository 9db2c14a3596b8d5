//! Core data types shared across the runtime

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A camera frame as delivered by the capture source
pub type Frame = image::RgbImage;

/// Default marker color for a freshly placed reference point (red)
pub const DEFAULT_POINT_COLOR: [u8; 3] = [255, 0, 0];

/// Pixel radius within which a click selects an existing reference point
pub const PROXIMITY_THRESHOLD: f64 = 10.0;

/// An operator-placed calibration point.
///
/// `coord` is the pixel position in the camera image; `real_coord` is filled
/// in once a calibration has been computed. The serialized form matches the
/// persisted calibration schema: `{"coord": [x, y], "id": n, "color":
/// [r, g, b], "real_coord": [x, y]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub coord: (f64, f64),
    pub id: u32,
    #[serde(default = "default_color")]
    pub color: [u8; 3],
    #[serde(default)]
    pub real_coord: (f64, f64),
}

fn default_color() -> [u8; 3] {
    DEFAULT_POINT_COLOR
}

impl ReferencePoint {
    pub fn new(coord: (f64, f64), id: u32) -> Self {
        Self {
            coord,
            id,
            color: DEFAULT_POINT_COLOR,
            real_coord: (0.0, 0.0),
        }
    }

    /// True when `(x, y)` lies within [`PROXIMITY_THRESHOLD`] pixels
    pub fn is_near(&self, x: f64, y: f64) -> bool {
        let dx = self.coord.0 - x;
        let dy = self.coord.1 - y;
        (dx * dx + dy * dy).sqrt() < PROXIMITY_THRESHOLD
    }

    /// Euclidean pixel distance to another reference point
    pub fn distance_to(&self, other: &ReferencePoint) -> f64 {
        let dx = self.coord.0 - other.coord.0;
        let dy = self.coord.1 - other.coord.1;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Pairwise real-world distances between reference points, keyed by the
/// canonical `"min-max"` id pair (`"1-2"`, `"3-4"`, ...). Missing entries
/// are a calibration precondition failure, never a default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistanceMap {
    entries: BTreeMap<String, f64>,
}

impl DistanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical key for an unordered id pair
    pub fn key(a: u32, b: u32) -> String {
        format!("{}-{}", a.min(b), a.max(b))
    }

    pub fn insert(&mut self, a: u32, b: u32, meters: f64) {
        self.entries.insert(Self::key(a, b), meters);
    }

    pub fn get(&self, a: u32, b: u32) -> Option<f64> {
        self.entries.get(&Self::key(a, b)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// One detector output entry: an axis-aligned box in center/size form plus
/// the persistent track id the detector assigned to the subject.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedDetection {
    /// Box center `(cx, cy)` in pixel coordinates
    pub center: (f64, f64),
    /// Box size `(w, h)` in pixels
    pub size: (f64, f64),
    pub track_id: u32,
}

impl TrackedDetection {
    pub fn new(center: (f64, f64), size: (f64, f64), track_id: u32) -> Self {
        Self {
            center,
            size,
            track_id,
        }
    }

    /// Ground-contact point: bottom center of the box, `(cx, cy + h/2)`
    pub fn ground_point(&self) -> (f64, f64) {
        (self.center.0, self.center.1 + self.size.1 / 2.0)
    }
}

/// Persisted calibration schema: reference points plus the distance map
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalibrationFile {
    #[serde(default)]
    pub points: Vec<ReferencePoint>,
    #[serde(default)]
    pub distances: DistanceMap,
}

/// One streaming output message: the annotated canvas plus intrusion flags
/// for the current and predicted positions. Consumed by the transport layer
/// through a latest-wins slot.
#[derive(Debug, Clone)]
pub struct StreamFrame {
    pub image: Frame,
    pub is_hit: bool,
    pub is_hit_id: Option<u32>,
    pub is_pred_hit: bool,
    pub is_pred_hit_id: Option<u32>,
}

impl StreamFrame {
    pub fn quiet(image: Frame) -> Self {
        Self {
            image,
            is_hit: false,
            is_hit_id: None,
            is_pred_hit: false,
            is_pred_hit_id: None,
        }
    }
}
