//! Shared test fixtures: a unit-square floor seen head-on, so the expected
//! canvas geometry is easy to reason about by hand.

use crate::calibration::Calibration;
use crate::types::{DistanceMap, ReferencePoint};

/// Four reference points at pixel (0,0), (100,0), (100,100), (0,100)
pub(crate) fn unit_square_points() -> Vec<ReferencePoint> {
    vec![
        ReferencePoint::new((0.0, 0.0), 1),
        ReferencePoint::new((100.0, 0.0), 2),
        ReferencePoint::new((100.0, 100.0), 3),
        ReferencePoint::new((0.0, 100.0), 4),
    ]
}

/// All six distances for a 1 m square: unit sides, √2 diagonals
pub(crate) fn unit_square_distances() -> DistanceMap {
    let diag = 2f64.sqrt();
    let mut d = DistanceMap::new();
    d.insert(1, 2, 1.0);
    d.insert(2, 3, 1.0);
    d.insert(3, 4, 1.0);
    d.insert(1, 4, 1.0);
    d.insert(1, 3, diag);
    d.insert(2, 4, diag);
    d
}

/// Calibration for the unit square: maps pixel (0..100)² onto the 800×800
/// canvas.
pub(crate) fn unit_square_calibration() -> Calibration {
    Calibration::compute(&unit_square_points(), &unit_square_distances()).unwrap()
}
