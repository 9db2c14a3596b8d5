//! Ground-plane layout from pairwise distance measurements
//!
//! Four reference points are measured only by their six pairwise real-world
//! distances. The layout places P0 at the origin, P1 on the positive x-axis,
//! triangulates P2 and least-squares-fits P3, then scales the result onto a
//! display canvas.

use crate::error::{GeometryError, Result};
use crate::optimize::solve_point_by_distances;

/// Longest canvas side, in canvas units, after scaling the raw layout
pub const CANVAS_SIZE: f64 = 800.0;

/// The six pairwise distances among four points, indexed by point order
/// (`d01` is the distance between the first and second point, and so on).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairDistances {
    pub d01: f64,
    pub d02: f64,
    pub d03: f64,
    pub d12: f64,
    pub d13: f64,
    pub d23: f64,
}

impl PairDistances {
    fn validate(&self) -> Result<()> {
        for d in [self.d01, self.d02, self.d03, self.d12, self.d13, self.d23] {
            if !(d > 0.0) {
                return Err(GeometryError::NonpositiveDistance(d));
            }
        }
        Ok(())
    }
}

/// Scaled destination layout: four canvas points plus the canvas extent
#[derive(Debug, Clone, PartialEq)]
pub struct GroundLayout {
    pub points: [(f64, f64); 4],
    pub width: u32,
    pub height: u32,
}

/// Derive raw real-world coordinates (meters) for the four points.
///
/// P0 sits at the origin and P1 at `(d01, 0)`. P2 comes from triangulation;
/// a negative radicand there means the triangle inequality is violated.
/// P3 minimizes the squared residuals against its three measured distances,
/// seeded at `(d03 / 2, d03 / 2)`.
pub fn derive_real_points(d: &PairDistances) -> Result<[(f64, f64); 4]> {
    d.validate()?;

    let p0 = (0.0, 0.0);
    let p1 = (d.d01, 0.0);

    let x = (d.d02 * d.d02 - d.d12 * d.d12 + d.d01 * d.d01) / (2.0 * d.d01);
    let radicand = d.d02 * d.d02 - x * x;
    if radicand < 0.0 {
        return Err(GeometryError::NegativeRadicand(radicand));
    }
    let p2 = (x, radicand.sqrt());

    let p3 = solve_point_by_distances(
        [p0, p1, p2],
        [d.d03, d.d13, d.d23],
        (d.d03 / 2.0, d.d03 / 2.0),
    )?;

    Ok([p0, p1, p2, p3])
}

/// Scale raw real-world points uniformly so the layout fits the canvas,
/// then translate the minimum coordinate to the origin.
pub fn scale_to_canvas(raw: &[(f64, f64); 4]) -> GroundLayout {
    // Quantize to single precision before measuring the extent: the spans
    // below truncate, and a least-squares epsilon above the true extent
    // must not cost a canvas unit.
    let raw = raw.map(|p| (p.0 as f32 as f64, p.1 as f32 as f64));
    let max_x = raw.iter().map(|p| p.0).fold(f64::MIN, f64::max);
    let max_y = raw.iter().map(|p| p.1).fold(f64::MIN, f64::max);
    let scale = (CANVAS_SIZE / max_x).min(CANVAS_SIZE / max_y);

    let scaled: Vec<(f64, f64)> = raw.iter().map(|p| (p.0 * scale, p.1 * scale)).collect();
    let min_x = scaled.iter().map(|p| p.0).fold(f64::MAX, f64::min);
    let min_y = scaled.iter().map(|p| p.1).fold(f64::MAX, f64::min);

    let mut points = [(0.0, 0.0); 4];
    for (out, p) in points.iter_mut().zip(scaled.iter()) {
        *out = (p.0 - min_x, p.1 - min_y);
    }

    let width = points.iter().map(|p| p.0).fold(f64::MIN, f64::max) as u32;
    let height = points.iter().map(|p| p.1).fold(f64::MIN, f64::max) as u32;

    GroundLayout {
        points,
        width,
        height,
    }
}
