//! Ray-cast point-in-polygon containment
//!
//! Classic even-odd ray casting with the tie-break behavior intrusion tests
//! depend on: the crossing test uses `y > min && y <= max` and `x <= xinters`,
//! horizontal edges never toggle, and a query point on a vertical edge toggles
//! on that edge. Results at exact vertices follow from those rules; callers
//! rely on the answer being deterministic, not on a particular boundary
//! convention.

/// Test whether `point` lies inside the open polygon `polygon`.
///
/// The polygon is an open ring: the first vertex must not be repeated as the
/// last. Callers holding closed rings trim the closing vertex first.
pub fn point_in_polygon(point: (f64, f64), polygon: &[(f64, f64)]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let (x, y) = point;
    let mut inside = false;

    for i in 0..n {
        let (p1x, p1y) = polygon[i];
        let (p2x, p2y) = polygon[(i + 1) % n];

        if y > p1y.min(p2y) && y <= p1y.max(p2y) && x <= p1x.max(p2x) && p1y != p2y {
            let xinters = (y - p1y) * (p2x - p1x) / (p2y - p1y) + p1x;
            if p1x == p2x || x <= xinters {
                inside = !inside;
            }
        }
    }

    inside
}
