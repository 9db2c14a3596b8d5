//! 3x3 perspective transform between two planar coordinate systems
//!
//! The transform is solved directly from 4 point correspondences with the
//! Direct Linear Transform: 8 equations in the 8 unknown matrix entries
//! (h22 is fixed at 1). The inverse direction is a second solve with the
//! correspondences swapped rather than a numeric matrix inversion, so both
//! directions interpolate their own anchor points exactly.

use crate::error::{GeometryError, Result};
use nalgebra::{SMatrix, SVector};

/// Perspective division guard: |w| below this returns the input unchanged
const W_EPSILON: f64 = 1e-10;

/// A 3x3 homography stored in row-major order
#[derive(Debug, Clone, PartialEq)]
pub struct Homography {
    m: [f64; 9],
}

impl Homography {
    /// Solve the homography mapping each `src[i]` onto `dst[i]`.
    ///
    /// Returns `GeometryError::Singular` when the correspondences are
    /// degenerate (three collinear points, repeated points).
    pub fn from_points(src: &[(f64, f64); 4], dst: &[(f64, f64); 4]) -> Result<Self> {
        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();

        for i in 0..4 {
            let (x, y) = src[i];
            let (xp, yp) = dst[i];
            let r1 = i * 2;
            let r2 = i * 2 + 1;

            a[(r1, 0)] = x;
            a[(r1, 1)] = y;
            a[(r1, 2)] = 1.0;
            a[(r1, 6)] = -xp * x;
            a[(r1, 7)] = -xp * y;
            b[r1] = xp;

            a[(r2, 3)] = x;
            a[(r2, 4)] = y;
            a[(r2, 5)] = 1.0;
            a[(r2, 6)] = -yp * x;
            a[(r2, 7)] = -yp * y;
            b[r2] = yp;
        }

        let h = a
            .lu()
            .solve(&b)
            .ok_or_else(|| GeometryError::singular("4-point correspondence system"))?;

        Ok(Self {
            m: [h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0],
        })
    }

    /// Apply the transform to a single point with perspective division
    #[inline]
    pub fn apply(&self, point: (f64, f64)) -> (f64, f64) {
        let (x, y) = point;
        let m = &self.m;
        let w = m[6] * x + m[7] * y + m[8];
        if w.abs() < W_EPSILON {
            return point;
        }
        ((m[0] * x + m[1] * y + m[2]) / w, (m[3] * x + m[4] * y + m[5]) / w)
    }

    /// Row-major matrix entries
    pub fn matrix(&self) -> &[f64; 9] {
        &self.m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const SQUARE: [(f64, f64); 4] = [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)];

    #[test]
    fn identity_correspondences() {
        let h = Homography::from_points(&SQUARE, &SQUARE).unwrap();
        let (x, y) = h.apply((37.0, 81.0));
        assert_abs_diff_eq!(x, 37.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y, 81.0, epsilon = 1e-9);
    }

    #[test]
    fn anchor_points_map_exactly() {
        let dst = [(10.0, 20.0), (410.0, 30.0), (400.0, 420.0), (0.0, 400.0)];
        let h = Homography::from_points(&SQUARE, &dst).unwrap();
        for (s, d) in SQUARE.iter().zip(dst.iter()) {
            let (x, y) = h.apply(*s);
            assert_abs_diff_eq!(x, d.0, epsilon = 1e-6);
            assert_abs_diff_eq!(y, d.1, epsilon = 1e-6);
        }
    }

    #[test]
    fn forward_inverse_round_trip() {
        let dst = [(0.0, 0.0), (800.0, 12.0), (790.0, 800.0), (5.0, 780.0)];
        let fwd = Homography::from_points(&SQUARE, &dst).unwrap();
        let inv = Homography::from_points(&dst, &SQUARE).unwrap();
        for p in &SQUARE {
            let (x, y) = inv.apply(fwd.apply(*p));
            assert_abs_diff_eq!(x, p.0, epsilon = 1e-3);
            assert_abs_diff_eq!(y, p.1, epsilon = 1e-3);
        }
    }

    #[test]
    fn collinear_points_are_singular() {
        let src = [(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 0.0)];
        let err = Homography::from_points(&src, &SQUARE).unwrap_err();
        assert!(matches!(err, GeometryError::Singular(_)));
    }
}
