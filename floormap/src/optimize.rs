//! Least-squares placement of a point from distances to known anchors
//!
//! Damped Gauss-Newton on the distance residuals `|p - a_i| - d_i`. The
//! problem is two-dimensional and smooth everywhere except at the anchors
//! themselves, so a handful of iterations from a reasonable seed converges.

use crate::error::{GeometryError, Result};
use nalgebra::{Matrix2, Vector2};

/// Iteration cap for the Gauss-Newton refinement
pub const MAX_ITERATIONS: usize = 100;

/// Step-norm threshold below which the solve is considered converged
pub const STEP_TOLERANCE: f64 = 1e-10;

/// Accepted RMS distance residual, relative to the mean target distance.
/// Hand-measured tape distances are noisy; geometrically impossible inputs
/// still land far above this.
pub const RESIDUAL_TOLERANCE: f64 = 1e-2;

/// Levenberg damping added to the normal equations
const DAMPING: f64 = 1e-6;

/// Find the point whose distances to `anchors` best match `targets`,
/// starting from `seed`.
///
/// Returns `GeometryError::Degenerate` when the refined point still
/// violates the target distances beyond [`RESIDUAL_TOLERANCE`].
pub fn solve_point_by_distances(
    anchors: [(f64, f64); 3],
    targets: [f64; 3],
    seed: (f64, f64),
) -> Result<(f64, f64)> {
    let mut p = Vector2::new(seed.0, seed.1);

    for _ in 0..MAX_ITERATIONS {
        let mut jtj = Matrix2::zeros();
        let mut jtr = Vector2::zeros();

        for (a, d) in anchors.iter().zip(targets.iter()) {
            let dx = p.x - a.0;
            let dy = p.y - a.1;
            let norm = (dx * dx + dy * dy).sqrt().max(1e-12);
            let residual = norm - d;
            let j = Vector2::new(dx / norm, dy / norm);
            jtj += j * j.transpose();
            jtr += j * residual;
        }

        jtj[(0, 0)] += DAMPING;
        jtj[(1, 1)] += DAMPING;

        let step = jtj
            .lu()
            .solve(&jtr)
            .ok_or_else(|| GeometryError::singular("normal equations for point placement"))?;
        p -= step;

        if step.norm() < STEP_TOLERANCE {
            break;
        }
    }

    let rms = {
        let sum: f64 = anchors
            .iter()
            .zip(targets.iter())
            .map(|(a, d)| {
                let norm = ((p.x - a.0).powi(2) + (p.y - a.1).powi(2)).sqrt();
                (norm - d).powi(2)
            })
            .sum();
        (sum / 3.0).sqrt()
    };
    let mean_target = (targets[0] + targets[1] + targets[2]) / 3.0;
    let relative = if mean_target > 0.0 { rms / mean_target } else { rms };

    if relative > RESIDUAL_TOLERANCE {
        return Err(GeometryError::degenerate(format!(
            "point placement residual {relative:.4} exceeds tolerance"
        )));
    }

    Ok((p.x, p.y))
}
