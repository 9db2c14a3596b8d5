//! Planar homography calibration and polygon geometry
//!
//! This crate holds the pure math for mapping a camera's pixel plane onto a
//! real-world ground plane:
//!
//! - [`Homography`]: 3x3 perspective transform solved from 4 correspondences
//! - [`layout`]: ground-plane point derivation from pairwise distances,
//!   scaled onto a display canvas
//! - [`point_in_polygon`]: ray-cast containment used for zone intrusion tests
//!
//! Everything here is stateless and thread-safe; the runtime crate owns the
//! calibration lifecycle and persistence.

pub mod error;
pub mod homography;
pub mod layout;
pub mod optimize;
pub mod polygon;

pub use error::{GeometryError, Result};
pub use homography::Homography;
pub use layout::{derive_real_points, scale_to_canvas, GroundLayout, PairDistances, CANVAS_SIZE};
pub use optimize::solve_point_by_distances;
pub use polygon::point_in_polygon;
