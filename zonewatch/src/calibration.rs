//! Calibration computation and the operator-facing point store
//!
//! [`Calibration::compute`] turns 4 reference points plus their 6 pairwise
//! distances into a forward/inverse homography pair and the canvas extent.
//! [`CalibrationStore`] owns the mutable operator state: incremental point
//! placement, selection, distances, persistence, and recompute-on-change.
//! A failed recompute always leaves the previously valid calibration in
//! place.

use crate::error::{Result, ZoneWatchError};
use crate::types::{CalibrationFile, DistanceMap, ReferencePoint};
use floormap::{derive_real_points, scale_to_canvas, Homography, PairDistances};
use std::fs;
use std::path::{Path, PathBuf};

/// A computed pixel-to-canvas mapping. Derived state only: recomputed
/// whenever points or distances change, never edited directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    /// Pixel plane to canvas
    pub forward: Homography,
    /// Canvas back to the pixel plane
    pub inverse: Homography,
    pub output_width: u32,
    pub output_height: u32,
    /// Scaled canvas positions of the four reference points, id order
    pub canvas_points: [(f64, f64); 4],
}

impl Calibration {
    /// Compute a calibration from exactly 4 reference points and all 6
    /// pairwise distances.
    pub fn compute(points: &[ReferencePoint], distances: &DistanceMap) -> Result<Self> {
        if points.len() != 4 {
            return Err(ZoneWatchError::InvalidPointCount(points.len()));
        }

        let mut sorted: Vec<&ReferencePoint> = points.iter().collect();
        sorted.sort_by_key(|p| p.id);

        let require = |a: &ReferencePoint, b: &ReferencePoint| -> Result<f64> {
            distances
                .get(a.id, b.id)
                .ok_or_else(|| ZoneWatchError::missing_distance(DistanceMap::key(a.id, b.id)))
        };

        let pair = PairDistances {
            d01: require(sorted[0], sorted[1])?,
            d02: require(sorted[0], sorted[2])?,
            d03: require(sorted[0], sorted[3])?,
            d12: require(sorted[1], sorted[2])?,
            d13: require(sorted[1], sorted[3])?,
            d23: require(sorted[2], sorted[3])?,
        };

        let raw = derive_real_points(&pair)?;
        let layout = scale_to_canvas(&raw);

        let src = [
            sorted[0].coord,
            sorted[1].coord,
            sorted[2].coord,
            sorted[3].coord,
        ];
        let forward = Homography::from_points(&src, &layout.points)?;
        let inverse = Homography::from_points(&layout.points, &src)?;

        Ok(Self {
            forward,
            inverse,
            output_width: layout.width,
            output_height: layout.height,
            canvas_points: layout.points,
        })
    }
}

/// Operator-facing store for reference points and distances.
///
/// Every mutation persists to the backing file (when one is configured) and
/// triggers a recompute. With fewer than 4 points the cached calibration is
/// cleared; with 4 points and a failing compute the previous calibration is
/// kept and the error is returned to the caller.
#[derive(Debug, Default)]
pub struct CalibrationStore {
    points: Vec<ReferencePoint>,
    distances: DistanceMap,
    calibration: Option<Calibration>,
    selected: Option<u32>,
    point_counter: u32,
    save_file: Option<PathBuf>,
}

/// Maximum number of reference points in a calibration
pub const MAX_POINTS: usize = 4;

impl CalibrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store backed by `path`, loading any existing file. A missing
    /// or unreadable file degrades to an empty store.
    pub fn with_file<P: AsRef<Path>>(path: P) -> Self {
        let mut store = Self {
            save_file: Some(path.as_ref().to_path_buf()),
            ..Self::default()
        };
        store.load();
        store
    }

    fn load(&mut self) {
        let Some(path) = self.save_file.clone() else {
            return;
        };
        if !path.exists() {
            log::debug!("no calibration file at {}, starting empty", path.display());
            return;
        }
        match fs::read_to_string(&path)
            .map_err(ZoneWatchError::from)
            .and_then(|text| Ok(serde_json::from_str::<CalibrationFile>(&text)?))
        {
            Ok(file) => {
                self.point_counter = file.points.iter().map(|p| p.id).max().unwrap_or(0);
                self.points = file.points;
                self.distances = file.distances;
                if let Err(e) = self.recompute() {
                    log::warn!("loaded calibration data does not compute: {e}");
                }
                log::info!(
                    "loaded {} reference points and {} distances from {}",
                    self.points.len(),
                    self.distances.len(),
                    path.display()
                );
            }
            Err(e) => {
                log::warn!("error loading calibration from {}: {e}", path.display());
            }
        }
    }

    fn persist(&self) {
        let Some(path) = &self.save_file else {
            return;
        };
        let file = CalibrationFile {
            points: self.points.clone(),
            distances: self.distances.clone(),
        };
        let result = serde_json::to_string(&file)
            .map_err(ZoneWatchError::from)
            .and_then(|text| Ok(fs::write(path, text)?));
        if let Err(e) = result {
            log::warn!("error saving calibration to {}: {e}", path.display());
        }
    }

    /// Recompute the cached calibration from the current points/distances.
    ///
    /// With fewer than [`MAX_POINTS`] points the calibration is cleared
    /// (the engine drops back to its idle state). A compute failure leaves
    /// the previous calibration untouched.
    pub fn recompute(&mut self) -> Result<()> {
        if self.points.len() != MAX_POINTS {
            self.calibration = None;
            return Ok(());
        }
        let calibration = Calibration::compute(&self.points, &self.distances)?;
        for (point, canvas) in self
            .points
            .iter_mut()
            .zip(calibration.canvas_points.iter())
        {
            point.real_coord = *canvas;
        }
        self.calibration = Some(calibration);
        Ok(())
    }

    /// Place a new point at `(x, y)` with an auto-assigned id. Returns the
    /// new point's id, or `None` once all 4 points exist.
    pub fn add_point(&mut self, x: f64, y: f64) -> Option<u32> {
        if self.points.len() >= MAX_POINTS {
            return None;
        }
        self.point_counter += 1;
        let id = self.point_counter;
        self.points.push(ReferencePoint::new((x, y), id));
        if let Err(e) = self.recompute() {
            log::warn!("calibration incomplete after adding point {id}: {e}");
        }
        self.persist();
        Some(id)
    }

    /// Toggle selection of the point nearest to `(x, y)` within the
    /// proximity threshold. Returns the now-selected id, if any.
    pub fn select_near(&mut self, x: f64, y: f64) -> Option<u32> {
        let hit = self.points.iter().find(|p| p.is_near(x, y)).map(|p| p.id);
        match hit {
            Some(id) if self.selected == Some(id) => self.selected = None,
            Some(id) => self.selected = Some(id),
            None => {}
        }
        self.selected
    }

    /// Remove the currently selected point. Returns true if one was removed.
    pub fn delete_selected(&mut self) -> bool {
        match self.selected.take() {
            Some(id) => self.remove_point(id),
            None => false,
        }
    }

    /// Remove the point with the given id
    pub fn remove_point(&mut self, id: u32) -> bool {
        let before = self.points.len();
        self.points.retain(|p| p.id != id);
        if self.points.len() == before {
            return false;
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        if let Err(e) = self.recompute() {
            log::warn!("calibration invalid after removing point {id}: {e}");
        }
        self.persist();
        true
    }

    /// Drop all points, distances, and the cached calibration
    pub fn clear(&mut self) {
        self.points.clear();
        self.distances.clear();
        self.selected = None;
        self.point_counter = 0;
        self.calibration = None;
        self.persist();
    }

    /// Replace the full point set and distance map in one control-path
    /// operation, recomputing immediately. On error the previous points,
    /// distances, and calibration are all kept.
    pub fn replace(&mut self, points: Vec<ReferencePoint>, distances: DistanceMap) -> Result<()> {
        let prev_points = std::mem::replace(&mut self.points, points);
        let prev_distances = std::mem::replace(&mut self.distances, distances);
        match self.recompute() {
            Ok(()) => {
                self.point_counter = self.points.iter().map(|p| p.id).max().unwrap_or(0);
                self.selected = None;
                self.persist();
                Ok(())
            }
            Err(e) => {
                self.points = prev_points;
                self.distances = prev_distances;
                Err(e)
            }
        }
    }

    /// Replace only the distance map, recomputing immediately. On error the
    /// previous distances and calibration are kept.
    pub fn set_distances(&mut self, distances: DistanceMap) -> Result<()> {
        let prev = std::mem::replace(&mut self.distances, distances);
        match self.recompute() {
            Ok(()) => {
                self.persist();
                Ok(())
            }
            Err(e) => {
                self.distances = prev;
                Err(e)
            }
        }
    }

    pub fn points(&self) -> &[ReferencePoint] {
        &self.points
    }

    pub fn distances(&self) -> &DistanceMap {
        &self.distances
    }

    pub fn selected(&self) -> Option<u32> {
        self.selected
    }

    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{unit_square_distances, unit_square_points};
    use approx::assert_abs_diff_eq;

    #[test]
    fn unit_square_maps_to_canvas_corners() {
        let calib = Calibration::compute(&unit_square_points(), &unit_square_distances()).unwrap();
        assert_eq!(calib.output_width, 800);
        assert_eq!(calib.output_height, 800);

        for (point, canvas) in unit_square_points()
            .iter()
            .zip(calib.canvas_points.iter())
        {
            let (x, y) = calib.forward.apply(point.coord);
            assert_abs_diff_eq!(x, canvas.0, epsilon = 1e-3);
            assert_abs_diff_eq!(y, canvas.1, epsilon = 1e-3);
        }
    }

    #[test]
    fn inverse_round_trips_reference_points() {
        let calib = Calibration::compute(&unit_square_points(), &unit_square_distances()).unwrap();
        for point in &unit_square_points() {
            let (x, y) = calib.inverse.apply(calib.forward.apply(point.coord));
            assert_abs_diff_eq!(x, point.coord.0, epsilon = 1e-3);
            assert_abs_diff_eq!(y, point.coord.1, epsilon = 1e-3);
        }
    }

    #[test]
    fn missing_distance_names_the_pair() {
        let mut distances = unit_square_distances();
        let mut partial = DistanceMap::new();
        for (a, b) in [(1, 2), (2, 3), (3, 4), (1, 4), (1, 3)] {
            partial.insert(a, b, distances.get(a, b).unwrap());
        }
        distances = partial;

        let err = Calibration::compute(&unit_square_points(), &distances).unwrap_err();
        match err {
            ZoneWatchError::MissingDistance(pair) => assert_eq!(pair, "2-4"),
            other => panic!("expected MissingDistance, got {other}"),
        }
    }

    #[test]
    fn wrong_point_count() {
        let err = Calibration::compute(&unit_square_points()[..3], &unit_square_distances())
            .unwrap_err();
        assert!(matches!(err, ZoneWatchError::InvalidPointCount(3)));
    }

    #[test]
    fn failed_recompute_keeps_previous_calibration() {
        let mut store = CalibrationStore::new();
        store
            .replace(unit_square_points(), unit_square_distances())
            .unwrap();
        let before = store.calibration().cloned().unwrap();

        // Degenerate update: the triangle inequality cannot hold.
        let mut bad = unit_square_distances();
        bad.insert(1, 3, 5.0);
        let err = store.set_distances(bad).unwrap_err();
        assert!(matches!(err, ZoneWatchError::DegenerateGeometry(_)));
        assert_eq!(store.calibration(), Some(&before));
        assert_eq!(store.distances(), &unit_square_distances());
    }

    #[test]
    fn dropping_below_four_points_clears_calibration() {
        let mut store = CalibrationStore::new();
        store
            .replace(unit_square_points(), unit_square_distances())
            .unwrap();
        assert!(store.calibration().is_some());

        assert!(store.remove_point(3));
        assert!(store.calibration().is_none());
        assert_eq!(store.points().len(), 3);
    }

    #[test]
    fn incremental_placement_and_selection() {
        let mut store = CalibrationStore::new();
        assert_eq!(store.add_point(10.0, 10.0), Some(1));
        assert_eq!(store.add_point(200.0, 12.0), Some(2));
        assert_eq!(store.add_point(205.0, 180.0), Some(3));
        assert_eq!(store.add_point(8.0, 190.0), Some(4));
        assert_eq!(store.add_point(50.0, 50.0), None);

        assert_eq!(store.select_near(202.0, 14.0), Some(2));
        assert_eq!(store.select_near(202.0, 14.0), None); // toggle off
        assert_eq!(store.select_near(9.0, 189.0), Some(4));
        assert!(store.delete_selected());
        assert_eq!(store.points().len(), 3);

        // Ids keep counting up, matching the operator flow.
        assert_eq!(store.add_point(0.0, 0.0), Some(5));
    }

    #[test]
    fn persistence_round_trip_reproduces_calibration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("homography_data.json");

        let original = {
            let mut store = CalibrationStore::with_file(&path);
            store
                .replace(unit_square_points(), unit_square_distances())
                .unwrap();
            store.calibration().cloned().unwrap()
        };

        let reloaded = CalibrationStore::with_file(&path);
        assert_eq!(reloaded.points().len(), 4);
        assert_eq!(reloaded.calibration(), Some(&original));
    }

    #[test]
    fn missing_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CalibrationStore::with_file(dir.path().join("absent.json"));
        assert!(store.points().is_empty());
        assert!(store.calibration().is_none());
    }
}
