//! Polygon zone storage, persistence, and containment queries
//!
//! Zones are stored as closed rings in canvas coordinates: the first vertex
//! is duplicated at the end when a polygon is completed, and that duplicate
//! stays in the persisted form. Containment always trims it before calling
//! the ray-cast test, which otherwise counts the shared edge twice.

use crate::error::Result;
use floormap::point_in_polygon;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted zone schema: `{"zones": [[[x, y], ...], ...]}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneFile {
    #[serde(default)]
    pub zones: Vec<Vec<(f64, f64)>>,
}

/// Zone store with an in-progress ring and optional JSON persistence.
///
/// Vertices accumulate through `add_vertex` until `complete_polygon` closes
/// the ring and appends it to the zone list. Mutations persist immediately
/// when a save file is configured; load failures degrade to an empty store.
#[derive(Debug, Default)]
pub struct ZoneManager {
    zones: Vec<Vec<(f64, f64)>>,
    pending: Vec<(f64, f64)>,
    save_file: Option<PathBuf>,
}

impl ZoneManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a manager backed by a JSON file, loading any existing zones
    pub fn with_file<P: AsRef<Path>>(path: P) -> Self {
        let mut manager = Self {
            save_file: Some(path.as_ref().to_path_buf()),
            ..Self::default()
        };
        manager.load();
        manager
    }

    fn load(&mut self) {
        let Some(path) = &self.save_file else {
            return;
        };
        match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<ZoneFile>(&raw) {
                Ok(file) => {
                    self.zones = file.zones;
                    log::info!("loaded {} zones from {}", self.zones.len(), path.display());
                }
                Err(err) => {
                    log::warn!("ignoring malformed zone file {}: {}", path.display(), err);
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                log::warn!("failed to read zone file {}: {}", path.display(), err);
            }
        }
    }

    fn persist(&self) {
        let Some(path) = &self.save_file else {
            return;
        };
        let file = ZoneFile {
            zones: self.zones.clone(),
        };
        if let Err(err) = serde_json::to_string(&file)
            .map_err(crate::error::ZoneWatchError::from)
            .and_then(|json| fs::write(path, json).map_err(Into::into))
        {
            log::warn!("failed to persist zones to {}: {}", path.display(), err);
        }
    }

    /// Append a vertex to the in-progress ring
    pub fn add_vertex(&mut self, x: f64, y: f64) {
        self.pending.push((x, y));
    }

    /// Drop the in-progress ring without touching completed zones
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// Close the in-progress ring and append it to the zone list. Returns
    /// false (leaving the ring intact) when fewer than 3 vertices exist.
    pub fn complete_polygon(&mut self) -> bool {
        if self.pending.len() < 3 {
            return false;
        }
        let mut ring = std::mem::take(&mut self.pending);
        ring.push(ring[0]);
        self.zones.push(ring);
        self.persist();
        true
    }

    /// Replace every zone with a single polygon built from `vertices`
    pub fn replace_all_zones(&mut self, mut vertices: Vec<(f64, f64)>) -> Result<()> {
        if vertices.len() < 3 {
            return Err(crate::error::ZoneWatchError::state(format!(
                "polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        vertices.push(vertices[0]);
        self.zones = vec![vertices];
        self.persist();
        Ok(())
    }

    /// Delete the zone at `index`; false when the index is out of range
    pub fn delete_zone(&mut self, index: usize) -> bool {
        if index >= self.zones.len() {
            return false;
        }
        self.zones.remove(index);
        self.persist();
        true
    }

    /// Indices of every zone containing `point`
    pub fn point_in_zones(&self, point: (f64, f64)) -> Vec<usize> {
        zones_containing(&self.zones, point)
    }

    pub fn zones(&self) -> &[Vec<(f64, f64)>] {
        &self.zones
    }

    pub fn zone(&self, index: usize) -> Option<&[(f64, f64)]> {
        self.zones.get(index).map(Vec::as_slice)
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn pending(&self) -> &[(f64, f64)] {
        &self.pending
    }
}

/// Indices of every closed ring in `zones` containing `point`. The
/// duplicated closing vertex is trimmed before the ray-cast test so the
/// shared edge is not counted twice.
pub fn zones_containing(zones: &[Vec<(f64, f64)>], point: (f64, f64)) -> Vec<usize> {
    zones
        .iter()
        .enumerate()
        .filter(|(_, ring)| point_in_polygon(point, &ring[..ring.len().saturating_sub(1)]))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn square(manager: &mut ZoneManager) {
        manager.add_vertex(0.0, 0.0);
        manager.add_vertex(100.0, 0.0);
        manager.add_vertex(100.0, 100.0);
        manager.add_vertex(0.0, 100.0);
        assert!(manager.complete_polygon());
    }

    #[test]
    fn complete_closes_the_ring() {
        let mut manager = ZoneManager::new();
        square(&mut manager);

        let ring = manager.zone(0).unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);
        assert!(manager.pending().is_empty());
    }

    #[test]
    fn incomplete_ring_is_rejected() {
        let mut manager = ZoneManager::new();
        manager.add_vertex(0.0, 0.0);
        manager.add_vertex(10.0, 0.0);
        assert!(!manager.complete_polygon());
        // The ring survives for further vertices.
        assert_eq!(manager.pending().len(), 2);

        manager.clear_pending();
        assert!(manager.pending().is_empty());
    }

    #[test]
    fn containment_reports_zone_indices() {
        let mut manager = ZoneManager::new();
        square(&mut manager);
        manager.add_vertex(200.0, 200.0);
        manager.add_vertex(300.0, 200.0);
        manager.add_vertex(250.0, 300.0);
        assert!(manager.complete_polygon());

        assert_eq!(manager.point_in_zones((50.0, 50.0)), vec![0]);
        assert_eq!(manager.point_in_zones((250.0, 230.0)), vec![1]);
        assert!(manager.point_in_zones((150.0, 150.0)).is_empty());
    }

    #[test]
    fn replace_all_resets_to_one_zone() {
        let mut manager = ZoneManager::new();
        square(&mut manager);
        square(&mut manager);
        assert_eq!(manager.zone_count(), 2);

        manager
            .replace_all_zones(vec![(0.0, 0.0), (10.0, 0.0), (5.0, 10.0)])
            .unwrap();
        assert_eq!(manager.zone_count(), 1);
        assert_eq!(manager.zone(0).unwrap().len(), 4);

        assert!(manager.replace_all_zones(vec![(0.0, 0.0)]).is_err());
    }

    #[test]
    fn delete_zone_bounds_checked() {
        let mut manager = ZoneManager::new();
        square(&mut manager);
        assert!(!manager.delete_zone(1));
        assert!(manager.delete_zone(0));
        assert_eq!(manager.zone_count(), 0);
    }

    #[test]
    fn zones_persist_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("zones.json");

        let mut manager = ZoneManager::with_file(&path);
        square(&mut manager);
        drop(manager);

        let reloaded = ZoneManager::with_file(&path);
        assert_eq!(reloaded.zone_count(), 1);
        assert_eq!(reloaded.point_in_zones((50.0, 50.0)), vec![0]);
    }

    #[test]
    fn missing_or_malformed_file_degrades_to_empty() {
        let dir = tempdir().unwrap();
        let missing = ZoneManager::with_file(dir.path().join("absent.json"));
        assert_eq!(missing.zone_count(), 0);

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        let malformed = ZoneManager::with_file(&path);
        assert_eq!(malformed.zone_count(), 0);
    }
}
