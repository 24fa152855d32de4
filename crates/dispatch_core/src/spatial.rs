//! Spatial operations: great-circle distances, grid-cell addressing, and
//! proximity queries over the responder population.
//!
//! This module provides:
//!
//! - **Distance calculations**: haversine distance between coordinates
//! - **Grid cells**: floored (lat, lng) bucketing of geographic space
//! - **ResponderGrid**: cell -> responder index built once per trial
//! - **nearby_responders**: two-phase range query (cell block, then exact)
//!
//! Default cell size is 0.01 degrees (~1.1 km), suitable for city-scale
//! simulations.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use lru::LruCache;

use crate::entities::{Coordinates, EmergencyId, Responder, ResponderId};

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Approximate kilometers per degree of latitude.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Distance cache entries per pipeline (~1MB memory at capacity).
const DISTANCE_CACHE_CAPACITY: usize = 50_000;

/// Haversine great-circle distance in kilometers.
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let (lat1, lon1) = (a.lat.to_radians(), a.lng.to_radians());
    let (lat2, lon2) = (b.lat.to_radians(), b.lng.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Key of one grid bucket: floored latitude/longitude cell indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub lat_idx: i32,
    pub lng_idx: i32,
}

/// Cell addressing is a pure function of coordinates: two points share a cell
/// iff their floored indices match.
pub fn cell_of(coords: Coordinates, cell_size_deg: f64) -> GridCell {
    debug_assert!(cell_size_deg > 0.0, "cell size must be positive");
    GridCell {
        lat_idx: (coords.lat / cell_size_deg).floor() as i32,
        lng_idx: (coords.lng / cell_size_deg).floor() as i32,
    }
}

/// The square block of cells within `radius_cells` Chebyshev distance of
/// `center`. Over-approximates a circular neighborhood; callers must apply an
/// exact distance check to the members.
pub fn cells_in_radius(center: GridCell, radius_cells: i32) -> Vec<GridCell> {
    let radius = radius_cells.max(0);
    let mut cells = Vec::with_capacity(((2 * radius + 1) * (2 * radius + 1)) as usize);
    for lat_idx in (center.lat_idx - radius)..=(center.lat_idx + radius) {
        for lng_idx in (center.lng_idx - radius)..=(center.lng_idx + radius) {
            cells.push(GridCell { lat_idx, lng_idx });
        }
    }
    cells
}

/// Per-pipeline cache of emergency-to-responder distances. Both endpoints are
/// immutable for the trial, so entries never invalidate; the cache is simply
/// cleared on trial reset.
#[derive(Debug)]
pub struct DistanceCache {
    cache: LruCache<(EmergencyId, ResponderId), f64>,
}

impl DistanceCache {
    pub fn new() -> Self {
        Self {
            cache: LruCache::new(
                NonZeroUsize::new(DISTANCE_CACHE_CAPACITY).expect("cache size must be non-zero"),
            ),
        }
    }

    pub fn distance_km(
        &mut self,
        emergency: EmergencyId,
        coords: Coordinates,
        responder: &Responder,
    ) -> f64 {
        *self
            .cache
            .get_or_insert((emergency, responder.id), || {
                distance_km(coords, responder.coords)
            })
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

impl Default for DistanceCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Static index from grid cell to the responders positioned in it. Built once
/// per trial per pipeline; responders do not move, so no update path exists.
///
/// Invariant: every responder of the source population appears in exactly one
/// cell.
#[derive(Debug, Clone)]
pub struct ResponderGrid {
    cell_size_deg: f64,
    cells: HashMap<GridCell, Vec<ResponderId>>,
}

impl ResponderGrid {
    /// An index with no members, for worlds where no trial has started yet.
    pub fn empty(cell_size_deg: f64) -> Self {
        Self {
            cell_size_deg,
            cells: HashMap::new(),
        }
    }

    pub fn build(population: &[Responder], cell_size_deg: f64) -> Self {
        let mut cells: HashMap<GridCell, Vec<ResponderId>> = HashMap::new();
        for responder in population {
            cells.entry(responder.cell).or_default().push(responder.id);
        }
        Self {
            cell_size_deg,
            cells,
        }
    }

    pub fn cell_size_deg(&self) -> f64 {
        self.cell_size_deg
    }

    pub fn responders_in(&self, cell: GridCell) -> &[ResponderId] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of cells to scan on each side for a query radius in kilometers.
    pub fn radius_cells(&self, max_distance_km: f64) -> i32 {
        (max_distance_km / (self.cell_size_deg * KM_PER_DEGREE)).ceil() as i32
    }
}

/// Free responders within `max_distance_km` of `coords`.
///
/// Two-phase query: the cell block narrows the candidate set, then an exact
/// haversine check decides membership. The square block is a superset of the
/// true circular neighborhood, so the grid never has the final word.
pub fn nearby_responders(
    emergency: EmergencyId,
    coords: Coordinates,
    population: &[Responder],
    grid: &ResponderGrid,
    max_distance_km: f64,
    now: u64,
    distances: &mut DistanceCache,
) -> Vec<ResponderId> {
    let center = cell_of(coords, grid.cell_size_deg());
    let radius = grid.radius_cells(max_distance_km);
    let mut found = Vec::new();
    for cell in cells_in_radius(center, radius) {
        for &id in grid.responders_in(cell) {
            let responder = &population[id.0 as usize];
            if !responder.is_free(now) {
                continue;
            }
            if distances.distance_km(emergency, coords, responder) <= max_distance_km {
                found.push(id);
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_symmetric_and_zero_on_identity() {
        let a = Coordinates::new(42.6977, 23.3219);
        let b = Coordinates::new(42.6506, 23.3806);
        assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-12);
        assert_eq!(distance_km(a, a), 0.0);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let a = Coordinates::new(42.0, 23.0);
        let b = Coordinates::new(43.0, 23.0);
        let d = distance_km(a, b);
        assert!((110.0..113.0).contains(&d), "got {d}");
    }

    #[test]
    fn cell_of_floors_indices() {
        let size = 0.01;
        let a = cell_of(Coordinates::new(42.654, 23.331), size);
        let b = cell_of(Coordinates::new(42.6549, 23.3301), size);
        let c = cell_of(Coordinates::new(42.661, 23.331), size);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn cell_of_handles_negative_coordinates() {
        let size = 0.01;
        let cell = cell_of(Coordinates::new(-0.005, -0.015), size);
        assert_eq!(cell.lat_idx, -1);
        assert_eq!(cell.lng_idx, -2);
    }

    #[test]
    fn cells_in_radius_is_the_full_square_block() {
        let center = GridCell {
            lat_idx: 10,
            lng_idx: -4,
        };
        let cells = cells_in_radius(center, 2);
        assert_eq!(cells.len(), 25);
        assert!(cells.contains(&center));
        for cell in &cells {
            assert!((cell.lat_idx - center.lat_idx).abs() <= 2);
            assert!((cell.lng_idx - center.lng_idx).abs() <= 2);
        }
    }

    #[test]
    fn cells_in_radius_zero_is_just_the_center() {
        let center = GridCell {
            lat_idx: 0,
            lng_idx: 0,
        };
        assert_eq!(cells_in_radius(center, 0), vec![center]);
    }

    #[test]
    fn radius_cells_rounds_up() {
        let grid = ResponderGrid::empty(0.01);
        // 0.5 km / (0.01 deg * 111 km/deg) = 0.45 cells -> 1
        assert_eq!(grid.radius_cells(0.5), 1);
        // 2.3 km / 1.11 km = 2.07 cells -> 3
        assert_eq!(grid.radius_cells(2.3), 3);
    }

    #[test]
    fn grid_places_every_responder_in_its_cell() {
        let size = 0.01;
        let responders: Vec<Responder> = [
            Coordinates::new(42.65, 23.33),
            Coordinates::new(42.651, 23.332),
            Coordinates::new(42.70, 23.40),
        ]
        .iter()
        .enumerate()
        .map(|(i, &coords)| Responder::new(ResponderId(i as u32), coords, cell_of(coords, size)))
        .collect();

        let grid = ResponderGrid::build(&responders, size);
        let mut indexed = 0;
        for responder in &responders {
            assert!(grid.responders_in(responder.cell).contains(&responder.id));
            indexed += 1;
        }
        assert_eq!(indexed, responders.len());
    }

    #[test]
    fn nearby_responders_excludes_busy_ones() {
        let size = 0.01;
        let origin = Coordinates::new(42.65, 23.33);
        let mut responders = vec![
            Responder::new(ResponderId(0), origin, cell_of(origin, size)),
            Responder::new(ResponderId(1), origin, cell_of(origin, size)),
        ];
        responders[1].busy_until = 100;
        let grid = ResponderGrid::build(&responders, size);
        let mut distances = DistanceCache::new();

        let found = nearby_responders(
            EmergencyId(0),
            origin,
            &responders,
            &grid,
            1.0,
            50,
            &mut distances,
        );
        assert_eq!(found, vec![ResponderId(0)]);
    }
}
