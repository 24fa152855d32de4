//! Population generation: uniform coordinate draws within the configured
//! region and per-trial responder placement.

use rand::Rng;

use crate::entities::{Coordinates, Responder, ResponderId};
use crate::scenario::RegionBounds;
use crate::spatial::cell_of;

/// Uniform random point inside the region.
pub fn random_coordinates<R: Rng>(rng: &mut R, bounds: &RegionBounds) -> Coordinates {
    let lat = rng.gen_range(bounds.lat_min..=bounds.lat_max);
    let lng = rng.gen_range(bounds.lng_min..=bounds.lng_max);
    Coordinates::new(lat, lng)
}

/// Fixed responder population for one trial, uniformly placed. Grid cells are
/// computed once here; positions never change mid-trial.
pub fn spawn_responders<R: Rng>(
    rng: &mut R,
    count: usize,
    bounds: &RegionBounds,
    cell_size_deg: f64,
) -> Vec<Responder> {
    (0..count)
        .map(|i| {
            let coords = random_coordinates(rng, bounds);
            Responder::new(
                ResponderId(i as u32),
                coords,
                cell_of(coords, cell_size_deg),
            )
        })
        .collect()
}
