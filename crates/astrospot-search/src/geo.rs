//! Great-circle distance.

use astrospot_core::Coordinate;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance between two coordinates in kilometres.
///
/// The grid generator and the clusterer take this as a trait object so tests
/// can substitute a constant distance.
pub trait DistanceCalculator: Send + Sync {
    fn distance_km(&self, a: Coordinate, b: Coordinate) -> f64;
}

/// Haversine distance on a sphere of radius [`EARTH_RADIUS_KM`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Haversine;

impl DistanceCalculator for Haversine {
    fn distance_km(&self, a: Coordinate, b: Coordinate) -> f64 {
        haversine_km(a, b)
    }
}

#[must_use]
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = lat_b - lat_a;
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    let angle = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * angle
}
