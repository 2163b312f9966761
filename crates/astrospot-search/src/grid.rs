//! Grid-point generation.
//!
//! Points sit on the absolute lattice `(i * lat_step, j * lon_step)` for
//! integer `i`, `j`, so two levels whose steps divide evenly share points no
//! matter where their centres fall.

use std::ops::RangeInclusive;
use std::sync::Arc;

use astrospot_core::{Coordinate, GridSize, SearchArea};

use crate::geo::DistanceCalculator;

/// Above this many points a single pass is worth a tuning look.
pub const LARGE_GRID_POINTS: usize = 1000;

/// Bounding boxes with more lattice cells than this are refused outright.
pub const MAX_LATTICE_CELLS: u64 = 4_000_000;

pub struct GridGenerator {
    distance: Arc<dyn DistanceCalculator>,
    /// Bounding-box conversion from kilometres to degrees.
    km_per_degree: f64,
}

impl GridGenerator {
    #[must_use]
    pub fn new(distance: Arc<dyn DistanceCalculator>, km_per_degree: f64) -> Self {
        Self {
            distance,
            km_per_degree,
        }
    }

    /// Every lattice point within `search_area` and within `origin`.
    ///
    /// Returns an empty list (not an error) for a non-positive radius or a
    /// non-positive grid step. Output is ordered by latitude, then longitude.
    #[must_use]
    pub fn points_within(
        &self,
        search_area: &SearchArea,
        origin: &SearchArea,
        grid: &GridSize,
    ) -> Vec<Coordinate> {
        let radius_km = search_area.radius_km;
        if !(radius_km.is_finite() && radius_km > 0.0) {
            tracing::warn!(radius_km, center = %search_area.center, "grid requested for empty area");
            return Vec::new();
        }
        if !(grid.latitude_degrees > 0.0 && grid.longitude_degrees > 0.0) {
            tracing::warn!(?grid, "grid requested with non-positive step");
            return Vec::new();
        }

        let center = search_area.center;
        let radius_degrees = radius_km / self.km_per_degree;
        let (Some(lat_range), Some(lon_range)) = (
            lattice_range(center.latitude, radius_degrees, grid.latitude_degrees),
            lattice_range(center.longitude, radius_degrees, grid.longitude_degrees),
        ) else {
            tracing::warn!(radius_degrees, ?grid, "bounding box does not fit the lattice");
            return Vec::new();
        };
        let cells = range_len(&lat_range).saturating_mul(range_len(&lon_range));
        if cells > MAX_LATTICE_CELLS {
            tracing::warn!(cells, radius_km, ?grid, "bounding box too large for one grid");
            return Vec::new();
        }

        let mut points = Vec::new();
        for i in lat_range {
            #[allow(clippy::cast_precision_loss)]
            let latitude = i as f64 * grid.latitude_degrees;
            for j in lon_range.clone() {
                #[allow(clippy::cast_precision_loss)]
                let longitude = j as f64 * grid.longitude_degrees;
                let point = Coordinate::new(latitude, longitude);
                if !point.is_on_globe() {
                    continue;
                }
                if self.distance.distance_km(center, point) <= radius_km
                    && self.distance.distance_km(origin.center, point) <= origin.radius_km
                {
                    points.push(point);
                }
            }
        }

        if points.len() > LARGE_GRID_POINTS {
            tracing::warn!(
                points = points.len(),
                radius_km,
                ?grid,
                "large number of grid points; consider a coarser grid or smaller radius"
            );
        }
        tracing::debug!(points = points.len(), radius_km, %center, "grid generated");
        points
    }
}

/// Integer lattice indices covering `[center - half_width, center + half_width]`.
///
/// `None` when the bounds are not finite or span more than
/// [`MAX_LATTICE_CELLS`] indices on their own.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn lattice_range(center: f64, half_width: f64, step: f64) -> Option<RangeInclusive<i64>> {
    let first = ((center - half_width) / step).floor();
    let last = ((center + half_width) / step).ceil();
    if !(first.is_finite() && last.is_finite()) || last - first > MAX_LATTICE_CELLS as f64 {
        return None;
    }
    Some(first as i64..=last as i64)
}

fn range_len(range: &RangeInclusive<i64>) -> u64 {
    u64::try_from(range.end() - range.start()).map_or(0, |span| span + 1)
}
