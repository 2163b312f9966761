//! Stub collaborators shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use astrospot_core::{Coordinate, LocationConditions};
use astrospot_lookup::{BrightnessInfo, BrightnessLookup, LookupError};
use async_trait::async_trait;

use crate::geo::DistanceCalculator;

/// Every pair of points is the same distance apart.
pub struct ConstantDistance(pub f64);

impl DistanceCalculator for ConstantDistance {
    fn distance_km(&self, _a: Coordinate, _b: Coordinate) -> f64 {
        self.0
    }
}

/// Brightness derived from the coordinate by a plain function.
pub struct FnBrightness<F>(F);

pub fn fn_brightness<F>(f: F) -> Arc<dyn BrightnessLookup>
where
    F: Fn(Coordinate) -> f64 + Send + Sync + 'static,
{
    Arc::new(FnBrightness(f))
}

#[async_trait]
impl<F> BrightnessLookup for FnBrightness<F>
where
    F: Fn(Coordinate) -> f64 + Send + Sync,
{
    async fn lookup(&self, coordinate: Coordinate) -> Result<Option<BrightnessInfo>, LookupError> {
        Ok(Some(info(coordinate, (self.0)(coordinate))))
    }
}

/// Fixed answers per coordinate; unknown coordinates have no data.
/// Coordinates listed in `rate_limited` fail with a rate-limit error.
#[derive(Default)]
pub struct TableBrightness {
    pub values: HashMap<Coordinate, f64>,
    pub rate_limited: Vec<Coordinate>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl BrightnessLookup for TableBrightness {
    async fn lookup(&self, coordinate: Coordinate) -> Result<Option<BrightnessInfo>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.rate_limited.contains(&coordinate) {
            return Err(LookupError::RateLimited {
                service: "brightness",
            });
        }
        Ok(self.values.get(&coordinate).map(|b| info(coordinate, *b)))
    }
}

/// Panics for one coordinate, answers a constant everywhere else.
pub struct PanickingBrightness {
    pub poisoned: Coordinate,
    pub value: f64,
}

#[async_trait]
impl BrightnessLookup for PanickingBrightness {
    async fn lookup(&self, coordinate: Coordinate) -> Result<Option<BrightnessInfo>, LookupError> {
        assert!(coordinate != self.poisoned, "lookup exploded for {coordinate}");
        Ok(Some(info(coordinate, self.value)))
    }
}

fn info(coordinate: Coordinate, relative_brightness: f64) -> BrightnessInfo {
    BrightnessInfo {
        latitude: coordinate.latitude,
        longitude: coordinate.longitude,
        relative_brightness,
    }
}

pub fn loc(latitude: f64, longitude: f64, brightness: f64) -> LocationConditions {
    LocationConditions::new(Coordinate::new(latitude, longitude), brightness)
}
