//! In-process memoization in front of the lookup collaborators.
//!
//! Only successful answers are stored (including "no data" for brightness).
//! Errors, rate limits in particular, pass through uncached so the next call
//! asks the service again.

use std::collections::HashMap;
use std::sync::Arc;

use astrospot_core::{Coordinate, WeatherForecastResponse};
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::brightness::{BrightnessInfo, BrightnessLookup};
use crate::error::LookupError;
use crate::weather::WeatherLookup;

pub struct CachedBrightness {
    inner: Arc<dyn BrightnessLookup>,
    entries: RwLock<HashMap<Coordinate, Option<BrightnessInfo>>>,
}

impl CachedBrightness {
    #[must_use]
    pub fn new(inner: Arc<dyn BrightnessLookup>) -> Self {
        Self {
            inner,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl BrightnessLookup for CachedBrightness {
    async fn lookup(&self, coordinate: Coordinate) -> Result<Option<BrightnessInfo>, LookupError> {
        if let Some(hit) = self.entries.read().await.get(&coordinate) {
            return Ok(*hit);
        }
        let answer = self.inner.lookup(coordinate).await?;
        self.entries.write().await.insert(coordinate, answer);
        Ok(answer)
    }
}

pub struct CachedWeather {
    inner: Arc<dyn WeatherLookup>,
    /// Keyed by coordinate and the timezone exactly as the caller passed it.
    entries: RwLock<HashMap<(Coordinate, Option<String>), WeatherForecastResponse>>,
}

impl CachedWeather {
    #[must_use]
    pub fn new(inner: Arc<dyn WeatherLookup>) -> Self {
        Self {
            inner,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl WeatherLookup for CachedWeather {
    async fn forecast(
        &self,
        coordinate: Coordinate,
        timezone: Option<&str>,
    ) -> Result<WeatherForecastResponse, LookupError> {
        let key = (coordinate, timezone.map(str::to_owned));
        if let Some(hit) = self.entries.read().await.get(&key) {
            return Ok(hit.clone());
        }
        let forecast = self.inner.forecast(coordinate, timezone).await?;
        self.entries.write().await.insert(key, forecast.clone());
        Ok(forecast)
    }
}
