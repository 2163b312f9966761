//! Concurrent brightness sampling.

use std::collections::HashSet;
use std::sync::Arc;

use astrospot_core::{Coordinate, LocationConditions};
use astrospot_lookup::BrightnessLookup;
use futures::future::join_all;

use crate::pool::WorkerPool;

/// Readings that came back, plus how many coordinates were lost on the way.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SampleReport {
    pub locations: Vec<LocationConditions>,
    /// Lookups that returned no data, failed, or could not be scheduled.
    pub dropped: usize,
}

#[derive(Clone)]
pub struct BrightnessSampler {
    lookup: Arc<dyn BrightnessLookup>,
    pool: WorkerPool,
}

impl BrightnessSampler {
    #[must_use]
    pub fn new(lookup: Arc<dyn BrightnessLookup>, pool: WorkerPool) -> Self {
        Self { lookup, pool }
    }

    #[must_use]
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Looks up every coordinate on the pool and keeps the ones that answered.
    ///
    /// Each reading keeps the requested coordinate. Missing data, lookup
    /// errors (rate limits included) and panicked tasks are dropped and
    /// counted; they never fail the batch.
    pub async fn sample(&self, coordinates: Vec<Coordinate>) -> SampleReport {
        if coordinates.is_empty() {
            tracing::info!("no coordinates to sample");
            return SampleReport::default();
        }

        let requested = coordinates.len();
        let mut dropped = 0_usize;
        let mut handles = Vec::with_capacity(requested);
        for coordinate in coordinates {
            let lookup = Arc::clone(&self.lookup);
            match self.pool.submit(async move { lookup.lookup(coordinate).await }).await {
                Ok(handle) => handles.push((coordinate, handle)),
                Err(e) => {
                    tracing::warn!(%coordinate, error = %e, "brightness lookup not scheduled");
                    dropped += 1;
                }
            }
        }

        let (coords, futures): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
        let outcomes = join_all(futures).await;

        let mut seen = HashSet::new();
        let mut locations = Vec::with_capacity(outcomes.len());
        for (coordinate, outcome) in coords.into_iter().zip(outcomes) {
            match outcome {
                Ok(Ok(Some(info))) => {
                    let location = LocationConditions::new(coordinate, info.relative_brightness);
                    if seen.insert(location.key()) {
                        locations.push(location);
                    }
                }
                Ok(Ok(None)) => {
                    tracing::debug!(%coordinate, "no brightness data");
                    dropped += 1;
                }
                Ok(Err(e)) => {
                    tracing::warn!(%coordinate, error = %e, "brightness lookup failed");
                    dropped += 1;
                }
                Err(e) => {
                    tracing::error!(%coordinate, error = %e, "brightness task failed");
                    dropped += 1;
                }
            }
        }

        tracing::debug!(requested, sampled = locations.len(), dropped, "brightness sampled");
        SampleReport { locations, dropped }
    }
}
