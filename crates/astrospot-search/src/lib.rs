//! Dark-sky location search and weather scoring.
//!
//! [`SearchEngine`] walks a lattice of candidate points, keeps the darkest,
//! groups them into clusters and refines each cluster on ever finer grids.
//! [`WeatherScoring`] ranks the resulting candidates per night.

pub mod cluster;
pub mod engine;
pub mod error;
pub mod geo;
pub mod grid;
pub mod pipeline;
pub mod pool;
pub mod sampler;
pub mod scorer;
pub mod select;

#[cfg(test)]
mod test_support;

pub use cluster::ProximityClusterer;
pub use engine::{DarkestLocations, SearchEngine, SearchStatus};
pub use error::{PoolError, ScoringError};
pub use geo::{haversine_km, DistanceCalculator, Haversine, EARTH_RADIUS_KM};
pub use grid::GridGenerator;
pub use pipeline::{ClusterScoring, WeatherScoring};
pub use pool::WorkerPool;
pub use sampler::{BrightnessSampler, SampleReport};
pub use scorer::{normalize, LocationScorer, ScoredByPeriod, ScoredLocation};
pub use select::TopSelector;
