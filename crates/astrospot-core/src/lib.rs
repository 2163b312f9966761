//! Shared value types and configuration for the dark-sky location search.
//!
//! Everything here is plain data: coordinates, search areas, grid steps,
//! recursion parameters, candidate snapshots, forecast payloads and scoring
//! weights. Behaviour lives in `astrospot-search` and `astrospot-lookup`.

pub mod app_config;
pub mod config;
pub mod error;
pub mod forecast;
pub mod geo;
pub mod location;
pub mod scoring;
pub mod search;

pub use app_config::{AppConfig, Environment, LookupConfig, LookupProvider, SearchTuning};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, ValidationError};
pub use forecast::{DataPeriod, HourlyData, HourlyUnits, WeatherForecastResponse};
pub use geo::{Coordinate, GridSize, SearchArea};
pub use location::{LocationConditions, LocationKey, LocationsCluster};
pub use scoring::{ScoringParameters, ScoringWeights};
pub use search::{SearchContext, SearchParams};
