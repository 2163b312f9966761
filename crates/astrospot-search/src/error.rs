use astrospot_lookup::LookupError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    /// `normalize` was called with an empty or inverted range.
    #[error("normalize range is empty: max {max} must be greater than min {min}")]
    EmptyRange { min: f64, max: f64 },

    #[error("invalid hour format: {0:?}")]
    InvalidHour(String),

    #[error("forecast lookup failed: {0}")]
    Forecast(#[from] LookupError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("worker pool has been shut down")]
    ShutDown,
}
