use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Malformed input rejected at the boundary, before any search starts.
///
/// The recursion itself never produces these: an out-of-range radius deep in
/// the tree is a termination condition, not an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),

    #[error("radius {0} km must be a finite, non-negative number")]
    Radius(f64),

    #[error("grid step must be positive in both directions, got {latitude}/{longitude} degrees")]
    GridStep { latitude: f64, longitude: f64 },

    #[error("scoring weight {name} must be finite and non-negative, got {value}")]
    Weight { name: &'static str, value: f64 },

    #[error("hour {0} is outside [0, 23]")]
    Hour(u32),
}
