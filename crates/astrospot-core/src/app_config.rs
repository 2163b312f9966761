use std::net::SocketAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which implementation backs a lookup collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupProvider {
    Http,
    Dummy,
}

impl std::fmt::Display for LookupProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupProvider::Http => write!(f, "http"),
            LookupProvider::Dummy => write!(f, "dummy"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    pub provider: LookupProvider,
    /// Present whenever `provider` is [`LookupProvider::Http`].
    pub service_url: Option<String>,
}

/// Knobs of the recursive search. [`Default`] gives the documented defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchTuning {
    pub grid_latitude_degrees: f64,
    pub grid_longitude_degrees: f64,
    pub grid_step_divisor: u32,
    pub max_depth: u32,
    /// Upper bound on same-depth grid refinements when a pass finds no points.
    pub max_thickening: u32,
    /// Bounding-box conversion used by grid generation.
    pub km_per_degree: f64,
    /// Child-radius conversion, north-south.
    pub km_per_degree_latitude: f64,
    /// Child-radius conversion, east-west.
    pub km_per_degree_longitude: f64,
    pub min_radius_km: f64,
    pub cluster_eps_factor: f64,
    pub top_number: i64,
    pub top_percent: f64,
    pub top_extended: bool,
    pub pool_parallelism_multiplier: usize,
}

impl Default for SearchTuning {
    fn default() -> Self {
        Self {
            grid_latitude_degrees: 0.1,
            grid_longitude_degrees: 0.1,
            grid_step_divisor: 2,
            max_depth: 3,
            max_thickening: 4,
            km_per_degree: 111.0,
            km_per_degree_latitude: 111.0,
            km_per_degree_longitude: 70.0,
            min_radius_km: 0.035,
            cluster_eps_factor: 1.2,
            top_number: 3,
            top_percent: 10.0,
            top_extended: false,
            pool_parallelism_multiplier: 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub search: SearchTuning,
    pub brightness: LookupConfig,
    pub weather: LookupConfig,
    pub default_timezone: String,
    pub lookup_timeout_secs: u64,
    pub lookup_user_agent: String,
}
