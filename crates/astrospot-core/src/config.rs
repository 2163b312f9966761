use std::env::VarError;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment, LookupConfig, LookupProvider, SearchTuning};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can pass a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let env = parse_environment(&or_default("ASTROSPOT_ENV", "development"))?;
    let bind_addr: SocketAddr = parse_value(
        "ASTROSPOT_BIND_ADDR",
        &or_default("ASTROSPOT_BIND_ADDR", "0.0.0.0:8080"),
    )?;
    let log_level = or_default("ASTROSPOT_LOG_LEVEL", "info");

    let defaults = SearchTuning::default();
    let number = |var: &str, default: String| -> Result<f64, ConfigError> {
        let raw = or_default(var, &default);
        let value: f64 = parse_value(var, &raw)?;
        if !value.is_finite() || value <= 0.0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected a positive number, got {raw}"),
            });
        }
        Ok(value)
    };

    let grid_step_divisor: u32 = parse_value(
        "ASTROSPOT_GRID_STEP_DIVISOR",
        &or_default("ASTROSPOT_GRID_STEP_DIVISOR", &defaults.grid_step_divisor.to_string()),
    )?;
    if grid_step_divisor <= 1 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ASTROSPOT_GRID_STEP_DIVISOR".to_string(),
            reason: format!("divisor must be greater than 1, got {grid_step_divisor}"),
        });
    }

    let search = SearchTuning {
        grid_latitude_degrees: number(
            "ASTROSPOT_GRID_LATITUDE_DEGREES",
            defaults.grid_latitude_degrees.to_string(),
        )?,
        grid_longitude_degrees: number(
            "ASTROSPOT_GRID_LONGITUDE_DEGREES",
            defaults.grid_longitude_degrees.to_string(),
        )?,
        grid_step_divisor,
        max_depth: parse_value(
            "ASTROSPOT_GRID_MAX_DEPTH",
            &or_default("ASTROSPOT_GRID_MAX_DEPTH", &defaults.max_depth.to_string()),
        )?,
        max_thickening: parse_value(
            "ASTROSPOT_GRID_MAX_THICKENING",
            &or_default("ASTROSPOT_GRID_MAX_THICKENING", &defaults.max_thickening.to_string()),
        )?,
        km_per_degree: number("ASTROSPOT_KM_PER_DEGREE", defaults.km_per_degree.to_string())?,
        km_per_degree_latitude: number(
            "ASTROSPOT_KM_PER_DEGREE_LATITUDE",
            defaults.km_per_degree_latitude.to_string(),
        )?,
        km_per_degree_longitude: number(
            "ASTROSPOT_KM_PER_DEGREE_LONGITUDE",
            defaults.km_per_degree_longitude.to_string(),
        )?,
        min_radius_km: number("ASTROSPOT_MIN_RADIUS_KM", defaults.min_radius_km.to_string())?,
        cluster_eps_factor: number(
            "ASTROSPOT_CLUSTER_EPS_FACTOR",
            defaults.cluster_eps_factor.to_string(),
        )?,
        top_number: parse_value(
            "ASTROSPOT_TOP_NUMBER",
            &or_default("ASTROSPOT_TOP_NUMBER", &defaults.top_number.to_string()),
        )?,
        top_percent: parse_value(
            "ASTROSPOT_TOP_PERCENT",
            &or_default("ASTROSPOT_TOP_PERCENT", &defaults.top_percent.to_string()),
        )?,
        top_extended: parse_value(
            "ASTROSPOT_TOP_EXTENDED",
            &or_default("ASTROSPOT_TOP_EXTENDED", &defaults.top_extended.to_string()),
        )?,
        pool_parallelism_multiplier: parse_value(
            "ASTROSPOT_POOL_PARALLELISM_MULTIPLIER",
            &or_default(
                "ASTROSPOT_POOL_PARALLELISM_MULTIPLIER",
                &defaults.pool_parallelism_multiplier.to_string(),
            ),
        )?,
    };

    let brightness = lookup_config(
        &lookup,
        "ASTROSPOT_BRIGHTNESS_PROVIDER",
        "ASTROSPOT_BRIGHTNESS_SERVICE_URL",
    )?;
    let weather = lookup_config(
        &lookup,
        "ASTROSPOT_WEATHER_PROVIDER",
        "ASTROSPOT_WEATHER_SERVICE_URL",
    )?;

    let default_timezone = or_default("ASTROSPOT_DEFAULT_TIMEZONE", "Europe/Warsaw");
    let lookup_timeout_secs: u64 = parse_value(
        "ASTROSPOT_LOOKUP_TIMEOUT_SECS",
        &or_default("ASTROSPOT_LOOKUP_TIMEOUT_SECS", "30"),
    )?;
    let lookup_user_agent = or_default(
        "ASTROSPOT_LOOKUP_USER_AGENT",
        "astrospot/0.1 (dark-sky-search)",
    );

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        search,
        brightness,
        weather,
        default_timezone,
        lookup_timeout_secs,
        lookup_user_agent,
    })
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

fn lookup_config<F>(
    lookup: &F,
    provider_var: &str,
    url_var: &str,
) -> Result<LookupConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let raw = lookup(provider_var).unwrap_or_else(|_| "http".to_string());
    let provider = parse_provider(provider_var, &raw)?;
    let service_url = lookup(url_var).ok().filter(|url| !url.trim().is_empty());
    if provider == LookupProvider::Http && service_url.is_none() {
        return Err(ConfigError::MissingEnvVar(url_var.to_string()));
    }
    Ok(LookupConfig {
        provider,
        service_url,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ASTROSPOT_ENV".to_string(),
            reason: format!(
                "unknown environment '{other}'; expected development, test, or production"
            ),
        }),
    }
}

fn parse_provider(var: &str, s: &str) -> Result<LookupProvider, ConfigError> {
    match s {
        "http" => Ok(LookupProvider::Http),
        "dummy" => Ok(LookupProvider::Dummy),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("unknown provider '{other}'; expected http or dummy"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
