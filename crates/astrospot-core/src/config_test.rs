use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with both service URLs populated.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("ASTROSPOT_BRIGHTNESS_SERVICE_URL", "http://localhost:9001");
    m.insert("ASTROSPOT_WEATHER_SERVICE_URL", "http://localhost:9002");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "ASTROSPOT_ENV"));
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8080");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.search, SearchTuning::default());
    assert_eq!(cfg.brightness.provider, LookupProvider::Http);
    assert_eq!(
        cfg.brightness.service_url.as_deref(),
        Some("http://localhost:9001")
    );
    assert_eq!(cfg.default_timezone, "Europe/Warsaw");
    assert_eq!(cfg.lookup_timeout_secs, 30);
    assert_eq!(cfg.lookup_user_agent, "astrospot/0.1 (dark-sky-search)");
}

#[test]
fn build_app_config_fails_without_brightness_url_for_http_provider() {
    let mut map = full_env();
    map.remove("ASTROSPOT_BRIGHTNESS_SERVICE_URL");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "ASTROSPOT_BRIGHTNESS_SERVICE_URL"),
        "expected MissingEnvVar(ASTROSPOT_BRIGHTNESS_SERVICE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_dummy_providers_need_no_urls() {
    let mut map = HashMap::new();
    map.insert("ASTROSPOT_BRIGHTNESS_PROVIDER", "dummy");
    map.insert("ASTROSPOT_WEATHER_PROVIDER", "dummy");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.brightness.provider, LookupProvider::Dummy);
    assert_eq!(cfg.weather.provider, LookupProvider::Dummy);
    assert!(cfg.weather.service_url.is_none());
}

#[test]
fn build_app_config_fails_with_unknown_provider() {
    let mut map = full_env();
    map.insert("ASTROSPOT_WEATHER_PROVIDER", "carrier-pigeon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ASTROSPOT_WEATHER_PROVIDER"),
        "got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = full_env();
    map.insert("ASTROSPOT_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ASTROSPOT_BIND_ADDR"),
        "expected InvalidEnvVar(ASTROSPOT_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_divisor_of_one() {
    let mut map = full_env();
    map.insert("ASTROSPOT_GRID_STEP_DIVISOR", "1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ASTROSPOT_GRID_STEP_DIVISOR"),
        "got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_positive_grid_step() {
    let mut map = full_env();
    map.insert("ASTROSPOT_GRID_LATITUDE_DEGREES", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ASTROSPOT_GRID_LATITUDE_DEGREES"),
        "got: {result:?}"
    );
}

#[test]
fn build_app_config_search_overrides() {
    let mut map = full_env();
    map.insert("ASTROSPOT_GRID_MAX_DEPTH", "0");
    map.insert("ASTROSPOT_TOP_NUMBER", "5");
    map.insert("ASTROSPOT_TOP_PERCENT", "25.5");
    map.insert("ASTROSPOT_TOP_EXTENDED", "true");
    map.insert("ASTROSPOT_KM_PER_DEGREE", "65.4");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.search.max_depth, 0);
    assert_eq!(cfg.search.top_number, 5);
    assert!((cfg.search.top_percent - 25.5).abs() < f64::EPSILON);
    assert!(cfg.search.top_extended);
    assert!((cfg.search.km_per_degree - 65.4).abs() < f64::EPSILON);
    // untouched values keep their defaults
    assert!((cfg.search.km_per_degree_longitude - 70.0).abs() < f64::EPSILON);
}

#[test]
fn build_app_config_rejects_non_boolean_top_extended() {
    let mut map = full_env();
    map.insert("ASTROSPOT_TOP_EXTENDED", "yes");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ASTROSPOT_TOP_EXTENDED"),
        "got: {result:?}"
    );
}

#[test]
fn build_app_config_lookup_timeout_invalid() {
    let mut map = full_env();
    map.insert("ASTROSPOT_LOOKUP_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ASTROSPOT_LOOKUP_TIMEOUT_SECS"),
        "got: {result:?}"
    );
}
