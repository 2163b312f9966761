//! Builds the configured collaborators, wrapped in their caches.

use std::sync::Arc;

use astrospot_core::{AppConfig, LookupConfig, LookupProvider};

use crate::brightness::{BrightnessLookup, DummyBrightness, HttpBrightnessClient};
use crate::cache::{CachedBrightness, CachedWeather};
use crate::error::LookupError;
use crate::weather::{DummyWeather, HttpWeatherClient, WeatherLookup};

fn service_url<'a>(lookup: &'a LookupConfig, service: &str) -> Result<&'a str, LookupError> {
    lookup
        .service_url
        .as_deref()
        .ok_or_else(|| LookupError::InvalidBaseUrl {
            url: String::new(),
            reason: format!("no service URL configured for {service}"),
        })
}

/// # Errors
///
/// Returns [`LookupError`] if the HTTP client cannot be constructed.
pub fn brightness_from_config(config: &AppConfig) -> Result<Arc<dyn BrightnessLookup>, LookupError> {
    let inner: Arc<dyn BrightnessLookup> = match config.brightness.provider {
        LookupProvider::Http => Arc::new(HttpBrightnessClient::new(
            service_url(&config.brightness, "brightness")?,
            config.lookup_timeout_secs,
            &config.lookup_user_agent,
        )?),
        LookupProvider::Dummy => Arc::new(DummyBrightness),
    };
    tracing::info!(provider = %config.brightness.provider, "brightness lookup ready");
    Ok(Arc::new(CachedBrightness::new(inner)))
}

/// # Errors
///
/// Returns [`LookupError`] if the HTTP client cannot be constructed.
pub fn weather_from_config(config: &AppConfig) -> Result<Arc<dyn WeatherLookup>, LookupError> {
    let inner: Arc<dyn WeatherLookup> = match config.weather.provider {
        LookupProvider::Http => Arc::new(HttpWeatherClient::new(
            service_url(&config.weather, "weather")?,
            &config.default_timezone,
            config.lookup_timeout_secs,
            &config.lookup_user_agent,
        )?),
        LookupProvider::Dummy => Arc::new(DummyWeather),
    };
    tracing::info!(provider = %config.weather.provider, "weather lookup ready");
    Ok(Arc::new(CachedWeather::new(inner)))
}
