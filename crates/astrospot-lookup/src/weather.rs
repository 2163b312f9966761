//! Night-forecast lookup.

use std::time::Instant;

use astrospot_core::{
    Coordinate, DataPeriod, HourlyData, HourlyUnits, WeatherForecastResponse,
};
use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::client::{build_client, endpoint_url, get_json};
use crate::error::LookupError;

#[async_trait]
pub trait WeatherLookup: Send + Sync {
    /// Fetches the night forecast for `coordinate`. `None` or a blank
    /// timezone falls back to the implementation's default.
    async fn forecast(
        &self,
        coordinate: Coordinate,
        timezone: Option<&str>,
    ) -> Result<WeatherForecastResponse, LookupError>;
}

pub struct HttpWeatherClient {
    client: Client,
    forecast_url: Url,
    default_timezone: String,
}

impl HttpWeatherClient {
    /// # Errors
    ///
    /// Returns [`LookupError::Http`] if the `reqwest` client cannot be built or
    /// [`LookupError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        base_url: &str,
        default_timezone: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, LookupError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            forecast_url: endpoint_url(base_url, "forecast")?,
            default_timezone: default_timezone.to_string(),
        })
    }
}

/// Resolves a caller-supplied timezone, treating blank as absent.
pub(crate) fn effective_timezone<'a>(timezone: Option<&'a str>, default: &'a str) -> &'a str {
    timezone.filter(|tz| !tz.trim().is_empty()).unwrap_or(default)
}

#[async_trait]
impl WeatherLookup for HttpWeatherClient {
    async fn forecast(
        &self,
        coordinate: Coordinate,
        timezone: Option<&str>,
    ) -> Result<WeatherForecastResponse, LookupError> {
        let started = Instant::now();
        let timezone = effective_timezone(timezone, &self.default_timezone);
        let query = [
            ("latitude", coordinate.latitude.to_string()),
            ("longitude", coordinate.longitude.to_string()),
            ("timezone", timezone.to_string()),
        ];

        let result = get_json(&self.client, &self.forecast_url, &query, "weather").await;
        match &result {
            Ok(_) => tracing::info!(
                %coordinate,
                timezone,
                elapsed_ms = started.elapsed().as_millis(),
                "weather forecast fetched"
            ),
            Err(e) if e.is_rate_limited() => {
                tracing::warn!(%coordinate, "weather service rate limited the request");
            }
            Err(e) => tracing::error!(
                %coordinate,
                url = %self.forecast_url,
                elapsed_ms = started.elapsed().as_millis(),
                error = %e,
                "weather forecast request failed"
            ),
        }
        result
    }
}

/// Always returns the same one-night forecast for Warsaw.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyWeather;

impl DummyWeather {
    #[must_use]
    pub fn fixture() -> WeatherForecastResponse {
        WeatherForecastResponse {
            latitude: 52.232_222,
            longitude: 21.008_333,
            generation_time_ms: 0.1,
            utc_offset_seconds: 7200,
            timezone: "Europe/Warsaw".to_string(),
            timezone_abbreviation: "GMT+2".to_string(),
            elevation: 113.0,
            hourly_units: HourlyUnits {
                time: "iso8601".to_string(),
                cloud_cover: "%".to_string(),
                temperature: "°C".to_string(),
                visibility: "m".to_string(),
                wind_speed: "m/s".to_string(),
                wind_gusts: "m/s".to_string(),
            },
            data: vec![DataPeriod {
                period: "2025-08-21/2025-08-22".to_string(),
                moon_illumination: 0.41,
                hours: vec![
                    HourlyData {
                        timestamp: 1_755_810_000,
                        hour: "21:00".to_string(),
                        temperature: 14.9,
                        cloud_cover: 3.0,
                        visibility: 16_720.0,
                        wind_speed: 4.7,
                        wind_gust: 8.9,
                    },
                    HourlyData {
                        timestamp: 1_755_813_600,
                        hour: "22:00".to_string(),
                        temperature: 14.3,
                        cloud_cover: 5.0,
                        visibility: 16_000.0,
                        wind_speed: 4.5,
                        wind_gust: 8.2,
                    },
                ],
            }],
        }
    }
}

#[async_trait]
impl WeatherLookup for DummyWeather {
    async fn forecast(
        &self,
        coordinate: Coordinate,
        timezone: Option<&str>,
    ) -> Result<WeatherForecastResponse, LookupError> {
        tracing::debug!(%coordinate, timezone = timezone.unwrap_or_default(), "serving dummy forecast");
        Ok(Self::fixture())
    }
}
