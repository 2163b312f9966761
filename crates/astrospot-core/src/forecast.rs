//! Night forecast payload as returned by the weather service.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherForecastResponse {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "generationtime_ms", default)]
    pub generation_time_ms: f64,
    #[serde(default)]
    pub utc_offset_seconds: i32,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub timezone_abbreviation: String,
    #[serde(default)]
    pub elevation: f64,
    #[serde(default)]
    pub hourly_units: HourlyUnits,
    /// One entry per night period.
    #[serde(default)]
    pub data: Vec<DataPeriod>,
}

impl WeatherForecastResponse {
    #[must_use]
    pub fn period(&self, period: &str) -> Option<&DataPeriod> {
        self.data.iter().find(|p| p.period == period)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HourlyUnits {
    pub time: String,
    #[serde(rename = "cloudCover")]
    pub cloud_cover: String,
    #[serde(rename = "temperature_2m")]
    pub temperature: String,
    pub visibility: String,
    #[serde(rename = "windspeed_10m")]
    pub wind_speed: String,
    #[serde(rename = "windgusts_10m")]
    pub wind_gusts: String,
}

/// A named night (e.g. `2025-08-21/2025-08-22`) and its hourly series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPeriod {
    pub period: String,
    #[serde(default)]
    pub moon_illumination: f64,
    #[serde(default)]
    pub hours: Vec<HourlyData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyData {
    #[serde(default)]
    pub timestamp: i64,
    /// Local wall-clock hour, `"HH:MM"`.
    pub hour: String,
    pub temperature: f64,
    /// Percent, 0–100.
    #[serde(rename = "cloudcover")]
    pub cloud_cover: f64,
    /// Metres.
    pub visibility: f64,
    #[serde(rename = "windspeed")]
    pub wind_speed: f64,
    #[serde(rename = "windgust")]
    pub wind_gust: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_service_field_names() {
        let json = serde_json::json!({
            "latitude": 52.23,
            "longitude": 21.01,
            "generationtime_ms": 0.1,
            "utc_offset_seconds": 7200,
            "timezone": "Europe/Warsaw",
            "timezone_abbreviation": "GMT+2",
            "elevation": 113,
            "hourly_units": {
                "time": "iso8601",
                "cloudCover": "%",
                "temperature_2m": "°C",
                "visibility": "m",
                "windspeed_10m": "m/s",
                "windgusts_10m": "m/s"
            },
            "data": [{
                "period": "2025-08-21/2025-08-22",
                "moon_illumination": 0.41,
                "hours": [{
                    "timestamp": 1_755_810_000,
                    "hour": "21:00",
                    "temperature": 14.9,
                    "cloudcover": 3,
                    "visibility": 16720.0,
                    "windspeed": 4.7,
                    "windgust": 8.9
                }]
            }]
        });

        let forecast: WeatherForecastResponse =
            serde_json::from_value(json).expect("forecast should deserialize");

        assert_eq!(forecast.utc_offset_seconds, 7200);
        assert_eq!(forecast.hourly_units.temperature, "°C");
        let period = forecast
            .period("2025-08-21/2025-08-22")
            .expect("period present");
        assert_eq!(period.hours.len(), 1);
        assert!((period.hours[0].cloud_cover - 3.0).abs() < f64::EPSILON);
        assert!((period.hours[0].wind_gust - 8.9).abs() < f64::EPSILON);
        assert!(forecast.period("missing").is_none());
    }
}
