//! Sky-brightness lookup: the trait the search engine samples through, the
//! HTTP client for the remote darkness service and a random stand-in.

use std::time::Instant;

use astrospot_core::Coordinate;
use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::client::{build_client, endpoint_url, get_json};
use crate::error::LookupError;

/// Upper bound of the relative brightness scale.
pub const MAX_RELATIVE_BRIGHTNESS: f64 = 255.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrightnessInfo {
    pub latitude: f64,
    pub longitude: f64,
    /// 0 (darkest) to 255 (brightest).
    pub relative_brightness: f64,
}

/// Returns a brightness reading for a coordinate.
///
/// `Ok(None)` means "no usable data". A rate limit is surfaced as
/// `Err(LookupError::RateLimited)` so caches can refuse to store it.
#[async_trait]
pub trait BrightnessLookup: Send + Sync {
    async fn lookup(&self, coordinate: Coordinate) -> Result<Option<BrightnessInfo>, LookupError>;
}

pub struct HttpBrightnessClient {
    client: Client,
    darkness_url: Url,
}

impl HttpBrightnessClient {
    /// # Errors
    ///
    /// Returns [`LookupError::Http`] if the `reqwest` client cannot be built or
    /// [`LookupError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, LookupError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            darkness_url: endpoint_url(base_url, "darkness")?,
        })
    }

    fn accept(coordinate: Coordinate, info: BrightnessInfo) -> Option<BrightnessInfo> {
        if !Coordinate::new(info.latitude, info.longitude).is_on_globe() {
            tracing::warn!(
                %coordinate,
                latitude = info.latitude,
                longitude = info.longitude,
                "brightness service returned invalid coordinates"
            );
            return None;
        }
        if !(0.0..=MAX_RELATIVE_BRIGHTNESS).contains(&info.relative_brightness) {
            tracing::warn!(
                %coordinate,
                relative_brightness = info.relative_brightness,
                "brightness service returned out-of-range brightness"
            );
            return None;
        }
        Some(info)
    }
}

#[async_trait]
impl BrightnessLookup for HttpBrightnessClient {
    async fn lookup(&self, coordinate: Coordinate) -> Result<Option<BrightnessInfo>, LookupError> {
        let started = Instant::now();
        let query = [
            ("latitude", coordinate.latitude.to_string()),
            ("longitude", coordinate.longitude.to_string()),
        ];

        match get_json::<BrightnessInfo>(&self.client, &self.darkness_url, &query, "brightness")
            .await
        {
            Ok(info) => {
                let accepted = Self::accept(coordinate, info);
                if let Some(info) = accepted {
                    tracing::debug!(
                        %coordinate,
                        relative_brightness = info.relative_brightness,
                        elapsed_ms = started.elapsed().as_millis(),
                        "brightness lookup succeeded"
                    );
                }
                Ok(accepted)
            }
            Err(e) if e.is_rate_limited() => {
                tracing::warn!(%coordinate, "brightness service rate limited the request");
                Err(e)
            }
            Err(e) => {
                tracing::error!(
                    %coordinate,
                    url = %self.darkness_url,
                    elapsed_ms = started.elapsed().as_millis(),
                    error = %e,
                    "brightness lookup failed"
                );
                Ok(None)
            }
        }
    }
}

/// Returns a uniformly random brightness in `[0, 255)` for any coordinate.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyBrightness;

#[async_trait]
impl BrightnessLookup for DummyBrightness {
    async fn lookup(&self, coordinate: Coordinate) -> Result<Option<BrightnessInfo>, LookupError> {
        let relative_brightness = rand::rng().random_range(0.0..MAX_RELATIVE_BRIGHTNESS);
        Ok(Some(BrightnessInfo {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            relative_brightness,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dummy_echoes_coordinate_with_in_range_brightness() {
        let coordinate = Coordinate::new(52.1, 21.3);
        for _ in 0..50 {
            let info = DummyBrightness
                .lookup(coordinate)
                .await
                .unwrap()
                .expect("dummy always answers");
            assert!((info.latitude - 52.1).abs() < f64::EPSILON);
            assert!((info.longitude - 21.3).abs() < f64::EPSILON);
            assert!((0.0..MAX_RELATIVE_BRIGHTNESS).contains(&info.relative_brightness));
        }
    }

    #[test]
    fn accept_rejects_off_globe_response() {
        let c = Coordinate::new(0.0, 0.0);
        let info = BrightnessInfo {
            latitude: 95.0,
            longitude: 0.0,
            relative_brightness: 10.0,
        };
        assert!(HttpBrightnessClient::accept(c, info).is_none());
    }

    #[test]
    fn accept_keeps_boundary_brightness() {
        let c = Coordinate::new(0.0, 0.0);
        for b in [0.0, MAX_RELATIVE_BRIGHTNESS] {
            let info = BrightnessInfo {
                latitude: 0.0,
                longitude: 0.0,
                relative_brightness: b,
            };
            assert!(HttpBrightnessClient::accept(c, info).is_some());
        }
    }
}
