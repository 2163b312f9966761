//! Scoring weights and the night-hour window.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Weighting coefficients for the per-night score.
///
/// `w_distance` is carried for callers and serialization but is not part of
/// the current score formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringWeights {
    pub w_light_pollution: f64,
    pub w_distance: f64,
    pub w_cloud_cover: f64,
    pub w_visibility: f64,
    pub w_wind_speed: f64,
    pub w_wind_gust: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            w_light_pollution: 0.4,
            w_distance: 0.2,
            w_cloud_cover: 0.15,
            w_visibility: 0.15,
            w_wind_speed: 0.05,
            w_wind_gust: 0.05,
        }
    }
}

impl ScoringWeights {
    /// # Errors
    ///
    /// Returns [`ValidationError::Weight`] for the first weight that is
    /// negative or not finite.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let named = [
            ("wLightPollution", self.w_light_pollution),
            ("wDistance", self.w_distance),
            ("wCloudCover", self.w_cloud_cover),
            ("wVisibility", self.w_visibility),
            ("wWindSpeed", self.w_wind_speed),
            ("wWindGust", self.w_wind_gust),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::Weight { name, value });
            }
        }
        Ok(())
    }
}

/// Weights plus the `[hour_from, hour_to)` window of forecast hours that
/// count as night. The window wraps past midnight when `hour_from > hour_to`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringParameters {
    #[serde(default)]
    pub weights: ScoringWeights,
    pub hour_from: u32,
    pub hour_to: u32,
}

impl Default for ScoringParameters {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            hour_from: 21,
            hour_to: 6,
        }
    }
}

impl ScoringParameters {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an invalid weight or an hour above 23.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.weights.validate()?;
        for hour in [self.hour_from, self.hour_to] {
            if hour > 23 {
                return Err(ValidationError::Hour(hour));
            }
        }
        Ok(())
    }
}
