//! Per-night weather aggregation and weighted scoring.

use std::collections::BTreeMap;

use astrospot_core::{
    DataPeriod, HourlyData, HourlyUnits, LocationConditions, ScoringParameters, ScoringWeights,
};
use serde::Serialize;

use crate::error::ScoringError;

const MAX_WIND_SPEED: f64 = 15.0;
const MAX_WIND_GUST: f64 = 20.0;
const MAX_VISIBILITY_M: f64 = 30_000.0;
const MAX_CLOUD_COVER: f64 = 100.0;
const MAX_BRIGHTNESS: f64 = 255.0;

/// Night conditions for one location over one period. Recomputed on every
/// scoring call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregatedWeatherData {
    pub brightness: f64,
    pub avg_cloud_cover: f64,
    pub avg_visibility: f64,
    pub max_wind_speed: f64,
    pub max_wind_gust: f64,
    pub avg_temperature: f64,
}

/// One candidate's result for one night, as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredLocation {
    pub coordinate: astrospot_core::Coordinate,
    pub brightness: f64,
    pub hourly_units: HourlyUnits,
    pub data: Option<DataPeriod>,
    pub score: f64,
}

/// Period id → candidates, best score first.
pub type ScoredByPeriod = BTreeMap<String, Vec<ScoredLocation>>;

/// Linear map of `value` onto `[0, 1]`, clamped at both ends.
///
/// # Errors
///
/// Returns [`ScoringError::EmptyRange`] when `max <= min`.
pub fn normalize(value: f64, min: f64, max: f64) -> Result<f64, ScoringError> {
    if max <= min {
        return Err(ScoringError::EmptyRange { min, max });
    }
    if value <= min {
        return Ok(0.0);
    }
    if value >= max {
        return Ok(1.0);
    }
    Ok((value - min) / (max - min))
}

/// Hour of day from an `"HH:MM"` string.
///
/// # Errors
///
/// Returns [`ScoringError::InvalidHour`] if the leading field is not a number.
pub fn parse_hour(hour: &str) -> Result<u32, ScoringError> {
    hour.split(':')
        .next()
        .and_then(|h| h.trim().parse::<u32>().ok())
        .ok_or_else(|| ScoringError::InvalidHour(hour.to_string()))
}

/// `[from, to)`, wrapping past midnight when `from > to`.
#[must_use]
pub fn is_hour_in_range(hour: u32, from: u32, to: u32) -> bool {
    if from <= to {
        hour >= from && hour < to
    } else {
        hour >= from || hour < to
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LocationScorer;

impl LocationScorer {
    /// Aggregates each forecast period over the night window. Periods with
    /// no hour inside the window are left out. A location without a forecast
    /// yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::InvalidHour`] for a malformed hour string.
    pub fn aggregate_weather_per_night(
        &self,
        location: &LocationConditions,
        hour_from: u32,
        hour_to: u32,
    ) -> Result<BTreeMap<String, AggregatedWeatherData>, ScoringError> {
        let Some(weather) = &location.weather else {
            return Ok(BTreeMap::new());
        };

        let mut nights = BTreeMap::new();
        for period in &weather.data {
            let mut hours: Vec<&HourlyData> = Vec::new();
            for hourly in &period.hours {
                if is_hour_in_range(parse_hour(&hourly.hour)?, hour_from, hour_to) {
                    hours.push(hourly);
                }
            }
            if hours.is_empty() {
                tracing::warn!(period = %period.period, "no forecast hours inside the night window");
                continue;
            }

            #[allow(clippy::cast_precision_loss)]
            let n = hours.len() as f64;
            let avg = |f: fn(&HourlyData) -> f64| hours.iter().map(|h| f(h)).sum::<f64>() / n;
            let max = |f: fn(&HourlyData) -> f64| {
                hours.iter().map(|h| f(h)).fold(f64::NEG_INFINITY, f64::max)
            };

            nights.insert(
                period.period.clone(),
                AggregatedWeatherData {
                    brightness: location.brightness,
                    avg_cloud_cover: avg(|h| h.cloud_cover),
                    avg_visibility: avg(|h| h.visibility),
                    max_wind_speed: max(|h| h.wind_speed),
                    max_wind_gust: max(|h| h.wind_gust),
                    avg_temperature: avg(|h| h.temperature),
                },
            );
        }
        Ok(nights)
    }

    /// Weighted night score. `w_distance` has no term here.
    ///
    /// # Errors
    ///
    /// Propagates [`normalize`] precondition failures.
    pub fn calculate_score(
        &self,
        night: &AggregatedWeatherData,
        weights: &ScoringWeights,
    ) -> Result<f64, ScoringError> {
        let light = 1.0 - normalize(night.brightness, 0.0, MAX_BRIGHTNESS)?;
        let cloud = 1.0 - night.avg_cloud_cover / MAX_CLOUD_COVER;
        let visibility = normalize(night.avg_visibility, 0.0, MAX_VISIBILITY_M)?;
        let wind_speed = 1.0 - night.max_wind_speed / MAX_WIND_SPEED;
        let wind_gust = 1.0 - night.max_wind_gust / MAX_WIND_GUST;

        Ok(weights.w_light_pollution * light
            + weights.w_cloud_cover * cloud
            + weights.w_visibility * visibility
            + weights.w_wind_speed * wind_speed
            + weights.w_wind_gust * wind_gust)
    }

    /// Period id → score for one location.
    ///
    /// # Errors
    ///
    /// See [`LocationScorer::aggregate_weather_per_night`].
    pub fn score_location(
        &self,
        location: &LocationConditions,
        parameters: &ScoringParameters,
    ) -> Result<BTreeMap<String, f64>, ScoringError> {
        let nights =
            self.aggregate_weather_per_night(location, parameters.hour_from, parameters.hour_to)?;
        if nights.is_empty() {
            tracing::debug!(coordinate = %location.coordinate, "nothing to score");
        }
        nights
            .into_iter()
            .map(|(period, night)| Ok((period, self.calculate_score(&night, &parameters.weights)?)))
            .collect()
    }

    /// Scores every candidate and groups the results by period, best first.
    /// A candidate without data for a period is absent from that group.
    ///
    /// # Errors
    ///
    /// Fails on the first candidate whose forecast cannot be scored.
    pub fn score_and_sort_locations(
        &self,
        candidates: &[LocationConditions],
        parameters: &ScoringParameters,
    ) -> Result<ScoredByPeriod, ScoringError> {
        let mut grouped = ScoredByPeriod::new();
        for candidate in candidates {
            let scored = candidate.with_scores(self.score_location(candidate, parameters)?);
            let (Some(weather), Some(scores)) = (&scored.weather, &scored.score) else {
                continue;
            };
            for (period, score) in scores {
                grouped.entry(period.clone()).or_default().push(ScoredLocation {
                    coordinate: scored.coordinate,
                    brightness: scored.brightness,
                    hourly_units: weather.hourly_units.clone(),
                    data: weather.period(period).cloned(),
                    score: *score,
                });
            }
        }
        sort_by_score(&mut grouped);
        Ok(grouped)
    }
}

/// Orders every period's list by descending score.
pub fn sort_by_score(grouped: &mut ScoredByPeriod) {
    for locations in grouped.values_mut() {
        locations.sort_by(|a, b| b.score.total_cmp(&a.score));
    }
}
