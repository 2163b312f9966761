//! Candidate snapshots and clusters of candidates.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::forecast::WeatherForecastResponse;
use crate::geo::Coordinate;

/// A candidate location: coordinate, sky brightness (lower is darker) and,
/// once enriched, its forecast and per-night scores.
///
/// Snapshots are never mutated in place; the `with_*` methods return a new
/// value that copies every unrelated field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConditions {
    pub coordinate: Coordinate,
    pub brightness: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherForecastResponse>,
    /// Night period id → score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<BTreeMap<String, f64>>,
}

/// Deduplication identity of a [`LocationConditions`]: coordinate plus brightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocationKey {
    coordinate: Coordinate,
    brightness_bits: u64,
}

impl LocationConditions {
    #[must_use]
    pub const fn new(coordinate: Coordinate, brightness: f64) -> Self {
        Self {
            coordinate,
            brightness,
            weather: None,
            score: None,
        }
    }

    #[must_use]
    pub fn key(&self) -> LocationKey {
        LocationKey {
            coordinate: self.coordinate,
            brightness_bits: (self.brightness + 0.0).to_bits(),
        }
    }

    #[must_use]
    pub fn with_weather(&self, weather: WeatherForecastResponse) -> Self {
        Self {
            weather: Some(weather),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_scores(&self, scores: BTreeMap<String, f64>) -> Self {
        Self {
            score: Some(scores),
            ..self.clone()
        }
    }

    /// Ascending brightness: darker first.
    #[must_use]
    pub fn cmp_brightness(&self, other: &Self) -> Ordering {
        self.brightness.total_cmp(&other.brightness)
    }
}

/// A group of nearby candidates treated as one recommended site.
///
/// Members are kept sorted by ascending brightness and are unique by
/// [`LocationKey`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ClusterRepr")]
pub struct LocationsCluster {
    locations: Vec<LocationConditions>,
}

#[derive(Deserialize)]
struct ClusterRepr {
    #[serde(default)]
    locations: Vec<LocationConditions>,
}

impl From<ClusterRepr> for LocationsCluster {
    fn from(repr: ClusterRepr) -> Self {
        Self::from_locations(repr.locations)
    }
}

impl LocationsCluster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_locations(locations: impl IntoIterator<Item = LocationConditions>) -> Self {
        let mut cluster = Self::new();
        for location in locations {
            cluster.add(location);
        }
        cluster
    }

    /// Inserts `location` in brightness order. Returns `false` if an equal
    /// member (same coordinate and brightness) is already present.
    pub fn add(&mut self, location: LocationConditions) -> bool {
        if self.contains(&location) {
            return false;
        }
        let at = self
            .locations
            .partition_point(|m| m.cmp_brightness(&location) != Ordering::Greater);
        self.locations.insert(at, location);
        true
    }

    /// Absorbs every member of `other`.
    pub fn merge(&mut self, other: LocationsCluster) {
        for location in other.locations {
            self.add(location);
        }
    }

    #[must_use]
    pub fn contains(&self, location: &LocationConditions) -> bool {
        let key = location.key();
        self.locations.iter().any(|m| m.key() == key)
    }

    #[must_use]
    pub fn contains_coordinate(&self, coordinate: &Coordinate) -> bool {
        self.locations.iter().any(|m| &m.coordinate == coordinate)
    }

    #[must_use]
    pub fn locations(&self) -> &[LocationConditions] {
        &self.locations
    }

    #[must_use]
    pub fn into_locations(self) -> Vec<LocationConditions> {
        self.locations
    }

    /// The darkest member.
    #[must_use]
    pub fn best(&self) -> Option<&LocationConditions> {
        self.locations.first()
    }

    /// Drops every member for which `keep` returns `false`.
    pub fn retain(&mut self, keep: impl FnMut(&LocationConditions) -> bool) {
        self.locations.retain(keep);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(lat: f64, lon: f64, brightness: f64) -> LocationConditions {
        LocationConditions::new(Coordinate::new(lat, lon), brightness)
    }

    #[test]
    fn cluster_keeps_members_sorted_by_brightness() {
        let cluster =
            LocationsCluster::from_locations([loc(1.0, 1.0, 3.0), loc(1.0, 2.0, 1.0), loc(2.0, 1.0, 2.0)]);
        let brightness: Vec<f64> = cluster.locations().iter().map(|l| l.brightness).collect();
        assert_eq!(brightness, vec![1.0, 2.0, 3.0]);
        assert_eq!(cluster.best().map(|l| l.brightness), Some(1.0));
    }

    #[test]
    fn equal_brightness_at_different_coordinates_are_both_kept() {
        let cluster = LocationsCluster::from_locations([loc(1.0, 1.0, 5.0), loc(1.0, 2.0, 5.0)]);
        assert_eq!(cluster.len(), 2);
    }

    #[test]
    fn duplicate_members_are_ignored() {
        let mut cluster = LocationsCluster::new();
        assert!(cluster.add(loc(1.0, 1.0, 5.0)));
        assert!(!cluster.add(loc(1.0, 1.0, 5.0)));
        assert_eq!(cluster.len(), 1);
    }

    #[test]
    fn merge_unions_members() {
        let mut a = LocationsCluster::from_locations([loc(1.0, 1.0, 1.0), loc(1.0, 2.0, 4.0)]);
        let b = LocationsCluster::from_locations([loc(1.0, 2.0, 4.0), loc(3.0, 3.0, 2.0)]);
        a.merge(b);
        assert_eq!(a.len(), 3);
        assert_eq!(a.locations()[1].brightness, 2.0);
    }

    #[test]
    fn with_weather_copies_unrelated_fields() {
        let original = loc(1.0, 1.0, 7.0).with_scores(BTreeMap::from([("n1".to_string(), 0.5)]));
        let forecast = WeatherForecastResponse {
            latitude: 1.0,
            longitude: 1.0,
            generation_time_ms: 0.0,
            utc_offset_seconds: 0,
            timezone: "UTC".to_string(),
            timezone_abbreviation: "UTC".to_string(),
            elevation: 0.0,
            hourly_units: crate::forecast::HourlyUnits::default(),
            data: vec![],
        };
        let enriched = original.with_weather(forecast);
        assert_eq!(enriched.coordinate, original.coordinate);
        assert_eq!(enriched.score, original.score);
        assert!(enriched.weather.is_some());
        assert!(original.weather.is_none());
    }

    #[test]
    fn deserialized_cluster_is_sorted() {
        let json = serde_json::json!({
            "locations": [
                { "coordinate": { "latitude": 1.0, "longitude": 1.0 }, "brightness": 9.0 },
                { "coordinate": { "latitude": 1.0, "longitude": 2.0 }, "brightness": 2.0 }
            ]
        });
        let cluster: LocationsCluster = serde_json::from_value(json).expect("cluster");
        assert_eq!(cluster.best().map(|l| l.brightness), Some(2.0));
    }
}
