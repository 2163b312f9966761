//! Geographic value types.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A point on the globe in decimal degrees.
///
/// Equality and hashing compare the exact bit patterns of both components
/// (with `-0.0` folded into `0.0`), so coordinates can key hash sets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Builds a coordinate without range checks.
    ///
    /// Use [`Coordinate::validated`] for values that come from a caller.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Builds a coordinate, rejecting non-finite or out-of-range components.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Latitude`] or [`ValidationError::Longitude`].
    pub fn validated(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::Longitude(longitude));
        }
        Ok(Self::new(latitude, longitude))
    }

    /// `true` when both components lie in their valid ranges.
    #[must_use]
    pub fn is_on_globe(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    fn bits(self) -> (u64, u64) {
        // Adding +0.0 turns -0.0 into +0.0 and leaves every other value alone.
        ((self.latitude + 0.0).to_bits(), (self.longitude + 0.0).to_bits())
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.latitude, self.longitude)
    }
}

/// A circular region: every point within `radius_km` of `center`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchArea {
    pub center: Coordinate,
    pub radius_km: f64,
}

impl SearchArea {
    #[must_use]
    pub const fn new(center: Coordinate, radius_km: f64) -> Self {
        Self { center, radius_km }
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::Radius`] when the radius is negative or not finite.
    pub fn validated(center: Coordinate, radius_km: f64) -> Result<Self, ValidationError> {
        if !radius_km.is_finite() || radius_km < 0.0 {
            return Err(ValidationError::Radius(radius_km));
        }
        Ok(Self::new(center, radius_km))
    }
}

/// Lattice step in degrees along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSize {
    pub latitude_degrees: f64,
    pub longitude_degrees: f64,
}

impl GridSize {
    #[must_use]
    pub const fn new(latitude_degrees: f64, longitude_degrees: f64) -> Self {
        Self {
            latitude_degrees,
            longitude_degrees,
        }
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::GridStep`] unless both steps are finite and positive.
    pub fn validated(latitude_degrees: f64, longitude_degrees: f64) -> Result<Self, ValidationError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(latitude_degrees) || !positive(longitude_degrees) {
            return Err(ValidationError::GridStep {
                latitude: latitude_degrees,
                longitude: longitude_degrees,
            });
        }
        Ok(Self::new(latitude_degrees, longitude_degrees))
    }

    /// The next, finer lattice: both steps divided by `divisor`.
    #[must_use]
    pub fn divided_by(&self, divisor: u32) -> Self {
        let divisor = f64::from(divisor.max(1));
        Self::new(
            self.latitude_degrees / divisor,
            self.longitude_degrees / divisor,
        )
    }
}
