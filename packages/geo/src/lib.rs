#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Great-circle distance scoring for emergency dispatch.
//!
//! Provides the [`Coordinates`] value type shared by incidents and
//! responders, and [`haversine_km`], the pure distance function used to
//! score every responder against an incident location.
//!
//! Range validation lives in [`Coordinates::new`]. The distance function
//! itself accepts any finite pair and never validates, since callers have
//! already checked their inputs at the boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Earth's mean radius in kilometers.
pub const EARTH_MEAN_RADIUS_KM: f64 = 6371.0;

/// A WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees, expected in `[-90, 90]`.
    pub latitude: f64,
    /// Longitude in degrees, expected in `[-180, 180]`.
    pub longitude: f64,
}

/// Error returned when a coordinate pair is outside the valid WGS84 range
/// or is not a finite number.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InvalidCoordinatesError {
    /// Latitude is NaN, infinite, or outside `[-90, 90]`.
    #[error("invalid latitude {value}: expected a finite value in [-90, 90]")]
    Latitude {
        /// The rejected latitude.
        value: f64,
    },
    /// Longitude is NaN, infinite, or outside `[-180, 180]`.
    #[error("invalid longitude {value}: expected a finite value in [-180, 180]")]
    Longitude {
        /// The rejected longitude.
        value: f64,
    },
}

impl Coordinates {
    /// Creates a validated coordinate pair.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinatesError`] if either component is not
    /// finite or falls outside its WGS84 range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinatesError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(InvalidCoordinatesError::Latitude { value: latitude });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidCoordinatesError::Longitude { value: longitude });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Creates a coordinate pair without range checks.
    ///
    /// Intended for values that were already validated (e.g. rows loaded
    /// back from storage).
    #[must_use]
    pub const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Distance in kilometers from `self` to `other`.
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        haversine_km(*self, *other)
    }
}

impl From<Coordinates> for geo::Point<f64> {
    fn from(c: Coordinates) -> Self {
        Self::new(c.longitude, c.latitude)
    }
}

impl From<geo::Point<f64>> for Coordinates {
    fn from(p: geo::Point<f64>) -> Self {
        Self::new_unchecked(p.y(), p.x())
    }
}

/// Great-circle surface distance in kilometers between two points, using
/// the haversine formula on a sphere of radius [`EARTH_MEAN_RADIUS_KM`].
///
/// Identical points yield exactly `0.0`. The intermediate term is clamped
/// to `[0, 1]` so rounding near antipodal points cannot produce `NaN`; the
/// maximum result is half the circumference (~20015 km).
#[must_use]
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let sin_lat = (d_lat / 2.0).sin();
    let sin_lon = (d_lon / 2.0).sin();

    let h = lat1
        .cos()
        .mul_add(lat2.cos() * sin_lon * sin_lon, sin_lat * sin_lat)
        .clamp(0.0, 1.0);

    2.0 * EARTH_MEAN_RADIUS_KM * h.sqrt().asin()
}
