//! Validated geographic position in decimal degrees.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PinpointError;

/// A point on the earth's surface (WGS84 decimal degrees).
///
/// Construction through [`GeoPoint::new`] guarantees both coordinates are
/// finite and within range, so distance computations never see `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    /// Creates a point from latitude and longitude.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::InvalidArgument`] if either coordinate is
    /// non-finite, latitude is outside `[-90, 90]`, or longitude is outside
    /// `[-180, 180]`.
    pub fn new(lat: f64, lon: f64) -> Result<Self, PinpointError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(PinpointError::invalid(
                "lat and lon must be finite numbers",
            ));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(PinpointError::invalid(format!(
                "lat must be between -90 and 90, got {lat}"
            )));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(PinpointError::invalid(format!(
                "lon must be between -180 and 180, got {lon}"
            )));
        }
        Ok(Self { lat, lon })
    }

    /// Builds a position from two nullable columns.
    ///
    /// Yields `None` unless both values are present and valid, so a row with
    /// a half-set position is treated as having no position at all.
    #[must_use]
    pub fn from_columns(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        match (lat, lon) {
            (Some(lat), Some(lon)) => Self::new(lat, lon).ok(),
            _ => None,
        }
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn lon(&self) -> f64 {
        self.lon
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_coordinates() {
        let Ok(p) = GeoPoint::new(12.97, 77.59) else {
            panic!("valid point rejected");
        };
        assert!((p.lat() - 12.97).abs() < f64::EPSILON);
        assert!((p.lon() - 77.59).abs() < f64::EPSILON);
    }

    #[test]
    fn accepts_boundaries() {
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(GeoPoint::new(90.5, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -180.01).is_err());
    }

    #[test]
    fn rejects_non_finite() {
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn half_set_columns_yield_no_position() {
        assert!(GeoPoint::from_columns(Some(1.0), None).is_none());
        assert!(GeoPoint::from_columns(None, Some(1.0)).is_none());
        assert!(GeoPoint::from_columns(None, None).is_none());
        assert!(GeoPoint::from_columns(Some(1.0), Some(2.0)).is_some());
    }
}
