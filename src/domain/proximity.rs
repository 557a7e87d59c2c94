//! Proximity query parameters and annotated results.

use super::{Campaign, GeoPoint, Shop};
use crate::error::PinpointError;

/// Radius used when the caller supplies none, in meters.
pub const DEFAULT_RADIUS_M: f64 = 10_000.0;

/// Hard safety cap on the search radius, in meters. Larger requests are
/// silently clamped.
pub const MAX_RADIUS_M: f64 = 10_000.0;

/// Result count used when the caller supplies none.
pub const DEFAULT_LIMIT: u32 = 50;

/// Upper bound on the result count.
pub const MAX_LIMIT: u32 = 500;

/// A validated proximity search: origin, radius, and result cap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityRequest {
    origin: GeoPoint,
    radius_m: f64,
    limit: u32,
}

impl ProximityRequest {
    /// Builds a request from typed values, applying defaults and caps.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::InvalidArgument`] if the radius is negative
    /// or non-finite.
    pub fn new(
        origin: GeoPoint,
        radius_m: Option<f64>,
        limit: Option<u32>,
    ) -> Result<Self, PinpointError> {
        let radius_m = radius_m.unwrap_or(DEFAULT_RADIUS_M);
        if !radius_m.is_finite() || radius_m < 0.0 {
            return Err(PinpointError::invalid(
                "radius_m must be a non-negative number",
            ));
        }
        Ok(Self {
            origin,
            radius_m: radius_m.min(MAX_RADIUS_M),
            limit: limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
        })
    }

    /// Parses raw query-string values.
    ///
    /// `lat` and `lon` are required; blank optional values fall back to
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::InvalidArgument`] if a coordinate is missing
    /// or not numeric, or if radius/limit are malformed.
    pub fn parse(
        lat: Option<&str>,
        lon: Option<&str>,
        radius_m: Option<&str>,
        limit: Option<&str>,
    ) -> Result<Self, PinpointError> {
        let lat = required_number("lat", lat)?;
        let lon = required_number("lon", lon)?;
        let origin = GeoPoint::new(lat, lon)?;

        let radius_m = match non_blank(radius_m) {
            Some(raw) => Some(raw.parse::<f64>().map_err(|_| {
                PinpointError::invalid(format!("radius_m must be numeric, got {raw:?}"))
            })?),
            None => None,
        };
        let limit = match non_blank(limit) {
            Some(raw) => Some(raw.parse::<u32>().map_err(|_| {
                PinpointError::invalid(format!(
                    "limit must be a non-negative integer, got {raw:?}"
                ))
            })?),
            None => None,
        };

        Self::new(origin, radius_m, limit)
    }

    /// Query origin.
    #[must_use]
    pub const fn origin(&self) -> &GeoPoint {
        &self.origin
    }

    /// Effective radius in meters, already clamped.
    #[must_use]
    pub const fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Maximum number of results.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn required_number(name: &str, raw: Option<&str>) -> Result<f64, PinpointError> {
    let raw = non_blank(raw).ok_or_else(|| {
        PinpointError::invalid(format!("{name} query parameter is required"))
    })?;
    let value: f64 = raw
        .parse()
        .map_err(|_| PinpointError::invalid(format!("{name} must be numeric, got {raw:?}")))?;
    if !value.is_finite() {
        return Err(PinpointError::invalid(format!("{name} must be finite")));
    }
    Ok(value)
}

/// A shop within range of a query origin.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyShop {
    /// The shop record.
    pub shop: Shop,
    /// Distance from the origin under the executed strategy, in meters.
    pub distance_m: f64,
    /// Whether any campaign with the shop's `owner_uid` is active now.
    pub has_active_campaign: bool,
}

/// An active campaign paired with its nearby shop.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyCampaign {
    /// The shop sharing the campaign's `owner_uid`.
    pub shop: Shop,
    /// The active campaign.
    pub campaign: Campaign,
    /// Distance from the origin to the shop, in meters.
    pub distance_m: f64,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn parse_ok(
        lat: Option<&str>,
        lon: Option<&str>,
        radius: Option<&str>,
        limit: Option<&str>,
    ) -> ProximityRequest {
        let Ok(req) = ProximityRequest::parse(lat, lon, radius, limit) else {
            panic!("expected valid request");
        };
        req
    }

    #[test]
    fn applies_defaults() {
        let req = parse_ok(Some("12.97"), Some("77.59"), None, None);
        assert!((req.radius_m() - DEFAULT_RADIUS_M).abs() < f64::EPSILON);
        assert_eq!(req.limit(), DEFAULT_LIMIT);
        assert!((req.origin().lat() - 12.97).abs() < f64::EPSILON);
    }

    #[test]
    fn clamps_radius_to_cap() {
        let req = parse_ok(Some("12.97"), Some("77.59"), Some("50000"), None);
        assert!((req.radius_m() - MAX_RADIUS_M).abs() < f64::EPSILON);
    }

    #[test]
    fn caps_limit() {
        let req = parse_ok(Some("0"), Some("0"), None, Some("100000"));
        assert_eq!(req.limit(), MAX_LIMIT);
    }

    #[test]
    fn blank_optionals_use_defaults() {
        let req = parse_ok(Some("0"), Some("0"), Some(""), Some(" "));
        assert_eq!(req.limit(), DEFAULT_LIMIT);
        assert!((req.radius_m() - DEFAULT_RADIUS_M).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_coordinates_are_rejected() {
        assert!(ProximityRequest::parse(None, Some("77.59"), None, None).is_err());
        assert!(ProximityRequest::parse(Some("12.97"), None, None, None).is_err());
        assert!(ProximityRequest::parse(Some(""), Some("77.59"), None, None).is_err());
    }

    #[test]
    fn non_numeric_coordinates_are_rejected() {
        let Err(err) = ProximityRequest::parse(Some("north"), Some("77.59"), None, None) else {
            panic!("expected error");
        };
        assert!(matches!(err, PinpointError::InvalidArgument(_)));
        assert!(ProximityRequest::parse(Some("NaN"), Some("77.59"), None, None).is_err());
        assert!(ProximityRequest::parse(Some("inf"), Some("77.59"), None, None).is_err());
    }

    #[test]
    fn negative_radius_is_rejected() {
        assert!(ProximityRequest::parse(Some("0"), Some("0"), Some("-5"), None).is_err());
    }

    #[test]
    fn malformed_limit_is_rejected() {
        assert!(ProximityRequest::parse(Some("0"), Some("0"), None, Some("-1")).is_err());
        assert!(ProximityRequest::parse(Some("0"), Some("0"), None, Some("ten")).is_err());
    }
}
