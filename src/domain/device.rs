//! Registered owner devices and their connectivity state.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::GeoPoint;
use crate::error::PinpointError;

/// Database identifier of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(i64);

impl DeviceId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }
}

/// How a device is currently reachable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    /// Online over mobile data or Wi-Fi.
    ConnectedData,
    /// Reachable by SMS only.
    ConnectedSms,
    /// Not reachable.
    #[default]
    NotConnected,
}

impl ConnectionStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 3] = [Self::ConnectedData, Self::ConnectedSms, Self::NotConnected];

    /// Wire and column representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectedData => "CONNECTED_DATA",
            Self::ConnectedSms => "CONNECTED_SMS",
            Self::NotConnected => "NOT_CONNECTED",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionStatus {
    type Err = PinpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                PinpointError::invalid(format!(
                    "c_status must be one of CONNECTED_DATA, CONNECTED_SMS, NOT_CONNECTED, got {s:?}"
                ))
            })
    }
}

/// A phone or tablet an owner registered, e.g. the one a mobile stall uses
/// to report its location.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    /// Primary key.
    pub id: DeviceId,
    /// Unique device identifier chosen by the client.
    pub uid: String,
    /// Phone number for SMS reachability.
    pub phone_number: Option<String>,
    /// Last reported position, if any.
    pub position: Option<GeoPoint>,
    /// Connectivity state.
    pub status: ConnectionStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when registering a device.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewDevice {
    /// Unique device identifier (required, non-blank).
    pub uid: String,
    /// Phone number.
    pub phone_number: Option<String>,
    /// Initial position.
    pub position: Option<GeoPoint>,
    /// Connectivity state.
    pub status: ConnectionStatus,
}

impl NewDevice {
    /// Materializes the record with a store-assigned ID.
    #[must_use]
    pub fn into_device(self, id: DeviceId, now: DateTime<Utc>) -> Device {
        Device {
            id,
            uid: self.uid,
            phone_number: self.phone_number,
            position: self.position,
            status: self.status,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(
            "connected_sms".parse::<ConnectionStatus>().ok(),
            Some(ConnectionStatus::ConnectedSms)
        );
        assert_eq!(
            " CONNECTED_DATA ".parse::<ConnectionStatus>().ok(),
            Some(ConnectionStatus::ConnectedData)
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        let result = "ONLINE".parse::<ConnectionStatus>();
        assert!(matches!(result, Err(PinpointError::InvalidArgument(_))));
    }

    #[test]
    fn status_defaults_to_not_connected() {
        assert_eq!(ConnectionStatus::default(), ConnectionStatus::NotConnected);
        assert_eq!(ConnectionStatus::default().to_string(), "NOT_CONNECTED");
    }

    #[test]
    fn serde_uses_column_spelling() {
        for status in ConnectionStatus::ALL {
            let json = serde_json::to_string(&status).unwrap_or_default();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }
}
