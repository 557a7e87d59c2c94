//! Device registry DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ConnectionStatus, Device};

/// Device as rendered in every response.
///
/// `lat`/`lon` are either both present or both `null`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeviceDto {
    /// Device identifier.
    pub id: i64,
    /// Unique device identifier chosen by the client.
    pub uid: String,
    /// Phone number.
    pub phone_number: Option<String>,
    /// Latitude in degrees.
    pub lat: Option<f64>,
    /// Longitude in degrees.
    pub lon: Option<f64>,
    /// Connectivity state.
    pub c_status: ConnectionStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<Device> for DeviceDto {
    fn from(device: Device) -> Self {
        Self {
            id: device.id.get(),
            uid: device.uid,
            phone_number: device.phone_number,
            lat: device.position.map(|p| p.lat()),
            lon: device.position.map(|p| p.lon()),
            c_status: device.status,
            created_at: device.created_at,
            updated_at: device.updated_at,
        }
    }
}

/// Request body for `POST /devices`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateDeviceRequest {
    /// Unique device identifier (required).
    #[serde(default)]
    pub uid: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Latitude (must be sent together with `lon`).
    #[serde(default, alias = "latitude")]
    pub lat: Option<f64>,
    /// Longitude (must be sent together with `lat`).
    #[serde(default, alias = "longitude")]
    pub lon: Option<f64>,
    /// `CONNECTED_DATA`, `CONNECTED_SMS` or `NOT_CONNECTED` (default).
    #[serde(default)]
    pub c_status: Option<String>,
}

/// Response body for `POST /devices` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateDeviceResponse {
    /// Confirmation message.
    pub message: String,
    /// The stored device.
    pub device: DeviceDto,
}

/// Response body for `GET /devices`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeviceListResponse {
    /// Number of devices returned.
    pub count: usize,
    /// Devices, newest first.
    pub devices: Vec<DeviceDto>,
}
