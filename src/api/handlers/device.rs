//! Device handlers: register, look up, list.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{CreateDeviceRequest, CreateDeviceResponse, DeviceDto, DeviceListResponse};
use crate::app_state::AppState;
use crate::domain::{ConnectionStatus, GeoPoint, NewDevice};
use crate::error::{ErrorResponse, PinpointError};

/// `POST /devices`: Register a device.
///
/// # Errors
///
/// Returns [`PinpointError::InvalidArgument`] on a missing uid, an unknown
/// `c_status`, or a half-specified position, and
/// [`PinpointError::DeviceAlreadyRegistered`] if the uid is taken.
#[utoipa::path(
    post,
    path = "/api/v1/devices",
    tag = "Devices",
    summary = "Register a device",
    request_body = CreateDeviceRequest,
    responses(
        (status = 201, description = "Device created", body = CreateDeviceResponse),
        (status = 400, description = "Invalid device data", body = ErrorResponse),
        (status = 409, description = "uid already registered", body = ErrorResponse),
    )
)]
pub async fn create_device(
    State(state): State<AppState>,
    Json(req): Json<CreateDeviceRequest>,
) -> Result<impl IntoResponse, PinpointError> {
    let new_device = parse_create_request(req)?;
    let device = state.devices.register_device(new_device).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateDeviceResponse {
            message: "Device created".to_string(),
            device: device.into(),
        }),
    ))
}

/// `GET /devices/{uid}`: Get a device by its uid.
///
/// # Errors
///
/// Returns [`PinpointError::DeviceNotFound`] if no device has that uid.
#[utoipa::path(
    get,
    path = "/api/v1/devices/{uid}",
    tag = "Devices",
    summary = "Get a device",
    params(
        ("uid" = String, Path, description = "Device uid"),
    ),
    responses(
        (status = 200, description = "Device details", body = DeviceDto),
        (status = 404, description = "Device not found", body = ErrorResponse),
    )
)]
pub async fn get_device(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<impl IntoResponse, PinpointError> {
    let device = state.devices.get_device(&uid).await?;
    Ok(Json(DeviceDto::from(device)))
}

/// `GET /devices`: List every registered device.
///
/// # Errors
///
/// Returns a server error if the store fails.
#[utoipa::path(
    get,
    path = "/api/v1/devices",
    tag = "Devices",
    summary = "List devices",
    responses(
        (status = 200, description = "Devices, newest first", body = DeviceListResponse),
    )
)]
pub async fn list_devices(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, PinpointError> {
    let devices: Vec<DeviceDto> = state
        .devices
        .list_devices()
        .await?
        .into_iter()
        .map(DeviceDto::from)
        .collect();

    Ok(Json(DeviceListResponse {
        count: devices.len(),
        devices,
    }))
}

/// Device routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/devices", post(create_device).get(list_devices))
        .route("/devices/{uid}", get(get_device))
}

// ── Request Parsing Helpers ─────────────────────────────────────────────

fn parse_create_request(req: CreateDeviceRequest) -> Result<NewDevice, PinpointError> {
    let uid = req
        .uid
        .ok_or_else(|| PinpointError::invalid("uid is required"))?;

    let position = match (req.lat, req.lon) {
        (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)?),
        (None, None) => None,
        _ => {
            return Err(PinpointError::invalid(
                "lat and lon must be provided together",
            ));
        }
    };

    let status = match req.c_status.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => raw.parse::<ConnectionStatus>()?,
        _ => ConnectionStatus::default(),
    };

    Ok(NewDevice {
        uid,
        phone_number: req.phone_number,
        position,
        status,
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn latitude_longitude_aliases_are_accepted() {
        let Ok(req) = serde_json::from_str::<CreateDeviceRequest>(
            r#"{"uid": "dev-1", "latitude": 12.9, "longitude": 77.6, "c_status": "connected_data"}"#,
        ) else {
            panic!("valid body rejected");
        };
        let Ok(device) = parse_create_request(req) else {
            panic!("valid request rejected");
        };
        assert!(device.position.is_some());
        assert_eq!(device.status, ConnectionStatus::ConnectedData);
    }

    #[test]
    fn half_position_and_bad_status_are_rejected() {
        let half = CreateDeviceRequest {
            uid: Some("dev-1".to_string()),
            lon: Some(77.6),
            ..CreateDeviceRequest::default()
        };
        assert!(parse_create_request(half).is_err());

        let bad_status = CreateDeviceRequest {
            uid: Some("dev-1".to_string()),
            c_status: Some("ONLINE".to_string()),
            ..CreateDeviceRequest::default()
        };
        assert!(matches!(
            parse_create_request(bad_status),
            Err(PinpointError::InvalidArgument(_))
        ));
    }
}
