//! Shop handlers: register, get, update location.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::dto::{CreateShopRequest, CreateShopResponse, ShopDto, UpdateLocationRequest};
use crate::app_state::AppState;
use crate::domain::{GeoPoint, NewShop, ShopId};
use crate::error::{ErrorResponse, PinpointError};

/// `POST /shops`: Register a shop.
///
/// # Errors
///
/// Returns [`PinpointError::InvalidArgument`] on a missing name or a
/// half-specified position.
#[utoipa::path(
    post,
    path = "/api/v1/shops",
    tag = "Shops",
    summary = "Register a shop",
    description = "Creates a shop. `lat` and `lon` are optional but must be sent together.",
    request_body = CreateShopRequest,
    responses(
        (status = 201, description = "Shop created", body = CreateShopResponse),
        (status = 400, description = "Invalid shop data", body = ErrorResponse),
    )
)]
pub async fn create_shop(
    State(state): State<AppState>,
    Json(req): Json<CreateShopRequest>,
) -> Result<impl IntoResponse, PinpointError> {
    let new_shop = parse_create_request(req)?;
    let shop = state.shops.register_shop(new_shop).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateShopResponse {
            message: "Shop created".to_string(),
            shop: shop.into(),
        }),
    ))
}

/// `GET /shops/{id}`: Get a shop.
///
/// # Errors
///
/// Returns [`PinpointError::ShopNotFound`] if the shop does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/shops/{id}",
    tag = "Shops",
    summary = "Get shop details",
    params(
        ("id" = i64, Path, description = "Shop ID"),
    ),
    responses(
        (status = 200, description = "Shop details", body = ShopDto),
        (status = 404, description = "Shop not found", body = ErrorResponse),
    )
)]
pub async fn get_shop(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, PinpointError> {
    let shop = state.shops.get_shop(ShopId::new(id)).await?;
    Ok(Json(ShopDto::from(shop)))
}

/// `PUT /shops/{id}/location`: Replace a shop's position.
///
/// # Errors
///
/// Returns [`PinpointError::InvalidArgument`] for out-of-range coordinates
/// or [`PinpointError::ShopNotFound`] if the shop does not exist.
#[utoipa::path(
    put,
    path = "/api/v1/shops/{id}/location",
    tag = "Shops",
    summary = "Update shop location",
    description = "Moves a shop, e.g. when a mobile or pop-up shop syncs its device location.",
    params(
        ("id" = i64, Path, description = "Shop ID"),
    ),
    request_body = UpdateLocationRequest,
    responses(
        (status = 200, description = "Updated shop", body = ShopDto),
        (status = 400, description = "Invalid coordinates", body = ErrorResponse),
        (status = 404, description = "Shop not found", body = ErrorResponse),
    )
)]
pub async fn update_shop_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateLocationRequest>,
) -> Result<impl IntoResponse, PinpointError> {
    let position = GeoPoint::new(req.lat, req.lon)?;
    let shop = state
        .shops
        .update_shop_position(ShopId::new(id), position)
        .await?;
    Ok(Json(ShopDto::from(shop)))
}

/// Shop routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/shops", post(create_shop))
        .route("/shops/{id}", get(get_shop))
        .route("/shops/{id}/location", put(update_shop_location))
}

// ── Request Parsing Helpers ─────────────────────────────────────────────

/// Converts the request body into a [`NewShop`].
///
/// # Errors
///
/// Returns [`PinpointError::InvalidArgument`] if the name is missing or only
/// one of `lat`/`lon` is given.
fn parse_create_request(req: CreateShopRequest) -> Result<NewShop, PinpointError> {
    let name = req
        .name
        .ok_or_else(|| PinpointError::invalid("shop name is required"))?;

    let position = match (req.lat, req.lon) {
        (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)?),
        (None, None) => None,
        _ => {
            return Err(PinpointError::invalid(
                "lat and lon must be provided together",
            ));
        }
    };

    Ok(NewShop {
        owner_uid: req.owner_uid,
        name,
        category: req.category,
        description: req.description,
        address_line: req.address_line,
        city: req.city,
        position,
        registration_no: req.registration_no,
        contact_number: req.contact_number,
        avg_spend: req.avg_spend,
        has_offer: req.has_offer.unwrap_or(false),
        image_url: req.image_url,
        logo_url: req.logo_url,
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn half_position_is_rejected() {
        let req = CreateShopRequest {
            name: Some("Stall".to_string()),
            lat: Some(12.0),
            ..CreateShopRequest::default()
        };
        assert!(matches!(
            parse_create_request(req),
            Err(PinpointError::InvalidArgument(_))
        ));
    }

    #[test]
    fn missing_name_is_rejected() {
        let req = CreateShopRequest::default();
        assert!(parse_create_request(req).is_err());
    }

    #[test]
    fn full_request_maps_every_field() {
        let req = CreateShopRequest {
            owner_uid: Some("owner-9".to_string()),
            name: Some("Book Nook".to_string()),
            city: Some("Mysuru".to_string()),
            lat: Some(12.3),
            lon: Some(76.6),
            has_offer: Some(true),
            ..CreateShopRequest::default()
        };
        let Ok(shop) = parse_create_request(req) else {
            panic!("valid request rejected");
        };
        assert_eq!(shop.name, "Book Nook");
        assert_eq!(shop.city.as_deref(), Some("Mysuru"));
        assert!(shop.has_offer);
        assert!(shop.position.is_some());
    }
}
