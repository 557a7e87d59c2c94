//! Proximity endpoints: nearby shops and nearby active campaigns.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    ActiveCampaignsResponse, NearbyCampaignDto, NearbyQueryParams, NearbyShopDto,
    NearbyShopsResponse,
};
use crate::app_state::AppState;
use crate::domain::ProximityRequest;
use crate::error::{ErrorResponse, PinpointError};

/// `GET /shops/nearby`: Shops within a radius, nearest first.
///
/// # Errors
///
/// Returns [`PinpointError::InvalidArgument`] for missing or malformed
/// coordinates, or an internal error if the query fails.
#[utoipa::path(
    get,
    path = "/api/v1/shops/nearby",
    tag = "Proximity",
    summary = "Nearby shops",
    description = "Returns shops within `radius_m` meters (capped at 10000) of the given point, nearest first, each flagged with whether it has a campaign running right now.",
    params(NearbyQueryParams),
    responses(
        (status = 200, description = "Shops within radius", body = NearbyShopsResponse),
        (status = 400, description = "Missing or invalid coordinates", body = ErrorResponse),
        (status = 500, description = "Query failed", body = ErrorResponse),
    )
)]
pub async fn nearby_shops(
    State(state): State<AppState>,
    Query(params): Query<NearbyQueryParams>,
) -> Result<impl IntoResponse, PinpointError> {
    let request = parse_params(&params)?;
    let shops: Vec<NearbyShopDto> = state
        .proximity
        .nearby_shops(&request)
        .await?
        .into_iter()
        .map(NearbyShopDto::from)
        .collect();

    Ok(Json(NearbyShopsResponse {
        count: shops.len(),
        shops,
    }))
}

/// `GET /campaigns/active/nearby`: Running campaigns of nearby shops.
///
/// # Errors
///
/// Returns [`PinpointError::InvalidArgument`] for missing or malformed
/// coordinates, or an internal error if the query fails.
#[utoipa::path(
    get,
    path = "/api/v1/campaigns/active/nearby",
    tag = "Proximity",
    summary = "Active campaigns nearby",
    description = "Returns (shop, campaign) pairs where the campaign window contains the current instant and the shop is within `radius_m` meters, nearest first.",
    params(NearbyQueryParams),
    responses(
        (status = 200, description = "Active campaigns within radius", body = ActiveCampaignsResponse),
        (status = 400, description = "Missing or invalid coordinates", body = ErrorResponse),
        (status = 500, description = "Query failed", body = ErrorResponse),
    )
)]
pub async fn active_campaigns_nearby(
    State(state): State<AppState>,
    Query(params): Query<NearbyQueryParams>,
) -> Result<impl IntoResponse, PinpointError> {
    let request = parse_params(&params)?;
    let items: Vec<NearbyCampaignDto> = state
        .proximity
        .active_campaigns_nearby(&request)
        .await?
        .into_iter()
        .map(NearbyCampaignDto::from)
        .collect();

    Ok(Json(ActiveCampaignsResponse {
        count: items.len(),
        items,
    }))
}

fn parse_params(params: &NearbyQueryParams) -> Result<ProximityRequest, PinpointError> {
    ProximityRequest::parse(
        params.lat.as_deref(),
        params.lon.as_deref(),
        params.radius_m.as_deref(),
        params.limit.as_deref(),
    )
}

/// Proximity routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/shops/nearby", get(nearby_shops))
        .route("/campaigns/active/nearby", get(active_campaigns_nearby))
}
