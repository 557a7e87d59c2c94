//! Campaign handlers: create and list by owner.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::api::dto::{
    CampaignDto, CampaignListQuery, CampaignListResponse, CreateCampaignRequest,
    CreateCampaignResponse,
};
use crate::app_state::AppState;
use crate::domain::NewCampaign;
use crate::error::{ErrorResponse, PinpointError};

/// Offset-less layouts accepted for campaign timestamps, read as UTC.
const NAIVE_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// `POST /campaigns`: Create a campaign.
///
/// # Errors
///
/// Returns [`PinpointError::InvalidArgument`] on missing fields, bad
/// timestamps, a non-positive radius, or an inverted window.
#[utoipa::path(
    post,
    path = "/api/v1/campaigns",
    tag = "Campaigns",
    summary = "Create a campaign",
    description = "Creates a time-bounded campaign for the owner. The campaign is linked to shops through `owner_uid`; no shop needs to exist yet.",
    request_body = CreateCampaignRequest,
    responses(
        (status = 201, description = "Campaign created", body = CreateCampaignResponse),
        (status = 400, description = "Invalid campaign data", body = ErrorResponse),
    )
)]
pub async fn create_campaign(
    State(state): State<AppState>,
    Json(req): Json<CreateCampaignRequest>,
) -> Result<impl IntoResponse, PinpointError> {
    let new_campaign = parse_create_request(req)?;
    let campaign = state.shops.create_campaign(new_campaign).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateCampaignResponse {
            message: "Campaign created successfully".to_string(),
            campaign: campaign.into(),
        }),
    ))
}

/// `GET /campaigns?owner_uid=`: List an owner's campaigns.
///
/// # Errors
///
/// Returns [`PinpointError::InvalidArgument`] if `owner_uid` is missing.
#[utoipa::path(
    get,
    path = "/api/v1/campaigns",
    tag = "Campaigns",
    summary = "List campaigns",
    description = "Returns every campaign of the given owner, newest first, regardless of its window.",
    params(CampaignListQuery),
    responses(
        (status = 200, description = "Owner's campaigns", body = CampaignListResponse),
        (status = 400, description = "Missing owner_uid", body = ErrorResponse),
    )
)]
pub async fn list_campaigns(
    State(state): State<AppState>,
    Query(query): Query<CampaignListQuery>,
) -> Result<impl IntoResponse, PinpointError> {
    let owner_uid = query
        .owner_uid
        .ok_or_else(|| PinpointError::invalid("owner_uid query parameter is required"))?;
    let campaigns: Vec<CampaignDto> = state
        .shops
        .list_campaigns(&owner_uid)
        .await?
        .into_iter()
        .map(CampaignDto::from)
        .collect();

    Ok(Json(CampaignListResponse {
        count: campaigns.len(),
        campaigns,
    }))
}

/// Campaign routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/campaigns", post(create_campaign).get(list_campaigns))
}

// ── Request Parsing Helpers ─────────────────────────────────────────────

fn parse_create_request(req: CreateCampaignRequest) -> Result<NewCampaign, PinpointError> {
    let (Some(owner_uid), Some(title), Some(offer), Some(radius_km), Some(start), Some(end)) = (
        req.owner_uid,
        req.title,
        req.offer,
        req.radius_km,
        req.start,
        req.end,
    ) else {
        return Err(PinpointError::invalid(
            "owner_uid, title, offer, radius_km, start and end are required",
        ));
    };

    Ok(NewCampaign {
        owner_uid,
        title,
        offer,
        radius_km,
        start: parse_timestamp("start", &start)?,
        end: parse_timestamp("end", &end)?,
        poster_path: req.poster_path,
        active: req.active.unwrap_or(true),
    })
}

/// Parses an RFC 3339 timestamp, or an offset-less ISO 8601 one as UTC.
///
/// # Errors
///
/// Returns [`PinpointError::InvalidArgument`] if no accepted layout matches.
fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>, PinpointError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            PinpointError::invalid(format!("{field} must be an ISO 8601 timestamp, got {raw:?}"))
        })
}
