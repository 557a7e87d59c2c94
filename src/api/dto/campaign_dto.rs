//! Campaign DTOs for creation and listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Campaign;

/// Campaign as rendered in every response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CampaignDto {
    /// Campaign identifier.
    pub id: i64,
    /// Owner identifier shared with the owning shop.
    pub owner_uid: String,
    /// Headline.
    pub title: String,
    /// Offer text.
    pub offer: String,
    /// Promotional radius in kilometers.
    pub radius_km: f64,
    /// Window start (UTC, inclusive).
    pub start: DateTime<Utc>,
    /// Window end (UTC, inclusive).
    pub end: DateTime<Utc>,
    /// Poster asset reference.
    pub poster_path: Option<String>,
    /// Manual activation flag.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Campaign> for CampaignDto {
    fn from(campaign: Campaign) -> Self {
        Self {
            id: campaign.id.get(),
            owner_uid: campaign.owner_uid,
            title: campaign.title,
            offer: campaign.offer,
            radius_km: campaign.radius_km,
            start: campaign.start,
            end: campaign.end,
            poster_path: campaign.poster_path,
            active: campaign.active,
            created_at: campaign.created_at,
        }
    }
}

/// Request body for `POST /campaigns`.
///
/// `start` and `end` accept RFC 3339 or offset-less ISO 8601 timestamps;
/// the latter are read as UTC.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateCampaignRequest {
    /// Owner identifier (required).
    #[serde(default)]
    pub owner_uid: Option<String>,
    /// Headline (required).
    #[serde(default)]
    pub title: Option<String>,
    /// Offer text (required).
    #[serde(default)]
    pub offer: Option<String>,
    /// Promotional radius in kilometers (required, > 0).
    #[serde(default)]
    pub radius_km: Option<f64>,
    /// Window start (required).
    #[serde(default)]
    pub start: Option<String>,
    /// Window end (required).
    #[serde(default)]
    pub end: Option<String>,
    /// Poster asset reference.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Manual activation flag (defaults to `true`).
    #[serde(default)]
    pub active: Option<bool>,
}

/// Response body for `POST /campaigns` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateCampaignResponse {
    /// Confirmation message.
    pub message: String,
    /// The stored campaign.
    pub campaign: CampaignDto,
}

/// Query parameters for `GET /campaigns`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CampaignListQuery {
    /// Owner whose campaigns to list.
    #[serde(default)]
    pub owner_uid: Option<String>,
}

/// Response body for `GET /campaigns`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CampaignListResponse {
    /// Number of campaigns returned.
    pub count: usize,
    /// Campaigns, newest first.
    pub campaigns: Vec<CampaignDto>,
}
