//! Proximity search DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{CampaignDto, ShopDto, ShopProfileDto};
use crate::domain::{NearbyCampaign, NearbyShop};

/// Query parameters shared by both nearby endpoints.
///
/// Values are taken as raw strings so that a missing or non-numeric
/// coordinate produces a structured 400 rather than an extractor rejection.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NearbyQueryParams {
    /// Latitude of the search origin (required).
    #[serde(default)]
    pub lat: Option<String>,
    /// Longitude of the search origin (required).
    #[serde(default)]
    pub lon: Option<String>,
    /// Search radius in meters (default 10000, capped at 10000).
    #[serde(default, alias = "radius_meters")]
    pub radius_m: Option<String>,
    /// Maximum number of results (default 50).
    #[serde(default)]
    pub limit: Option<String>,
}

/// A shop in a nearby result.
///
/// `has_offer` is computed at query time: it is `true` exactly when a
/// campaign of the shop's owner is running now. The flag stored on the shop
/// is reported separately as `manual_has_offer`.
#[derive(Debug, Serialize, ToSchema)]
pub struct NearbyShopDto {
    /// Shop fields.
    #[serde(flatten)]
    pub shop: ShopProfileDto,
    /// Distance from the search origin in meters.
    pub distance_m: f64,
    /// Whether any campaign with the shop's owner is running right now.
    pub has_offer: bool,
    /// The shop's stored offer flag.
    pub manual_has_offer: bool,
}

impl From<NearbyShop> for NearbyShopDto {
    fn from(item: NearbyShop) -> Self {
        let (shop, manual_has_offer) = ShopProfileDto::split(item.shop);
        Self {
            shop,
            distance_m: item.distance_m,
            has_offer: item.has_active_campaign,
            manual_has_offer,
        }
    }
}

/// Response body for `GET /shops/nearby`.
#[derive(Debug, Serialize, ToSchema)]
pub struct NearbyShopsResponse {
    /// Number of shops returned.
    pub count: usize,
    /// Shops, nearest first.
    pub shops: Vec<NearbyShopDto>,
}

/// An active campaign with its shop.
#[derive(Debug, Serialize, ToSchema)]
pub struct NearbyCampaignDto {
    /// The shop running the campaign.
    pub shop: ShopDto,
    /// The campaign.
    pub campaign: CampaignDto,
    /// Distance from the search origin to the shop in meters.
    pub distance_m: f64,
}

impl From<NearbyCampaign> for NearbyCampaignDto {
    fn from(item: NearbyCampaign) -> Self {
        Self {
            shop: item.shop.into(),
            campaign: item.campaign.into(),
            distance_m: item.distance_m,
        }
    }
}

/// Response body for `GET /campaigns/active/nearby`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActiveCampaignsResponse {
    /// Number of items returned.
    pub count: usize,
    /// Campaign/shop pairs, nearest first.
    pub items: Vec<NearbyCampaignDto>,
}
