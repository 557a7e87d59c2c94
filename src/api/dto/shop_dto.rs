//! Shop DTOs for registration, lookup, and position updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Shop;

/// Shop fields shared by every shop rendering.
///
/// `lat`/`lon` are either both present or both `null`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShopProfileDto {
    /// Shop identifier.
    pub id: i64,
    /// Owner identifier.
    pub owner_uid: Option<String>,
    /// Display name.
    pub name: String,
    /// Category.
    pub category: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Street address.
    pub address_line: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Latitude in degrees.
    pub lat: Option<f64>,
    /// Longitude in degrees.
    pub lon: Option<f64>,
    /// Business registration number.
    pub registration_no: Option<String>,
    /// Contact phone number.
    pub contact_number: Option<String>,
    /// Average spend per visit.
    pub avg_spend: Option<f64>,
    /// Storefront image reference.
    pub image_url: Option<String>,
    /// Logo reference.
    pub logo_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ShopProfileDto {
    /// Splits a shop into its profile and its stored `has_offer` flag.
    #[must_use]
    pub fn split(shop: Shop) -> (Self, bool) {
        let profile = Self {
            id: shop.id.get(),
            owner_uid: shop.owner_uid,
            name: shop.name,
            category: shop.category,
            description: shop.description,
            address_line: shop.address_line,
            city: shop.city,
            lat: shop.position.map(|p| p.lat()),
            lon: shop.position.map(|p| p.lon()),
            registration_no: shop.registration_no,
            contact_number: shop.contact_number,
            avg_spend: shop.avg_spend,
            image_url: shop.image_url,
            logo_url: shop.logo_url,
            created_at: shop.created_at,
            updated_at: shop.updated_at,
        };
        (profile, shop.has_offer)
    }
}

/// Shop as returned by the shop and campaign endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShopDto {
    /// Shop fields.
    #[serde(flatten)]
    pub profile: ShopProfileDto,
    /// Manually maintained offer flag, as stored.
    pub has_offer: bool,
}

impl From<Shop> for ShopDto {
    fn from(shop: Shop) -> Self {
        let (profile, has_offer) = ShopProfileDto::split(shop);
        Self { profile, has_offer }
    }
}

/// Request body for `POST /shops`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateShopRequest {
    /// Owner identifier.
    #[serde(default)]
    pub owner_uid: Option<String>,
    /// Display name (required).
    #[serde(default)]
    pub name: Option<String>,
    /// Category.
    #[serde(default)]
    pub category: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Street address.
    #[serde(default)]
    pub address_line: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// Latitude; must be sent together with `lon`.
    #[serde(default)]
    pub lat: Option<f64>,
    /// Longitude; must be sent together with `lat`.
    #[serde(default)]
    pub lon: Option<f64>,
    /// Business registration number.
    #[serde(default)]
    pub registration_no: Option<String>,
    /// Contact phone number.
    #[serde(default)]
    pub contact_number: Option<String>,
    /// Average spend per visit.
    #[serde(default)]
    pub avg_spend: Option<f64>,
    /// Manual offer flag (defaults to `false`).
    #[serde(default)]
    pub has_offer: Option<bool>,
    /// Storefront image reference.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Logo reference.
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Response body for `POST /shops` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateShopResponse {
    /// Confirmation message.
    pub message: String,
    /// The stored shop.
    pub shop: ShopDto,
}

/// Request body for `PUT /shops/{id}/location`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLocationRequest {
    /// New latitude.
    pub lat: f64,
    /// New longitude.
    pub lon: f64,
}
