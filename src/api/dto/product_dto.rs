//! Product catalog DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Product;

/// Product as rendered in every response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductDto {
    /// Product identifier.
    pub id: i64,
    /// Owner identifier.
    pub owner_uid: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Unit price.
    pub price: f64,
    /// Product image reference.
    pub image_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.get(),
            owner_uid: product.owner_uid,
            name: product.name,
            description: product.description,
            price: product.price,
            image_url: product.image_url,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Request body for `POST /products`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    /// Owner identifier (required).
    #[serde(default)]
    pub owner_uid: Option<String>,
    /// Display name (required).
    #[serde(default)]
    pub name: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price (defaults to 0, never negative).
    #[serde(default)]
    pub price: Option<f64>,
    /// Product image reference.
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Response body for `POST /products` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateProductResponse {
    /// Confirmation message.
    pub message: String,
    /// The stored product.
    pub product: ProductDto,
}

/// Response body for `GET /products/{id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    /// The product.
    pub product: ProductDto,
}

/// Request body for `PUT`/`PATCH /products/{id}`.
///
/// Absent fields are left untouched. `description` and `image_url` may be
/// sent as `null` to clear them.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    /// Acting owner. When given it must own the product.
    #[serde(default)]
    pub owner_uid: Option<String>,
    /// New name. Blank values are ignored.
    #[serde(default)]
    pub name: Option<String>,
    /// New description, or `null` to clear it.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    /// New unit price.
    #[serde(default)]
    pub price: Option<f64>,
    /// New image reference, or `null` to clear it.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub image_url: Option<Option<String>>,
}

/// Response body for a successful product update.
#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateProductResponse {
    /// Confirmation message.
    pub message: String,
    /// The stored product after the update.
    pub product: ProductDto,
}

/// Query parameters for `GET /products`.
///
/// Kept as raw strings so malformed paging values produce a structured 400.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// Owner whose catalog to list (required).
    #[serde(default)]
    pub owner_uid: Option<String>,
    /// Case-insensitive text matched against name and description.
    #[serde(default)]
    pub q: Option<String>,
    /// Page size (default 50, capped at 500).
    #[serde(default)]
    pub limit: Option<String>,
    /// Number of matches to skip (default 0).
    #[serde(default)]
    pub offset: Option<String>,
}

/// Response body for `GET /products`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductListResponse {
    /// Number of products matching the query across all pages.
    pub count: u64,
    /// The requested page, newest first.
    pub products: Vec<ProductDto>,
}

/// Query parameters for `DELETE /products/{id}`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OwnerQuery {
    /// Acting owner. When given it must own the product.
    #[serde(default)]
    pub owner_uid: Option<String>,
}

/// Bare confirmation body.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Confirmation message.
    pub message: String,
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field
/// (`None`, via `#[serde(default)]`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
