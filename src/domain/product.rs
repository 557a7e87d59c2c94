//! Owner-scoped product catalog records and list queries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PinpointError;

/// Page size used when the caller supplies none.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Upper bound on the page size.
pub const MAX_PAGE_SIZE: u32 = 500;

/// Database identifier of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

impl ProductId {
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

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An item in a shop owner's catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Primary key.
    pub id: ProductId,
    /// Owner identifier, the same one shops and campaigns carry.
    pub owner_uid: String,
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: Option<String>,
    /// Unit price, never negative.
    pub price: f64,
    /// Product image reference.
    pub image_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewProduct {
    /// Owner identifier (required, non-blank).
    pub owner_uid: String,
    /// Display name (required, non-blank).
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Unit price.
    pub price: f64,
    /// Product image reference.
    pub image_url: Option<String>,
}

impl NewProduct {
    /// Materializes the record with a store-assigned ID.
    #[must_use]
    pub fn into_product(self, id: ProductId, now: DateTime<Utc>) -> Product {
        Product {
            id,
            owner_uid: self.owner_uid,
            name: self.name,
            description: self.description,
            price: self.price,
            image_url: self.image_url,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a product.
///
/// `None` leaves a field untouched. For the nullable fields,
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    /// New name.
    pub name: Option<String>,
    /// New description, or `Some(None)` to clear it.
    pub description: Option<Option<String>>,
    /// New price.
    pub price: Option<f64>,
    /// New image reference, or `Some(None)` to clear it.
    pub image_url: Option<Option<String>>,
}

impl ProductPatch {
    /// Writes the set fields onto `product` and bumps `updated_at`.
    pub fn apply(self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(image_url) = self.image_url {
            product.image_url = image_url;
        }
        product.updated_at = now;
    }
}

/// A validated catalog listing: one owner, an optional text filter, and a
/// page window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    owner_uid: String,
    search: Option<String>,
    limit: u32,
    offset: u32,
}

impl ProductQuery {
    /// Parses raw query-string values.
    ///
    /// A blank search term means no filter. A limit above
    /// [`MAX_PAGE_SIZE`] is clamped.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::InvalidArgument`] if `owner_uid` is missing
    /// or `limit`/`offset` are not non-negative integers.
    pub fn parse(
        owner_uid: Option<&str>,
        search: Option<&str>,
        limit: Option<&str>,
        offset: Option<&str>,
    ) -> Result<Self, PinpointError> {
        let owner_uid = non_blank(owner_uid)
            .ok_or_else(|| PinpointError::invalid("owner_uid is required"))?;
        Ok(Self {
            owner_uid: owner_uid.to_string(),
            search: non_blank(search).map(str::to_string),
            limit: parse_count("limit", limit)?
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .min(MAX_PAGE_SIZE),
            offset: parse_count("offset", offset)?.unwrap_or(0),
        })
    }

    /// Owner whose catalog is listed.
    #[must_use]
    pub fn owner_uid(&self) -> &str {
        &self.owner_uid
    }

    /// Case-insensitive substring matched against name and description.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of matching products skipped before the page starts.
    #[must_use]
    pub const fn offset(&self) -> u32 {
        self.offset
    }

    /// Whether `product` belongs to this listing, ignoring the page window.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if product.owner_uid != self.owner_uid {
            return false;
        }
        let Some(search) = &self.search else {
            return true;
        };
        let needle = search.to_lowercase();
        product.name.to_lowercase().contains(&needle)
            || product
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }
}

/// One page of a catalog listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
    /// Number of products matching the query across all pages.
    pub total: u64,
    /// The requested page, newest first.
    pub products: Vec<Product>,
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_count(name: &str, raw: Option<&str>) -> Result<Option<u32>, PinpointError> {
    non_blank(raw)
        .map(|raw| {
            raw.parse::<u32>().map_err(|_| {
                PinpointError::invalid(format!("{name} must be a non-negative integer, got {raw:?}"))
            })
        })
        .transpose()
}
