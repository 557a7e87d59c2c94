//! Shop records and their identifiers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// Database identifier of a shop.
///
/// Newtype over the `BIGSERIAL` primary key so shop IDs cannot be confused
/// with campaign IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShopId(i64);

impl ShopId {
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

impl fmt::Display for ShopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ShopId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A registered storefront.
///
/// `position` is either fully set or absent; a shop never carries a
/// latitude without a longitude.
#[derive(Debug, Clone, PartialEq)]
pub struct Shop {
    /// Primary key.
    pub id: ShopId,
    /// Opaque owner identifier, shared with the owner's campaigns.
    pub owner_uid: Option<String>,
    /// Display name.
    pub name: String,
    /// Free-form category (e.g. `"cafe"`).
    pub category: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Street address.
    pub address_line: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Geographic position, if known.
    pub position: Option<GeoPoint>,
    /// Business registration number.
    pub registration_no: Option<String>,
    /// Contact phone number.
    pub contact_number: Option<String>,
    /// Average spend per visit.
    pub avg_spend: Option<f64>,
    /// Manually maintained "has an offer" flag.
    pub has_offer: bool,
    /// Storefront image reference.
    pub image_url: Option<String>,
    /// Logo reference.
    pub logo_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when registering a shop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewShop {
    /// Opaque owner identifier.
    pub owner_uid: Option<String>,
    /// Display name (required, non-blank).
    pub name: String,
    /// Category.
    pub category: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Street address.
    pub address_line: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Initial position.
    pub position: Option<GeoPoint>,
    /// Business registration number.
    pub registration_no: Option<String>,
    /// Contact phone number.
    pub contact_number: Option<String>,
    /// Average spend per visit.
    pub avg_spend: Option<f64>,
    /// Manual offer flag.
    pub has_offer: bool,
    /// Storefront image reference.
    pub image_url: Option<String>,
    /// Logo reference.
    pub logo_url: Option<String>,
}

impl NewShop {
    /// Materializes the record with a store-assigned ID.
    #[must_use]
    pub fn into_shop(self, id: ShopId, now: DateTime<Utc>) -> Shop {
        Shop {
            id,
            owner_uid: self.owner_uid,
            name: self.name,
            category: self.category,
            description: self.description,
            address_line: self.address_line,
            city: self.city,
            position: self.position,
            registration_no: self.registration_no,
            contact_number: self.contact_number,
            avg_spend: self.avg_spend,
            has_offer: self.has_offer,
            image_url: self.image_url,
            logo_url: self.logo_url,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_shop_keeps_fields_and_stamps_times() {
        let now = Utc::now();
        let new = NewShop {
            owner_uid: Some("owner-1".to_string()),
            name: "Chai Point".to_string(),
            has_offer: true,
            ..NewShop::default()
        };
        let shop = new.into_shop(ShopId::new(7), now);
        assert_eq!(shop.id.get(), 7);
        assert_eq!(shop.owner_uid.as_deref(), Some("owner-1"));
        assert_eq!(shop.name, "Chai Point");
        assert!(shop.has_offer);
        assert_eq!(shop.created_at, now);
        assert_eq!(shop.updated_at, now);
    }

    #[test]
    fn shop_id_display() {
        assert_eq!(ShopId::from(15).to_string(), "15");
    }
}
