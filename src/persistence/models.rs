//! Database row types for shops, campaigns, products, and devices.
//!
//! Rows mirror the table columns one-to-one and are converted into domain
//! records here, at the storage boundary. Nullable coordinates become an
//! `Option<GeoPoint>` that is only `Some` when both halves are valid.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::{
    Campaign, CampaignId, ConnectionStatus, Device, DeviceId, GeoPoint, NearbyCampaign,
    NearbyShop, Product, ProductId, Shop, ShopId,
};
use crate::error::PinpointError;

/// A row from the `shops` table.
#[derive(Debug, Clone, FromRow)]
pub struct ShopRow {
    /// Primary key.
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
    /// Manual offer flag.
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

impl From<ShopRow> for Shop {
    fn from(row: ShopRow) -> Self {
        Self {
            id: ShopId::new(row.id),
            owner_uid: row.owner_uid,
            name: row.name,
            category: row.category,
            description: row.description,
            address_line: row.address_line,
            city: row.city,
            position: GeoPoint::from_columns(row.lat, row.lon),
            registration_no: row.registration_no,
            contact_number: row.contact_number,
            avg_spend: row.avg_spend,
            has_offer: row.has_offer,
            image_url: row.image_url,
            logo_url: row.logo_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A row from the `campaigns` table.
#[derive(Debug, Clone, FromRow)]
pub struct CampaignRow {
    /// Primary key.
    pub id: i64,
    /// Owner identifier.
    pub owner_uid: String,
    /// Headline.
    pub title: String,
    /// Offer text.
    pub offer: String,
    /// Promotional radius in kilometers.
    pub radius_km: f64,
    /// Window start.
    pub start_at: DateTime<Utc>,
    /// Window end.
    pub end_at: DateTime<Utc>,
    /// Poster asset reference.
    pub poster_path: Option<String>,
    /// Manual activation flag.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<CampaignRow> for Campaign {
    fn from(row: CampaignRow) -> Self {
        Self {
            id: CampaignId::new(row.id),
            owner_uid: row.owner_uid,
            title: row.title,
            offer: row.offer,
            radius_km: row.radius_km,
            start: row.start_at,
            end: row.end_at,
            poster_path: row.poster_path,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

/// Result row of the nearby-shops query.
#[derive(Debug, Clone, FromRow)]
pub struct NearbyShopRow {
    /// Shop columns.
    #[sqlx(flatten)]
    pub shop: ShopRow,
    /// Distance computed by the executed strategy.
    pub distance_m: f64,
    /// Any campaign with the same owner is active at query time.
    pub has_active_campaign: bool,
}

impl From<NearbyShopRow> for NearbyShop {
    fn from(row: NearbyShopRow) -> Self {
        Self {
            shop: row.shop.into(),
            distance_m: row.distance_m,
            has_active_campaign: row.has_active_campaign,
        }
    }
}

/// Result row of the active-campaigns query. Campaign columns carry a
/// `campaign_` prefix to avoid clashing with shop columns.
#[derive(Debug, Clone, FromRow)]
pub struct NearbyCampaignRow {
    /// Shop columns.
    #[sqlx(flatten)]
    pub shop: ShopRow,
    /// Distance computed by the executed strategy.
    pub distance_m: f64,
    /// Campaign primary key.
    pub campaign_id: i64,
    /// Campaign owner identifier.
    pub campaign_owner_uid: String,
    /// Campaign headline.
    pub campaign_title: String,
    /// Campaign offer text.
    pub campaign_offer: String,
    /// Campaign radius in kilometers.
    pub campaign_radius_km: f64,
    /// Campaign window start.
    pub campaign_start_at: DateTime<Utc>,
    /// Campaign window end.
    pub campaign_end_at: DateTime<Utc>,
    /// Campaign poster reference.
    pub campaign_poster_path: Option<String>,
    /// Campaign manual flag.
    pub campaign_active: bool,
    /// Campaign creation timestamp.
    pub campaign_created_at: DateTime<Utc>,
}

impl From<NearbyCampaignRow> for NearbyCampaign {
    fn from(row: NearbyCampaignRow) -> Self {
        let campaign = CampaignRow {
            id: row.campaign_id,
            owner_uid: row.campaign_owner_uid,
            title: row.campaign_title,
            offer: row.campaign_offer,
            radius_km: row.campaign_radius_km,
            start_at: row.campaign_start_at,
            end_at: row.campaign_end_at,
            poster_path: row.campaign_poster_path,
            active: row.campaign_active,
            created_at: row.campaign_created_at,
        };
        Self {
            shop: row.shop.into(),
            campaign: campaign.into(),
            distance_m: row.distance_m,
        }
    }
}

/// A row from the `products` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    /// Primary key.
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

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            owner_uid: row.owner_uid,
            name: row.name,
            description: row.description,
            price: row.price,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A row from the `devices` table. `c_status` is stored as text.
#[derive(Debug, Clone, FromRow)]
pub struct DeviceRow {
    /// Primary key.
    pub id: i64,
    /// Unique device identifier.
    pub uid: String,
    /// Phone number.
    pub phone_number: Option<String>,
    /// Latitude in degrees.
    pub lat: Option<f64>,
    /// Longitude in degrees.
    pub lon: Option<f64>,
    /// Connectivity state, one of the [`ConnectionStatus`] spellings.
    pub c_status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DeviceRow> for Device {
    type Error = PinpointError;

    fn try_from(row: DeviceRow) -> Result<Self, Self::Error> {
        let status: ConnectionStatus = row.c_status.parse().map_err(|_| {
            PinpointError::Persistence(format!(
                "device {} has unknown c_status {:?}",
                row.id, row.c_status
            ))
        })?;
        Ok(Self {
            id: DeviceId::new(row.id),
            uid: row.uid,
            phone_number: row.phone_number,
            position: GeoPoint::from_columns(row.lat, row.lon),
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn shop_row(lat: Option<f64>, lon: Option<f64>) -> ShopRow {
        let now = Utc::now();
        ShopRow {
            id: 3,
            owner_uid: Some("owner-3".to_string()),
            name: "Bakery".to_string(),
            category: Some("food".to_string()),
            description: None,
            address_line: None,
            city: Some("Bengaluru".to_string()),
            lat,
            lon,
            registration_no: None,
            contact_number: None,
            avg_spend: Some(250.0),
            has_offer: false,
            image_url: None,
            logo_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn shop_row_with_full_position() {
        let shop = Shop::from(shop_row(Some(12.97), Some(77.59)));
        assert_eq!(shop.id, ShopId::new(3));
        assert!(shop.position.is_some());
        assert_eq!(shop.city.as_deref(), Some("Bengaluru"));
    }

    #[test]
    fn shop_row_with_half_position_has_none() {
        let shop = Shop::from(shop_row(Some(12.97), None));
        assert!(shop.position.is_none());
    }

    #[test]
    fn nearby_campaign_row_splits_columns() {
        let now = Utc::now();
        let row = NearbyCampaignRow {
            shop: shop_row(Some(1.0), Some(2.0)),
            distance_m: 12.5,
            campaign_id: 9,
            campaign_owner_uid: "owner-3".to_string(),
            campaign_title: "Weekend".to_string(),
            campaign_offer: "Buy one get one".to_string(),
            campaign_radius_km: 1.5,
            campaign_start_at: now,
            campaign_end_at: now,
            campaign_poster_path: None,
            campaign_active: true,
            campaign_created_at: now,
        };
        let item = NearbyCampaign::from(row);
        assert_eq!(item.shop.id.get(), 3);
        assert_eq!(item.campaign.id.get(), 9);
        assert_eq!(item.campaign.title, "Weekend");
        assert!((item.distance_m - 12.5).abs() < f64::EPSILON);
    }

    fn device_row(c_status: &str) -> DeviceRow {
        let now = Utc::now();
        DeviceRow {
            id: 5,
            uid: "dev-5".to_string(),
            phone_number: None,
            lat: Some(12.9),
            lon: Some(77.6),
            c_status: c_status.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn device_row_parses_status() {
        let Ok(device) = Device::try_from(device_row("CONNECTED_SMS")) else {
            panic!("valid row rejected");
        };
        assert_eq!(device.status, ConnectionStatus::ConnectedSms);
        assert!(device.position.is_some());
    }

    #[test]
    fn device_row_with_unknown_status_is_a_storage_fault() {
        assert!(matches!(
            Device::try_from(device_row("ONLINE")),
            Err(PinpointError::Persistence(_))
        ));
    }
}
