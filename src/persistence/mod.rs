//! Persistence layer: the [`OfferStore`] seam and its implementations.
//!
//! [`PostgresStore`] is the production backend (`sqlx::PgPool`, PostGIS when
//! installed). [`InMemoryStore`] computes everything in process and backs
//! tests and database-less runs.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

use crate::domain::{
    Campaign, Device, DistanceStrategy, GeoPoint, NearbyCampaign, NearbyShop, NewCampaign,
    NewDevice, NewProduct, NewShop, Product, ProductId, ProductPage, ProductPatch, ProductQuery,
    ProximityRequest, Shop, ShopId,
};
use crate::error::PinpointError;

/// Data store holding shops, campaigns, products, and devices.
///
/// Spatial reads take the [`DistanceStrategy`] to execute. A store that
/// cannot evaluate [`DistanceStrategy::Geodesic`] must fail with
/// [`PinpointError::GeoCapabilityUnavailable`] and nothing else, so the
/// caller can tell "extension missing" apart from real failures.
#[async_trait]
pub trait OfferStore: Send + Sync + std::fmt::Debug {
    /// Reports the best strategy this store can execute.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::Persistence`] if the store cannot be reached.
    async fn probe_strategy(&self) -> Result<DistanceStrategy, PinpointError>;

    /// Shops with a position within `request.radius_m()` of the origin,
    /// nearest first, at most `request.limit()` rows.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::GeoCapabilityUnavailable`] when the strategy
    /// is unsupported, or [`PinpointError::Persistence`] on store failure.
    async fn nearby_shops(
        &self,
        request: &ProximityRequest,
        strategy: DistanceStrategy,
        now: DateTime<Utc>,
    ) -> Result<Vec<NearbyShop>, PinpointError>;

    /// `(shop, campaign)` pairs joined on `owner_uid` where the campaign is
    /// active at `now` and the shop is within radius, nearest first.
    ///
    /// # Errors
    ///
    /// Same as [`OfferStore::nearby_shops`].
    async fn active_campaigns_nearby(
        &self,
        request: &ProximityRequest,
        strategy: DistanceStrategy,
        now: DateTime<Utc>,
    ) -> Result<Vec<NearbyCampaign>, PinpointError>;

    /// Persists a new shop and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::Persistence`] on store failure.
    async fn insert_shop(&self, shop: NewShop) -> Result<Shop, PinpointError>;

    /// Fetches a shop by ID.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::ShopNotFound`] if absent.
    async fn get_shop(&self, id: ShopId) -> Result<Shop, PinpointError>;

    /// Replaces a shop's position.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::ShopNotFound`] if absent.
    async fn update_shop_position(
        &self,
        id: ShopId,
        position: GeoPoint,
    ) -> Result<Shop, PinpointError>;

    /// Persists a new campaign and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::Persistence`] on store failure.
    async fn insert_campaign(&self, campaign: NewCampaign) -> Result<Campaign, PinpointError>;

    /// Campaigns with the given owner, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::Persistence`] on store failure.
    async fn list_campaigns(&self, owner_uid: &str) -> Result<Vec<Campaign>, PinpointError>;

    /// Persists a new product and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::Persistence`] on store failure.
    async fn insert_product(&self, product: NewProduct) -> Result<Product, PinpointError>;

    /// Fetches a product by ID.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::ProductNotFound`] if absent.
    async fn get_product(&self, id: ProductId) -> Result<Product, PinpointError>;

    /// One page of an owner's catalog, newest first, with the total match
    /// count.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::Persistence`] on store failure.
    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, PinpointError>;

    /// Applies a partial update and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::ProductNotFound`] if absent.
    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, PinpointError>;

    /// Removes a product.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::ProductNotFound`] if absent.
    async fn delete_product(&self, id: ProductId) -> Result<(), PinpointError>;

    /// Persists a new device.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::DeviceAlreadyRegistered`] if the uid is
    /// taken, or [`PinpointError::Persistence`] on store failure.
    async fn insert_device(&self, device: NewDevice) -> Result<Device, PinpointError>;

    /// Fetches a device by its uid.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::DeviceNotFound`] if absent.
    async fn get_device(&self, uid: &str) -> Result<Device, PinpointError>;

    /// Every registered device, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::Persistence`] on store failure.
    async fn list_devices(&self) -> Result<Vec<Device>, PinpointError>;
}
