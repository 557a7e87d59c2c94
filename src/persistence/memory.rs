//! In-process store with the same query semantics as the SQL backend.
//!
//! Tables live behind a single [`tokio::sync::RwLock`]: proximity reads
//! share the lock, writes are serialized. Distances are computed with the
//! requested [`DistanceStrategy`] and the radius filter uses that same
//! value, exactly like the SQL queries.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::OfferStore;
use crate::domain::{
    Campaign, CampaignId, Device, DeviceId, DistanceStrategy, GeoPoint, NearbyCampaign,
    NearbyShop, NewCampaign, NewDevice, NewProduct, NewShop, Product, ProductId, ProductPage,
    ProductPatch, ProductQuery, ProximityRequest, Shop, ShopId,
};
use crate::error::PinpointError;

#[derive(Debug, Default)]
struct Tables {
    shops: BTreeMap<ShopId, Shop>,
    campaigns: BTreeMap<CampaignId, Campaign>,
    products: BTreeMap<ProductId, Product>,
    devices: BTreeMap<DeviceId, Device>,
    next_shop_id: i64,
    next_campaign_id: i64,
    next_product_id: i64,
    next_device_id: i64,
}

impl Tables {
    /// Shops within radius under `strategy`, sorted nearest first (ties
    /// keep ID order), not yet truncated.
    fn shops_within(
        &self,
        request: &ProximityRequest,
        strategy: DistanceStrategy,
    ) -> Vec<(&Shop, f64)> {
        let mut hits: Vec<(&Shop, f64)> = self
            .shops
            .values()
            .filter_map(|shop| {
                let position = shop.position.as_ref()?;
                let distance = strategy.distance_m(request.origin(), position);
                (distance <= request.radius_m()).then_some((shop, distance))
            })
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits
    }

    fn active_campaigns_of<'a>(
        &'a self,
        owner_uid: Option<&'a str>,
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = &'a Campaign> + 'a {
        self.campaigns.values().filter(move |c| {
            owner_uid.is_some_and(|uid| c.owner_uid == uid) && c.is_active_at(now)
        })
    }
}

/// Store that keeps all records in memory.
#[derive(Debug)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    geodesic_supported: bool,
}

impl InMemoryStore {
    /// Creates an empty store supporting both distance strategies.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            geodesic_supported: true,
        }
    }

    /// Creates an empty store that behaves like a database without a
    /// geospatial extension: geodesic queries fail with
    /// [`PinpointError::GeoCapabilityUnavailable`].
    #[must_use]
    pub fn haversine_only() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            geodesic_supported: false,
        }
    }

    fn check_strategy(&self, strategy: DistanceStrategy) -> Result<(), PinpointError> {
        if strategy == DistanceStrategy::Geodesic && !self.geodesic_supported {
            return Err(PinpointError::GeoCapabilityUnavailable(
                "geodesic distance is not supported by this store".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the number of stored shops.
    pub async fn shop_count(&self) -> usize {
        self.tables.read().await.shops.len()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OfferStore for InMemoryStore {
    async fn probe_strategy(&self) -> Result<DistanceStrategy, PinpointError> {
        Ok(if self.geodesic_supported {
            DistanceStrategy::Geodesic
        } else {
            DistanceStrategy::Haversine
        })
    }

    async fn nearby_shops(
        &self,
        request: &ProximityRequest,
        strategy: DistanceStrategy,
        now: DateTime<Utc>,
    ) -> Result<Vec<NearbyShop>, PinpointError> {
        self.check_strategy(strategy)?;
        let guard = self.tables.read().await;
        let tables: &Tables = &guard;
        let limit = usize::try_from(request.limit()).unwrap_or(usize::MAX);

        Ok(tables
            .shops_within(request, strategy)
            .into_iter()
            .take(limit)
            .map(|(shop, distance_m)| NearbyShop {
                has_active_campaign: tables
                    .active_campaigns_of(shop.owner_uid.as_deref(), now)
                    .next()
                    .is_some(),
                shop: shop.clone(),
                distance_m,
            })
            .collect())
    }

    async fn active_campaigns_nearby(
        &self,
        request: &ProximityRequest,
        strategy: DistanceStrategy,
        now: DateTime<Utc>,
    ) -> Result<Vec<NearbyCampaign>, PinpointError> {
        self.check_strategy(strategy)?;
        let guard = self.tables.read().await;
        let tables: &Tables = &guard;
        let limit = usize::try_from(request.limit()).unwrap_or(usize::MAX);

        Ok(tables
            .shops_within(request, strategy)
            .into_iter()
            .flat_map(|(shop, distance_m)| {
                tables
                    .active_campaigns_of(shop.owner_uid.as_deref(), now)
                    .map(move |campaign| NearbyCampaign {
                        shop: shop.clone(),
                        campaign: campaign.clone(),
                        distance_m,
                    })
            })
            .take(limit)
            .collect())
    }

    async fn insert_shop(&self, shop: NewShop) -> Result<Shop, PinpointError> {
        let mut tables = self.tables.write().await;
        tables.next_shop_id += 1;
        let id = ShopId::new(tables.next_shop_id);
        let stored = shop.into_shop(id, Utc::now());
        tables.shops.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_shop(&self, id: ShopId) -> Result<Shop, PinpointError> {
        let tables = self.tables.read().await;
        tables
            .shops
            .get(&id)
            .cloned()
            .ok_or(PinpointError::ShopNotFound(id.get()))
    }

    async fn update_shop_position(
        &self,
        id: ShopId,
        position: GeoPoint,
    ) -> Result<Shop, PinpointError> {
        let mut tables = self.tables.write().await;
        let shop = tables
            .shops
            .get_mut(&id)
            .ok_or(PinpointError::ShopNotFound(id.get()))?;
        shop.position = Some(position);
        shop.updated_at = Utc::now();
        Ok(shop.clone())
    }

    async fn insert_campaign(&self, campaign: NewCampaign) -> Result<Campaign, PinpointError> {
        let mut tables = self.tables.write().await;
        tables.next_campaign_id += 1;
        let id = CampaignId::new(tables.next_campaign_id);
        let stored = campaign.into_campaign(id, Utc::now());
        tables.campaigns.insert(id, stored.clone());
        Ok(stored)
    }

    async fn list_campaigns(&self, owner_uid: &str) -> Result<Vec<Campaign>, PinpointError> {
        let tables = self.tables.read().await;
        let mut campaigns: Vec<Campaign> = tables
            .campaigns
            .values()
            .filter(|c| c.owner_uid == owner_uid)
            .cloned()
            .collect();
        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(campaigns)
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, PinpointError> {
        let mut tables = self.tables.write().await;
        tables.next_product_id += 1;
        let id = ProductId::new(tables.next_product_id);
        let stored = product.into_product(id, Utc::now());
        tables.products.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, PinpointError> {
        let tables = self.tables.read().await;
        tables
            .products
            .get(&id)
            .cloned()
            .ok_or(PinpointError::ProductNotFound(id.get()))
    }

    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, PinpointError> {
        let tables = self.tables.read().await;
        let mut matching: Vec<&Product> = tables
            .products
            .values()
            .filter(|p| query.matches(p))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit()).unwrap_or(usize::MAX);
        Ok(ProductPage {
            total,
            products: matching
                .into_iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect(),
        })
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, PinpointError> {
        let mut tables = self.tables.write().await;
        let product = tables
            .products
            .get_mut(&id)
            .ok_or(PinpointError::ProductNotFound(id.get()))?;
        patch.apply(product, Utc::now());
        Ok(product.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), PinpointError> {
        let mut tables = self.tables.write().await;
        tables
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or(PinpointError::ProductNotFound(id.get()))
    }

    async fn insert_device(&self, device: NewDevice) -> Result<Device, PinpointError> {
        let mut tables = self.tables.write().await;
        if tables.devices.values().any(|d| d.uid == device.uid) {
            return Err(PinpointError::DeviceAlreadyRegistered(device.uid));
        }
        tables.next_device_id += 1;
        let id = DeviceId::new(tables.next_device_id);
        let stored = device.into_device(id, Utc::now());
        tables.devices.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_device(&self, uid: &str) -> Result<Device, PinpointError> {
        let tables = self.tables.read().await;
        tables
            .devices
            .values()
            .find(|d| d.uid == uid)
            .cloned()
            .ok_or_else(|| PinpointError::DeviceNotFound(uid.to_string()))
    }

    async fn list_devices(&self) -> Result<Vec<Device>, PinpointError> {
        let tables = self.tables.read().await;
        let mut devices: Vec<Device> = tables.devices.values().cloned().collect();
        devices.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(devices)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        let Ok(p) = GeoPoint::new(lat, lon) else {
            panic!("invalid test point");
        };
        p
    }

    fn request(lat: f64, lon: f64, radius_m: f64, limit: u32) -> ProximityRequest {
        let Ok(req) = ProximityRequest::new(point(lat, lon), Some(radius_m), Some(limit)) else {
            panic!("invalid request");
        };
        req
    }

    fn shop(owner: Option<&str>, position: Option<GeoPoint>) -> NewShop {
        NewShop {
            owner_uid: owner.map(str::to_string),
            name: "shop".to_string(),
            position,
            ..NewShop::default()
        }
    }

    fn campaign(owner: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> NewCampaign {
        NewCampaign {
            owner_uid: owner.to_string(),
            title: "t".to_string(),
            offer: "o".to_string(),
            radius_km: 1.0,
            start,
            end,
            poster_path: None,
            active: true,
        }
    }

    async fn seed_shop(store: &InMemoryStore, new: NewShop) -> Shop {
        let Ok(stored) = store.insert_shop(new).await else {
            panic!("shop insert failed");
        };
        stored
    }

    async fn seed_campaign(store: &InMemoryStore, new: NewCampaign) -> Campaign {
        let Ok(stored) = store.insert_campaign(new).await else {
            panic!("campaign insert failed");
        };
        stored
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = InMemoryStore::new();
        let Ok(a) = store.insert_shop(shop(None, None)).await else {
            panic!("insert failed");
        };
        let Ok(b) = store.insert_shop(shop(None, None)).await else {
            panic!("insert failed");
        };
        assert_eq!(a.id.get() + 1, b.id.get());
        assert_eq!(store.shop_count().await, 2);
    }

    #[tokio::test]
    async fn shops_without_position_are_skipped() {
        let store = InMemoryStore::new();
        seed_shop(&store, shop(None, None)).await;
        seed_shop(&store, shop(None, Some(point(12.97, 77.59)))).await;

        let Ok(rows) = store
            .nearby_shops(
                &request(12.97, 77.59, 1_000.0, 10),
                DistanceStrategy::Haversine,
                Utc::now(),
            )
            .await
        else {
            panic!("query failed");
        };
        assert_eq!(rows.len(), 1);
        assert!(rows.iter().all(|r| r.shop.position.is_some()));
    }

    #[tokio::test]
    async fn results_sorted_and_truncated() {
        let store = InMemoryStore::new();
        for offset in [0.03, 0.01, 0.02, 0.005] {
            seed_shop(&store, shop(None, Some(point(12.97 + offset, 77.59)))).await;
        }
        let Ok(rows) = store
            .nearby_shops(
                &request(12.97, 77.59, 10_000.0, 3),
                DistanceStrategy::Geodesic,
                Utc::now(),
            )
            .await
        else {
            panic!("query failed");
        };
        assert_eq!(rows.len(), 3);
        assert!(rows.windows(2).all(|w| match w {
            [a, b] => a.distance_m <= b.distance_m,
            _ => true,
        }));
    }

    #[tokio::test]
    async fn haversine_only_rejects_geodesic() {
        let store = InMemoryStore::haversine_only();
        let result = store
            .nearby_shops(
                &request(0.0, 0.0, 100.0, 10),
                DistanceStrategy::Geodesic,
                Utc::now(),
            )
            .await;
        assert!(matches!(
            result,
            Err(PinpointError::GeoCapabilityUnavailable(_))
        ));
        assert_eq!(store.probe_strategy().await.ok(), Some(DistanceStrategy::Haversine));
    }

    #[tokio::test]
    async fn shops_without_owner_never_match_campaigns() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        seed_shop(&store, shop(None, Some(point(1.0, 1.0)))).await;
        seed_campaign(
            &store,
            campaign("", now - Duration::hours(1), now + Duration::hours(1)),
        )
        .await;

        let Ok(rows) = store
            .active_campaigns_nearby(&request(1.0, 1.0, 100.0, 10), DistanceStrategy::Haversine, now)
            .await
        else {
            panic!("query failed");
        };
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn update_position_of_missing_shop_fails() {
        let store = InMemoryStore::new();
        let result = store
            .update_shop_position(ShopId::new(99), point(1.0, 1.0))
            .await;
        assert!(matches!(result, Err(PinpointError::ShopNotFound(99))));
    }

    #[tokio::test]
    async fn list_campaigns_filters_by_owner_newest_first() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        seed_campaign(&store, campaign("a", now, now)).await;
        seed_campaign(&store, campaign("b", now, now)).await;
        seed_campaign(&store, campaign("a", now, now)).await;

        let Ok(list) = store.list_campaigns("a").await else {
            panic!("list failed");
        };
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|c| c.owner_uid == "a"));
        let ids: Vec<i64> = list.iter().map(|c| c.id.get()).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    fn product(owner: &str, name: &str) -> NewProduct {
        NewProduct {
            owner_uid: owner.to_string(),
            name: name.to_string(),
            price: 20.0,
            ..NewProduct::default()
        }
    }

    async fn seed_product(store: &InMemoryStore, new: NewProduct) -> Product {
        let Ok(stored) = store.insert_product(new).await else {
            panic!("product insert failed");
        };
        stored
    }

    fn product_query(owner: &str, search: Option<&str>, limit: &str, offset: &str) -> ProductQuery {
        let Ok(query) = ProductQuery::parse(Some(owner), search, Some(limit), Some(offset)) else {
            panic!("invalid product query");
        };
        query
    }

    #[tokio::test]
    async fn product_pages_report_the_full_total() {
        let store = InMemoryStore::new();
        for name in ["Idli", "Vada", "Dosa", "Upma"] {
            seed_product(&store, product("o1", name)).await;
        }
        seed_product(&store, product("o2", "Poha")).await;

        let Ok(page) = store.list_products(&product_query("o1", None, "2", "1")).await else {
            panic!("list failed");
        };
        assert_eq!(page.total, 4);
        let names: Vec<&str> = page.products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Dosa", "Vada"]);

        let Ok(past_end) = store.list_products(&product_query("o1", None, "2", "10")).await else {
            panic!("list failed");
        };
        assert_eq!(past_end.total, 4);
        assert!(past_end.products.is_empty());
    }

    #[tokio::test]
    async fn product_search_filters_before_paging() {
        let store = InMemoryStore::new();
        seed_product(&store, product("o1", "Filter coffee")).await;
        seed_product(&store, product("o1", "Masala chai")).await;

        let Ok(page) = store
            .list_products(&product_query("o1", Some("COFFEE"), "50", "0"))
            .await
        else {
            panic!("list failed");
        };
        assert_eq!(page.total, 1);
        assert_eq!(page.products.len(), 1);
    }

    #[tokio::test]
    async fn deleted_products_are_gone() {
        let store = InMemoryStore::new();
        let stored = seed_product(&store, product("o1", "Lassi")).await;
        assert!(store.delete_product(stored.id).await.is_ok());
        assert!(matches!(
            store.get_product(stored.id).await,
            Err(PinpointError::ProductNotFound(_))
        ));
        assert!(matches!(
            store.delete_product(stored.id).await,
            Err(PinpointError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_device_uid_is_a_conflict() {
        let store = InMemoryStore::new();
        let device = NewDevice {
            uid: "dev-1".to_string(),
            ..NewDevice::default()
        };
        let Ok(first) = store.insert_device(device.clone()).await else {
            panic!("device insert failed");
        };
        assert!(matches!(
            store.insert_device(device).await,
            Err(PinpointError::DeviceAlreadyRegistered(uid)) if uid == "dev-1"
        ));

        let Ok(fetched) = store.get_device("dev-1").await else {
            panic!("device lookup failed");
        };
        assert_eq!(fetched.id, first.id);
        assert!(matches!(
            store.get_device("dev-2").await,
            Err(PinpointError::DeviceNotFound(_))
        ));
    }
}
