//! Proximity search over shops and active campaigns.
//!
//! [`ProximityOfferQuery`] is stateless apart from the strategy chosen at
//! startup. Each call issues one read against the store, bounded by a
//! timeout. If the geodesic path reports
//! [`PinpointError::GeoCapabilityUnavailable`], the call is retried exactly
//! once with the haversine strategy. Every other failure, and any failure of
//! the retry, surfaces as [`PinpointError::Internal`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::{DistanceStrategy, NearbyCampaign, NearbyShop, ProximityRequest};
use crate::error::PinpointError;
use crate::persistence::OfferStore;

/// Query component behind the nearby endpoints.
#[derive(Debug, Clone)]
pub struct ProximityOfferQuery {
    store: Arc<dyn OfferStore>,
    strategy: DistanceStrategy,
    timeout: Duration,
}

impl ProximityOfferQuery {
    /// Probes the store once and builds a query component using the best
    /// strategy it supports.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the capability probe fails.
    pub async fn connect(
        store: Arc<dyn OfferStore>,
        timeout: Duration,
    ) -> Result<Self, PinpointError> {
        let strategy = store.probe_strategy().await?;
        tracing::info!(%strategy, "proximity queries configured");
        Ok(Self::with_strategy(store, strategy, timeout))
    }

    /// Builds a query component with an explicit preferred strategy.
    #[must_use]
    pub fn with_strategy(
        store: Arc<dyn OfferStore>,
        strategy: DistanceStrategy,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            strategy,
            timeout,
        }
    }

    /// Preferred strategy for this process.
    #[must_use]
    pub const fn strategy(&self) -> DistanceStrategy {
        self.strategy
    }

    /// Shops near the request origin, each annotated with its distance and
    /// whether it has an active campaign right now.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::Internal`] if the query fails.
    pub async fn nearby_shops(
        &self,
        request: &ProximityRequest,
    ) -> Result<Vec<NearbyShop>, PinpointError> {
        self.nearby_shops_at(request, Utc::now()).await
    }

    /// [`Self::nearby_shops`] with campaign activity evaluated at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::Internal`] if the query fails.
    pub async fn nearby_shops_at(
        &self,
        request: &ProximityRequest,
        now: DateTime<Utc>,
    ) -> Result<Vec<NearbyShop>, PinpointError> {
        if request.limit() == 0 {
            return Ok(Vec::new());
        }
        let shops = self
            .run("nearby_shops", |strategy| {
                self.store.nearby_shops(request, strategy, now)
            })
            .await?;
        tracing::debug!(
            origin = %request.origin(),
            radius_m = request.radius_m(),
            count = shops.len(),
            "nearby shops"
        );
        Ok(shops)
    }

    /// Active campaigns whose shop is near the request origin, paired with
    /// that shop.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::Internal`] if the query fails.
    pub async fn active_campaigns_nearby(
        &self,
        request: &ProximityRequest,
    ) -> Result<Vec<NearbyCampaign>, PinpointError> {
        self.active_campaigns_nearby_at(request, Utc::now()).await
    }

    /// [`Self::active_campaigns_nearby`] with activity evaluated at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::Internal`] if the query fails.
    pub async fn active_campaigns_nearby_at(
        &self,
        request: &ProximityRequest,
        now: DateTime<Utc>,
    ) -> Result<Vec<NearbyCampaign>, PinpointError> {
        if request.limit() == 0 {
            return Ok(Vec::new());
        }
        let items = self
            .run("active_campaigns_nearby", |strategy| {
                self.store.active_campaigns_nearby(request, strategy, now)
            })
            .await?;
        tracing::debug!(
            origin = %request.origin(),
            radius_m = request.radius_m(),
            count = items.len(),
            "active campaigns nearby"
        );
        Ok(items)
    }

    /// Runs `query` with the preferred strategy, falling back to haversine
    /// at most once.
    async fn run<T, F, Fut>(&self, operation: &'static str, query: F) -> Result<T, PinpointError>
    where
        F: Fn(DistanceStrategy) -> Fut,
        Fut: Future<Output = Result<T, PinpointError>>,
    {
        match self.attempt(query(self.strategy)).await {
            Ok(rows) => Ok(rows),
            Err(PinpointError::GeoCapabilityUnavailable(reason))
                if self.strategy == DistanceStrategy::Geodesic =>
            {
                tracing::warn!(
                    operation,
                    %reason,
                    "geodesic strategy unavailable, retrying with haversine"
                );
                self.attempt(query(DistanceStrategy::Haversine))
                    .await
                    .map_err(|err| internal(operation, DistanceStrategy::Haversine, err))
            }
            Err(err) => Err(internal(operation, self.strategy, err)),
        }
    }

    async fn attempt<T, Fut>(&self, query: Fut) -> Result<T, PinpointError>
    where
        Fut: Future<Output = Result<T, PinpointError>>,
    {
        tokio::time::timeout(self.timeout, query)
            .await
            .unwrap_or_else(|_| {
                Err(PinpointError::QueryTimeout {
                    timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                })
            })
    }
}

fn internal(operation: &str, strategy: DistanceStrategy, err: PinpointError) -> PinpointError {
    tracing::error!(operation, %strategy, error = %err, "proximity query failed");
    PinpointError::Internal(format!("{operation} failed: {err}"))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;

    use super::*;
    use crate::domain::{
        Campaign, Device, GeoPoint, NewCampaign, NewDevice, NewProduct, NewShop, Product,
        ProductId, ProductPage, ProductPatch, ProductQuery, Shop, ShopId,
    };
    use crate::persistence::InMemoryStore;

    const TIMEOUT: Duration = Duration::from_secs(2);

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Failure {
        /// Every spatial query fails with a persistence error.
        Connection,
        /// Geodesic reports missing PostGIS, haversine then fails too.
        GeoMissingThenConnection,
        /// Spatial queries never finish.
        Hang,
    }

    #[derive(Debug)]
    struct FailingStore {
        failure: Failure,
        calls: AtomicUsize,
    }

    impl FailingStore {
        fn new(failure: Failure) -> Self {
            Self {
                failure,
                calls: AtomicUsize::new(0),
            }
        }

        async fn fail<T>(&self, strategy: DistanceStrategy) -> Result<T, PinpointError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match (self.failure, strategy) {
                (Failure::GeoMissingThenConnection, DistanceStrategy::Geodesic) => Err(
                    PinpointError::GeoCapabilityUnavailable("function st_dwithin".to_string()),
                ),
                (Failure::Hang, _) => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Err(PinpointError::Internal("woke up".to_string()))
                }
                _ => Err(PinpointError::Persistence("connection reset".to_string())),
            }
        }
    }

    #[async_trait]
    impl OfferStore for FailingStore {
        async fn probe_strategy(&self) -> Result<DistanceStrategy, PinpointError> {
            Ok(DistanceStrategy::Geodesic)
        }

        async fn nearby_shops(
            &self,
            _request: &ProximityRequest,
            strategy: DistanceStrategy,
            _now: DateTime<Utc>,
        ) -> Result<Vec<NearbyShop>, PinpointError> {
            self.fail(strategy).await
        }

        async fn active_campaigns_nearby(
            &self,
            _request: &ProximityRequest,
            strategy: DistanceStrategy,
            _now: DateTime<Utc>,
        ) -> Result<Vec<NearbyCampaign>, PinpointError> {
            self.fail(strategy).await
        }

        async fn insert_shop(&self, _shop: NewShop) -> Result<Shop, PinpointError> {
            Err(PinpointError::Internal("read-only".to_string()))
        }

        async fn get_shop(&self, id: ShopId) -> Result<Shop, PinpointError> {
            Err(PinpointError::ShopNotFound(id.get()))
        }

        async fn update_shop_position(
            &self,
            id: ShopId,
            _position: GeoPoint,
        ) -> Result<Shop, PinpointError> {
            Err(PinpointError::ShopNotFound(id.get()))
        }

        async fn insert_campaign(
            &self,
            _campaign: NewCampaign,
        ) -> Result<Campaign, PinpointError> {
            Err(PinpointError::Internal("read-only".to_string()))
        }

        async fn list_campaigns(&self, _owner_uid: &str) -> Result<Vec<Campaign>, PinpointError> {
            Ok(Vec::new())
        }

        async fn insert_product(&self, _product: NewProduct) -> Result<Product, PinpointError> {
            Err(PinpointError::Internal("read-only".to_string()))
        }

        async fn get_product(&self, id: ProductId) -> Result<Product, PinpointError> {
            Err(PinpointError::ProductNotFound(id.get()))
        }

        async fn list_products(
            &self,
            _query: &ProductQuery,
        ) -> Result<ProductPage, PinpointError> {
            Ok(ProductPage {
                total: 0,
                products: Vec::new(),
            })
        }

        async fn update_product(
            &self,
            id: ProductId,
            _patch: ProductPatch,
        ) -> Result<Product, PinpointError> {
            Err(PinpointError::ProductNotFound(id.get()))
        }

        async fn delete_product(&self, id: ProductId) -> Result<(), PinpointError> {
            Err(PinpointError::ProductNotFound(id.get()))
        }

        async fn insert_device(&self, _device: NewDevice) -> Result<Device, PinpointError> {
            Err(PinpointError::Internal("read-only".to_string()))
        }

        async fn get_device(&self, uid: &str) -> Result<Device, PinpointError> {
            Err(PinpointError::DeviceNotFound(uid.to_string()))
        }

        async fn list_devices(&self) -> Result<Vec<Device>, PinpointError> {
            Ok(Vec::new())
        }
    }

    fn point(lat: f64, lon: f64) -> GeoPoint {
        let Ok(p) = GeoPoint::new(lat, lon) else {
            panic!("invalid test point");
        };
        p
    }

    fn request(lat: f64, lon: f64, radius_m: f64) -> ProximityRequest {
        let Ok(req) = ProximityRequest::new(point(lat, lon), Some(radius_m), None) else {
            panic!("invalid request");
        };
        req
    }

    async fn seeded_store(store: InMemoryStore) -> Arc<InMemoryStore> {
        let now = Utc::now();
        let shop = NewShop {
            owner_uid: Some("owner-1".to_string()),
            name: "Filter Coffee".to_string(),
            position: Some(point(12.97, 77.59)),
            ..NewShop::default()
        };
        let Ok(_) = store.insert_shop(shop).await else {
            panic!("seed shop failed");
        };
        let campaign = NewCampaign {
            owner_uid: "owner-1".to_string(),
            title: "Morning".to_string(),
            offer: "Free refill".to_string(),
            radius_km: 1.0,
            start: now - ChronoDuration::hours(1),
            end: now + ChronoDuration::hours(1),
            poster_path: None,
            active: true,
        };
        let Ok(_) = store.insert_campaign(campaign).await else {
            panic!("seed campaign failed");
        };
        Arc::new(store)
    }

    #[tokio::test]
    async fn connect_uses_probed_strategy() {
        let store = Arc::new(InMemoryStore::haversine_only());
        let Ok(query) = ProximityOfferQuery::connect(store, TIMEOUT).await else {
            panic!("connect failed");
        };
        assert_eq!(query.strategy(), DistanceStrategy::Haversine);
    }

    #[tokio::test]
    async fn falls_back_to_haversine_when_geodesic_is_unavailable() {
        let store = seeded_store(InMemoryStore::haversine_only()).await;
        let query = ProximityOfferQuery::with_strategy(store, DistanceStrategy::Geodesic, TIMEOUT);

        let Ok(shops) = query.nearby_shops(&request(12.97, 77.59, 100.0)).await else {
            panic!("fallback should succeed");
        };
        assert_eq!(shops.len(), 1);

        let Ok(items) = query
            .active_campaigns_nearby(&request(12.97, 77.59, 100.0))
            .await
        else {
            panic!("fallback should succeed");
        };
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn unrelated_failures_are_not_retried() {
        let store = Arc::new(FailingStore::new(Failure::Connection));
        let query = ProximityOfferQuery::with_strategy(
            Arc::clone(&store) as Arc<dyn OfferStore>,
            DistanceStrategy::Geodesic,
            TIMEOUT,
        );

        let result = query.nearby_shops(&request(0.0, 0.0, 100.0)).await;
        assert!(matches!(result, Err(PinpointError::Internal(_))));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fallback_is_attempted_only_once() {
        let store = Arc::new(FailingStore::new(Failure::GeoMissingThenConnection));
        let query = ProximityOfferQuery::with_strategy(
            Arc::clone(&store) as Arc<dyn OfferStore>,
            DistanceStrategy::Geodesic,
            TIMEOUT,
        );

        let result = query.active_campaigns_nearby(&request(0.0, 0.0, 100.0)).await;
        assert!(matches!(result, Err(PinpointError::Internal(_))));
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn capability_error_on_haversine_is_not_retried() {
        let store = Arc::new(FailingStore::new(Failure::GeoMissingThenConnection));
        let query = ProximityOfferQuery::with_strategy(
            Arc::clone(&store) as Arc<dyn OfferStore>,
            DistanceStrategy::Haversine,
            TIMEOUT,
        );

        let result = query.nearby_shops(&request(0.0, 0.0, 100.0)).await;
        assert!(matches!(result, Err(PinpointError::Internal(_))));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slow_queries_time_out_as_internal_errors() {
        let store = Arc::new(FailingStore::new(Failure::Hang));
        let query = ProximityOfferQuery::with_strategy(
            store,
            DistanceStrategy::Geodesic,
            Duration::from_millis(20),
        );

        let Err(err) = query.nearby_shops(&request(0.0, 0.0, 100.0)).await else {
            panic!("expected timeout");
        };
        assert!(matches!(err, PinpointError::Internal(_)));
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn zero_limit_returns_empty_without_querying() {
        let store = Arc::new(FailingStore::new(Failure::Connection));
        let query = ProximityOfferQuery::with_strategy(
            Arc::clone(&store) as Arc<dyn OfferStore>,
            DistanceStrategy::Geodesic,
            TIMEOUT,
        );
        let Ok(req) = ProximityRequest::new(point(0.0, 0.0), None, Some(0)) else {
            panic!("invalid request");
        };

        let Ok(rows) = query.nearby_shops(&req).await else {
            panic!("zero limit should not fail");
        };
        assert!(rows.is_empty());
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }
}
