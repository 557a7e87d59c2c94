//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::{DeviceService, ProductService, ProximityOfferQuery, ShopService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Nearby shop and campaign queries.
    pub proximity: Arc<ProximityOfferQuery>,
    /// Shop and campaign management.
    pub shops: Arc<ShopService>,
    /// Owner product catalogs.
    pub products: Arc<ProductService>,
    /// Device registry.
    pub devices: Arc<DeviceService>,
}
