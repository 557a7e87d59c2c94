//! Service layer: proximity queries, shop/campaign management, the product
//! catalog, and the device registry.

pub mod device_service;
pub mod product_service;
pub mod proximity;
pub mod shop_service;

pub use device_service::DeviceService;
pub use product_service::ProductService;
pub use proximity::ProximityOfferQuery;
pub use shop_service::ShopService;

/// Trims optional text, mapping blank values to `None`.
fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
