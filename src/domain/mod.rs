//! Domain layer: positions, distance strategies, shops, campaigns,
//! products, and devices.
//!
//! Everything here is storage-agnostic. Records are validated on the way in
//! (a [`Shop`] position is a [`GeoPoint`] or nothing) so the query layer
//! never has to deal with half-set coordinates.

pub mod campaign;
pub mod device;
pub mod distance;
pub mod geo_point;
pub mod product;
pub mod proximity;
pub mod shop;

pub use campaign::{Campaign, CampaignId, NewCampaign};
pub use device::{ConnectionStatus, Device, DeviceId, NewDevice};
pub use distance::DistanceStrategy;
pub use geo_point::GeoPoint;
pub use product::{NewProduct, Product, ProductId, ProductPage, ProductPatch, ProductQuery};
pub use proximity::{NearbyCampaign, NearbyShop, ProximityRequest};
pub use shop::{NewShop, Shop, ShopId};
