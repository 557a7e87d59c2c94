//! Data Transfer Objects for REST request/response serialization.
//!
//! Domain records are converted with `From` impls; DTOs never carry
//! validation logic of their own.

pub mod campaign_dto;
pub mod device_dto;
pub mod nearby_dto;
pub mod product_dto;
pub mod shop_dto;

pub use campaign_dto::*;
pub use device_dto::*;
pub use nearby_dto::*;
pub use product_dto::*;
pub use shop_dto::*;
