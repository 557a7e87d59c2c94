//! REST endpoint handlers organized by resource.

pub mod campaign;
pub mod device;
pub mod nearby;
pub mod product;
pub mod shop;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(nearby::routes())
        .merge(shop::routes())
        .merge(campaign::routes())
        .merge(product::routes())
        .merge(device::routes())
}
