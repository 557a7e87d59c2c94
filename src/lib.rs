//! # pinpoint-gateway
//!
//! REST gateway for location-based shop offers.
//!
//! Shops register a position; owners publish time-bounded campaigns. The
//! gateway answers two questions for a client standing at a point: which
//! shops are within a radius, and which of their campaigns are running
//! right now. Distances are geodesic (PostGIS geography) when the database
//! supports it, with a one-shot haversine fallback when it does not.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── ProximityOfferQuery, ShopService (service/)
//!     │
//!     ├── OfferStore (persistence/)
//!     │     ├── PostgresStore (PostGIS or haversine SQL)
//!     │     └── InMemoryStore
//!     │
//!     └── Shops, campaigns, distance math (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
