//! pinpoint-gateway server entry point.
//!
//! Starts the Axum HTTP server with the REST endpoints.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::http::StatusCode;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use pinpoint_gateway::api;
use pinpoint_gateway::app_state::AppState;
use pinpoint_gateway::config::{LogFormat, PinpointConfig};
use pinpoint_gateway::persistence::{InMemoryStore, OfferStore, PostgresStore};
use pinpoint_gateway::service::{DeviceService, ProductService, ProximityOfferQuery, ShopService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = PinpointConfig::from_env()?;
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting pinpoint-gateway");

    // Build persistence layer
    let store = build_store(&config).await?;

    // Build service layer
    let proximity = ProximityOfferQuery::connect(Arc::clone(&store), config.query_timeout())
        .await
        .context("probing distance capabilities")?;
    let shops = ShopService::new(Arc::clone(&store));
    let products = ProductService::new(Arc::clone(&store));
    let devices = DeviceService::new(store);

    // Build application state
    let app_state = AppState {
        proximity: Arc::new(proximity),
        shops: Arc::new(shops),
        products: Arc::new(products),
        devices: Arc::new(devices),
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout(),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn build_store(config: &PinpointConfig) -> anyhow::Result<Arc<dyn OfferStore>> {
    if !config.persistence_enabled {
        tracing::warn!("persistence disabled, using in-memory store");
        return Ok(Arc::new(InMemoryStore::new()));
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(std::time::Duration::from_secs(
            config.database_connect_timeout_secs,
        ))
        .connect(&config.database_url)
        .await
        .context("connecting to PostgreSQL")?;
    tracing::info!(
        max_connections = config.database_max_connections,
        "database pool ready"
    );

    let store = PostgresStore::new(pool);
    if config.run_migrations {
        store.migrate().await.context("running migrations")?;
        tracing::info!("migrations applied");
    }
    Ok(Arc::new(store))
}
