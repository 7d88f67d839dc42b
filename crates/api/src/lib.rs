//! HTTP API server with observability for the inventory dashboard.
//!
//! Provides REST endpoints for products, customers, sales, reports and
//! notifications, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use store::{InventoryStore, StoreError};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;

/// Shared application state for all route handlers.
pub struct AppState {
    pub store: InventoryStore,
    /// How long clients should keep a notification on screen.
    pub notification_display_ms: u64,
}

impl AppState {
    pub fn new(store: InventoryStore, notification_display_ms: u64) -> Self {
        Self {
            store,
            notification_display_ms,
        }
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(routes::metrics::MetricsState {
            handle: metrics_handle,
            store: state.store.clone(),
        });

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/products",
            get(routes::products::list).post(routes::products::create),
        )
        .route("/products/low-stock", get(routes::products::low_stock))
        .route("/products/out-of-stock", get(routes::products::out_of_stock))
        .route("/products/stats", get(routes::products::stats))
        .route(
            "/products/{id}",
            get(routes::products::get)
                .patch(routes::products::update)
                .delete(routes::products::delete),
        )
        .route(
            "/customers",
            get(routes::customers::list).post(routes::customers::create),
        )
        .route(
            "/customers/{id}",
            axum::routing::patch(routes::customers::update).delete(routes::customers::delete),
        )
        .route("/sales", get(routes::sales::list).post(routes::sales::create))
        .route("/sales/{id}", get(routes::sales::get))
        .route("/reports", get(routes::reports::get))
        .route("/notifications", get(routes::notifications::list))
        .route("/notifications/current", get(routes::notifications::current))
        .route(
            "/notifications/{id}",
            axum::routing::delete(routes::notifications::dismiss),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Connects the configured storage and builds a hydrated store around it.
pub async fn create_state(config: &Config) -> Result<Arc<AppState>, StoreError> {
    let backend = config.storage_backend()?;
    let adapter = storage::connect(&backend).await?;

    let store = InventoryStore::new(adapter, config.store_config());
    store.hydrate().await;

    Ok(Arc::new(AppState::new(
        store,
        config.notification_display_ms,
    )))
}
