//! Prometheus metrics endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;
use store::InventoryStore;

/// State of the metrics router: the exporter plus the store it samples.
#[derive(Clone)]
pub struct MetricsState {
    pub handle: PrometheusHandle,
    pub store: InventoryStore,
}

/// GET /metrics: refreshes the inventory gauges, then renders every metric.
pub async fn get(State(state): State<MetricsState>) -> impl IntoResponse {
    let stats = state.store.get_inventory_stats().await;
    metrics::gauge!("inventory_products").set(stats.total_products as f64);
    metrics::gauge!("inventory_low_stock_products").set(stats.low_stock_count as f64);
    metrics::gauge!("inventory_out_of_stock_products").set(stats.out_of_stock_count as f64);
    metrics::gauge!("inventory_stock_value").set(stats.total_value.as_decimal());
    metrics::gauge!("notifications_queued").set(state.store.notifications().await.len() as f64);

    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.handle.render(),
    )
}
