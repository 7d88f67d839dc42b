//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub products: usize,
    pub customers: usize,
    pub sales: usize,
}

/// GET /health: returns status and the size of each collection.
pub async fn check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let snapshot = state.store.snapshot().await;
    Json(HealthResponse {
        status: "ok",
        products: snapshot.products.len(),
        customers: snapshot.customers.len(),
        sales: snapshot.sales.len(),
    })
}
