//! Sales report endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use projections::{DEFAULT_TOP_PRODUCTS, SalesReport};
use serde::Deserialize;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    #[serde(default = "default_top")]
    pub top: usize,
}

fn default_top() -> usize {
    DEFAULT_TOP_PRODUCTS
}

/// GET /reports: key metrics, daily trend, best sellers and payment mix.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
) -> Json<SalesReport> {
    Json(state.store.sales_report(query.top).await)
}
