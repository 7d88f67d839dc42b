//! Sale order endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use domain::{Sale, SaleDraft, SaleId};
use serde::Deserialize;
use store::StoreError;

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct SalesQuery {
    #[serde(default)]
    pub search: String,
    /// Keep only the newest `limit` sales.
    pub limit: Option<usize>,
}

/// GET /sales: sales matching `search` on id, customer name or notes.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SalesQuery>,
) -> Json<Vec<Sale>> {
    let sales = match query.limit {
        Some(limit) if query.search.trim().is_empty() => state.store.recent_sales(limit).await,
        Some(limit) => {
            let mut sales = state.store.search_sales(&query.search).await;
            sales.truncate(limit);
            sales
        }
        None => state.store.search_sales(&query.search).await,
    };
    Json(sales)
}

/// POST /sales: checks the draft against current stock and records it in
/// one step.
///
/// Rejected drafts answer 422 with the list of issues and change nothing.
#[tracing::instrument(skip(state, draft), fields(items = draft.items.len()))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<SaleDraft>,
) -> Result<(StatusCode, Json<Sale>), ApiError> {
    match state.store.create_validated_sale(draft).await {
        Ok(sale) => Ok((StatusCode::CREATED, Json(sale))),
        Err(StoreError::InvalidSale(issues)) => {
            tracing::info!(issues = issues.len(), "sale draft rejected");
            metrics::counter!("sales_rejected_total").increment(1);
            Err(ApiError::InvalidSale(issues))
        }
        Err(e) => Err(e.into()),
    }
}

#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Sale>, ApiError> {
    Ok(Json(state.store.sale(&SaleId::new(id)).await?))
}
