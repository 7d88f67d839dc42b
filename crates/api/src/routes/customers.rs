//! Customer endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use domain::{Customer, CustomerDraft, CustomerId, CustomerPatch};
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: String,
}

/// GET /customers: customers whose name, phone or email contain `search`.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Customer>> {
    Json(state.store.search_customers(&query.search).await)
}

#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CustomerDraft>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    let customer = state.store.add_customer(req).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

#[tracing::instrument(skip(state, patch))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<CustomerPatch>,
) -> Result<Json<Customer>, ApiError> {
    let customer = state
        .store
        .update_customer(&CustomerId::new(id), patch)
        .await?;
    Ok(Json(customer))
}

/// DELETE /customers/{id}: past sales keep the customer's name.
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Customer>, ApiError> {
    Ok(Json(state.store.delete_customer(&CustomerId::new(id)).await?))
}
