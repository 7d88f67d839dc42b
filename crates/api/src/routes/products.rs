//! Product catalogue endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use domain::{Product, ProductDraft, ProductId, ProductPatch, StockStatus};
use projections::{InventoryStats, ProductFilters};
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;

/// Query string of the product list. `all` or an empty value disables a filter.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

impl ProductQuery {
    fn into_filters(self) -> Result<ProductFilters, ApiError> {
        let mut filters = ProductFilters::new().search(self.search.unwrap_or_default());
        if let Some(category) = active(self.category) {
            filters = filters.category(category);
        }
        if let Some(status) = active(self.status) {
            let status: StockStatus = status
                .parse()
                .map_err(|e: domain::DomainError| ApiError::BadRequest(e.to_string()))?;
            filters = filters.status(status);
        }
        Ok(filters)
    }
}

fn active(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && v != "all")
}

/// GET /products: list products matching the search, category and status filters.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let filters = query.into_filters()?;
    Ok(Json(state.store.get_filtered_products(&filters).await))
}

/// POST /products: add a product to the catalogue.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProductDraft>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state.store.add_product(req).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /products/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.store.product(&ProductId::new(id)).await?))
}

/// PATCH /products/{id}: merge the present fields into the product.
#[tracing::instrument(skip(state, patch))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .store
        .update_product(&ProductId::new(id), patch)
        .await?;
    Ok(Json(product))
}

/// DELETE /products/{id}: returns the removed product.
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.store.delete_product(&ProductId::new(id)).await?))
}

pub async fn low_stock(State(state): State<Arc<AppState>>) -> Json<Vec<Product>> {
    Json(state.store.get_low_stock_products().await)
}

pub async fn out_of_stock(State(state): State<Arc<AppState>>) -> Json<Vec<Product>> {
    Json(state.store.get_out_of_stock_products().await)
}

/// GET /products/stats: catalogue totals for the dashboard cards.
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<InventoryStats> {
    Json(state.store.get_inventory_stats().await)
}
