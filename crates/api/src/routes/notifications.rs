//! Notification queue endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use domain::{Notification, NotificationId};
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;

/// The notification to show now and for how long.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentNotification {
    pub notification: Option<Notification>,
    pub display_ms: u64,
}

/// GET /notifications: every queued notification, oldest first.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<Notification>> {
    Json(state.store.notifications().await)
}

pub async fn current(State(state): State<Arc<AppState>>) -> Json<CurrentNotification> {
    Json(CurrentNotification {
        notification: state.store.current_notification().await,
        display_ms: state.notification_display_ms,
    })
}

/// DELETE /notifications/{id}: dismiss a notification once shown.
#[tracing::instrument(skip(state))]
pub async fn dismiss(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Notification>, ApiError> {
    let uuid = uuid::Uuid::parse_str(&id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid notification id: {e}")))?;
    state
        .store
        .dismiss_notification(NotificationId::from_uuid(uuid))
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Notification {id} not found")))
}
