//! Health check.

use std::sync::Arc;

use axum::{extract::State, Json};
use swatch::Predicate;

use super::blocking;
use crate::error::ApiResult;
use crate::models::{ErrorResponse, HealthResponse};
use crate::state::AppState;

/// Service status, version and catalog size.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> ApiResult<Json<HealthResponse>> {
    let store = state.store();
    let total_materials = blocking(move || store.count(&Predicate::All)).await?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        total_materials,
    }))
}
