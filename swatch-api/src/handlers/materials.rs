//! Material CRUD handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use swatch::{Material, MaterialPatch, NewMaterial, Predicate, Sort};

use super::blocking;
use crate::error::ApiResult;
use crate::models::{DeleteMaterialResponse, ErrorResponse, MaterialListResponse, PageQuery};
use crate::state::AppState;

/// Create a material.
///
/// `materialId` is required and must be unique across the catalog.
#[utoipa::path(
    post,
    path = "/materials",
    tag = "materials",
    request_body = NewMaterial,
    responses(
        (status = 201, description = "Material created", body = Material),
        (status = 400, description = "Missing or duplicate materialId, or malformed body", body = ErrorResponse)
    )
)]
pub async fn create_material(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewMaterial>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Material>)> {
    let Json(new) = payload?;
    let store = state.store();

    let material = blocking(move || store.insert(new)).await?;
    tracing::info!(id = %material.id, material_id = %material.material_id, "Material created");

    Ok((StatusCode::CREATED, Json(material)))
}

/// List materials in insertion order, one page at a time.
#[utoipa::path(
    get,
    path = "/materials",
    tag = "materials",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of materials", body = MaterialListResponse)
    )
)]
pub async fn list_materials(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<MaterialListResponse>> {
    let request = query.page_request();
    let store = state.store();

    let start = Instant::now();
    let page = blocking(move || store.find_page(&Predicate::All, Sort::default(), request)).await?;
    tracing::debug!(
        page = request.page,
        limit = request.limit,
        total = page.total,
        duration_ms = start.elapsed().as_millis() as u64,
        "Listed materials"
    );

    Ok(Json(MaterialListResponse {
        page: request.page,
        limit: request.limit,
        total_items: page.total,
        total_pages: request.total_pages(page.total),
        data: page.items,
    }))
}

/// Fetch one material by its `_id`.
#[utoipa::path(
    get,
    path = "/materials/{id}",
    tag = "materials",
    params(
        ("id" = String, Path, description = "Material `_id`")
    ),
    responses(
        (status = 200, description = "The material", body = Material),
        (status = 404, description = "Material not found", body = ErrorResponse)
    )
)]
pub async fn get_material(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Material>> {
    let store = state.store();
    let material = blocking(move || store.get(&id)).await?;
    Ok(Json(material))
}

/// Merge the provided fields into an existing material.
///
/// Fields absent from the body keep their stored values.
#[utoipa::path(
    put,
    path = "/materials/{id}",
    tag = "materials",
    params(
        ("id" = String, Path, description = "Material `_id`")
    ),
    request_body = MaterialPatch,
    responses(
        (status = 200, description = "Updated material", body = Material),
        (status = 400, description = "Invalid update", body = ErrorResponse),
        (status = 404, description = "Material not found", body = ErrorResponse)
    )
)]
pub async fn update_material(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<MaterialPatch>, JsonRejection>,
) -> ApiResult<Json<Material>> {
    let Json(patch) = payload?;
    let store = state.store();

    let material = blocking(move || store.update(&id, patch)).await?;
    tracing::info!(id = %material.id, "Material updated");

    Ok(Json(material))
}

/// Delete a material by its `_id`.
#[utoipa::path(
    delete,
    path = "/materials/{id}",
    tag = "materials",
    params(
        ("id" = String, Path, description = "Material `_id`")
    ),
    responses(
        (status = 200, description = "Material deleted", body = DeleteMaterialResponse),
        (status = 404, description = "Material not found", body = ErrorResponse)
    )
)]
pub async fn delete_material(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteMaterialResponse>> {
    let store = state.store();
    let deleted_id = id.clone();

    blocking(move || store.delete(&id)).await?;
    tracing::info!(id = %deleted_id, "Material deleted");

    Ok(Json(DeleteMaterialResponse {
        message: "Material deleted successfully".to_string(),
    }))
}
