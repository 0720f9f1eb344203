//! Column filter and filter-option handlers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use swatch::{build_filter, criteria_from_query, facets, Selection, Sort, FILTER_OPTION_COLUMNS};

use super::blocking;
use crate::error::ApiResult;
use crate::models::{ErrorResponse, FilterOptionsResponse, FilteredRequest, MaterialPageResponse, PageQuery};
use crate::state::AppState;

/// Filter materials by column criteria.
///
/// Criteria on the same column are alternatives; criteria on different
/// columns must all hold. An empty list returns every material.
#[utoipa::path(
    post,
    path = "/products/filtered",
    tag = "filter",
    params(PageQuery),
    request_body = FilteredRequest,
    responses(
        (status = 200, description = "Page of matching materials", body = MaterialPageResponse),
        (status = 400, description = "Unknown column or malformed body", body = ErrorResponse)
    )
)]
pub async fn filter_materials(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
    payload: Result<Json<FilteredRequest>, JsonRejection>,
) -> ApiResult<Json<MaterialPageResponse>> {
    let Json(req) = payload?;
    let request = query.page_request();
    let predicate = build_filter(&req.filters)?;
    let store = state.store();

    let start = Instant::now();
    let page = blocking(move || store.find_page(&predicate, Sort::default(), request)).await?;
    tracing::info!(
        criteria = req.filters.len(),
        total = page.total,
        duration_ms = start.elapsed().as_millis() as u64,
        "Filter query completed"
    );

    Ok(Json(MaterialPageResponse::new(request, page.total, page.items)))
}

/// Distinct values of every filterable column.
///
/// Column keys in the query string (`colors=Red,Blue`) mark matching values
/// as selected. `format=map` returns `{column: {value: selected}}` instead of
/// lists of `{value, selected}`.
#[utoipa::path(
    get,
    path = "/filter-options",
    tag = "filter",
    params(
        ("format" = Option<String>, Query, description = "`map` for the value-to-selected shape")
    ),
    responses(
        (status = 200, description = "Distinct values per column", body = FilterOptionsResponse),
        (status = 400, description = "Unknown column", body = ErrorResponse)
    )
)]
pub async fn filter_options(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<FilterOptionsResponse>> {
    let as_map = params
        .get("format")
        .is_some_and(|f| f.trim().eq_ignore_ascii_case("map"));
    let selection = Selection::from_criteria(&criteria_from_query(&params)?)?;
    let store = state.store();

    let options = blocking(move || store.facets(FILTER_OPTION_COLUMNS, &selection, None)).await?;

    Ok(Json(if as_map {
        FilterOptionsResponse::Map(facets::to_flags(&options))
    } else {
        FilterOptionsResponse::List(options)
    }))
}
