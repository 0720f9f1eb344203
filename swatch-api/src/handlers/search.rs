//! Search handlers.
//!
//! `GET /search` is plain free-text search. `GET /` is the catalog view:
//! free-text search AND column filters, sorted, with facets attached.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Query, State},
    Json,
};
use swatch::{
    build_filter, criteria_from_query, search_predicate, PageRequest, Selection, Sort,
    CATALOG_FACET_COLUMNS,
};

use super::blocking;
use crate::error::ApiResult;
use crate::models::{ErrorResponse, MaterialPageResponse, SearchQuery};
use crate::state::AppState;

/// Free-text search across the descriptive columns.
///
/// Matches are case-insensitive substrings; the term is taken literally.
#[utoipa::path(
    get,
    path = "/search",
    tag = "search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Page of matching materials", body = MaterialPageResponse)
    )
)]
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<MaterialPageResponse>> {
    let request = query.page_request();
    let term = query.q.unwrap_or_default();
    let predicate = search_predicate(&term);
    let store = state.store();

    let start = Instant::now();
    let page = blocking(move || store.find_page(&predicate, Sort::default(), request)).await?;
    tracing::info!(
        term = %term,
        total = page.total,
        duration_ms = start.elapsed().as_millis() as u64,
        "Search completed"
    );

    Ok(Json(MaterialPageResponse::new(request, page.total, page.items)))
}

/// Catalog listing: search, filter, sort and facets in one call.
///
/// Every query key other than `q`, `page`, `limit`, `sortField`,
/// `sortOrder` and `format` names a column, with comma-separated values.
/// `filterOptions` always covers the whole catalog.
#[utoipa::path(
    get,
    path = "/",
    tag = "search",
    params(
        ("q" = Option<String>, Query, description = "Free-text search term"),
        ("page" = Option<String>, Query, description = "1-based page number (default: 1)"),
        ("limit" = Option<String>, Query, description = "Page size (default: 10)"),
        ("sortField" = Option<String>, Query, description = "Column to sort by; `_id` or absent keeps insertion order"),
        ("sortOrder" = Option<String>, Query, description = "`desc` for descending, anything else ascending")
    ),
    responses(
        (status = 200, description = "Page of materials with catalog facets", body = MaterialPageResponse),
        (status = 400, description = "Unknown filter or sort column", body = ErrorResponse)
    )
)]
pub async fn catalog(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<MaterialPageResponse>> {
    let param = |key: &str| params.get(key).map(String::as_str);

    let request = PageRequest::from_query(param("page"), param("limit"));
    let sort = Sort::parse(param("sortField"), param("sortOrder"))?;
    let criteria = criteria_from_query(&params)?;
    let selection = Selection::from_criteria(&criteria)?;
    let predicate = search_predicate(param("q").unwrap_or_default()).and(build_filter(&criteria)?);

    tracing::debug!(predicate = %predicate, "Catalog query");

    let store = state.store();
    let start = Instant::now();
    let (page, facets) = blocking(move || {
        let page = store.find_page(&predicate, sort, request)?;
        let facets = store.facets(CATALOG_FACET_COLUMNS, &selection, None)?;
        Ok((page, facets))
    })
    .await?;

    tracing::info!(
        criteria = criteria.len(),
        total = page.total,
        duration_ms = start.elapsed().as_millis() as u64,
        "Catalog query completed"
    );

    let mut response = MaterialPageResponse::new(request, page.total, page.items);
    response.filter_options = Some(facets);
    Ok(Json(response))
}
