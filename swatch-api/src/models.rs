//! Request and response models for the swatch API.
//!
//! Material records themselves come from the `swatch` crate; this module
//! defines the envelopes around them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use swatch::{FacetValue, FilterCriterion, Material, PageRequest};
use utoipa::{IntoParams, ToSchema};

pub use crate::error::ErrorResponse;

// =============================================================================
// Query strings
// =============================================================================

/// Pagination parameters. Values are parsed leniently: anything that is not
/// a positive integer falls back to the default.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number (default: 1)
    #[param(example = "1")]
    pub page: Option<String>,
    /// Page size (default: 10)
    #[param(example = "10")]
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::from_query(self.page.as_deref(), self.limit.as_deref())
    }
}

/// Free-text search parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Search term; blank matches everything
    #[param(example = "knit")]
    pub q: Option<String>,
    /// 1-based page number (default: 1)
    pub page: Option<String>,
    /// Page size (default: 10)
    pub limit: Option<String>,
}

impl SearchQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::from_query(self.page.as_deref(), self.limit.as_deref())
    }
}

/// Image proxy parameters.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProxyQuery {
    /// Absolute http(s) URL of the image to fetch
    #[param(example = "https://cdn.example.com/swatches/mat-1001.jpg")]
    pub url: Option<String>,
}

// =============================================================================
// Request bodies
// =============================================================================

/// Body of `POST /products/filtered`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct FilteredRequest {
    /// Criteria; same-column values are OR-ed, distinct columns AND-ed
    #[serde(default)]
    pub filters: Vec<FilterCriterion>,
}

// =============================================================================
// Responses
// =============================================================================

/// Page of materials returned by `GET /materials`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialListResponse {
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub limit: u64,
    /// Number of stored materials
    #[schema(example = 42)]
    pub total_items: u64,
    /// `ceil(totalItems / limit)`
    #[schema(example = 5)]
    pub total_pages: u64,
    pub data: Vec<Material>,
}

/// Page of matching materials returned by search, filter and catalog queries.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialPageResponse {
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub limit: u64,
    /// Number of materials matching the query
    #[schema(example = 7)]
    pub total_materials: u64,
    /// `ceil(totalMaterials / limit)`
    #[schema(example = 1)]
    pub total_pages: u64,
    pub data: Vec<Material>,
    /// Facets over the catalog columns (catalog endpoint only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_options: Option<BTreeMap<String, Vec<FacetValue>>>,
}

impl MaterialPageResponse {
    pub fn new(request: PageRequest, total: u64, data: Vec<Material>) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total_materials: total,
            total_pages: request.total_pages(total),
            data,
            filter_options: None,
        }
    }
}

/// Response after deleting a material.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteMaterialResponse {
    #[schema(example = "Material deleted successfully")]
    pub message: String,
}

/// Distinct values per filterable column.
///
/// The default shape lists `{value, selected}` objects; with `format=map`
/// each value maps straight to its selected flag.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum FilterOptionsResponse {
    List(BTreeMap<String, Vec<FacetValue>>),
    Map(BTreeMap<String, BTreeMap<String, bool>>),
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    #[schema(example = 42)]
    pub total_materials: u64,
}
