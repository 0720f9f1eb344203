//! Swatch: a queryable catalog of fabric and style materials
//!
//! This crate holds everything below the HTTP layer: the [`Material`] model,
//! the column catalogue, filter predicates and their SQL compilation,
//! pagination, facet construction, and the SQLite-backed [`MaterialStore`].
//!
//! Filtering follows one rule: criteria naming the same column are OR-ed,
//! criteria naming different columns are AND-ed (see [`filter`]).

pub mod column;
pub mod error;
pub mod facets;
pub mod filter;
pub mod material;
pub mod pagination;
pub mod sort;
pub mod sql;
pub mod store;

pub use column::{Column, CATALOG_FACET_COLUMNS, FILTER_OPTION_COLUMNS, SEARCH_COLUMNS};
pub use error::{Error, Result};
pub use facets::{FacetFlags, FacetValue, Facets, Selection};
pub use filter::{build_filter, criteria_from_query, search_predicate, FilterCriterion, Predicate};
pub use material::{Material, MaterialPatch, NewMaterial};
pub use pagination::PageRequest;
pub use sort::{Sort, SortOrder};
pub use store::{MaterialPage, MaterialStore};
