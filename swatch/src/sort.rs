//! Result ordering.

use crate::column::Column;
use crate::error::{Error, Result};

/// Sort field name meaning "natural (insertion) order".
pub const NATURAL_SORT_FIELD: &str = "_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// `desc` (any case) sorts descending; anything else ascends.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.trim().eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    pub(crate) fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Ordering of a query. `column: None` keeps insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub column: Option<Column>,
    pub order: SortOrder,
}

impl Sort {
    pub fn by(column: Column, order: SortOrder) -> Self {
        Self {
            column: Some(column),
            order,
        }
    }

    /// Parse `sortField`/`sortOrder` query values.
    pub fn parse(field: Option<&str>, order: Option<&str>) -> Result<Self> {
        let order = SortOrder::parse(order);
        let column = match field.map(str::trim) {
            None | Some("") | Some(NATURAL_SORT_FIELD) => None,
            Some(name) => Some(
                Column::parse(name)
                    .ok_or_else(|| Error::Validation(format!("Cannot sort by unknown field '{}'", name)))?,
            ),
        };
        Ok(Self { column, order })
    }
}
