//! Column catalogue for material records.
//!
//! Every attribute of a [`Material`](crate::Material) other than its store
//! identifier is a column. Callers name columns in query strings and filter
//! bodies; names resolve case-insensitively so `styleno`, `StyleNo` and
//! `styleNo` all refer to [`Column::StyleNo`].

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A filterable, searchable or sortable material attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    MaterialId,
    StyleNo,
    StyleName,
    Vendor,
    Tat,
    Imported,
    Location,
    MaterialComposition,
    Weight,
    Cost,
    Moq,
    Type,
    Subtype,
    Segment,
    Images,
    Colors,
    Features,
}

/// Columns matched by free-text search.
pub const SEARCH_COLUMNS: &[Column] = &[
    Column::StyleNo,
    Column::StyleName,
    Column::MaterialComposition,
    Column::MaterialId,
    Column::Vendor,
    Column::Tat,
    Column::Imported,
    Column::Location,
    Column::Type,
    Column::Subtype,
    Column::Features,
];

/// Columns reported by the filter-options endpoint.
pub const FILTER_OPTION_COLUMNS: &[Column] = &[
    Column::StyleNo,
    Column::StyleName,
    Column::Vendor,
    Column::Tat,
    Column::Imported,
    Column::Location,
    Column::MaterialComposition,
    Column::Weight,
    Column::Cost,
    Column::Moq,
    Column::Type,
    Column::Subtype,
    Column::Segment,
    Column::Colors,
    Column::Features,
];

/// Columns faceted alongside catalog browsing results.
pub const CATALOG_FACET_COLUMNS: &[Column] = &[
    Column::StyleNo,
    Column::StyleName,
    Column::Vendor,
    Column::Location,
    Column::MaterialComposition,
    Column::Type,
    Column::Subtype,
    Column::Segment,
    Column::Colors,
];

impl Column {
    /// All columns in declaration order.
    pub const ALL: [Column; 17] = [
        Column::MaterialId,
        Column::StyleNo,
        Column::StyleName,
        Column::Vendor,
        Column::Tat,
        Column::Imported,
        Column::Location,
        Column::MaterialComposition,
        Column::Weight,
        Column::Cost,
        Column::Moq,
        Column::Type,
        Column::Subtype,
        Column::Segment,
        Column::Images,
        Column::Colors,
        Column::Features,
    ];

    /// Name used in JSON payloads and query strings.
    pub fn name(self) -> &'static str {
        match self {
            Column::MaterialId => "materialId",
            Column::StyleNo => "styleNo",
            Column::StyleName => "styleName",
            Column::Vendor => "vendor",
            Column::Tat => "tat",
            Column::Imported => "imported",
            Column::Location => "location",
            Column::MaterialComposition => "materialComposition",
            Column::Weight => "weight",
            Column::Cost => "cost",
            Column::Moq => "moq",
            Column::Type => "type",
            Column::Subtype => "subtype",
            Column::Segment => "segment",
            Column::Images => "images",
            Column::Colors => "colors",
            Column::Features => "features",
        }
    }

    /// Name of the backing SQLite column.
    pub fn sql_name(self) -> &'static str {
        match self {
            Column::MaterialId => "material_id",
            Column::StyleNo => "style_no",
            Column::StyleName => "style_name",
            Column::MaterialComposition => "material_composition",
            other => other.name(),
        }
    }

    /// Whether the column holds a list of strings rather than a single string.
    pub fn is_list(self) -> bool {
        matches!(self, Column::Images | Column::Colors | Column::Features)
    }

    /// Resolve a caller-supplied column name, ignoring ASCII case.
    pub fn parse(name: &str) -> Option<Column> {
        let name = name.trim();
        Column::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::parse(s).ok_or_else(|| Error::Validation(format!("Unknown column '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_case() {
        assert_eq!(Column::parse("styleno"), Some(Column::StyleNo));
        assert_eq!(Column::parse("STYLENAME"), Some(Column::StyleName));
        assert_eq!(Column::parse(" type "), Some(Column::Type));
        assert_eq!(Column::parse("colour"), None);
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        let err = "_id".parse::<Column>().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_sql_names_are_unique() {
        let mut names: Vec<&str> = Column::ALL.iter().map(|c| c.sql_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Column::ALL.len());
    }

    #[test]
    fn test_list_columns() {
        let lists: Vec<Column> = Column::ALL.into_iter().filter(|c| c.is_list()).collect();
        assert_eq!(lists, vec![Column::Images, Column::Colors, Column::Features]);
    }
}
