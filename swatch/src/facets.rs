//! Facet (filter option) construction.
//!
//! A facet is the distinct value set of one column, each value flagged as
//! `selected` when the caller's active filter names it exactly. Columns
//! without any value are still reported, with an empty set, so clients can
//! render them as present but empty.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::error::Result;
use crate::filter::{group_criteria, FilterCriterion};

/// One distinct column value and whether the caller has it selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FacetValue {
    pub value: String,
    pub selected: bool,
}

/// Column name to its annotated values.
pub type Facets = BTreeMap<String, Vec<FacetValue>>;

/// Column name to a value -> selected map.
pub type FacetFlags = BTreeMap<String, BTreeMap<String, bool>>;

/// Active filter values per column, built from caller criteria.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    by_column: HashMap<Column, HashSet<String>>,
}

impl Selection {
    pub fn from_criteria(criteria: &[FilterCriterion]) -> Result<Self> {
        let by_column = group_criteria(criteria)?
            .into_iter()
            .map(|(column, values)| (column, values.into_iter().collect()))
            .collect();
        Ok(Self { by_column })
    }

    pub fn is_selected(&self, column: Column, value: &str) -> bool {
        self.by_column
            .get(&column)
            .is_some_and(|values| values.contains(value))
    }
}

/// Annotate the distinct values of one column.
pub fn annotate(column: Column, values: Vec<String>, selection: &Selection) -> Vec<FacetValue> {
    values
        .into_iter()
        .map(|value| FacetValue {
            selected: selection.is_selected(column, &value),
            value,
        })
        .collect()
}

/// Build facets for `columns`, fetching each column's distinct values with
/// `distinct`. Every requested column appears in the result.
pub fn build_facets<F>(columns: &[Column], selection: &Selection, mut distinct: F) -> Result<Facets>
where
    F: FnMut(Column) -> Result<Vec<String>>,
{
    let mut facets = Facets::new();
    for &column in columns {
        let values = distinct(column)?;
        facets.insert(column.name().to_string(), annotate(column, values, selection));
    }
    Ok(facets)
}

/// Reshape facets into the value -> selected map form.
pub fn to_flags(facets: &Facets) -> FacetFlags {
    facets
        .iter()
        .map(|(column, values)| {
            let flags = values
                .iter()
                .map(|v| (v.value.clone(), v.selected))
                .collect();
            (column.clone(), flags)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(criteria: &[(&str, &str)]) -> Selection {
        let criteria: Vec<FilterCriterion> = criteria
            .iter()
            .map(|(c, v)| FilterCriterion::new(*c, *v))
            .collect();
        Selection::from_criteria(&criteria).unwrap()
    }

    #[test]
    fn test_marks_selected_values() {
        let sel = selection(&[("colors", "red"), ("Colors", "blue"), ("type", "Knit")]);
        let values = annotate(
            Column::Colors,
            vec!["blue".into(), "green".into(), "red".into()],
            &sel,
        );

        let selected: Vec<&str> = values
            .iter()
            .filter(|v| v.selected)
            .map(|v| v.value.as_str())
            .collect();
        assert_eq!(selected, vec!["blue", "red"]);
    }

    #[test]
    fn test_selection_is_per_column() {
        let sel = selection(&[("vendor", "Acme")]);
        assert!(sel.is_selected(Column::Vendor, "Acme"));
        assert!(!sel.is_selected(Column::Location, "Acme"));
        assert!(!sel.is_selected(Column::Vendor, "acme"));
    }

    #[test]
    fn test_empty_column_still_present() {
        let facets = build_facets(
            &[Column::Vendor, Column::Segment],
            &Selection::default(),
            |column| {
                Ok(match column {
                    Column::Vendor => vec!["Acme".to_string()],
                    _ => Vec::new(),
                })
            },
        )
        .unwrap();

        assert_eq!(facets.len(), 2);
        assert!(facets["segment"].is_empty());
        assert_eq!(facets["vendor"][0].value, "Acme");

        let flags = to_flags(&facets);
        assert!(flags["segment"].is_empty());
        assert_eq!(flags["vendor"].get("Acme"), Some(&false));
    }
}
