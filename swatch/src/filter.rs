//! Filter predicates over material columns.
//!
//! Callers narrow results with `(column, value)` criteria. Criteria are grouped
//! by column: values for the same column are alternatives (OR), while distinct
//! columns must all match (AND). Every comparison is a case-insensitive
//! substring test, and a list column matches when any of its elements does.
//!
//! ```
//! use swatch::filter::{build_filter, FilterCriterion};
//!
//! let predicate = build_filter(&[
//!     FilterCriterion::new("colors", "red"),
//!     FilterCriterion::new("colors", "blue"),
//!     FilterCriterion::new("type", "knit"),
//! ])
//! .unwrap();
//! // (colors ~ red OR colors ~ blue) AND type ~ knit
//! assert_eq!(predicate.to_string(), "((colors ~ \"red\" OR colors ~ \"blue\") AND type ~ \"knit\")");
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::column::{Column, SEARCH_COLUMNS};
use crate::error::Result;
use crate::material::Material;
use crate::sql::{case_insensitive, literal_pattern};

/// Query-string keys that never name a filter column.
pub const RESERVED_QUERY_KEYS: &[&str] = &["page", "limit", "q", "sortField", "sortOrder", "format"];

/// A single `(column, value)` criterion supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FilterCriterion {
    /// Column name, matched case-insensitively
    #[cfg_attr(feature = "openapi", schema(example = "colors"))]
    pub column: String,
    /// Substring to look for, matched case-insensitively
    #[cfg_attr(feature = "openapi", schema(example = "red"))]
    pub value: String,
}

impl FilterCriterion {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Boolean predicate tree evaluated against materials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches every material
    All,
    /// Case-insensitive substring match on one column
    Contains { column: Column, needle: String },
    /// At least one child matches
    Or(Vec<Predicate>),
    /// Every child matches
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn contains(column: Column, needle: impl Into<String>) -> Self {
        Predicate::Contains {
            column,
            needle: needle.into(),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Predicate::All)
    }

    /// Conjunction of `self` and `other`, dropping match-all operands.
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::All, p) | (p, Predicate::All) => p,
            (Predicate::And(mut left), Predicate::And(right)) => {
                left.extend(right);
                Predicate::And(left)
            }
            (Predicate::And(mut left), p) => {
                left.push(p);
                Predicate::And(left)
            }
            (p, Predicate::And(mut right)) => {
                right.insert(0, p);
                Predicate::And(right)
            }
            (left, right) => Predicate::And(vec![left, right]),
        }
    }

    /// Evaluate the predicate in memory.
    pub fn matches(&self, material: &Material) -> bool {
        match self {
            Predicate::All => true,
            // Same matcher as the SQL REGEXP function, so both paths fold case identically
            Predicate::Contains { column, needle } => case_insensitive(&literal_pattern(needle))
                .is_ok_and(|re| material.values(*column).iter().any(|value| re.is_match(value))),
            Predicate::Or(children) => children.iter().any(|p| p.matches(material)),
            Predicate::And(children) => children.iter().all(|p| p.matches(material)),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, children: &[Predicate], op: &str) -> fmt::Result {
            f.write_str("(")?;
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    write!(f, " {} ", op)?;
                }
                write!(f, "{}", child)?;
            }
            f.write_str(")")
        }

        match self {
            Predicate::All => f.write_str("*"),
            Predicate::Contains { column, needle } => write!(f, "{} ~ {:?}", column, needle),
            Predicate::Or(children) => join(f, children, "OR"),
            Predicate::And(children) => join(f, children, "AND"),
        }
    }
}

/// Criteria grouped by resolved column, in order of first appearance.
pub fn group_criteria(criteria: &[FilterCriterion]) -> Result<Vec<(Column, Vec<String>)>> {
    let mut groups: Vec<(Column, Vec<String>)> = Vec::new();

    for criterion in criteria {
        let column: Column = criterion.column.parse()?;
        match groups.iter_mut().find(|(c, _)| *c == column) {
            Some((_, values)) => values.push(criterion.value.clone()),
            None => groups.push((column, vec![criterion.value.clone()])),
        }
    }

    Ok(groups)
}

/// Build the filter predicate for a set of criteria.
///
/// Values of one column are OR-ed, column groups are AND-ed, and an empty
/// criteria set yields [`Predicate::All`]. Unknown column names are rejected.
pub fn build_filter(criteria: &[FilterCriterion]) -> Result<Predicate> {
    let mut clauses: Vec<Predicate> = group_criteria(criteria)?
        .into_iter()
        .map(|(column, values)| {
            let mut alternatives: Vec<Predicate> = values
                .into_iter()
                .map(|value| Predicate::contains(column, value))
                .collect();
            if alternatives.len() == 1 {
                alternatives.remove(0)
            } else {
                Predicate::Or(alternatives)
            }
        })
        .collect();

    Ok(match clauses.len() {
        0 => Predicate::All,
        1 => clauses.remove(0),
        _ => Predicate::And(clauses),
    })
}

/// Free-text predicate: `term` appears in any of the search columns.
///
/// A blank term matches everything.
pub fn search_predicate(term: &str) -> Predicate {
    let term = term.trim();
    if term.is_empty() {
        return Predicate::All;
    }

    Predicate::Or(
        SEARCH_COLUMNS
            .iter()
            .map(|&column| Predicate::contains(column, term))
            .collect(),
    )
}

/// Extract criteria from flattened query parameters of the form `column=v1,v2`.
///
/// Reserved keys (pagination, search and sorting) are skipped. Values are
/// split on commas and trimmed; empty pieces are dropped. The column name is
/// resolved here so unknown columns fail early.
pub fn criteria_from_query(params: &HashMap<String, String>) -> Result<Vec<FilterCriterion>> {
    // Sort keys so the resulting predicate does not depend on map iteration order.
    let mut keys: Vec<&String> = params
        .keys()
        .filter(|key| !RESERVED_QUERY_KEYS.contains(&key.as_str()))
        .collect();
    keys.sort();

    let mut criteria = Vec::new();
    for key in keys {
        let column: Column = key.parse()?;
        criteria.extend(
            params[key]
                .split(',')
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(|value| FilterCriterion::new(column.name(), value)),
        );
    }

    Ok(criteria)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::NewMaterial;

    fn material(material_type: &str, segment: &str) -> Material {
        Material::from_new(
            format!("{}-{}", material_type, segment),
            NewMaterial {
                material_type: material_type.into(),
                segment: segment.into(),
                ..NewMaterial::with_id(format!("MAT-{}-{}", material_type, segment))
            },
        )
    }

    #[test]
    fn test_empty_criteria_match_all() {
        let predicate = build_filter(&[]).unwrap();
        assert_eq!(predicate, Predicate::All);
        assert!(predicate.matches(&material("A", "X")));
    }

    #[test]
    fn test_single_criterion_is_bare_contains() {
        let predicate = build_filter(&[FilterCriterion::new("vendor", "acme")]).unwrap();
        assert_eq!(predicate, Predicate::contains(Column::Vendor, "acme"));
    }

    #[test]
    fn test_groups_by_column() {
        let predicate = build_filter(&[
            FilterCriterion::new("type", "A"),
            FilterCriterion::new("type", "B"),
            FilterCriterion::new("segment", "X"),
        ])
        .unwrap();

        assert_eq!(
            predicate,
            Predicate::And(vec![
                Predicate::Or(vec![
                    Predicate::contains(Column::Type, "A"),
                    Predicate::contains(Column::Type, "B"),
                ]),
                Predicate::contains(Column::Segment, "X"),
            ])
        );

        assert!(predicate.matches(&material("A", "X")));
        assert!(predicate.matches(&material("B", "X")));
        assert!(!predicate.matches(&material("C", "X")));
        assert!(!predicate.matches(&material("A", "Y")));
    }

    #[test]
    fn test_interleaved_criteria_keep_first_seen_order() {
        let groups = group_criteria(&[
            FilterCriterion::new("segment", "X"),
            FilterCriterion::new("Type", "A"),
            FilterCriterion::new("SEGMENT", "Y"),
        ])
        .unwrap();

        assert_eq!(
            groups,
            vec![
                (Column::Segment, vec!["X".to_string(), "Y".to_string()]),
                (Column::Type, vec!["A".to_string()]),
            ]
        );
    }

    #[test]
    fn test_unknown_column_rejected() {
        let result = build_filter(&[FilterCriterion::new("flavour", "mint")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_contains_is_case_insensitive_substring() {
        let m = Material::from_new(
            "id".into(),
            NewMaterial {
                material_composition: "Cotton Knit Blend".into(),
                ..NewMaterial::with_id("MAT-1")
            },
        );

        assert!(search_predicate("knit").matches(&m));
        assert!(search_predicate("KNIT b").matches(&m));
        assert!(!search_predicate("woven").matches(&m));
    }

    #[test]
    fn test_list_column_matches_any_element() {
        let m = Material::from_new(
            "id".into(),
            NewMaterial {
                colors: vec!["Navy".into(), "Crimson Red".into()],
                ..NewMaterial::with_id("MAT-1")
            },
        );

        assert!(Predicate::contains(Column::Colors, "red").matches(&m));
        assert!(!Predicate::contains(Column::Colors, "green").matches(&m));
    }

    #[test]
    fn test_blank_search_matches_all() {
        assert!(search_predicate("   ").is_all());
        assert_eq!(
            search_predicate("x").to_string().matches(" OR ").count(),
            SEARCH_COLUMNS.len() - 1
        );
    }

    #[test]
    fn test_and_flattens_and_drops_all() {
        let a = Predicate::contains(Column::Vendor, "a");
        let b = Predicate::contains(Column::Cost, "b");
        let c = Predicate::contains(Column::Moq, "c");

        assert_eq!(Predicate::All.and(a.clone()), a);
        assert_eq!(a.clone().and(Predicate::All), a);
        assert_eq!(
            Predicate::And(vec![a.clone(), b.clone()]).and(c.clone()),
            Predicate::And(vec![a, b, c])
        );
    }

    #[test]
    fn test_criteria_from_query() {
        let params: HashMap<String, String> = [
            ("page", "2"),
            ("q", "knit"),
            ("colors", "red, blue,,"),
            ("styleno", "S-1"),
            ("segment", " , "),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let criteria = criteria_from_query(&params).unwrap();
        assert_eq!(
            criteria,
            vec![
                FilterCriterion::new("colors", "red"),
                FilterCriterion::new("colors", "blue"),
                FilterCriterion::new("styleNo", "S-1"),
            ]
        );
    }

    #[test]
    fn test_criteria_from_query_rejects_unknown_column() {
        let params: HashMap<String, String> =
            [("flavour".to_string(), "mint".to_string())].into_iter().collect();
        assert!(criteria_from_query(&params).is_err());
    }
}
