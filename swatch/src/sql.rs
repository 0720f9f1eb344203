//! Compilation of [`Predicate`] trees into SQLite `WHERE` clauses.
//!
//! Substring tests are expressed with the `REGEXP` operator over an escaped,
//! case-insensitive pattern. SQLite has no built-in `REGEXP`, so
//! [`register_regexp`] installs one backed by the `regex` crate on every
//! connection the store opens.

use regex::{Regex, RegexBuilder};
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

use crate::column::Column;
use crate::filter::Predicate;

/// Table holding one row per material.
pub(crate) const TABLE: &str = "materials";

/// A compiled `WHERE` clause and its positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlCondition {
    pub clause: String,
    pub params: Vec<String>,
}

/// Fully qualified reference to a column of the materials table.
///
/// Qualification matters: `json_each` exposes its own `type`, `id` and
/// `value` columns.
pub(crate) fn column_ref(column: Column) -> String {
    format!("{}.\"{}\"", TABLE, column.sql_name())
}

/// Pattern that matches `needle` literally.
pub(crate) fn literal_pattern(needle: &str) -> String {
    regex::escape(needle)
}

/// Case-insensitive regex used by `REGEXP` and by in-memory evaluation alike.
pub(crate) fn case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Compile a predicate into a parameterised SQL condition.
pub fn compile(predicate: &Predicate) -> SqlCondition {
    let mut params = Vec::new();
    let clause = compile_into(predicate, &mut params);
    SqlCondition { clause, params }
}

fn compile_into(predicate: &Predicate, params: &mut Vec<String>) -> String {
    match predicate {
        Predicate::All => "1 = 1".to_string(),
        Predicate::Contains { column, needle } => {
            params.push(literal_pattern(needle));
            if column.is_list() {
                format!(
                    "EXISTS (SELECT 1 FROM json_each({}) AS je WHERE je.value REGEXP ?)",
                    column_ref(*column)
                )
            } else {
                format!("{} REGEXP ?", column_ref(*column))
            }
        }
        Predicate::Or(children) => join(children, " OR ", "1 = 0", params),
        Predicate::And(children) => join(children, " AND ", "1 = 1", params),
    }
}

fn join(children: &[Predicate], op: &str, empty: &str, params: &mut Vec<String>) -> String {
    if children.is_empty() {
        return empty.to_string();
    }
    let parts: Vec<String> = children.iter().map(|c| compile_into(c, params)).collect();
    format!("({})", parts.join(op))
}

/// Register a case-insensitive `REGEXP` function on `conn`.
///
/// `X REGEXP Y` invokes `regexp(Y, X)`, so argument 0 is the pattern. The
/// compiled pattern is cached per statement through SQLite's auxiliary data.
/// NULL subjects never match.
pub(crate) fn register_regexp(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "regexp",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let re = ctx.get_or_create_aux(0, |pattern| -> Result<Regex, regex::Error> {
                case_insensitive(pattern.as_str().unwrap_or_default())
            })?;
            let text: Option<String> = ctx.get(1)?;

            Ok(text.is_some_and(|text| re.is_match(&text)))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{build_filter, FilterCriterion};

    #[test]
    fn test_compile_all() {
        let cond = compile(&Predicate::All);
        assert_eq!(cond.clause, "1 = 1");
        assert!(cond.params.is_empty());
    }

    #[test]
    fn test_compile_grouped_filter() {
        let predicate = build_filter(&[
            FilterCriterion::new("type", "A"),
            FilterCriterion::new("type", "B"),
            FilterCriterion::new("styleNo", "S.1"),
        ])
        .unwrap();

        let cond = compile(&predicate);
        assert_eq!(
            cond.clause,
            "((materials.\"type\" REGEXP ? OR materials.\"type\" REGEXP ?) \
             AND materials.\"style_no\" REGEXP ?)"
        );
        // Needles are matched literally
        assert_eq!(cond.params, vec!["A", "B", "S\\.1"]);
    }

    #[test]
    fn test_compile_list_column() {
        let cond = compile(&Predicate::contains(Column::Colors, "red"));
        assert_eq!(
            cond.clause,
            "EXISTS (SELECT 1 FROM json_each(materials.\"colors\") AS je WHERE je.value REGEXP ?)"
        );
        assert_eq!(cond.params, vec!["red"]);
    }

    #[test]
    fn test_empty_groups() {
        assert_eq!(compile(&Predicate::Or(vec![])).clause, "1 = 0");
        assert_eq!(compile(&Predicate::And(vec![])).clause, "1 = 1");
    }

    #[test]
    fn test_regexp_function() {
        let conn = Connection::open_in_memory().unwrap();
        register_regexp(&conn).unwrap();

        let matched: bool = conn
            .query_row("SELECT 'Cotton Knit Blend' REGEXP ?", ["knit"], |row| row.get(0))
            .unwrap();
        assert!(matched);

        let matched: bool = conn
            .query_row("SELECT NULL REGEXP ?", ["knit"], |row| row.get(0))
            .unwrap();
        assert!(!matched);
    }
}
