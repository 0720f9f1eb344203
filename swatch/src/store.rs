//! SQLite-backed material store.
//!
//! Materials live in a single `materials` table. Scalar attributes are TEXT
//! columns; list attributes (`images`, `colors`, `features`) are stored as
//! JSON arrays and queried through `json_each`. The `seq` column records
//! insertion order, which is the natural order of every listing.
//!
//! The store owns one connection guarded by a mutex. All methods are
//! blocking; async callers should run them on a blocking thread.
//!
//! # Example
//!
//! ```
//! use swatch::{build_filter, FilterCriterion, MaterialStore, NewMaterial, PageRequest, Sort};
//!
//! let store = MaterialStore::open_in_memory()?;
//! store.insert(NewMaterial {
//!     material_type: "Knit".into(),
//!     ..NewMaterial::with_id("MAT-1")
//! })?;
//!
//! let predicate = build_filter(&[FilterCriterion::new("type", "knit")])?;
//! let page = store.find_page(&predicate, Sort::default(), PageRequest::default())?;
//! assert_eq!(page.total, 1);
//! # Ok::<(), swatch::Error>(())
//! ```

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params_from_iter, Connection, ErrorCode, OptionalExtension, Row, ToSql};

use crate::column::Column;
use crate::error::{Error, Result};
use crate::facets::{build_facets, Facets, Selection};
use crate::filter::Predicate;
use crate::material::{Material, MaterialPatch, NewMaterial};
use crate::pagination::PageRequest;
use crate::sort::Sort;
use crate::sql::{column_ref, compile, register_regexp, TABLE};

/// One page of materials plus the total number of matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialPage {
    pub items: Vec<Material>,
    pub total: u64,
}

/// Durable store of catalog materials.
pub struct MaterialStore {
    conn: Mutex<Connection>,
}

impl MaterialStore {
    /// Open the store named by a connection string.
    ///
    /// Accepts `sqlite://<path>`, a bare filesystem path, or `:memory:`.
    pub fn connect(url: &str) -> Result<Self> {
        let target = url.trim();
        let target = target.strip_prefix("sqlite://").unwrap_or(target);

        if target.is_empty() {
            return Err(Error::Validation("Database URL must not be empty".into()));
        }
        if target == ":memory:" {
            return Self::open_in_memory();
        }
        Self::open(target)
    }

    /// Open (or create) a store backed by the file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        tracing::info!(path = %path.display(), "Opened material store");
        Self::init(conn)
    }

    /// Open a private in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        register_regexp(&conn)?;
        conn.execute_batch(&schema_sql())?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Persist a new material under a freshly generated identifier.
    ///
    /// A blank or already-used `materialId` is a validation error.
    pub fn insert(&self, new: NewMaterial) -> Result<Material> {
        new.validate()?;

        let material = Material::from_new(uuid::Uuid::new_v4().to_string(), new);
        let values = column_values(&material)?;

        let names: Vec<String> = Column::ALL
            .iter()
            .map(|c| format!("\"{}\"", c.sql_name()))
            .collect();
        let placeholders = vec!["?"; Column::ALL.len() + 1];
        let sql = format!(
            "INSERT INTO {} (\"id\", {}) VALUES ({})",
            TABLE,
            names.join(", "),
            placeholders.join(", ")
        );

        let conn = self.conn.lock();
        conn.execute(
            &sql,
            params_from_iter(std::iter::once(&material.id).chain(values.iter())),
        )
        .map_err(|e| map_write_error(e, &material.material_id))?;

        tracing::debug!(id = %material.id, material_id = %material.material_id, "Material inserted");
        Ok(material)
    }

    /// Fetch a material by its store identifier.
    pub fn get(&self, id: &str) -> Result<Material> {
        let conn = self.conn.lock();
        fetch(&conn, id)?.ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Merge `patch` into the material with identifier `id`.
    pub fn update(&self, id: &str, patch: MaterialPatch) -> Result<Material> {
        patch.validate()?;

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let mut material = fetch(&tx, id)?.ok_or_else(|| Error::NotFound(id.to_string()))?;
        material.apply(patch);
        let values = column_values(&material)?;

        let assignments: Vec<String> = Column::ALL
            .iter()
            .map(|c| format!("\"{}\" = ?", c.sql_name()))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE \"id\" = ?",
            TABLE,
            assignments.join(", ")
        );

        tx.execute(
            &sql,
            params_from_iter(values.iter().chain(std::iter::once(&material.id))),
        )
        .map_err(|e| map_write_error(e, &material.material_id))?;
        tx.commit()?;

        tracing::debug!(id = %material.id, "Material updated");
        Ok(material)
    }

    /// Remove the material with identifier `id`.
    pub fn delete(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock();
        let deleted = conn.execute(&format!("DELETE FROM {} WHERE \"id\" = ?", TABLE), [id])?;
        if deleted == 0 {
            return Err(Error::NotFound(id.to_string()));
        }

        tracing::debug!(id = %id, "Material deleted");
        Ok(())
    }

    /// Number of materials matching `predicate`.
    pub fn count(&self, predicate: &Predicate) -> Result<u64> {
        let conn = self.conn.lock();
        count_matching(&conn, predicate)
    }

    /// One page of materials matching `predicate`, plus the total match count.
    ///
    /// Both figures are read under the same lock so they agree with each other.
    pub fn find_page(&self, predicate: &Predicate, sort: Sort, page: PageRequest) -> Result<MaterialPage> {
        let start = Instant::now();
        let conn = self.conn.lock();

        let cond = compile(predicate);
        let sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY {} LIMIT ? OFFSET ?",
            select_list(),
            TABLE,
            cond.clause,
            order_by(sort)
        );

        let limit = i64::try_from(page.limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
        let mut params: Vec<&dyn ToSql> = cond.params.iter().map(|p| p as &dyn ToSql).collect();
        params.push(&limit);
        params.push(&offset);

        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(params), read_material)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        let total = count_matching(&conn, predicate)?;

        tracing::debug!(
            predicate = %predicate,
            page = page.page,
            limit = page.limit,
            returned = items.len(),
            total = total,
            query_duration_ms = start.elapsed().as_millis() as u64,
            "Material page query completed"
        );

        Ok(MaterialPage { items, total })
    }

    /// Distinct non-empty values of `column`, ascending.
    ///
    /// List columns contribute each element. With `scope`, only materials
    /// matching the predicate are considered.
    pub fn distinct(&self, column: Column, scope: Option<&Predicate>) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        distinct_values(&conn, column, scope.unwrap_or(&Predicate::All))
    }

    /// Facets for `columns`, with selection flags from `selection`.
    pub fn facets(
        &self,
        columns: &[Column],
        selection: &Selection,
        scope: Option<&Predicate>,
    ) -> Result<Facets> {
        let start = Instant::now();
        let scope = scope.unwrap_or(&Predicate::All);
        let conn = self.conn.lock();

        let facets = build_facets(columns, selection, |column| {
            distinct_values(&conn, column, scope)
        })?;

        tracing::debug!(
            columns = columns.len(),
            query_duration_ms = start.elapsed().as_millis() as u64,
            "Facet queries completed"
        );
        Ok(facets)
    }
}

fn schema_sql() -> String {
    let mut defs = vec![
        "\"seq\" INTEGER PRIMARY KEY AUTOINCREMENT".to_string(),
        "\"id\" TEXT NOT NULL UNIQUE".to_string(),
    ];
    for column in Column::ALL {
        let def = match column {
            Column::MaterialId => format!("\"{}\" TEXT NOT NULL UNIQUE", column.sql_name()),
            c if c.is_list() => format!("\"{}\" TEXT NOT NULL DEFAULT '[]'", c.sql_name()),
            c => format!("\"{}\" TEXT NOT NULL DEFAULT ''", c.sql_name()),
        };
        defs.push(def);
    }
    format!("CREATE TABLE IF NOT EXISTS {} ({});", TABLE, defs.join(", "))
}

/// Column list matching [`read_material`]'s positional reads.
fn select_list() -> String {
    let mut cols = vec![format!("{}.\"id\"", TABLE)];
    cols.extend(Column::ALL.iter().map(|c| column_ref(*c)));
    cols.join(", ")
}

fn order_by(sort: Sort) -> String {
    let seq = format!("{}.\"seq\"", TABLE);
    match sort.column {
        Some(column) => format!("{} {}, {} ASC", column_ref(column), sort.order.sql(), seq),
        None => format!("{} {}", seq, sort.order.sql()),
    }
}

/// SQL values for every column of `material`, in [`Column::ALL`] order.
fn column_values(material: &Material) -> Result<Vec<String>> {
    Column::ALL
        .iter()
        .map(|&column| {
            let values = material.values(column);
            if column.is_list() {
                Ok(serde_json::to_string(values)?)
            } else {
                Ok(values[0].clone())
            }
        })
        .collect()
}

fn read_material(row: &Row) -> rusqlite::Result<Material> {
    let list = |idx: usize| -> rusqlite::Result<Vec<String>> {
        let raw: String = row.get(idx)?;
        serde_json::from_str(&raw)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    };

    Ok(Material {
        id: row.get(0)?,
        material_id: row.get(1)?,
        style_no: row.get(2)?,
        style_name: row.get(3)?,
        vendor: row.get(4)?,
        tat: row.get(5)?,
        imported: row.get(6)?,
        location: row.get(7)?,
        material_composition: row.get(8)?,
        weight: row.get(9)?,
        cost: row.get(10)?,
        moq: row.get(11)?,
        material_type: row.get(12)?,
        subtype: row.get(13)?,
        segment: row.get(14)?,
        images: list(15)?,
        colors: list(16)?,
        features: list(17)?,
    })
}

fn fetch(conn: &Connection, id: &str) -> Result<Option<Material>> {
    let sql = format!("SELECT {} FROM {} WHERE \"id\" = ?", select_list(), TABLE);
    Ok(conn.query_row(&sql, [id], read_material).optional()?)
}

fn count_matching(conn: &Connection, predicate: &Predicate) -> Result<u64> {
    let cond = compile(predicate);
    let sql = format!("SELECT COUNT(*) FROM {} WHERE {}", TABLE, cond.clause);
    let count: i64 = conn.query_row(&sql, params_from_iter(cond.params.iter()), |row| row.get(0))?;
    Ok(count as u64)
}

fn distinct_values(conn: &Connection, column: Column, scope: &Predicate) -> Result<Vec<String>> {
    let cond = compile(scope);
    let sql = if column.is_list() {
        format!(
            "SELECT DISTINCT facet.value FROM {}, json_each({}) AS facet \
             WHERE ({}) AND facet.value <> '' ORDER BY facet.value",
            TABLE,
            column_ref(column),
            cond.clause
        )
    } else {
        let col = column_ref(column);
        format!(
            "SELECT DISTINCT {col} FROM {} WHERE ({}) AND {col} <> '' ORDER BY {col}",
            TABLE, cond.clause
        )
    };

    let mut stmt = conn.prepare(&sql)?;
    let values = stmt
        .query_map(params_from_iter(cond.params.iter()), |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(values)
}

/// Translate a uniqueness violation into a validation error.
fn map_write_error(err: rusqlite::Error, material_id: &str) -> Error {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            Error::Validation(format!("materialId '{}' already exists", material_id))
        }
        _ => err.into(),
    }
}
