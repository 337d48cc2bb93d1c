//! Local libsql stores.
//!
//! Both stores open their database file per call through [`ScopedConnection`];
//! the connection and database handle are dropped when the scope ends, on
//! success and error paths alike.
//!
//! - [`company`] - employees/departments store queried with generated SQL
//! - [`events`] - dated event catalogue used by the recommender

pub mod company;
pub mod events;

pub use company::{CompanyStore, SqlStore};
pub use events::{Event, EventSource, EventStore};

use crate::types::{AppError, Result};
use libsql::{Builder, Connection, Database, OpenFlags};
use std::ops::Deref;
use std::path::Path;

/// A connection to a local database file that lives for one scope.
pub struct ScopedConnection {
    conn: Connection,
    _db: Database,
}

impl ScopedConnection {
    pub async fn open(path: &Path) -> Result<Self> {
        let db = Builder::new_local(path).build().await.map_err(|e| {
            AppError::Database(format!("Failed to open {}: {}", path.display(), e))
        })?;
        let conn = db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?;

        Ok(Self { conn, _db: db })
    }

    /// Open an existing database file without write access. Statements that
    /// modify data fail with `attempt to write a readonly database`.
    pub async fn open_read_only(path: &Path) -> Result<Self> {
        let db = Builder::new_local(path)
            .flags(OpenFlags::SQLITE_OPEN_READ_ONLY)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open {}: {}", path.display(), e)))?;
        let conn = db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?;

        Ok(Self { conn, _db: db })
    }
}

impl Deref for ScopedConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

/// A single value from a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(usize),
}

impl From<libsql::Value> for Cell {
    fn from(value: libsql::Value) -> Self {
        match value {
            libsql::Value::Null => Cell::Null,
            libsql::Value::Integer(i) => Cell::Integer(i),
            libsql::Value::Real(f) => Cell::Real(f),
            libsql::Value::Text(s) => Cell::Text(s),
            libsql::Value::Blob(b) => Cell::Blob(b.len()),
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Null => write!(f, "NULL"),
            Cell::Integer(i) => write!(f, "{}", i),
            // Debug keeps the trailing ".0" on whole numbers (75000.0)
            Cell::Real(r) => write!(f, "{:?}", r),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Blob(len) => write!(f, "<blob {} bytes>", len),
        }
    }
}

/// Column names plus rows of a read query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Run a read query and collect every row.
pub(crate) async fn fetch_all(
    conn: &Connection,
    sql: &str,
    params: impl libsql::params::IntoParams,
) -> std::result::Result<QueryResult, libsql::Error> {
    let mut rows = conn.query(sql, params).await?;

    let column_count = rows.column_count();
    let columns = (0..column_count)
        .map(|i| rows.column_name(i).unwrap_or_default().to_string())
        .collect();

    let mut result = QueryResult {
        columns,
        rows: Vec::new(),
    };
    while let Some(row) = rows.next().await? {
        let mut cells = Vec::with_capacity(column_count as usize);
        for i in 0..column_count {
            cells.push(Cell::from(row.get_value(i)?));
        }
        result.rows.push(cells);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Integer(5).to_string(), "5");
        assert_eq!(Cell::Real(75000.0).to_string(), "75000.0");
        assert_eq!(Cell::Real(0.5).to_string(), "0.5");
        assert_eq!(Cell::Text("Eng".into()).to_string(), "Eng");
        assert_eq!(Cell::Null.to_string(), "NULL");
    }

    #[tokio::test]
    async fn test_fetch_all_keeps_column_names() {
        let dir = tempfile::tempdir().unwrap();
        let conn = ScopedConnection::open(&dir.path().join("t.db")).await.unwrap();
        conn.execute("CREATE TABLE t (id INTEGER, salary REAL)", ())
            .await
            .unwrap();
        conn.execute("INSERT INTO t VALUES (1, 10.5)", ()).await.unwrap();

        let result = fetch_all(&conn, "SELECT id, salary FROM t", ()).await.unwrap();
        assert_eq!(result.columns, vec!["id", "salary"]);
        assert_eq!(result.rows, vec![vec![Cell::Integer(1), Cell::Real(10.5)]]);
    }
}
