use super::{fetch_all, QueryResult, ScopedConnection};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// Schema description handed to the SQL-generation prompt.
pub const COMPANY_SCHEMA: &str = "
Table: employees
Columns:
- id (INTEGER PRIMARY KEY)
- name (TEXT)
- department (TEXT)
- salary (REAL)

Table: departments
Columns:
- id (INTEGER PRIMARY KEY)
- name (TEXT)
- budget (REAL)
";

/// Read-only SQL surface over the company database.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SqlStore: Send + Sync {
    /// # Errors
    ///
    /// [`AppError::QueryExecution`] when the statement fails.
    async fn query(&self, sql: &str) -> Result<QueryResult>;
}

/// The employees/departments database file.
#[derive(Debug, Clone)]
pub struct CompanyStore {
    path: PathBuf,
}

impl CompanyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create the tables and insert the sample rows. Safe to run repeatedly.
    pub async fn seed(&self) -> Result<()> {
        let conn = ScopedConnection::open(&self.path).await?;

        let statements = [
            "CREATE TABLE IF NOT EXISTS employees (
                id INTEGER PRIMARY KEY,
                name TEXT,
                department TEXT,
                salary REAL
            )",
            "CREATE TABLE IF NOT EXISTS departments (
                id INTEGER PRIMARY KEY,
                name TEXT,
                budget REAL
            )",
            "INSERT OR IGNORE INTO employees VALUES (1, 'John Doe', 'Engineering', 75000)",
            "INSERT OR IGNORE INTO employees VALUES (2, 'Jane Smith', 'Marketing', 65000)",
            "INSERT OR IGNORE INTO departments VALUES (1, 'Engineering', 1000000)",
            "INSERT OR IGNORE INTO departments VALUES (2, 'Marketing', 500000)",
        ];
        for statement in statements {
            conn.execute(statement, ())
                .await
                .map_err(|e| AppError::Database(format!("Failed to seed company store: {}", e)))?;
        }

        tracing::info!(path = %self.path.display(), "Company store seeded");
        Ok(())
    }
}

#[async_trait]
impl SqlStore for CompanyStore {
    async fn query(&self, sql: &str) -> Result<QueryResult> {
        let conn = ScopedConnection::open_read_only(&self.path).await?;
        fetch_all(&conn, sql, ())
            .await
            .map_err(|e| AppError::QueryExecution(e.to_string()))
    }
}
