//! SQLite-backed record and catalog sources.
//!
//! Each fetch opens a fresh read-only connection on a blocking thread via
//! `tokio::task::spawn_blocking`; the pipeline runs once per day, so
//! connection reuse buys nothing. Table and column names come from
//! configuration and are quoted as identifiers, never interpolated raw.

use opspulse_domain::{
    CategoryCatalog, ColumnMap, OpsPulseError, RawRecord, Result, SqliteSourceConfig,
};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row};
use tokio::task;

use crate::errors::InfraError;
use opspulse_core::{CatalogSource, RecordSource};
use async_trait::async_trait;

/// Reads raw interaction rows from a configured SQLite table.
pub struct SqliteRecordSource {
    path: String,
    table: String,
    columns: ColumnMap,
}

impl SqliteRecordSource {
    pub fn new(config: &SqliteSourceConfig) -> Result<Self> {
        Ok(Self {
            path: config.path.clone(),
            table: quote_ident(&config.table)?,
            columns: config.columns.clone(),
        })
    }
}

#[async_trait]
impl RecordSource for SqliteRecordSource {
    async fn fetch_records(&self) -> Result<Vec<RawRecord>> {
        let path = self.path.clone();
        let table = self.table.clone();
        let columns = self.columns.clone();

        task::spawn_blocking(move || -> Result<Vec<RawRecord>> {
            let conn = open_read_only(&path)?;
            let sql = format!(
                "SELECT {ts}, {emp}, {cat}, {phone}, {status}, {comment} FROM {table} ORDER BY rowid",
                ts = quote_ident(&columns.timestamp)?,
                emp = quote_ident(&columns.employee)?,
                cat = quote_ident(&columns.category)?,
                phone = quote_ident(&columns.phone)?,
                status = quote_ident(&columns.status)?,
                comment = quote_ident(&columns.comment)?,
            );

            let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(RawRecord {
                        timestamp: text_at(row, 0),
                        employee: text_at(row, 1),
                        category: text_at(row, 2),
                        phone: text_at(row, 3),
                        status: text_at(row, 4),
                        comment: text_at(row, 5),
                    })
                })
                .map_err(map_sql_error)?;

            let mut records = Vec::new();
            for row in rows {
                records.push(row.map_err(map_sql_error)?);
            }
            tracing::debug!(count = records.len(), "fetched records from sqlite");
            Ok(records)
        })
        .await
        .map_err(map_join_error)?
    }
}

/// Loads the category catalog from a two-column `code, name` lookup table.
pub struct SqliteCatalogSource {
    path: String,
    table: String,
}

impl SqliteCatalogSource {
    pub fn new(path: impl Into<String>, table: &str) -> Result<Self> {
        Ok(Self { path: path.into(), table: quote_ident(table)? })
    }
}

#[async_trait]
impl CatalogSource for SqliteCatalogSource {
    async fn load_catalog(&self) -> Result<CategoryCatalog> {
        let path = self.path.clone();
        let table = self.table.clone();

        task::spawn_blocking(move || -> Result<CategoryCatalog> {
            let conn = open_read_only(&path)?;
            let sql = format!("SELECT code, name FROM {table}");
            let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
            let rows = stmt
                .query_map([], |row| Ok((text_at(row, 0), text_at(row, 1))))
                .map_err(map_sql_error)?;

            let mut catalog = CategoryCatalog::new();
            for row in rows {
                let (code, name) = row.map_err(map_sql_error)?;
                let (code, name) = (code.trim().to_string(), name.trim().to_string());
                if code.is_empty() || name.is_empty() {
                    continue;
                }
                catalog.insert(code, name);
            }
            Ok(catalog)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn open_read_only(path: &str) -> Result<Connection> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(map_sql_error)
}

/// Quote a configured identifier for embedding in SQL.
///
/// Embedded double quotes are rejected instead of escaped; no legitimate
/// table or column name in this dataset contains one.
fn quote_ident(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(OpsPulseError::Config("empty SQL identifier".into()));
    }
    if name.contains('"') {
        return Err(OpsPulseError::Config(format!("invalid SQL identifier: {name}")));
    }
    Ok(format!("\"{name}\""))
}

/// Read a column as text, stringifying non-text values.
///
/// Source tables are loose about types (timestamps stored as integers,
/// phone numbers as reals), so everything funnels through text and the
/// normalizer decides what parses.
fn text_at(row: &Row<'_>, idx: usize) -> String {
    match row.get_ref(idx) {
        Ok(ValueRef::Null) => String::new(),
        Ok(ValueRef::Integer(v)) => v.to_string(),
        Ok(ValueRef::Real(v)) => v.to_string(),
        Ok(ValueRef::Text(bytes)) => String::from_utf8_lossy(bytes).into_owned(),
        Ok(ValueRef::Blob(_)) | Err(_) => String::new(),
    }
}

fn map_sql_error(err: rusqlite::Error) -> OpsPulseError {
    let infra: InfraError = err.into();
    infra.into()
}

fn map_join_error(err: task::JoinError) -> OpsPulseError {
    let infra: InfraError = err.into();
    infra.into()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn seeded_db(dir: &TempDir) -> String {
        let path = dir.path().join("records.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE interactions (
                "Дата/час" TEXT,
                "Співробітник" TEXT,
                "Категорія" TEXT,
                "Телефон клієнта" TEXT,
                "Статус" TEXT,
                "Коментар" TEXT
            );
            INSERT INTO interactions VALUES
                ('2024-06-10 09:15:00', 'Олена', 'CL1', '380501112233', 'виконано', ''),
                ('2024-06-10 10:40:00', 'Ігор', 'СМС', 380501112233, 'виконано', 'repeat'),
                ('2024-06-10 11:05:00', 'Олена', 'CNF', NULL, 'в роботі', '');

            CREATE TABLE categories (code TEXT, name TEXT);
            INSERT INTO categories VALUES ('CL1', 'Дзвінки дрібні'), ('SMS', 'СМС'), ('', 'ignored');
            "#,
        )
        .unwrap();
        path.to_string_lossy().into_owned()
    }

    fn source_config(path: String) -> SqliteSourceConfig {
        SqliteSourceConfig {
            path,
            table: "interactions".to_string(),
            catalog_table: Some("categories".to_string()),
            columns: ColumnMap::default(),
        }
    }

    #[tokio::test]
    async fn fetches_rows_with_mixed_value_types() {
        let dir = TempDir::new().unwrap();
        let path = seeded_db(&dir);

        let source = SqliteRecordSource::new(&source_config(path)).unwrap();
        let records = source.fetch_records().await.unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].employee, "Олена");
        // Integer-typed phone cell is stringified, NULL becomes empty.
        assert_eq!(records[1].phone, "380501112233");
        assert_eq!(records[2].phone, "");
    }

    #[tokio::test]
    async fn loads_catalog_skipping_blank_entries() {
        let dir = TempDir::new().unwrap();
        let path = seeded_db(&dir);

        let source = SqliteCatalogSource::new(path, "categories").unwrap();
        let catalog = source.load_catalog().await.unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.name_for("CL1"), Some("Дзвінки дрібні"));
        assert_eq!(catalog.code_for("СМС"), Some("SMS"));
    }

    #[tokio::test]
    async fn missing_database_is_a_source_error() {
        let config = source_config("/nonexistent/records.db".to_string());
        let source = SqliteRecordSource::new(&config).unwrap();
        let result = source.fetch_records().await;
        assert!(matches!(result, Err(OpsPulseError::Source(_))));
    }

    #[test]
    fn identifiers_with_quotes_are_rejected() {
        assert!(quote_ident("inter\"actions").is_err());
        assert!(quote_ident("  ").is_err());
        assert_eq!(quote_ident("Дата/час").unwrap(), "\"Дата/час\"");
    }
}
