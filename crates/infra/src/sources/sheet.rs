//! HTTP sheet record source.
//!
//! Fetches a published spreadsheet range as JSON in the
//! `{"values": [[header...], [row...], ...]}` shape and maps columns to
//! record fields by header name. Short rows are padded with empty cells;
//! extra cells are ignored.

use async_trait::async_trait;
use opspulse_domain::{ColumnMap, OpsPulseError, RawRecord, Result, SheetSourceConfig};
use opspulse_core::RecordSource;
use serde::Deserialize;
use serde_json::Value;

use crate::http::HttpClient;

#[derive(Debug, Deserialize)]
struct SheetPayload {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Column indexes resolved from the sheet header row.
struct ColumnIndexes {
    timestamp: usize,
    employee: usize,
    category: usize,
    phone: usize,
    status: usize,
    comment: usize,
}

pub struct SheetRecordSource {
    http: HttpClient,
    url: String,
    columns: ColumnMap,
}

impl SheetRecordSource {
    pub fn new(http: HttpClient, config: &SheetSourceConfig) -> Self {
        Self { http, url: config.url.clone(), columns: config.columns.clone() }
    }

    fn resolve_columns(&self, header: &[Value]) -> Result<ColumnIndexes> {
        let names: Vec<String> =
            header.iter().map(|cell| cell_text(cell).trim().to_string()).collect();

        let index_of = |wanted: &str| -> Result<usize> {
            names.iter().position(|name| name == wanted).ok_or_else(|| {
                OpsPulseError::Source(format!("sheet header is missing column: {wanted}"))
            })
        };

        Ok(ColumnIndexes {
            timestamp: index_of(&self.columns.timestamp)?,
            employee: index_of(&self.columns.employee)?,
            category: index_of(&self.columns.category)?,
            phone: index_of(&self.columns.phone)?,
            status: index_of(&self.columns.status)?,
            comment: index_of(&self.columns.comment)?,
        })
    }
}

#[async_trait]
impl RecordSource for SheetRecordSource {
    async fn fetch_records(&self) -> Result<Vec<RawRecord>> {
        let payload: SheetPayload = self.http.get_json(&self.url).await?;

        let mut rows = payload.values.into_iter();
        let header = match rows.next() {
            Some(header) => header,
            None => {
                tracing::warn!(url = %self.url, "sheet returned no rows");
                return Ok(Vec::new());
            }
        };
        let idx = self.resolve_columns(&header)?;

        let records: Vec<RawRecord> = rows
            .map(|row| RawRecord {
                timestamp: cell_at(&row, idx.timestamp),
                employee: cell_at(&row, idx.employee),
                category: cell_at(&row, idx.category),
                phone: cell_at(&row, idx.phone),
                status: cell_at(&row, idx.status),
                comment: cell_at(&row, idx.comment),
            })
            .collect();

        tracing::debug!(count = records.len(), "fetched records from sheet");
        Ok(records)
    }
}

fn cell_at(row: &[Value], idx: usize) -> String {
    row.get(idx).map(cell_text).unwrap_or_default()
}

/// Stringify a sheet cell. Numbers show up for phone columns, nulls for
/// trailing empty cells.
fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
