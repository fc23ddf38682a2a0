//! Record normalization - pure transform from raw to normalized records
//!
//! Cleans text fields, parses timestamps (timezone-naive input is treated
//! as UTC), resolves category labels through the catalog, filters to the
//! report window and flags completed records. Records whose timestamp
//! cannot be parsed are dropped silently; unknown categories pass through
//! unresolved.

use chrono::{DateTime, NaiveDateTime, Utc};
use opspulse_domain::{CategoryCatalog, NormalizedRecord, RawRecord, ReportWindow};
use tracing::debug;

/// Timestamp formats accepted for timezone-naive input.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

/// All in-window records for one report day, in source order.
///
/// The full set feeds the hourly activity series; KPI derivation uses the
/// completed subset.
#[derive(Debug, Clone)]
pub struct NormalizedDay {
    pub records: Vec<NormalizedRecord>,
    /// Records dropped because their timestamp failed to parse.
    pub dropped_timestamps: usize,
}

impl NormalizedDay {
    /// The completed subset, preserving order.
    pub fn completed(&self) -> impl Iterator<Item = &NormalizedRecord> {
        self.records.iter().filter(|r| r.completed)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parse a source timestamp. RFC 3339 input keeps its offset; naive input
/// is assumed to be UTC. Returns `None` for unparseable values.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(raw, fmt)
            .ok()
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
    })
}

/// Normalize a raw record set against the catalog and window.
///
/// Pure transform: no I/O, no retained state, input order preserved.
pub fn normalize(
    raw: &[RawRecord],
    catalog: &CategoryCatalog,
    window: &ReportWindow,
    completed_marker: &str,
) -> NormalizedDay {
    let marker = completed_marker.trim().to_lowercase();
    let tz = window.tz();

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for rec in raw {
        let Some(instant) = parse_timestamp(&rec.timestamp) else {
            dropped += 1;
            continue;
        };
        let local_ts = instant.with_timezone(&tz);
        if !window.contains(&local_ts) {
            continue;
        }

        let (category_code, category_name) = catalog.resolve(&rec.category);
        let status = rec.status.trim().to_string();
        let completed = status.to_lowercase() == marker;

        records.push(NormalizedRecord {
            local_ts,
            employee: rec.employee.trim().to_string(),
            category_code,
            category_name,
            phone: rec.phone.trim().to_string(),
            status,
            completed,
        });
    }

    if dropped > 0 {
        debug!(dropped, "dropped records with unparseable timestamps");
    }

    NormalizedDay { records, dropped_timestamps: dropped }
}
