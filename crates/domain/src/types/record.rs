//! Raw and normalized interaction records

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// One interaction event as ingested from the record source.
///
/// The timestamp is kept as source text until the normalizer parses it;
/// everything else is free text that gets trimmed during normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    pub timestamp: String,
    pub employee: String,
    pub category: String,
    pub phone: String,
    pub status: String,
    pub comment: String,
}

/// A raw record after normalization: local timestamp, trimmed fields and a
/// resolved category. Derived once, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedRecord {
    /// Timestamp converted to the report timezone.
    pub local_ts: DateTime<Tz>,
    pub employee: String,
    pub category_code: String,
    pub category_name: String,
    pub phone: String,
    pub status: String,
    /// Whether the status matched the completed marker (case-insensitive).
    pub completed: bool,
}
