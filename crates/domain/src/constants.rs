//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

/// Reserved category codes with fixed meaning in the daily report.
pub const CODE_CALL_SMALL: &str = "CL1";
pub const CODE_CALL_MEDIUM: &str = "CL2";
pub const CODE_CALL_LONG: &str = "CL3";
pub const CODE_SMS: &str = "SMS";
pub const CODE_SECURITY_ESCORT: &str = "SEC";
pub const CODE_CONFERENCE: &str = "CNF";

/// Default category catalog: canonical code -> display name.
///
/// Acts as the fallback when no catalog is configured and no lookup table
/// is available in the record store.
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("CL1", "Дзвінки дрібні"),
    ("CL2", "Дзвінки середні"),
    ("CL3", "Дзвінки довготривалі"),
    ("SMS", "СМС"),
    ("SEC", "СБ (супровід)"),
    ("CNF", "Конференція"),
    ("NEW", "Перший контакт"),
    ("HS1", "Опрацювання історії легке"),
    ("HS2", "Опрацювання історії середнє"),
    ("HS3", "Опрацювання історії складне"),
    ("REP", "Повторне звернення"),
];

/// Status literal marking a finished interaction, compared case-insensitively.
pub const DEFAULT_COMPLETED_MARKER: &str = "виконано";

/// Business timezone used when none is configured.
pub const DEFAULT_TIMEZONE: &str = "Europe/Kyiv";

/// Estimated minutes per call for the small/medium/long categories.
pub const DEFAULT_MINUTE_WEIGHTS: [u32; 3] = [10, 30, 50];

/// Repeat-share percentage above which an employee line is flagged.
pub const DEFAULT_REPEAT_ALERT_THRESHOLD_PCT: f64 = 30.0;

/// How many phones the top-clients table shows.
pub const TOP_CLIENTS_LIMIT: usize = 3;

/// How many hours the peak annotation highlights.
pub const PEAK_HOURS_LIMIT: usize = 3;
