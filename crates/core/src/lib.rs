//! # OpsPulse Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Time window resolution ("yesterday" in the business timezone)
//! - Record normalization and metric derivation
//! - Report rendering (text + dashboard data)
//! - Port/adapter interfaces (traits)
//! - The report orchestration service
//!
//! ## Architecture Principles
//! - Only depends on `opspulse-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod metrics;
pub mod normalize;
pub mod render;
pub mod report;
pub mod window;

// Re-export specific items to avoid ambiguity
pub use metrics::compute_metrics;
pub use normalize::{normalize, NormalizedDay};
pub use render::{render_birthday_digest, render_report};
pub use report::ports::{CatalogSource, CrmDirectory, DeliveryReport, RecordSource, ReportSink};
pub use report::service::{ReportService, RunSummary};
pub use window::{resolve_yesterday, Clock, SystemClock};
