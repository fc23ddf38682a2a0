//! Report orchestration: port interfaces and the pipeline service

pub mod ports;
pub mod service;

pub use ports::{CatalogSource, CrmDirectory, DeliveryReport, RecordSource, ReportSink};
pub use service::{ReportService, RunSummary};
