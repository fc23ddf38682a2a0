//! # OpsPulse Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Record sources (SQLite, HTTP sheet)
//! - Catalog sources (static config, SQLite lookup table)
//! - Telegram delivery sink
//! - Bitrix24 CRM client for the birthday digest
//! - Configuration loading and the retrying HTTP client
//!
//! ## Architecture
//! - Implements traits defined in `opspulse-core`
//! - Depends on `opspulse-domain` and `opspulse-core`
//! - Contains all "impure" code (I/O, network, storage)

pub mod config;
pub mod crm;
pub mod delivery;
pub mod errors;
pub mod http;
pub mod sources;

// Re-export commonly used items
pub use crm::BitrixClient;
pub use delivery::TelegramSink;
pub use errors::InfraError;
pub use http::HttpClient;
pub use sources::{SheetRecordSource, SqliteCatalogSource, SqliteRecordSource, StaticCatalogSource};
