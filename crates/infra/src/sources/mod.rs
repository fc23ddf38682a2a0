//! Record and catalog source adapters

pub mod catalog;
pub mod sheet;
pub mod sqlite;

pub use catalog::StaticCatalogSource;
pub use sheet::SheetRecordSource;
pub use sqlite::{SqliteCatalogSource, SqliteRecordSource};
