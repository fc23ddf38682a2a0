//! Port interfaces for the report pipeline
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use opspulse_domain::{BirthdayPerson, CategoryCatalog, DashboardSpec, RawRecord, Result};

/// Trait for fetching raw interaction records from a tabular source
/// (spreadsheet, SQL table, or any other provider).
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch all available raw records; windowing happens downstream.
    async fn fetch_records(&self) -> Result<Vec<RawRecord>>;
}

/// Trait for loading the category catalog once per run.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load_catalog(&self) -> Result<CategoryCatalog>;
}

/// Outcome of a fan-out delivery across destinations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

impl DeliveryReport {
    pub fn absorb(&mut self, other: DeliveryReport) {
        self.delivered += other.delivered;
        self.failed += other.failed;
    }
}

/// Trait for delivering the rendered report to messaging destinations.
///
/// Implementations must log and continue per destination: a failure sending
/// to one chat never blocks the others.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Send a formatted text block to each chat.
    async fn send_text(&self, text: &str, chats: &[i64]) -> Result<DeliveryReport>;

    /// Send the dashboard data to each chat.
    async fn send_dashboard(&self, spec: &DashboardSpec, chats: &[i64])
        -> Result<DeliveryReport>;
}

/// Trait for the CRM birthday lookup.
#[async_trait]
pub trait CrmDirectory: Send + Sync {
    /// Active employees whose birthday falls on `(month, day)`.
    async fn employees_with_birthday(&self, month: u32, day: u32) -> Result<Vec<BirthdayPerson>>;

    /// Clients whose birthday falls on `(month, day)`, with normalized phones.
    async fn clients_with_birthday(&self, month: u32, day: u32) -> Result<Vec<BirthdayPerson>>;
}
