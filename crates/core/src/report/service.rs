//! Report pipeline service - core orchestration
//!
//! Runs the pipeline strictly forward: resolve window, fetch, normalize,
//! compute, render, deliver. The core stages are pure; all I/O goes
//! through the injected ports.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use opspulse_domain::{BirthdayDigest, ReportConfig, Result};
use tracing::{info, warn};
use uuid::Uuid;

use super::ports::{CatalogSource, CrmDirectory, DeliveryReport, RecordSource, ReportSink};
use crate::metrics::compute_metrics;
use crate::normalize::normalize;
use crate::render::{render_birthday_digest, render_report};
use crate::window::{resolve_yesterday, Clock, SystemClock};

/// What one pipeline run produced and delivered.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub report_day: NaiveDate,
    pub total_tasks: u64,
    pub dropped_timestamps: usize,
    pub delivery: DeliveryReport,
    pub birthday_digest_sent: bool,
}

/// Daily report service wiring the ports together.
pub struct ReportService {
    records: Arc<dyn RecordSource>,
    catalog: Arc<dyn CatalogSource>,
    sink: Arc<dyn ReportSink>,
    crm: Option<Arc<dyn CrmDirectory>>,
    clock: Arc<dyn Clock>,
    config: ReportConfig,
}

impl ReportService {
    /// Create a new report service with the system clock and no CRM.
    pub fn new(
        records: Arc<dyn RecordSource>,
        catalog: Arc<dyn CatalogSource>,
        sink: Arc<dyn ReportSink>,
        config: ReportConfig,
    ) -> Self {
        Self { records, catalog, sink, crm: None, clock: Arc::new(SystemClock), config }
    }

    /// Attach a CRM directory for the birthday digest.
    pub fn with_crm(mut self, crm: Arc<dyn CrmDirectory>) -> Self {
        self.crm = Some(crm);
        self
    }

    /// Override the clock (tests, replaying past days).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Execute one report run.
    ///
    /// Fails only when the report itself cannot be produced (config,
    /// source or catalog errors). Partial delivery failures are logged per
    /// destination and reflected in the summary, not returned as errors.
    pub async fn run(&self) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        let tz = self.config.tz()?;
        let now = self.clock.now_utc();
        let window = resolve_yesterday(tz, now)?;

        info!(%run_id, report_day = %window.report_day(), %tz, "starting daily report run");

        let catalog = self.catalog.load_catalog().await?;
        let raw = self.records.fetch_records().await?;
        info!(%run_id, fetched = raw.len(), catalog_size = catalog.len(), "records fetched");

        let day = normalize(&raw, &catalog, &window, &self.config.completed_marker);
        let metrics = compute_metrics(&day, &window, self.config.minute_weights);
        let report = render_report(&metrics, &window, self.config.repeat_alert_threshold_pct);

        let mut delivery = DeliveryReport::default();
        match self.sink.send_dashboard(&report.dashboard, &self.config.chat_ids).await {
            Ok(outcome) => delivery.absorb(outcome),
            Err(err) => {
                warn!(%run_id, error = %err, "dashboard delivery failed");
                delivery.failed += self.config.chat_ids.len();
            }
        }
        match self.sink.send_text(&report.text, &self.config.chat_ids).await {
            Ok(outcome) => delivery.absorb(outcome),
            Err(err) => {
                warn!(%run_id, error = %err, "report text delivery failed");
                delivery.failed += self.config.chat_ids.len();
            }
        }

        let birthday_digest_sent = self.send_birthday_digest(run_id, &now, tz).await;

        info!(
            %run_id,
            total_tasks = metrics.total_tasks,
            delivered = delivery.delivered,
            failed = delivery.failed,
            "report run finished"
        );

        Ok(RunSummary {
            run_id,
            report_day: window.report_day(),
            total_tasks: metrics.total_tasks,
            dropped_timestamps: day.dropped_timestamps,
            delivery,
            birthday_digest_sent,
        })
    }

    /// Look up today's birthdays and send the digest. A CRM failure
    /// degrades to skipping the digest; it never fails the run.
    async fn send_birthday_digest(
        &self,
        run_id: Uuid,
        now: &chrono::DateTime<chrono::Utc>,
        tz: chrono_tz::Tz,
    ) -> bool {
        let Some(crm) = &self.crm else {
            return false;
        };

        let today = now.with_timezone(&tz).date_naive();
        let (month, day) = (today.month(), today.day());

        let digest = match self.fetch_digest(crm.as_ref(), month, day).await {
            Ok(digest) => digest,
            Err(err) => {
                warn!(%run_id, error = %err, "birthday digest skipped");
                return false;
            }
        };

        let text = render_birthday_digest(&digest);
        match self.sink.send_text(&text, self.config.birthday_chats()).await {
            Ok(outcome) => {
                if outcome.failed > 0 {
                    warn!(%run_id, failed = outcome.failed, "birthday digest partially delivered");
                }
                true
            }
            Err(err) => {
                warn!(%run_id, error = %err, "birthday digest delivery failed");
                false
            }
        }
    }

    async fn fetch_digest(
        &self,
        crm: &dyn CrmDirectory,
        month: u32,
        day: u32,
    ) -> Result<BirthdayDigest> {
        let employees = crm.employees_with_birthday(month, day).await?;
        let clients = crm.clients_with_birthday(month, day).await?;
        Ok(BirthdayDigest { employees, clients })
    }
}
