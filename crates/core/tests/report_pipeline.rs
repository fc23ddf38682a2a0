//! End-to-end pipeline test over in-memory ports.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use opspulse_core::{
    CatalogSource, Clock, CrmDirectory, DeliveryReport, RecordSource, ReportService, ReportSink,
};
use opspulse_domain::{
    BirthdayPerson, CategoryCatalog, ColumnMap, DashboardSpec, MinuteWeights, OpsPulseError,
    RawRecord, ReportConfig, Result, SheetSourceConfig, SourceConfig, TelegramConfig,
};

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

struct VecRecordSource(Vec<RawRecord>);

#[async_trait]
impl RecordSource for VecRecordSource {
    async fn fetch_records(&self) -> Result<Vec<RawRecord>> {
        Ok(self.0.clone())
    }
}

struct DefaultCatalog;

#[async_trait]
impl CatalogSource for DefaultCatalog {
    async fn load_catalog(&self) -> Result<CategoryCatalog> {
        Ok(CategoryCatalog::default())
    }
}

#[derive(Default)]
struct RecordingSink {
    texts: Mutex<Vec<(String, Vec<i64>)>>,
    dashboards: Mutex<Vec<DashboardSpec>>,
    fail_chat: Option<i64>,
}

#[async_trait]
impl ReportSink for RecordingSink {
    async fn send_text(&self, text: &str, chats: &[i64]) -> Result<DeliveryReport> {
        let mut report = DeliveryReport::default();
        for chat in chats {
            if Some(*chat) == self.fail_chat {
                report.failed += 1;
            } else {
                report.delivered += 1;
            }
        }
        self.texts.lock().unwrap().push((text.to_string(), chats.to_vec()));
        Ok(report)
    }

    async fn send_dashboard(&self, spec: &DashboardSpec, chats: &[i64]) -> Result<DeliveryReport> {
        self.dashboards.lock().unwrap().push(spec.clone());
        Ok(DeliveryReport { delivered: chats.len(), failed: 0 })
    }
}

struct StaticCrm;

#[async_trait]
impl CrmDirectory for StaticCrm {
    async fn employees_with_birthday(&self, _month: u32, _day: u32) -> Result<Vec<BirthdayPerson>> {
        Ok(vec![BirthdayPerson {
            id: "7".to_string(),
            name: "Іван Петренко".to_string(),
            phones: vec![],
        }])
    }

    async fn clients_with_birthday(&self, _month: u32, _day: u32) -> Result<Vec<BirthdayPerson>> {
        Ok(vec![])
    }
}

struct FailingCrm;

#[async_trait]
impl CrmDirectory for FailingCrm {
    async fn employees_with_birthday(&self, _month: u32, _day: u32) -> Result<Vec<BirthdayPerson>> {
        Err(OpsPulseError::Network("bitrix unavailable".to_string()))
    }

    async fn clients_with_birthday(&self, _month: u32, _day: u32) -> Result<Vec<BirthdayPerson>> {
        Err(OpsPulseError::Network("bitrix unavailable".to_string()))
    }
}

fn config() -> ReportConfig {
    ReportConfig {
        timezone: "Europe/Kyiv".to_string(),
        completed_marker: "виконано".to_string(),
        minute_weights: MinuteWeights::default(),
        repeat_alert_threshold_pct: 30.0,
        chat_ids: vec![100, 200],
        birthday_chat_ids: vec![300],
        categories: None,
        source: SourceConfig::Sheet(SheetSourceConfig {
            url: "https://example.com/values".to_string(),
            columns: ColumnMap::default(),
        }),
        telegram: TelegramConfig {
            token: "token".to_string(),
            api_base: "https://api.telegram.org".to_string(),
        },
        bitrix: None,
    }
}

fn record(timestamp: &str, employee: &str, category: &str, phone: &str, status: &str) -> RawRecord {
    RawRecord {
        timestamp: timestamp.to_string(),
        employee: employee.to_string(),
        category: category.to_string(),
        phone: phone.to_string(),
        status: status.to_string(),
        comment: String::new(),
    }
}

/// 09:00 Kyiv on June 11 so the report covers June 10.
fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 6, 11, 6, 0, 0).unwrap()))
}

#[tokio::test]
async fn run_produces_report_and_delivers_to_all_chats() {
    let records = vec![
        record("2024-06-10 08:00:00", "Олена", "CL1", "p1", "виконано"),
        record("2024-06-10 09:00:00", "Олена", "CL1", "p1", "Виконано"),
        record("2024-06-10 10:00:00", "Олена", "CL2", "p2", "виконано"),
        record("2024-06-10 11:00:00", "Ігор", "SMS", "p3", "в роботі"),
        record("2024-06-12 11:00:00", "Ігор", "SMS", "p3", "виконано"),
        record("bad timestamp", "Ігор", "SMS", "p3", "виконано"),
    ];

    let sink = Arc::new(RecordingSink::default());
    let service = ReportService::new(
        Arc::new(VecRecordSource(records)),
        Arc::new(DefaultCatalog),
        sink.clone(),
        config(),
    )
    .with_clock(clock());

    let summary = service.run().await.unwrap();

    assert_eq!(summary.total_tasks, 3);
    assert_eq!(summary.dropped_timestamps, 1);
    assert_eq!(summary.report_day.to_string(), "2024-06-10");
    // Dashboard + text, two chats each.
    assert_eq!(summary.delivery.delivered, 4);
    assert_eq!(summary.delivery.failed, 0);
    assert!(!summary.birthday_digest_sent);

    let texts = sink.texts.lock().unwrap();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].0.contains("Всього виконано задач: <b>3</b>"));
    assert_eq!(texts[0].1, vec![100, 200]);

    let dashboards = sink.dashboards.lock().unwrap();
    assert_eq!(dashboards.len(), 1);
    assert_eq!(dashboards[0].hourly.values.iter().sum::<u64>(), 4);
}

#[tokio::test]
async fn empty_source_still_produces_a_report() {
    let sink = Arc::new(RecordingSink::default());
    let service = ReportService::new(
        Arc::new(VecRecordSource(vec![])),
        Arc::new(DefaultCatalog),
        sink.clone(),
        config(),
    )
    .with_clock(clock());

    let summary = service.run().await.unwrap();

    assert_eq!(summary.total_tasks, 0);
    let texts = sink.texts.lock().unwrap();
    assert!(texts[0].0.contains("Всього виконано задач: <b>0</b>"));
}

#[tokio::test]
async fn birthday_digest_goes_to_its_own_chats() {
    let sink = Arc::new(RecordingSink::default());
    let service = ReportService::new(
        Arc::new(VecRecordSource(vec![])),
        Arc::new(DefaultCatalog),
        sink.clone(),
        config(),
    )
    .with_clock(clock())
    .with_crm(Arc::new(StaticCrm));

    let summary = service.run().await.unwrap();
    assert!(summary.birthday_digest_sent);

    let texts = sink.texts.lock().unwrap();
    let digest = texts.iter().find(|(text, _)| text.contains("днів народження")).unwrap();
    assert!(digest.0.contains("Іван Петренко"));
    assert_eq!(digest.1, vec![300]);
}

#[tokio::test]
async fn crm_failure_skips_digest_without_failing_the_run() {
    let sink = Arc::new(RecordingSink::default());
    let service = ReportService::new(
        Arc::new(VecRecordSource(vec![])),
        Arc::new(DefaultCatalog),
        sink.clone(),
        config(),
    )
    .with_clock(clock())
    .with_crm(Arc::new(FailingCrm));

    let summary = service.run().await.unwrap();
    assert!(!summary.birthday_digest_sent);
    // Only the report text went out, no digest text.
    assert_eq!(sink.texts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn partial_delivery_failure_is_reported_not_fatal() {
    let sink = Arc::new(RecordingSink { fail_chat: Some(200), ..Default::default() });
    let service = ReportService::new(
        Arc::new(VecRecordSource(vec![])),
        Arc::new(DefaultCatalog),
        sink,
        config(),
    )
    .with_clock(clock());

    let summary = service.run().await.unwrap();
    assert_eq!(summary.delivery.failed, 1);
    assert_eq!(summary.delivery.delivered, 3);
}
