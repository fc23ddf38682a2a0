//! Application context - dependency injection container

use std::sync::Arc;

use opspulse_core::{CatalogSource, CrmDirectory, RecordSource, ReportService, ReportSink};
use opspulse_domain::{ReportConfig, Result, SourceConfig};
use opspulse_infra::{
    BitrixClient, HttpClient, SheetRecordSource, SqliteCatalogSource, SqliteRecordSource,
    StaticCatalogSource, TelegramSink,
};

/// Wires configuration into concrete adapters and hands out the service.
pub struct AppContext {
    pub service: ReportService,
}

impl AppContext {
    pub fn new(config: ReportConfig) -> Result<Self> {
        let http = HttpClient::builder().user_agent("opspulse").build()?;

        let records: Arc<dyn RecordSource> = match &config.source {
            SourceConfig::Sqlite(sqlite) => Arc::new(SqliteRecordSource::new(sqlite)?),
            SourceConfig::Sheet(sheet) => Arc::new(SheetRecordSource::new(http.clone(), sheet)),
        };

        // Catalog precedence: configured overrides, then a source lookup
        // table, then the built-in defaults.
        let catalog: Arc<dyn CatalogSource> = match (&config.categories, &config.source) {
            (Some(overrides), _) => Arc::new(StaticCatalogSource::new(Some(overrides))),
            (None, SourceConfig::Sqlite(sqlite)) if sqlite.catalog_table.is_some() => {
                let table = sqlite.catalog_table.as_deref().unwrap_or_default();
                Arc::new(SqliteCatalogSource::new(sqlite.path.clone(), table)?)
            }
            _ => Arc::new(StaticCatalogSource::new(None)),
        };

        let sink: Arc<dyn ReportSink> =
            Arc::new(TelegramSink::new(http.clone(), &config.telegram));

        let crm: Option<Arc<dyn CrmDirectory>> = config
            .bitrix
            .as_ref()
            .map(|bitrix| Arc::new(BitrixClient::new(http, bitrix)) as Arc<dyn CrmDirectory>);

        let mut service = ReportService::new(records, catalog, sink, config);
        if let Some(crm) = crm {
            service = service.with_crm(crm);
        }

        Ok(Self { service })
    }
}
