//! Domain types and models

pub mod birthday;
pub mod catalog;
pub mod metrics;
pub mod record;
pub mod window;

pub use birthday::{BirthdayDigest, BirthdayPerson};
pub use catalog::CategoryCatalog;
pub use metrics::{
    BarPanel, CategoryCount, ClientActivity, DailyMetrics, DashboardSpec, EmployeeClientCount,
    EmployeeSummary, EmployeeTaskCount, HourlyActivity, LinePanel, PanelAnnotation, RenderedReport,
};
pub use record::{NormalizedRecord, RawRecord};
pub use window::ReportWindow;
