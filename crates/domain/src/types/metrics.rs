//! Daily report metrics bundle and renderer output

use serde::Serialize;

/// Tasks completed by one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeTaskCount {
    pub employee: String,
    pub tasks_done: u64,
}

/// Distinct clients contacted by one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeClientCount {
    pub employee: String,
    pub unique_clients: u64,
}

/// Completed tasks per category display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category_name: String,
    pub tasks: u64,
}

/// Events attributed to one client phone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientActivity {
    pub phone: String,
    pub events: u64,
}

/// Per-employee summary combining task, client and repeat-contact counts.
///
/// Outer-joined over all three per-employee tables; absent values are 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeSummary {
    pub employee: String,
    pub tasks_done: u64,
    pub unique_clients: u64,
    pub total_clients: u64,
    pub repeat_clients: u64,
    pub repeat_share_pct: f64,
}

/// Hourly activity series over the report window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyActivity {
    /// Local-time labels, one per bucket (`"00:00"`, `"01:00"`, ...).
    pub labels: Vec<String>,
    /// Record counts per bucket (all in-window records, not just completed).
    pub counts: Vec<u64>,
    /// Indices of the busiest hours, ties broken by earliest hour.
    pub peak_hours: Vec<usize>,
    /// Index of the single quietest hour, if any records exist.
    pub valley_hour: Option<usize>,
    /// Whether the bare hour-of-day fallback produced this series.
    pub fallback_used: bool,
}

/// The full metrics bundle derived from one day of normalized records.
#[derive(Debug, Clone, Serialize)]
pub struct DailyMetrics {
    pub total_tasks: u64,
    /// Share of events belonging to repeat phones, percent, 2-dp.
    pub repeat_rate: f64,
    pub tasks_by_employee: Vec<EmployeeTaskCount>,
    pub unique_clients_by_employee: Vec<EmployeeClientCount>,
    pub category_breakdown: Vec<CategoryCount>,
    pub top_clients: Vec<ClientActivity>,
    pub calls_small: u64,
    pub calls_medium: u64,
    pub calls_long: u64,
    pub total_calls: u64,
    pub total_chats: u64,
    pub total_conferences: u64,
    /// Distinct phones among security-escort records.
    pub sb_unique_clients: u64,
    /// Weighted talk-time estimate in hours, 2-dp.
    pub total_hours: f64,
    pub employee_summary: Vec<EmployeeSummary>,
    pub hourly_activity: HourlyActivity,
}

/// Annotation attached to a chart panel point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelAnnotation {
    pub index: usize,
    pub label: String,
}

/// Line panel data (hourly activity).
#[derive(Debug, Clone, Serialize)]
pub struct LinePanel {
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    pub annotations: Vec<PanelAnnotation>,
}

/// Bar panel data (per-employee and per-category charts).
#[derive(Debug, Clone, Serialize)]
pub struct BarPanel {
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

/// Pure data backing the three-panel dashboard. Chart drawing itself is an
/// external concern; this struct is what gets handed to a renderer.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSpec {
    pub title: String,
    pub hourly: LinePanel,
    pub employees: BarPanel,
    pub categories: BarPanel,
}

/// Renderer output: the formatted report text plus the dashboard data.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedReport {
    pub text: String,
    pub dashboard: DashboardSpec,
}
