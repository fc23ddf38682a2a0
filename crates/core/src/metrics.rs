//! Metrics engine - derives the daily KPI bundle from normalized records
//!
//! Pure batch transform: one pass over the in-window record set, no
//! retained state, no I/O. An empty input produces an all-zero bundle.

use ahash::{AHashMap, AHashSet};
use chrono::{Duration, Timelike};
use opspulse_domain::constants::{
    CODE_CALL_LONG, CODE_CALL_MEDIUM, CODE_CALL_SMALL, CODE_CONFERENCE, CODE_SECURITY_ESCORT,
    CODE_SMS, PEAK_HOURS_LIMIT, TOP_CLIENTS_LIMIT,
};
use opspulse_domain::{
    CategoryCount, ClientActivity, DailyMetrics, EmployeeClientCount, EmployeeSummary,
    EmployeeTaskCount, HourlyActivity, MinuteWeights, NormalizedRecord, ReportWindow,
};
use tracing::warn;

use crate::normalize::NormalizedDay;

/// Buckets in the hourly activity series.
const HOURLY_BUCKETS: usize = 24;

/// Round to two decimal places (report percentages and hour totals).
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute the full metrics bundle for one report day.
///
/// KPIs come from the completed subset; the hourly series counts all
/// in-window records. Zero denominators resolve to 0, never an error.
pub fn compute_metrics(
    day: &NormalizedDay,
    window: &ReportWindow,
    weights: MinuteWeights,
) -> DailyMetrics {
    let completed: Vec<&NormalizedRecord> = day.completed().collect();
    let total_tasks = completed.len() as u64;

    // Events per phone, remembering encounter order for tie-breaking.
    let mut phone_events: AHashMap<&str, (u64, usize)> = AHashMap::new();
    for (idx, rec) in completed.iter().enumerate() {
        phone_events.entry(rec.phone.as_str()).or_insert((0, idx)).0 += 1;
    }

    let repeat_events: u64 =
        phone_events.values().filter(|(count, _)| *count >= 2).map(|(count, _)| *count).sum();
    let repeat_rate = if total_tasks == 0 {
        0.0
    } else {
        round2(repeat_events as f64 * 100.0 / total_tasks as f64)
    };

    let tasks_by_employee = count_descending(completed.iter().map(|r| r.employee.as_str()))
        .into_iter()
        .map(|(employee, tasks_done)| EmployeeTaskCount { employee, tasks_done })
        .collect::<Vec<_>>();

    let mut clients_per_employee: AHashMap<&str, AHashSet<&str>> = AHashMap::new();
    for rec in &completed {
        clients_per_employee.entry(rec.employee.as_str()).or_default().insert(rec.phone.as_str());
    }
    let mut unique_clients_by_employee: Vec<EmployeeClientCount> = clients_per_employee
        .iter()
        .map(|(employee, phones)| EmployeeClientCount {
            employee: (*employee).to_string(),
            unique_clients: phones.len() as u64,
        })
        .collect();
    unique_clients_by_employee
        .sort_by(|a, b| b.unique_clients.cmp(&a.unique_clients).then(a.employee.cmp(&b.employee)));

    let category_breakdown = count_descending(completed.iter().map(|r| r.category_name.as_str()))
        .into_iter()
        .map(|(category_name, tasks)| CategoryCount { category_name, tasks })
        .collect::<Vec<_>>();

    // Top clients: events descending, encounter order on ties.
    let mut ranked_phones: Vec<(&str, u64, usize)> =
        phone_events.iter().map(|(phone, (count, first))| (*phone, *count, *first)).collect();
    ranked_phones.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    let top_clients: Vec<ClientActivity> = ranked_phones
        .iter()
        .take(TOP_CLIENTS_LIMIT)
        .map(|(phone, events, _)| ClientActivity { phone: (*phone).to_string(), events: *events })
        .collect();

    let code_count = |code: &str| -> u64 {
        completed.iter().filter(|r| r.category_code == code).count() as u64
    };
    let calls_small = code_count(CODE_CALL_SMALL);
    let calls_medium = code_count(CODE_CALL_MEDIUM);
    let calls_long = code_count(CODE_CALL_LONG);
    let total_calls = calls_small + calls_medium + calls_long;
    let total_chats = code_count(CODE_SMS);
    let total_conferences = code_count(CODE_CONFERENCE);

    let sb_unique_clients = completed
        .iter()
        .filter(|r| r.category_code == CODE_SECURITY_ESCORT)
        .map(|r| r.phone.as_str())
        .collect::<AHashSet<_>>()
        .len() as u64;

    let total_minutes = calls_small * u64::from(weights.small)
        + calls_medium * u64::from(weights.medium)
        + calls_long * u64::from(weights.long);
    let total_hours = round2(total_minutes as f64 / 60.0);

    let employee_summary =
        build_employee_summary(&completed, &tasks_by_employee, &unique_clients_by_employee);

    let hourly_activity = build_hourly_activity(day, window);

    DailyMetrics {
        total_tasks,
        repeat_rate,
        tasks_by_employee,
        unique_clients_by_employee,
        category_breakdown,
        top_clients,
        calls_small,
        calls_medium,
        calls_long,
        total_calls,
        total_chats,
        total_conferences,
        sb_unique_clients,
        total_hours,
        employee_summary,
        hourly_activity,
    }
}

/// Count occurrences per key, sorted by count descending then key ascending.
fn count_descending<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(String, u64)> {
    let mut counts: AHashMap<&str, u64> = AHashMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    let mut out: Vec<(String, u64)> =
        counts.into_iter().map(|(key, count)| (key.to_string(), count)).collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    out
}

/// Outer-join tasks, unique clients and repeat-contact analysis per
/// employee, sorted by `(repeat_share_pct, tasks_done)` descending.
fn build_employee_summary(
    completed: &[&NormalizedRecord],
    tasks: &[EmployeeTaskCount],
    unique_clients: &[EmployeeClientCount],
) -> Vec<EmployeeSummary> {
    // (employee, phone) -> events
    let mut events: AHashMap<(&str, &str), u64> = AHashMap::new();
    for rec in completed {
        *events.entry((rec.employee.as_str(), rec.phone.as_str())).or_insert(0) += 1;
    }

    let mut total_clients: AHashMap<&str, u64> = AHashMap::new();
    let mut repeat_clients: AHashMap<&str, u64> = AHashMap::new();
    for ((employee, _), count) in &events {
        *total_clients.entry(employee).or_insert(0) += 1;
        if *count >= 2 {
            *repeat_clients.entry(employee).or_insert(0) += 1;
        }
    }

    let task_map: AHashMap<&str, u64> =
        tasks.iter().map(|t| (t.employee.as_str(), t.tasks_done)).collect();
    let client_map: AHashMap<&str, u64> =
        unique_clients.iter().map(|c| (c.employee.as_str(), c.unique_clients)).collect();

    // Union of all employees seen in any table; absent values become 0.
    let mut employees: Vec<&str> = task_map
        .keys()
        .chain(client_map.keys())
        .chain(total_clients.keys())
        .copied()
        .collect::<AHashSet<_>>()
        .into_iter()
        .collect();
    employees.sort_unstable();

    let mut summary: Vec<EmployeeSummary> = employees
        .into_iter()
        .map(|employee| {
            let total = total_clients.get(employee).copied().unwrap_or(0);
            let repeat = repeat_clients.get(employee).copied().unwrap_or(0);
            let repeat_share_pct = if total == 0 {
                0.0
            } else {
                round2(repeat as f64 * 100.0 / total as f64)
            };
            EmployeeSummary {
                employee: employee.to_string(),
                tasks_done: task_map.get(employee).copied().unwrap_or(0),
                unique_clients: client_map.get(employee).copied().unwrap_or(0),
                total_clients: total,
                repeat_clients: repeat,
                repeat_share_pct,
            }
        })
        .collect();

    summary.sort_by(|a, b| {
        b.repeat_share_pct
            .total_cmp(&a.repeat_share_pct)
            .then(b.tasks_done.cmp(&a.tasks_done))
            .then(a.employee.cmp(&b.employee))
    });
    summary
}

/// Bucket all in-window records into the 24 local hours of the window.
///
/// On a 25-hour DST day the final wall-clock hour folds into the last
/// bucket so the series always has exactly 24 entries. If every bucket is
/// zero while records exist (degenerate bucketing in the source data),
/// recompute by bare local hour-of-day as a best-effort recovery.
fn build_hourly_activity(day: &NormalizedDay, window: &ReportWindow) -> HourlyActivity {
    let mut counts = vec![0u64; HOURLY_BUCKETS];
    for rec in &day.records {
        let hours_in = (rec.local_ts - window.start()).num_hours();
        let bucket = hours_in.clamp(0, HOURLY_BUCKETS as i64 - 1) as usize;
        counts[bucket] += 1;
    }

    let mut fallback_used = false;
    if counts.iter().all(|&c| c == 0) && !day.is_empty() {
        warn!(
            records = day.len(),
            "hourly buckets all empty despite in-window records; falling back to hour-of-day counts"
        );
        fallback_used = true;
        for rec in &day.records {
            counts[rec.local_ts.hour() as usize] += 1;
        }
    }

    let labels: Vec<String> = if fallback_used {
        (0..HOURLY_BUCKETS).map(|h| format!("{h:02}:00")).collect()
    } else {
        (0..HOURLY_BUCKETS)
            .map(|h| (window.start() + Duration::hours(h as i64)).format("%H:%M").to_string())
            .collect()
    };

    let (peak_hours, valley_hour) = if day.is_empty() {
        (Vec::new(), None)
    } else {
        let mut ranked: Vec<usize> = (0..HOURLY_BUCKETS).collect();
        ranked.sort_by(|&a, &b| counts[b].cmp(&counts[a]).then(a.cmp(&b)));
        let peaks = ranked.iter().take(PEAK_HOURS_LIMIT).copied().collect();
        let valley = (0..HOURLY_BUCKETS).min_by(|&a, &b| counts[a].cmp(&counts[b]).then(a.cmp(&b)));
        (peaks, valley)
    };

    HourlyActivity { labels, counts, peak_hours, valley_hour, fallback_used }
}
