//! Report rendering - formatted text block and dashboard data
//!
//! Pure formatting over the metrics bundle. The text uses Telegram HTML
//! markup; the dashboard is data for an external chart renderer (drawing
//! mechanics are out of scope).

use std::fmt::Write as _;

use opspulse_domain::{
    BarPanel, BirthdayDigest, DailyMetrics, DashboardSpec, LinePanel, PanelAnnotation,
    RenderedReport, ReportWindow,
};

/// Render the daily report: KPI text plus the three-panel dashboard spec.
pub fn render_report(
    metrics: &DailyMetrics,
    window: &ReportWindow,
    repeat_alert_threshold_pct: f64,
) -> RenderedReport {
    RenderedReport {
        text: render_text(metrics, window, repeat_alert_threshold_pct),
        dashboard: build_dashboard(metrics, window),
    }
}

fn render_text(metrics: &DailyMetrics, window: &ReportWindow, threshold_pct: f64) -> String {
    let date = window.start().format("%d.%m.%Y");
    let mut text = String::new();

    let _ = writeln!(text, "📊 <b>Денний звіт підтримки</b> ({date} — час {})", window.tz());
    text.push('\n');
    let _ = writeln!(text, "✅ Всього виконано задач: <b>{}</b>", metrics.total_tasks);
    let _ = writeln!(
        text,
        "🔁 Частка повторних звернень (за день, по подіях): <b>{}%</b>",
        metrics.repeat_rate
    );
    text.push('\n');
    let _ = writeln!(
        text,
        "☎️ <b>Дзвінки</b>: всього <b>{}</b> (короткі: <b>{}</b>, середні: <b>{}</b>, довготривалі: <b>{}</b>)",
        metrics.total_calls, metrics.calls_small, metrics.calls_medium, metrics.calls_long
    );
    let _ = writeln!(text, "⏱️ <b>Годин у розмові</b> (оцінка): <b>{} год</b>", metrics.total_hours);
    let _ = writeln!(text, "💬 <b>Чати</b>: <b>{}</b>", metrics.total_chats);
    let _ = writeln!(text, "🎥 <b>Проведені конференції</b>: <b>{}</b>", metrics.total_conferences);
    let _ = writeln!(
        text,
        "🧩 <b>СБ (супровід)</b> — унікальних клієнтів: <b>{}</b>",
        metrics.sb_unique_clients
    );
    text.push('\n');

    let max_tasks = metrics.tasks_by_employee.iter().map(|t| t.tasks_done).max().unwrap_or(0);
    let min_tasks = metrics.tasks_by_employee.iter().map(|t| t.tasks_done).min().unwrap_or(0);

    let _ = writeln!(text, "👥 <b>По співробітниках</b>:");
    for summary in &metrics.employee_summary {
        let mut badges = String::new();
        if summary.tasks_done == max_tasks && summary.tasks_done > 0 {
            badges.push_str(" 🏆");
        }
        if summary.tasks_done == min_tasks && summary.tasks_done > 0 && max_tasks != min_tasks {
            badges.push_str(" 🔴");
        }
        let _ = writeln!(
            text,
            "• <b>{}</b> — задач: <b>{}</b>{} | унікальних клієнтів: <b>{}</b>",
            summary.employee, summary.tasks_done, badges, summary.unique_clients
        );
    }
    text.push('\n');

    let _ = writeln!(
        text,
        "🔁 <b>Повторні звернення по співробітниках</b> (клієнти з ≥2 зверненнями; поріг: {threshold_pct}%):"
    );
    for summary in &metrics.employee_summary {
        let flag = if summary.repeat_share_pct > threshold_pct { "🔴" } else { "🟢" };
        let _ = writeln!(
            text,
            "• <b>{}</b> — повторні клієнти: <b>{}%</b> ({} з {}) {}",
            summary.employee,
            summary.repeat_share_pct,
            summary.repeat_clients,
            summary.total_clients,
            flag
        );
    }
    text.push('\n');

    let _ = writeln!(text, "🏷️ <b>Категорії (розподіл задач)</b>:");
    for category in &metrics.category_breakdown {
        let _ = writeln!(text, "• <b>{}</b>: {}", category.category_name, category.tasks);
    }
    text.push('\n');

    let _ = writeln!(text, "📱 <b>Топ-3 клієнтів за зверненнями</b>:");
    for client in &metrics.top_clients {
        let _ = writeln!(text, "• <b>{}</b>: {}", client.phone, client.events);
    }
    text.push('\n');

    let _ = write!(text, "📈 Лінійний графік звернень по годинах — див. на дашборді.");
    text
}

fn build_dashboard(metrics: &DailyMetrics, window: &ReportWindow) -> DashboardSpec {
    let hourly = &metrics.hourly_activity;

    let mut annotations: Vec<PanelAnnotation> = hourly
        .peak_hours
        .iter()
        .map(|&idx| PanelAnnotation { index: idx, label: format!("пік: {}", hourly.counts[idx]) })
        .collect();
    if let Some(idx) = hourly.valley_hour {
        annotations.push(PanelAnnotation { index: idx, label: format!("мін: {}", hourly.counts[idx]) });
    }

    DashboardSpec {
        title: format!(
            "Підтримка • Денний звіт {} (час {})",
            window.start().format("%d.%m.%Y"),
            window.tz()
        ),
        hourly: LinePanel {
            title: "Звернення по годинах (усі події)".to_string(),
            labels: hourly.labels.clone(),
            values: hourly.counts.clone(),
            annotations,
        },
        employees: BarPanel {
            title: "Унікальні клієнти по співробітнику".to_string(),
            labels: metrics.employee_summary.iter().map(|s| s.employee.clone()).collect(),
            values: metrics.employee_summary.iter().map(|s| s.unique_clients).collect(),
        },
        categories: BarPanel {
            title: "Розподіл задач за категоріями".to_string(),
            labels: metrics.category_breakdown.iter().map(|c| c.category_name.clone()).collect(),
            values: metrics.category_breakdown.iter().map(|c| c.tasks).collect(),
        },
    }
}

/// Render the birthday digest text block.
pub fn render_birthday_digest(digest: &BirthdayDigest) -> String {
    if digest.is_empty() {
        return "📅 На сьогодні днів народження немає.".to_string();
    }

    let mut text = String::from("🎂 Щоденна перевірка днів народження:");
    if !digest.employees.is_empty() {
        text.push_str("\n\n👥 Співробітники:");
        for person in &digest.employees {
            let _ = write!(text, "\n• {}", person.name);
        }
    }
    if !digest.clients.is_empty() {
        text.push_str("\n\n🧑‍💼 Клієнти:");
        for person in &digest.clients {
            if person.phones.is_empty() {
                let _ = write!(text, "\n• {} — (тел. відсутній)", person.name);
            } else {
                let _ = write!(text, "\n• {} — {}", person.name, person.phones.join(", "));
            }
        }
    }
    text
}
