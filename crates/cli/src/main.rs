//! OpsPulse - daily support team report
//!
//! Resolves yesterday's reporting window, pulls interaction records,
//! computes the daily metrics and delivers the report to Telegram.

mod context;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::context::AppContext;

#[tokio::main]
async fn main() {
    // Logging first so .env loading is visible.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env file found, using process environment"),
    }

    if let Err(err) = run().await {
        error!(error = %err, "report run failed");
        std::process::exit(1);
    }
}

async fn run() -> opspulse_domain::Result<()> {
    let config = opspulse_infra::config::load()?;
    let ctx = AppContext::new(config)?;

    let summary = ctx.service.run().await?;
    info!(
        run_id = %summary.run_id,
        report_day = %summary.report_day,
        total_tasks = summary.total_tasks,
        dropped_timestamps = summary.dropped_timestamps,
        delivered = summary.delivery.delivered,
        failed = summary.delivery.failed,
        birthday_digest = summary.birthday_digest_sent,
        "daily report finished"
    );
    Ok(())
}
