//! Time window resolution - the single definition of "yesterday"
//!
//! All filtering in the pipeline uses the window produced here. The
//! resolver works with calendar-day arithmetic rather than a fixed 24-hour
//! offset, so DST transition days produce 23- or 25-hour windows instead of
//! drifting off local midnight.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use opspulse_domain::{OpsPulseError, ReportWindow, Result};

/// Injected clock so window resolution is testable for arbitrary instants.
pub trait Clock: Send + Sync {
    /// Current instant in UTC.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Production clock reading the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Resolve the half-open window covering the calendar day before `now_utc`
/// in the given timezone: previous day at 00:00 local through today at
/// 00:00 local.
pub fn resolve_yesterday(tz: Tz, now_utc: DateTime<Utc>) -> Result<ReportWindow> {
    let today = now_utc.with_timezone(&tz).date_naive();
    let report_day = today
        .pred_opt()
        .ok_or_else(|| OpsPulseError::Internal("calendar underflow resolving yesterday".into()))?;

    let start = local_midnight(tz, report_day)?;
    let end = local_midnight(tz, today)?;
    ReportWindow::new(start, end)
}

/// Earliest valid instant of `day` at 00:00 local.
///
/// Ambiguous midnights (DST fall-back) resolve to the earliest instant; a
/// midnight erased by a spring-forward gap advances by one hour.
fn local_midnight(tz: Tz, day: NaiveDate) -> Result<DateTime<Tz>> {
    let midnight = day
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| OpsPulseError::Internal(format!("invalid midnight for {day}")))?;

    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => match tz.from_local_datetime(&(midnight + Duration::hours(1))) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt),
            LocalResult::None => Err(OpsPulseError::Internal(format!(
                "no valid local midnight for {day} in {tz}"
            ))),
        },
    }
}
