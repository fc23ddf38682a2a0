//! Report time window

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::errors::{OpsPulseError, Result};

/// Half-open `[start, end)` local-time interval scoping the report.
///
/// For the daily report this spans exactly one calendar day ("yesterday")
/// in the business timezone; on DST transition days the wall-clock span is
/// 23 or 25 hours.
#[derive(Debug, Clone, Serialize)]
pub struct ReportWindow {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl ReportWindow {
    /// Create a window, enforcing `start < end`.
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Result<Self> {
        if start >= end {
            return Err(OpsPulseError::InvalidInput(format!(
                "window start {start} is not before end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Tz> {
        self.start
    }

    pub fn end(&self) -> DateTime<Tz> {
        self.end
    }

    /// Timezone the window is expressed in.
    pub fn tz(&self) -> Tz {
        self.start.timezone()
    }

    /// The calendar day this window covers.
    pub fn report_day(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Half-open containment: `>= start`, `< end`.
    pub fn contains(&self, ts: &DateTime<Tz>) -> bool {
        *ts >= self.start && *ts < self.end
    }

    /// Containment check for UTC instants.
    pub fn contains_utc(&self, ts: &DateTime<Utc>) -> bool {
        *ts >= self.start.with_timezone(&Utc) && *ts < self.end.with_timezone(&Utc)
    }

    /// Whole wall-clock hours between start and end.
    pub fn span_hours(&self) -> i64 {
        (self.end - self.start).num_hours()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono_tz::Europe::Kyiv;

    use super::*;

    fn window() -> ReportWindow {
        let start = Kyiv.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        let end = Kyiv.with_ymd_and_hms(2024, 6, 11, 0, 0, 0).unwrap();
        ReportWindow::new(start, end).unwrap()
    }

    #[test]
    fn start_is_included_end_is_excluded() {
        let w = window();
        assert!(w.contains(&w.start()));
        assert!(!w.contains(&w.end()));

        let just_before_end = Kyiv.with_ymd_and_hms(2024, 6, 10, 23, 59, 59).unwrap();
        assert!(w.contains(&just_before_end));
    }

    #[test]
    fn rejects_inverted_window() {
        let start = Kyiv.with_ymd_and_hms(2024, 6, 11, 0, 0, 0).unwrap();
        let end = Kyiv.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        assert!(ReportWindow::new(start, end).is_err());
    }

    #[test]
    fn report_day_is_the_start_day() {
        assert_eq!(window().report_day(), NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
    }

    #[test]
    fn span_is_24_hours_on_a_plain_day() {
        assert_eq!(window().span_hours(), 24);
    }
}
