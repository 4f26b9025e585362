//! Date window the digest covers. Inclusive calendar dates, `to >= from`.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::DomainError;

/// Length of the default "this week" window in days.
pub const WEEK_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateWindow {
    /// Build a window; bounds given in reverse order are swapped.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        if to < from {
            Self { from: to, to: from }
        } else {
            Self { from, to }
        }
    }

    /// `[today - days, today]`.
    pub fn last_days(today: NaiveDate, days: u64) -> Self {
        let from = today.checked_sub_days(Days::new(days)).unwrap_or(today);
        Self::new(from, today)
    }

    /// Parse `YYYY-MM-DD` bounds as stored in the settings.
    pub fn parse(from: &str, to: &str) -> Result<Self, DomainError> {
        let parse = |s: &str| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map_err(|e| DomainError::Settings(format!("invalid date '{}': {}", s, e)))
        };
        Ok(Self::new(parse(from)?, parse(to)?))
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// First instant covered: `from 00:00:00`.
    pub fn start(&self) -> NaiveDateTime {
        self.from.and_time(NaiveTime::MIN)
    }

    /// Last instant covered: `to 23:59:59`.
    pub fn end(&self) -> NaiveDateTime {
        let last = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        self.to.and_time(last)
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start() && at <= self.end()
    }
}

/// `dd.mm.YYYY - dd.mm.YYYY`, as appended to the mail subject.
impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.from.format("%d.%m.%Y"),
            self.to.format("%d.%m.%Y")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn reversed_bounds_are_swapped() {
        let w = DateWindow::new(date(2024, 3, 10), date(2024, 3, 1));
        assert_eq!(w.from(), date(2024, 3, 1));
        assert_eq!(w.to(), date(2024, 3, 10));
        assert!(w.end() >= w.start());
    }

    #[test]
    fn last_week_spans_eight_calendar_days() {
        let w = DateWindow::last_days(date(2024, 3, 11), WEEK_DAYS);
        assert_eq!(w.from(), date(2024, 3, 4));
        assert_eq!(w.to(), date(2024, 3, 11));
        assert_eq!(w.to_string(), "04.03.2024 - 11.03.2024");
    }

    #[test]
    fn bounds_are_inclusive() {
        let w = DateWindow::new(date(2024, 3, 1), date(2024, 3, 1));
        assert!(w.contains(date(2024, 3, 1).and_hms_opt(0, 0, 0).unwrap()));
        assert!(w.contains(date(2024, 3, 1).and_hms_opt(23, 59, 59).unwrap()));
        assert!(!w.contains(date(2024, 3, 2).and_hms_opt(0, 0, 0).unwrap()));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(DateWindow::parse("2024-03-01", "2024-03-07").is_ok());
        assert!(DateWindow::parse("", "2024-03-07").is_err());
        assert!(DateWindow::parse("03/01/2024", "2024-03-07").is_err());
    }
}
