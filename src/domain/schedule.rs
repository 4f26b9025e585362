//! Weekly send schedule: parse the configured day/time and compute the next run.

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveTime, TimeDelta, TimeZone, Utc, Weekday};

use super::errors::DomainError;

/// Name of the single recurring job.
pub const NEWSLETTER_HOOK: &str = "weekly_digest_send";

/// Recurrence of the job.
pub const WEEK_SECS: i64 = 7 * 24 * 60 * 60;

/// Parsed send slot: a weekday and a wall-clock time in the site timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendSlot {
    pub weekday: Weekday,
    pub time: NaiveTime,
}

impl SendSlot {
    /// Parse `"monday"` and `"08:00"` (or `"08:00:00"`).
    pub fn parse(day: &str, time: &str) -> Result<Self, DomainError> {
        let weekday: Weekday = day
            .trim()
            .parse()
            .map_err(|_| DomainError::Schedule(format!("invalid send day '{}'", day)))?;
        let t = time.trim();
        let time = NaiveTime::parse_from_str(t, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M:%S"))
            .map_err(|_| DomainError::Schedule(format!("invalid send time '{}'", time)))?;
        Ok(Self { weekday, time })
    }

    /// "This <weekday>" at the slot time; if that is not strictly after `now`, one week later.
    pub fn next_after(
        &self,
        now: DateTime<FixedOffset>,
    ) -> Result<DateTime<FixedOffset>, DomainError> {
        let today = now.date_naive();
        let ahead = (7 + self.weekday.num_days_from_monday() as i64
            - today.weekday().num_days_from_monday() as i64)
            % 7;
        let day = today
            .checked_add_days(Days::new(ahead as u64))
            .ok_or_else(|| DomainError::Schedule("date out of range".into()))?;
        let candidate = now
            .timezone()
            .from_local_datetime(&day.and_time(self.time))
            .single()
            .ok_or_else(|| DomainError::Schedule("ambiguous local time".into()))?;
        if candidate > now {
            Ok(candidate)
        } else {
            candidate
                .checked_add_days(Days::new(7))
                .ok_or_else(|| DomainError::Schedule("date out of range".into()))
        }
    }
}

/// Next send instant for the configured day/time, seen from `now`.
pub fn next_occurrence(
    day: &str,
    time: &str,
    now: DateTime<FixedOffset>,
) -> Result<DateTime<FixedOffset>, DomainError> {
    SendSlot::parse(day, time)?.next_after(now)
}

/// Parse a fixed UTC offset such as `+02:00`, `-0530` or `UTC`.
pub fn parse_utc_offset(s: &str) -> Result<FixedOffset, DomainError> {
    let t = s.trim();
    if t.is_empty() || t.eq_ignore_ascii_case("utc") || t == "Z" {
        return FixedOffset::east_opt(0)
            .ok_or_else(|| DomainError::Settings("zero offset rejected".into()));
    }
    let (sign, rest) = match t.as_bytes()[0] {
        b'+' => (1, &t[1..]),
        b'-' => (-1, &t[1..]),
        _ => return Err(DomainError::Settings(format!("invalid UTC offset '{}'", s))),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::Settings(format!("invalid UTC offset '{}'", s)));
    }
    let (h, m) = match digits.len() {
        1 | 2 => (digits.as_str(), "0"),
        4 => digits.split_at(2),
        _ => return Err(DomainError::Settings(format!("invalid UTC offset '{}'", s))),
    };
    let h: i32 = h
        .parse()
        .map_err(|_| DomainError::Settings(format!("invalid UTC offset '{}'", s)))?;
    let m: i32 = m
        .parse()
        .map_err(|_| DomainError::Settings(format!("invalid UTC offset '{}'", s)))?;
    FixedOffset::east_opt(sign * (h * 3600 + m * 60))
        .ok_or_else(|| DomainError::Settings(format!("UTC offset out of range '{}'", s)))
}

/// A persisted recurring job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledJob {
    pub hook: String,
    pub next_run: DateTime<Utc>,
    pub interval_secs: i64,
}

impl ScheduledJob {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_run <= now
    }

    /// First run strictly after `now`, stepping by whole intervals. Missed runs are skipped.
    pub fn following_run(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let interval = self.interval_secs.max(1);
        if self.next_run > now {
            return self.next_run;
        }
        let behind = (now - self.next_run).num_seconds();
        let steps = behind / interval + 1;
        self.next_run + TimeDelta::seconds(steps * interval)
    }
}
