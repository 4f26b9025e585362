//! Weekly job scheduling in the site timezone.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{info, warn};

use crate::domain::schedule::{NEWSLETTER_HOOK, WEEK_SECS, next_occurrence};
use crate::domain::{DomainError, Settings};
use crate::ports::JobRegistry;

pub struct SchedulerService {
    jobs: Arc<dyn JobRegistry>,
    tz: FixedOffset,
}

impl SchedulerService {
    pub fn new(jobs: Arc<dyn JobRegistry>, tz: FixedOffset) -> Self {
        Self { jobs, tz }
    }

    pub async fn reschedule(
        &self,
        settings: &Settings,
    ) -> Result<Option<DateTime<Utc>>, DomainError> {
        self.reschedule_at(settings, Utc::now()).await
    }

    /// Clear the job, then add it again when enabled. Returns the next run.
    ///
    /// A malformed day or time is logged and leaves the job cleared.
    pub async fn reschedule_at(
        &self,
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, DomainError> {
        self.jobs.clear(NEWSLETTER_HOOK).await?;
        if !settings.enabled {
            info!("newsletter disabled; schedule cleared");
            return Ok(None);
        }
        let local_now = now.with_timezone(&self.tz);
        let next = match next_occurrence(&settings.send_day, &settings.send_time, local_now) {
            Ok(next) => next.with_timezone(&Utc),
            Err(e) => {
                warn!(
                    day = %settings.send_day,
                    time = %settings.send_time,
                    error = %e,
                    "cannot schedule newsletter"
                );
                return Ok(None);
            }
        };
        self.jobs.schedule(NEWSLETTER_HOOK, next, WEEK_SECS).await?;
        info!(
            next_run = %next.with_timezone(&self.tz),
            "newsletter scheduled"
        );
        Ok(Some(next))
    }

    /// Remove the job unconditionally.
    pub async fn clear(&self) -> Result<bool, DomainError> {
        let removed = self.jobs.clear(NEWSLETTER_HOOK).await?;
        info!(removed, "newsletter schedule cleared");
        Ok(removed)
    }

    /// Remove every job, including hooks this build no longer runs.
    pub async fn clear_all(&self) -> Result<usize, DomainError> {
        let removed = self.jobs.clear_all().await?;
        info!(removed, "all scheduled jobs cleared");
        Ok(removed)
    }

    pub async fn resume(
        &self,
        settings: &Settings,
    ) -> Result<Option<DateTime<Utc>>, DomainError> {
        self.resume_at(settings, Utc::now()).await
    }

    /// Keep a stored job as it is so a restart does not move a pending send.
    /// Schedules only when the job is missing; clears it when disabled.
    pub async fn resume_at(
        &self,
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, DomainError> {
        if !settings.enabled {
            self.jobs.clear(NEWSLETTER_HOOK).await?;
            return Ok(None);
        }
        match self.jobs.next_scheduled(NEWSLETTER_HOOK).await? {
            Some(next) => {
                info!(next_run = %next.with_timezone(&self.tz), "keeping stored schedule");
                Ok(Some(next))
            }
            None => self.reschedule_at(settings, now).await,
        }
    }

    pub async fn next_send(&self) -> Result<Option<DateTime<Utc>>, DomainError> {
        self.jobs.next_scheduled(NEWSLETTER_HOOK).await
    }

    pub fn timezone(&self) -> FixedOffset {
        self.tz
    }
}
