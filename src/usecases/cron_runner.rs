//! Cron runner (daemon): wake periodically, run due jobs, advance them.
//!
//! Runs on the shared runtime; uses tokio::time::sleep between ticks.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::domain::schedule::NEWSLETTER_HOOK;
use crate::domain::{DomainError, SendOutcome};
use crate::ports::JobRegistry;
use crate::usecases::newsletter_service::NewsletterService;

pub struct CronRunner {
    jobs: Arc<dyn JobRegistry>,
    newsletter: Arc<NewsletterService>,
    tick: Duration,
}

impl CronRunner {
    pub fn new(
        jobs: Arc<dyn JobRegistry>,
        newsletter: Arc<NewsletterService>,
        tick: Duration,
    ) -> Self {
        Self {
            jobs,
            newsletter,
            tick,
        }
    }

    /// Run until the process stops. A failing tick is logged and the loop continues.
    pub async fn run_loop(&self) -> Result<(), DomainError> {
        info!(tick_secs = self.tick.as_secs(), "cron runner started");
        loop {
            if let Err(e) = self.tick_at(Utc::now()).await {
                warn!(error = %e, "cron tick failed");
            }
            tokio::time::sleep(self.tick).await;
        }
    }

    /// Run every job due at `now`. Each job is advanced before it runs, so a
    /// failing job is not retried until its next slot. Returns how many ran.
    pub async fn tick_at(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let due = self.jobs.due_jobs(now).await?;
        if due.is_empty() {
            debug!("no jobs due");
            return Ok(0);
        }
        for job in &due {
            let next = job.following_run(now);
            self.jobs.advance(&job.hook, next).await?;
            match job.hook.as_str() {
                NEWSLETTER_HOOK => match self.newsletter.send_at(now).await {
                    Ok(SendOutcome::Sent { report, items, .. }) => {
                        info!(sent = report.sent, items, next_run = %next, "scheduled newsletter done")
                    }
                    Ok(SendOutcome::Disabled) => info!(next_run = %next, "scheduled newsletter skipped"),
                    Err(e) => warn!(error = %e, "scheduled newsletter failed"),
                },
                other => warn!(hook = other, "no handler for job"),
            }
        }
        Ok(due.len())
    }
}
