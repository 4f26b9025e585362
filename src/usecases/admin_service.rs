//! Admin facade. Implements the inbound port for the HTTP admin and the console.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::settings::keys;
use crate::domain::{DomainError, SendOutcome, Settings};
use crate::ports::InputPort;
use crate::usecases::digest_service::DigestService;
use crate::usecases::newsletter_service::NewsletterService;
use crate::usecases::scheduler_service::SchedulerService;
use crate::usecases::settings_service::SettingsService;

pub struct AdminService {
    settings: Arc<SettingsService>,
    scheduler: Arc<SchedulerService>,
    digest: Arc<DigestService>,
    newsletter: Arc<NewsletterService>,
}

impl AdminService {
    pub fn new(
        settings: Arc<SettingsService>,
        scheduler: Arc<SchedulerService>,
        digest: Arc<DigestService>,
        newsletter: Arc<NewsletterService>,
    ) -> Self {
        Self {
            settings,
            scheduler,
            digest,
            newsletter,
        }
    }
}

/// Lay unsaved form values over `settings`. Malformed values are skipped; the
/// assembler falls back per token anyway. The password is never taken from a preview.
pub fn apply_preview_overrides(settings: &mut Settings, overrides: &HashMap<String, String>) {
    for (key, value) in overrides {
        if key == keys::SMTP_PASSWORD || !keys::ALL.contains(&key.as_str()) {
            continue;
        }
        if let Err(e) = settings.set(key, value) {
            debug!(key = %key, error = %e, "preview override skipped");
        }
    }
}

#[async_trait::async_trait]
impl InputPort for AdminService {
    async fn settings(&self) -> Result<Settings, DomainError> {
        self.settings.load().await
    }

    async fn save_settings(
        &self,
        form: HashMap<String, String>,
    ) -> Result<Settings, DomainError> {
        self.settings.save(form).await
    }

    async fn send_now(&self) -> Result<SendOutcome, DomainError> {
        self.newsletter.send().await
    }

    async fn send_test(&self, to: &str) -> Result<SendOutcome, DomainError> {
        self.newsletter.send_test(to).await
    }

    async fn preview(&self, overrides: &HashMap<String, String>) -> Result<String, DomainError> {
        let mut settings = self.settings.load().await?;
        apply_preview_overrides(&mut settings, overrides);
        Ok(self.digest.build(&settings).await?.html)
    }

    async fn next_send(&self) -> Result<Option<DateTime<Utc>>, DomainError> {
        self.scheduler.next_send().await
    }

    async fn activate(&self) -> Result<(), DomainError> {
        self.settings.activate().await
    }

    async fn deactivate(&self) -> Result<(), DomainError> {
        self.settings.deactivate().await
    }

    async fn uninstall(&self) -> Result<(), DomainError> {
        self.settings.uninstall().await
    }
}
