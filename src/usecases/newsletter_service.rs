//! Newsletter use case: compose the digest and mail it to every recipient.
//!
//! Scheduled and manual sends go through [`NewsletterService::send`]; there is
//! no locking, so overlapping sends may deliver twice.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::{DomainError, SendOutcome};
use crate::ports::RecipientDirectory;
use crate::usecases::digest_service::DigestService;
use crate::usecases::mail_dispatcher::{Batch, MailDispatcher};
use crate::usecases::settings_service::SettingsService;

/// Subject prefix of test sends.
pub const TEST_SUBJECT_PREFIX: &str = "[Test]";

pub struct NewsletterService {
    settings: Arc<SettingsService>,
    digest: Arc<DigestService>,
    recipients: Arc<dyn RecipientDirectory>,
    dispatcher: MailDispatcher,
}

impl NewsletterService {
    pub fn new(
        settings: Arc<SettingsService>,
        digest: Arc<DigestService>,
        recipients: Arc<dyn RecipientDirectory>,
        dispatcher: MailDispatcher,
    ) -> Self {
        Self {
            settings,
            digest,
            recipients,
            dispatcher,
        }
    }

    pub async fn send(&self) -> Result<SendOutcome, DomainError> {
        self.send_at(Utc::now()).await
    }

    /// Send to every user holding a configured role. Does nothing when disabled.
    pub async fn send_at(&self, now: DateTime<Utc>) -> Result<SendOutcome, DomainError> {
        let settings = self.settings.load().await?;
        if !settings.enabled {
            info!("newsletter disabled; nothing sent");
            return Ok(SendOutcome::Disabled);
        }
        let rendered = self.digest.build_at(&settings, now).await?;
        let recipients = self.recipients.emails_for_roles(&settings.roles).await?;
        if recipients.is_empty() {
            warn!(roles = ?settings.roles, "no recipients for the configured roles");
        }
        let report = self
            .dispatcher
            .dispatch(
                &settings.mail,
                Batch {
                    recipients: &recipients,
                    subject: &rendered.subject,
                    html: &rendered.html,
                    from_name: &settings.from_name,
                },
            )
            .await;
        let range = rendered
            .window
            .map(|w| format!("{} to {}", w.from(), w.to()))
            .unwrap_or_default();
        info!(
            recipients = report.recipients,
            sent = report.sent,
            items = rendered.items,
            range = %range,
            "newsletter send finished"
        );
        Ok(SendOutcome::Sent {
            report,
            items: rendered.items,
            subject: rendered.subject,
        })
    }

    pub async fn send_test(&self, to: &str) -> Result<SendOutcome, DomainError> {
        self.send_test_at(to, Utc::now()).await
    }

    /// Current digest to one address, `[Test]` subject. Ignores the enabled flag.
    pub async fn send_test_at(
        &self,
        to: &str,
        now: DateTime<Utc>,
    ) -> Result<SendOutcome, DomainError> {
        let to = to.trim();
        if to.is_empty() || !to.contains('@') {
            return Err(DomainError::Mail(format!("invalid test address '{}'", to)));
        }
        let settings = self.settings.load().await?;
        let rendered = self.digest.build_at(&settings, now).await?;
        let subject = format!("{} {}", TEST_SUBJECT_PREFIX, rendered.subject);
        let recipients = [to.to_string()];
        let report = self
            .dispatcher
            .dispatch(
                &settings.mail,
                Batch {
                    recipients: &recipients,
                    subject: &subject,
                    html: &rendered.html,
                    from_name: &settings.from_name,
                },
            )
            .await;
        info!(to, sent = report.sent, items = rendered.items, "test newsletter sent");
        Ok(SendOutcome::Sent {
            report,
            items: rendered.items,
            subject,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settings::keys;
    use crate::usecases::testing::{Harness, harness};
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 6, 10, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn sends_to_each_role_holder_once() {
        let Harness {
            newsletter,
            factory,
            ..
        } = harness();
        let outcome = newsletter.send_at(now()).await.unwrap();
        let SendOutcome::Sent { report, items, subject } = outcome else {
            panic!("expected a send");
        };
        assert_eq!(report.recipients, 2);
        assert_eq!(report.sent, 2);
        assert_eq!(items, 2);
        assert!(subject.ends_with("(28.02.2024 - 06.03.2024)"));
        let sent = factory.default.sent();
        assert_eq!(sent[0].from_name, "Forum & News");
        assert!(sent.iter().all(|m| m.to != "editor@example.org"));
    }

    #[tokio::test]
    async fn disabled_sends_nothing_but_test_still_works() {
        let Harness {
            newsletter,
            settings,
            factory,
            ..
        } = harness();
        let mut form = HashMap::new();
        form.insert(keys::ENABLED.to_string(), "0".to_string());
        settings.save(form).await.unwrap();

        assert_eq!(newsletter.send_at(now()).await.unwrap(), SendOutcome::Disabled);
        assert!(factory.default.sent().is_empty());

        newsletter.send_test_at("me@example.org", now()).await.unwrap();
        let sent = factory.default.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].subject.starts_with("[Test] Forum & News"));
    }

    #[tokio::test]
    async fn test_send_rejects_bad_address() {
        let h = harness();
        assert!(h.newsletter.send_test_at("nobody", now()).await.is_err());
    }
}
