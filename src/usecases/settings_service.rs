//! Settings lifecycle: load, save, activate, resume, deactivate, uninstall.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::settings::keys;
use crate::domain::{DomainError, Settings};
use crate::ports::OptionStore;
use crate::shared::secrets::PasswordCipher;
use crate::usecases::scheduler_service::SchedulerService;

pub struct SettingsService {
    store: Arc<dyn OptionStore>,
    scheduler: Arc<SchedulerService>,
    cipher: PasswordCipher,
    /// Files the service owns; removed on uninstall.
    uploads_dir: PathBuf,
}

impl SettingsService {
    pub fn new(
        store: Arc<dyn OptionStore>,
        scheduler: Arc<SchedulerService>,
        cipher: PasswordCipher,
        uploads_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            scheduler,
            cipher,
            uploads_dir,
        }
    }

    /// Stored settings, defaults filling every absent or malformed key.
    pub async fn load(&self) -> Result<Settings, DomainError> {
        Ok(Settings::from_options(&self.store.load_options().await?))
    }

    /// Validate and store a submitted form.
    ///
    /// Unknown keys are ignored. A non-empty SMTP password is encrypted; an
    /// empty one keeps the stored password. Nothing is written if any value is
    /// malformed. A change to enabled, send day or send time reschedules.
    pub async fn save(&self, form: HashMap<String, String>) -> Result<Settings, DomainError> {
        let current = self.load().await?;
        let mut next = current.clone();
        let mut touched: Vec<&str> = Vec::new();

        for (key, value) in &form {
            let Some(known) = keys::ALL.iter().find(|k| **k == key.as_str()) else {
                debug!(key = %key, "ignoring unknown form field");
                continue;
            };
            if *known == keys::SMTP_PASSWORD {
                if value.is_empty() {
                    continue;
                }
                next.set(known, &self.cipher.encrypt(value)?)?;
            } else {
                next.set(known, value)?;
            }
            touched.push(*known);
        }

        let options: Vec<(String, String)> = next
            .to_options()
            .into_iter()
            .filter(|(k, _)| touched.contains(&k.as_str()))
            .collect();
        self.store.save_options(&options).await?;
        info!(count = options.len(), "settings saved");

        if current.schedule_differs(&next) {
            self.scheduler.reschedule(&next).await?;
        }
        Ok(next)
    }

    /// Add every absent default, then schedule.
    pub async fn activate(&self) -> Result<(), DomainError> {
        let added = self
            .store
            .add_missing(&Settings::default().to_options())
            .await?;
        let settings = self.load().await?;
        let next = self.scheduler.reschedule(&settings).await?;
        info!(added, scheduled = next.is_some(), "activated");
        Ok(())
    }

    /// Startup: add absent defaults and keep the stored schedule.
    pub async fn resume(&self) -> Result<(), DomainError> {
        let added = self
            .store
            .add_missing(&Settings::default().to_options())
            .await?;
        let settings = self.load().await?;
        let next = self.scheduler.resume(&settings).await?;
        info!(added, scheduled = next.is_some(), "resumed");
        Ok(())
    }

    pub async fn deactivate(&self) -> Result<(), DomainError> {
        self.scheduler.clear().await?;
        info!("deactivated");
        Ok(())
    }

    /// Delete every option, every job and the uploads directory.
    pub async fn uninstall(&self) -> Result<(), DomainError> {
        self.store.delete_options(keys::ALL).await?;
        self.scheduler.clear_all().await?;
        match tokio::fs::remove_dir_all(&self.uploads_dir).await {
            Ok(()) => info!(path = %self.uploads_dir.display(), "uploads removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.uploads_dir.display(), error = %e, "cannot remove uploads"),
        }
        info!("uninstalled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schedule::NEWSLETTER_HOOK;
    use crate::ports::JobRegistry;
    use crate::usecases::testing::{MemoryJobs, MemoryOptions};
    use chrono::{FixedOffset, TimeZone, Utc};

    struct Fixture {
        store: Arc<MemoryOptions>,
        jobs: Arc<MemoryJobs>,
        service: SettingsService,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryOptions::default());
        let jobs = Arc::new(MemoryJobs::default());
        let scheduler = Arc::new(SchedulerService::new(
            jobs.clone(),
            FixedOffset::east_opt(0).unwrap(),
        ));
        let service = SettingsService::new(
            store.clone(),
            scheduler,
            PasswordCipher::from_salts("a", "b"),
            dir.path().join("uploads"),
        );
        Fixture {
            store,
            jobs,
            service,
            _dir: dir,
        }
    }

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn activate_keeps_existing_values() {
        let f = fixture();
        f.store
            .save_options(&[(keys::SUBJECT.into(), "Mine".into())])
            .await
            .unwrap();
        f.service.activate().await.unwrap();
        let map = f.store.map.lock().unwrap().clone();
        assert_eq!(map.len(), keys::ALL.len());
        assert_eq!(map[keys::SUBJECT], "Mine");
        assert!(f.jobs.get(NEWSLETTER_HOOK).is_some());
    }

    #[tokio::test]
    async fn password_is_encrypted_and_blank_keeps_it() {
        let f = fixture();
        f.service
            .save(form(&[(keys::SMTP_PASSWORD, "hunter2")]))
            .await
            .unwrap();
        let stored = f.store.map.lock().unwrap()[keys::SMTP_PASSWORD].clone();
        assert_ne!(stored, "hunter2");
        let cipher = PasswordCipher::from_salts("a", "b");
        assert_eq!(cipher.decrypt(&stored).unwrap(), "hunter2");

        f.service
            .save(form(&[(keys::SMTP_PASSWORD, ""), (keys::SMTP_HOST, "smtp.x")]))
            .await
            .unwrap();
        let map = f.store.map.lock().unwrap().clone();
        assert_eq!(map[keys::SMTP_PASSWORD], stored);
        assert_eq!(map[keys::SMTP_HOST], "smtp.x");
    }

    #[tokio::test]
    async fn schedule_change_reschedules_and_disable_clears() {
        let f = fixture();
        f.service.activate().await.unwrap();
        f.service
            .save(form(&[(keys::SUBJECT, "New subject")]))
            .await
            .unwrap();
        assert!(f.jobs.get(NEWSLETTER_HOOK).is_some());

        f.service.save(form(&[(keys::ENABLED, "0")])).await.unwrap();
        assert!(f.jobs.get(NEWSLETTER_HOOK).is_none());
    }

    #[tokio::test]
    async fn restart_keeps_a_pending_send() {
        let f = fixture();
        f.service.activate().await.unwrap();
        let due = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
        f.jobs.schedule(NEWSLETTER_HOOK, due, 604_800).await.unwrap();

        f.service.resume().await.unwrap();
        assert_eq!(f.jobs.get(NEWSLETTER_HOOK).unwrap().next_run, due);
    }

    #[tokio::test]
    async fn resume_fills_defaults_and_schedules_when_missing() {
        let f = fixture();
        f.service.resume().await.unwrap();
        assert_eq!(f.store.map.lock().unwrap().len(), keys::ALL.len());
        assert!(f.jobs.get(NEWSLETTER_HOOK).is_some());

        f.service.save(form(&[(keys::ENABLED, "0")])).await.unwrap();
        f.jobs
            .schedule(NEWSLETTER_HOOK, Utc::now(), 604_800)
            .await
            .unwrap();
        f.service.resume().await.unwrap();
        assert!(f.jobs.get(NEWSLETTER_HOOK).is_none());
    }

    #[tokio::test]
    async fn malformed_form_writes_nothing() {
        let f = fixture();
        let err = f
            .service
            .save(form(&[(keys::SUBJECT, "ok"), (keys::SMTP_PORT, "many")]))
            .await;
        assert!(err.is_err());
        assert!(f.store.map.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn uninstall_removes_everything() {
        let f = fixture();
        f.service.activate().await.unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 11, 8, 0, 0).unwrap();
        f.jobs
            .schedule("weekly_digest_cleanup", at, 86_400)
            .await
            .unwrap();
        std::fs::create_dir_all(f._dir.path().join("uploads/2024")).unwrap();
        f.service.uninstall().await.unwrap();
        assert!(f.store.map.lock().unwrap().is_empty());
        assert!(f.jobs.jobs.lock().unwrap().is_empty());
        assert!(!f._dir.path().join("uploads").exists());
        // Idempotent.
        f.service.uninstall().await.unwrap();
    }
}
