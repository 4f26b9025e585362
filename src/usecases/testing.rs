//! In-memory port implementations for use-case tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, FixedOffset, Utc};

use crate::domain::digest::SiteLinks;
use crate::domain::entities::fixtures::{blog_post, forum_post};
use crate::domain::{
    BlogPost, DateWindow, DomainError, ForumPost, OutgoingMail, ScheduledJob, SmtpParams,
};
use crate::ports::{
    ContentSource, JobRegistry, MailTransport, OptionStore, RecipientDirectory, TransportFactory,
};
use crate::shared::config::SmtpOverrides;
use crate::shared::secrets::PasswordCipher;
use crate::usecases::content_service::ContentService;
use crate::usecases::digest_service::DigestService;
use crate::usecases::mail_dispatcher::{MailDispatcher, MailIdentity};
use crate::usecases::newsletter_service::NewsletterService;
use crate::usecases::scheduler_service::SchedulerService;
use crate::usecases::settings_service::SettingsService;

#[derive(Default)]
pub struct MemoryContent {
    pub forum: Vec<ForumPost>,
    pub blog: Vec<BlogPost>,
    pub calls: Mutex<Vec<&'static str>>,
}

#[async_trait::async_trait]
impl ContentSource for MemoryContent {
    async fn forum_posts(&self, window: &DateWindow) -> Result<Vec<ForumPost>, DomainError> {
        self.calls.lock().unwrap().push("forum");
        Ok(self
            .forum
            .iter()
            .filter(|p| window.contains(p.created))
            .cloned()
            .collect())
    }

    async fn blog_posts(
        &self,
        window: &DateWindow,
        limit: usize,
    ) -> Result<Vec<BlogPost>, DomainError> {
        self.calls.lock().unwrap().push("blog");
        Ok(self
            .blog
            .iter()
            .filter(|p| window.contains(p.published))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryDirectory {
    pub users: Vec<(String, String)>,
}

#[async_trait::async_trait]
impl RecipientDirectory for MemoryDirectory {
    async fn emails_for_roles(&self, roles: &[String]) -> Result<Vec<String>, DomainError> {
        let mut out: Vec<String> = Vec::new();
        for (email, role) in &self.users {
            if roles.contains(role) && !out.contains(email) {
                out.push(email.clone());
            }
        }
        Ok(out)
    }
}

#[derive(Default)]
pub struct MemoryOptions {
    pub map: Mutex<HashMap<String, String>>,
}

#[async_trait::async_trait]
impl OptionStore for MemoryOptions {
    async fn load_options(&self) -> Result<HashMap<String, String>, DomainError> {
        Ok(self.map.lock().unwrap().clone())
    }

    async fn save_options(&self, options: &[(String, String)]) -> Result<(), DomainError> {
        let mut map = self.map.lock().unwrap();
        for (k, v) in options {
            map.insert(k.clone(), v.clone());
        }
        Ok(())
    }

    async fn add_missing(&self, options: &[(String, String)]) -> Result<usize, DomainError> {
        let mut map = self.map.lock().unwrap();
        let mut added = 0;
        for (k, v) in options {
            if !map.contains_key(k) {
                map.insert(k.clone(), v.clone());
                added += 1;
            }
        }
        Ok(added)
    }

    async fn delete_options(&self, keys: &[&str]) -> Result<(), DomainError> {
        let mut map = self.map.lock().unwrap();
        for k in keys {
            map.remove(*k);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryJobs {
    pub jobs: Mutex<HashMap<String, ScheduledJob>>,
}

impl MemoryJobs {
    pub fn get(&self, hook: &str) -> Option<ScheduledJob> {
        self.jobs.lock().unwrap().get(hook).cloned()
    }
}

#[async_trait::async_trait]
impl JobRegistry for MemoryJobs {
    async fn schedule(
        &self,
        hook: &str,
        next_run: DateTime<Utc>,
        interval_secs: i64,
    ) -> Result<(), DomainError> {
        self.jobs.lock().unwrap().insert(
            hook.to_string(),
            ScheduledJob {
                hook: hook.to_string(),
                next_run,
                interval_secs,
            },
        );
        Ok(())
    }

    async fn clear(&self, hook: &str) -> Result<bool, DomainError> {
        Ok(self.jobs.lock().unwrap().remove(hook).is_some())
    }

    async fn clear_all(&self) -> Result<usize, DomainError> {
        let mut jobs = self.jobs.lock().unwrap();
        let removed = jobs.len();
        jobs.clear();
        Ok(removed)
    }

    async fn next_scheduled(&self, hook: &str) -> Result<Option<DateTime<Utc>>, DomainError> {
        Ok(self.get(hook).map(|j| j.next_run))
    }

    async fn due_jobs(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledJob>, DomainError> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .values()
            .filter(|j| j.is_due(now))
            .cloned()
            .collect())
    }

    async fn advance(&self, hook: &str, next_run: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(job) = self.jobs.lock().unwrap().get_mut(hook) {
            job.next_run = next_run;
        }
        Ok(())
    }
}

/// Records every mail; addresses listed in `reject` fail.
pub struct RecordingTransport {
    pub label: &'static str,
    pub sent: Mutex<Vec<OutgoingMail>>,
    pub reject: Vec<String>,
}

impl RecordingTransport {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            sent: Mutex::new(Vec::new()),
            reject: Vec::new(),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MailTransport for RecordingTransport {
    fn name(&self) -> &'static str {
        self.label
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<(), DomainError> {
        if self.reject.contains(&mail.to) {
            return Err(DomainError::Mail(format!("rejected {}", mail.to)));
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

/// Hands out two fixed recording transports and remembers SMTP requests.
pub struct FakeFactory {
    pub default: Arc<RecordingTransport>,
    pub smtp: Arc<RecordingTransport>,
    pub smtp_requests: Mutex<Vec<SmtpParams>>,
    pub smtp_fails: bool,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self {
            default: Arc::new(RecordingTransport::new("default")),
            smtp: Arc::new(RecordingTransport::new("smtp")),
            smtp_requests: Mutex::new(Vec::new()),
            smtp_fails: false,
        }
    }
}

impl TransportFactory for FakeFactory {
    fn default_transport(&self) -> Arc<dyn MailTransport> {
        self.default.clone()
    }

    fn smtp_transport(&self, params: &SmtpParams) -> Result<Arc<dyn MailTransport>, DomainError> {
        self.smtp_requests.lock().unwrap().push(params.clone());
        if self.smtp_fails {
            return Err(DomainError::Mail("relay unreachable".into()));
        }
        Ok(self.smtp.clone())
    }
}

/// Services wired over in-memory ports. Two subscribers/admins and one editor;
/// one forum post and one blog post in early March 2024.
pub struct Harness {
    pub store: Arc<MemoryOptions>,
    pub jobs: Arc<MemoryJobs>,
    pub factory: Arc<FakeFactory>,
    pub settings: Arc<SettingsService>,
    pub scheduler: Arc<SchedulerService>,
    pub digest: Arc<DigestService>,
    pub newsletter: Arc<NewsletterService>,
    pub dir: tempfile::TempDir,
}

pub fn harness() -> Harness {
    let tz = FixedOffset::east_opt(0).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryOptions::default());
    let jobs = Arc::new(MemoryJobs::default());
    let factory = Arc::new(FakeFactory::new());
    let cipher = PasswordCipher::from_salts("a", "b");

    let scheduler = Arc::new(SchedulerService::new(jobs.clone(), tz));
    let settings = Arc::new(SettingsService::new(
        store.clone(),
        scheduler.clone(),
        cipher.clone(),
        dir.path().join("uploads"),
    ));
    let content = MemoryContent {
        forum: vec![forum_post(1, (1, "General"), (4, "Welcome"), "Hello")],
        blog: vec![blog_post(2, "Release", Some(("News", "news")))],
        ..Default::default()
    };
    let digest = Arc::new(DigestService::new(
        ContentService::new(Arc::new(content), tz),
        SiteLinks {
            home_url: "https://example.org/".into(),
            forum_url: "https://example.org/community/".into(),
        },
    ));
    let directory = MemoryDirectory {
        users: vec![
            ("a@example.org".into(), "subscriber".into()),
            ("b@example.org".into(), "administrator".into()),
            ("a@example.org".into(), "administrator".into()),
            ("editor@example.org".into(), "editor".into()),
        ],
    };
    let dispatcher = MailDispatcher::new(
        factory.clone(),
        cipher,
        SmtpOverrides::default(),
        MailIdentity {
            from_address: "wordpress@example.org".into(),
            reply_to: None,
        },
    );
    let newsletter = Arc::new(NewsletterService::new(
        settings.clone(),
        digest.clone(),
        Arc::new(directory),
        dispatcher,
    ));
    Harness {
        store,
        jobs,
        factory,
        settings,
        scheduler,
        digest,
        newsletter,
        dir,
    }
}
