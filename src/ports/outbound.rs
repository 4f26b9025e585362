//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{
    BlogPost, DateWindow, DomainError, ForumPost, OutgoingMail, ScheduledJob, SmtpParams,
};

/// Read-only access to the site's posts.
#[async_trait::async_trait]
pub trait ContentSource: Send + Sync {
    /// Forum posts created within the window (inclusive, whole days), ordered by
    /// forum title, thread title, creation time.
    async fn forum_posts(&self, window: &DateWindow) -> Result<Vec<ForumPost>, DomainError>;

    /// Published blog posts within the window, newest first, at most `limit`.
    async fn blog_posts(
        &self,
        window: &DateWindow,
        limit: usize,
    ) -> Result<Vec<BlogPost>, DomainError>;
}

/// Who receives the digest.
#[async_trait::async_trait]
pub trait RecipientDirectory: Send + Sync {
    /// De-duplicated e-mail addresses of users holding any of `roles`.
    async fn emails_for_roles(&self, roles: &[String]) -> Result<Vec<String>, DomainError>;
}

/// Flat key/value option storage.
#[async_trait::async_trait]
pub trait OptionStore: Send + Sync {
    async fn load_options(&self) -> Result<HashMap<String, String>, DomainError>;

    /// Insert or overwrite the given options.
    async fn save_options(&self, options: &[(String, String)]) -> Result<(), DomainError>;

    /// Insert options that are absent; existing values are kept. Returns how many were added.
    async fn add_missing(&self, options: &[(String, String)]) -> Result<usize, DomainError>;

    async fn delete_options(&self, keys: &[&str]) -> Result<(), DomainError>;
}

/// Persistent recurring jobs, keyed by hook name.
#[async_trait::async_trait]
pub trait JobRegistry: Send + Sync {
    /// Add (or replace) the job for `hook`.
    async fn schedule(
        &self,
        hook: &str,
        next_run: DateTime<Utc>,
        interval_secs: i64,
    ) -> Result<(), DomainError>;

    /// Remove the job for `hook`. Returns true if one existed.
    async fn clear(&self, hook: &str) -> Result<bool, DomainError>;

    /// Remove every job. Returns how many were removed.
    async fn clear_all(&self) -> Result<usize, DomainError>;

    async fn next_scheduled(&self, hook: &str) -> Result<Option<DateTime<Utc>>, DomainError>;

    /// Jobs with `next_run <= now`.
    async fn due_jobs(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledJob>, DomainError>;

    /// Move the job's next run.
    async fn advance(&self, hook: &str, next_run: DateTime<Utc>) -> Result<(), DomainError>;
}

/// Delivers one message.
#[async_trait::async_trait]
pub trait MailTransport: Send + Sync {
    /// Short name for logs, e.g. `sendmail` or `smtp`.
    fn name(&self) -> &'static str;

    async fn send(&self, mail: &OutgoingMail) -> Result<(), DomainError>;
}

/// Builds transports. Construction errors let the caller fall back.
pub trait TransportFactory: Send + Sync {
    /// The host's default mail transport.
    fn default_transport(&self) -> Arc<dyn MailTransport>;

    fn smtp_transport(&self, params: &SmtpParams) -> Result<Arc<dyn MailTransport>, DomainError>;
}
