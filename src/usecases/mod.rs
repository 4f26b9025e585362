//! Application use cases. Orchestrate domain logic via ports.

pub mod admin_service;
pub mod content_service;
pub mod cron_runner;
pub mod digest_service;
pub mod mail_dispatcher;
pub mod newsletter_service;
pub mod scheduler_service;
pub mod settings_service;

#[cfg(test)]
pub(crate) mod testing;

pub use admin_service::AdminService;
pub use content_service::ContentService;
pub use cron_runner::CronRunner;
pub use digest_service::{DigestService, RenderedDigest};
pub use mail_dispatcher::{MailDispatcher, MailIdentity};
pub use newsletter_service::NewsletterService;
pub use scheduler_service::SchedulerService;
pub use settings_service::SettingsService;
