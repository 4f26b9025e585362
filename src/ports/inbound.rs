//! Inbound port. Admin surfaces (HTTP, console) call into the application.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::{DomainError, SendOutcome, Settings};

#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Current settings with defaults applied.
    async fn settings(&self) -> Result<Settings, DomainError>;

    /// Apply a submitted form. Unknown keys are ignored; returns the new settings.
    async fn save_settings(&self, form: HashMap<String, String>)
    -> Result<Settings, DomainError>;

    /// Send the digest now, honouring the enabled flag.
    async fn send_now(&self) -> Result<SendOutcome, DomainError>;

    /// Send the digest to one address with a `[Test]` subject.
    async fn send_test(&self, to: &str) -> Result<SendOutcome, DomainError>;

    /// Render the digest with unsaved `overrides` laid over the stored settings.
    async fn preview(&self, overrides: &HashMap<String, String>) -> Result<String, DomainError>;

    async fn next_send(&self) -> Result<Option<DateTime<Utc>>, DomainError>;

    async fn activate(&self) -> Result<(), DomainError>;

    async fn deactivate(&self) -> Result<(), DomainError>;

    async fn uninstall(&self) -> Result<(), DomainError>;
}
