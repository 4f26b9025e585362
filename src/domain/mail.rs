//! Outgoing mail and resolved transport parameters.

use super::settings::SmtpEncryption;

/// Fixed content type of every digest mail.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// One message to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub from_name: String,
    pub from_address: String,
    pub reply_to: Option<String>,
}

/// Complete SMTP parameters with the password in plain text. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpParams {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub encryption: SmtpEncryption,
}

impl std::fmt::Debug for SmtpParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("encryption", &self.encryption)
            .finish()
    }
}

/// Result of one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub recipients: usize,
    pub sent: usize,
    pub failed: usize,
}

/// What a send request did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// `enabled` is off; nothing was fetched or sent.
    Disabled,
    Sent {
        report: DispatchReport,
        /// Blog plus forum posts in the digest.
        items: usize,
        subject: String,
    },
}
