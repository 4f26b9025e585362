//! Mail dispatch: pick a transport, send one message per recipient, report.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{DispatchReport, MailSettings, MailType, OutgoingMail, SmtpParams};
use crate::ports::{MailTransport, TransportFactory};
use crate::shared::config::SmtpOverrides;
use crate::shared::secrets::PasswordCipher;

/// Sender identity shared by every digest mail.
#[derive(Debug, Clone)]
pub struct MailIdentity {
    pub from_address: String,
    pub reply_to: Option<String>,
}

/// One batch: the same subject and body to every recipient.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    pub recipients: &'a [String],
    pub subject: &'a str,
    pub html: &'a str,
    pub from_name: &'a str,
}

pub struct MailDispatcher {
    factory: Arc<dyn TransportFactory>,
    cipher: PasswordCipher,
    overrides: SmtpOverrides,
    identity: MailIdentity,
}

impl MailDispatcher {
    pub fn new(
        factory: Arc<dyn TransportFactory>,
        cipher: PasswordCipher,
        overrides: SmtpOverrides,
        identity: MailIdentity,
    ) -> Self {
        Self {
            factory,
            cipher,
            overrides,
            identity,
        }
    }

    /// Stored SMTP settings with configured constants laid over them. The
    /// stored password is decrypted; a blob that fails to decrypt counts as empty.
    /// None when host, username or password is missing.
    pub fn smtp_params(&self, mail: &MailSettings) -> Option<SmtpParams> {
        let o = &self.overrides;
        let host = o.host.clone().unwrap_or_else(|| mail.smtp_host.clone());
        let username = o
            .username
            .clone()
            .unwrap_or_else(|| mail.smtp_username.clone());
        let password = match &o.password {
            Some(p) => p.clone(),
            None => self.cipher.decrypt(&mail.smtp_password).unwrap_or_else(|e| {
                warn!(error = %e, "stored SMTP password unreadable; treating as empty");
                String::new()
            }),
        };
        if host.is_empty() || username.is_empty() || password.is_empty() {
            return None;
        }
        Some(SmtpParams {
            host,
            port: o.port.unwrap_or(mail.smtp_port),
            username,
            password,
            encryption: o.encryption.unwrap_or(mail.smtp_encryption),
        })
    }

    /// SMTP when selected and complete, otherwise the default transport.
    pub fn transport_for(&self, mail: &MailSettings) -> Arc<dyn MailTransport> {
        if mail.mail_type != MailType::Smtp {
            return self.factory.default_transport();
        }
        let Some(params) = self.smtp_params(mail) else {
            warn!("SMTP selected but host, username or password missing; using default transport");
            return self.factory.default_transport();
        };
        match self.factory.smtp_transport(&params) {
            Ok(t) => t,
            Err(e) => {
                warn!(host = %params.host, error = %e, "SMTP transport unavailable; using default transport");
                self.factory.default_transport()
            }
        }
    }

    /// Send sequentially. Failures are logged per recipient and never abort the batch.
    pub async fn dispatch(&self, mail: &MailSettings, batch: Batch<'_>) -> DispatchReport {
        let transport = self.transport_for(mail);
        let mut report = DispatchReport {
            recipients: batch.recipients.len(),
            ..Default::default()
        };
        for to in batch.recipients {
            let message = OutgoingMail {
                to: to.clone(),
                subject: batch.subject.to_string(),
                html: batch.html.to_string(),
                from_name: batch.from_name.to_string(),
                from_address: self.identity.from_address.clone(),
                reply_to: self.identity.reply_to.clone(),
            };
            match transport.send(&message).await {
                Ok(()) => {
                    report.sent += 1;
                    debug!(to = %to, transport = transport.name(), "sent");
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(to = %to, transport = transport.name(), error = %e, "failed to send");
                }
            }
        }
        info!(
            recipients = report.recipients,
            sent = report.sent,
            failed = report.failed,
            transport = transport.name(),
            "batch finished"
        );
        report
    }
}
