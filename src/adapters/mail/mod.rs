//! Mail adapters (lettre): sendmail as the default transport, SMTP on request.

pub mod message;
pub mod sendmail;
pub mod smtp;

use std::sync::Arc;

use crate::domain::{DomainError, SmtpParams};
use crate::ports::{MailTransport, TransportFactory};

pub use sendmail::SendmailMailer;
pub use smtp::SmtpMailer;

/// Hands out the shared sendmail transport and builds SMTP transports per batch.
pub struct LettreTransports {
    default: Arc<SendmailMailer>,
}

impl LettreTransports {
    pub fn new(default: SendmailMailer) -> Self {
        Self {
            default: Arc::new(default),
        }
    }
}

impl TransportFactory for LettreTransports {
    fn default_transport(&self) -> Arc<dyn MailTransport> {
        self.default.clone()
    }

    fn smtp_transport(&self, params: &SmtpParams) -> Result<Arc<dyn MailTransport>, DomainError> {
        Ok(Arc::new(SmtpMailer::new(params)?))
    }
}
