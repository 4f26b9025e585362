//! Default transport: the local `sendmail` binary.

use lettre::{AsyncSendmailTransport, AsyncTransport, Tokio1Executor};

use crate::adapters::mail::message::build_message;
use crate::domain::{DomainError, OutgoingMail};
use crate::ports::MailTransport;

pub struct SendmailMailer {
    transport: AsyncSendmailTransport<Tokio1Executor>,
}

impl SendmailMailer {
    pub fn new() -> Self {
        Self {
            transport: AsyncSendmailTransport::<Tokio1Executor>::new(),
        }
    }

    /// Use a specific binary instead of `sendmail` from PATH.
    pub fn with_command(command: &str) -> Self {
        Self {
            transport: AsyncSendmailTransport::<Tokio1Executor>::new_with_command(command),
        }
    }
}

impl Default for SendmailMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MailTransport for SendmailMailer {
    fn name(&self) -> &'static str {
        "sendmail"
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<(), DomainError> {
        let message = build_message(mail)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| DomainError::Mail(e.to_string()))?;
        Ok(())
    }
}
