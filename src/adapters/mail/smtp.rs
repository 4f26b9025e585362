//! SMTP transport.

use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

use crate::adapters::mail::message::build_message;
use crate::domain::{DomainError, OutgoingMail, SmtpEncryption, SmtpParams};
use crate::ports::MailTransport;

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build the transport. No connection is opened until the first send.
    ///
    /// `ssl` is implicit TLS, `tls` is STARTTLS, `none` is plain text.
    pub fn new(params: &SmtpParams) -> Result<Self, DomainError> {
        let builder = match params.encryption {
            SmtpEncryption::Ssl => AsyncSmtpTransport::<Tokio1Executor>::relay(&params.host),
            SmtpEncryption::Tls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&params.host)
            }
            SmtpEncryption::None => Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(
                &params.host,
            )),
        }
        .map_err(|e| DomainError::Mail(e.to_string()))?;
        let transport = builder
            .port(params.port)
            .credentials(Credentials::new(
                params.username.clone(),
                params.password.clone(),
            ))
            .build();
        Ok(Self { transport })
    }
}

#[async_trait::async_trait]
impl MailTransport for SmtpMailer {
    fn name(&self) -> &'static str {
        "smtp"
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

#[cfg(test)]
mod tests {
    use super::*;

    fn params(encryption: SmtpEncryption) -> SmtpParams {
        SmtpParams {
            host: "smtp.example.org".into(),
            port: 2525,
            username: "u".into(),
            password: "p".into(),
            encryption,
        }
    }

    #[tokio::test]
    async fn builds_for_every_encryption() {
        for enc in [SmtpEncryption::None, SmtpEncryption::Ssl, SmtpEncryption::Tls] {
            let mailer = SmtpMailer::new(&params(enc)).unwrap();
            assert_eq!(mailer.name(), "smtp");
        }
    }
}
