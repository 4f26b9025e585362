//! Build RFC 5322 messages from domain mail.

use lettre::Message;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;

use crate::domain::mail::HTML_CONTENT_TYPE;
use crate::domain::{DomainError, OutgoingMail};

fn address_err(field: &str, value: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::Mail(format!("invalid {} address '{}': {}", field, value, e))
}

/// HTML message with the configured sender name and optional Reply-To.
pub fn build_message(mail: &OutgoingMail) -> Result<Message, DomainError> {
    let from_address = mail
        .from_address
        .parse()
        .map_err(|e| address_err("from", &mail.from_address, e))?;
    let from_name = mail.from_name.trim();
    let from = Mailbox::new(
        (!from_name.is_empty()).then(|| from_name.to_string()),
        from_address,
    );
    let to: Mailbox = mail
        .to
        .parse()
        .map_err(|e| address_err("recipient", &mail.to, e))?;
    let content_type = ContentType::parse(HTML_CONTENT_TYPE)
        .map_err(|e| DomainError::Mail(e.to_string()))?;

    let mut builder = Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject.clone())
        .header(content_type);
    if let Some(reply_to) = &mail.reply_to {
        let reply_to: Mailbox = reply_to
            .parse()
            .map_err(|e| address_err("reply-to", reply_to, e))?;
        builder = builder.reply_to(reply_to);
    }
    builder
        .body(mail.html.clone())
        .map_err(|e| DomainError::Mail(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail() -> OutgoingMail {
        OutgoingMail {
            to: "reader@example.org".into(),
            subject: "Weekly digest".into(),
            html: "<p>Hello</p>".into(),
            from_name: "Forum News".into(),
            from_address: "wordpress@example.org".into(),
            reply_to: Some("noreply@example.org".into()),
        }
    }

    #[test]
    fn headers_are_set() {
        let raw = String::from_utf8(build_message(&mail()).unwrap().formatted()).unwrap();
        assert!(raw.contains("Content-Type: text/html; charset=utf-8"));
        assert!(raw.contains("From: \"Forum News\" <wordpress@example.org>"));
        assert!(raw.contains("Reply-To: noreply@example.org"));
        assert!(raw.contains("Subject: Weekly digest"));
    }

    #[test]
    fn bad_recipient_is_a_mail_error() {
        let mut m = mail();
        m.to = "not an address".into();
        assert!(matches!(build_message(&m), Err(DomainError::Mail(_))));
    }
}
