use crate::render::html_to_plain_text;
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error(
        "SMTP authentication failed; make sure GMAIL_APP_PASSWORD is a 16-character app password, not the account password: {0}"
    )]
    Auth(String),

    #[error("SMTP delivery failed: {0}")]
    Transport(String),
}

#[derive(Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub timeout_seconds: u64,
}

impl SmtpConfig {
    /// Gmail submission over STARTTLS with an app password.
    pub fn gmail(username: String, password: String) -> Self {
        Self {
            server: "smtp.gmail.com".to_string(),
            port: 587,
            username,
            password,
            timeout_seconds: 30,
        }
    }
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Who the digest is from and who gets it.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub sender_name: String,
    pub sender_address: String,
    pub recipients: Vec<String>,
}

/// Build the `multipart/alternative` message (plain text first, then HTML).
pub fn build_message(envelope: &Envelope, subject: &str, html: &str) -> Result<Message, DeliveryError> {
    let from = Mailbox::new(
        Some(envelope.sender_name.clone()),
        envelope.sender_address.parse()?,
    );

    let mut builder = Message::builder().from(from).subject(subject).date_now();
    for recipient in &envelope.recipients {
        builder = builder.to(Mailbox::new(None, recipient.parse()?));
    }

    let plain = html_to_plain_text(html);
    let message = builder.multipart(MultiPart::alternative_plain_html(plain, html.to_string()))?;
    Ok(message)
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn deliver(&self, message: Message) -> Result<(), DeliveryError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, DeliveryError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)
            .map_err(|e| DeliveryError::Transport(e.to_string()))?
            .port(config.port)
            .credentials(Credentials::new(config.username.clone(), config.password.clone()))
            .timeout(Some(Duration::from_secs(config.timeout_seconds)))
            .build();

        Ok(Self { transport })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn deliver(&self, message: Message) -> Result<(), DeliveryError> {
        let recipients = message.envelope().to().len();
        match self.transport.send(message).await {
            Ok(_) => {
                info!(recipients, "Email sent");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to send email");
                Err(classify_smtp_error(&e))
            }
        }
    }
}

/// 530/534/535 are the authentication replies.
fn classify_smtp_error(e: &lettre::transport::smtp::Error) -> DeliveryError {
    let is_auth = e
        .status()
        .map(|code| code.to_string().starts_with("53"))
        .unwrap_or(false);
    if is_auth {
        DeliveryError::Auth(e.to_string())
    } else {
        DeliveryError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(recipients: &[&str]) -> Envelope {
        Envelope {
            sender_name: "FastTrackr AI".to_string(),
            sender_address: "digest@example.com".to_string(),
            recipients: recipients.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn builds_alternative_message_for_every_recipient() {
        let message = build_message(
            &envelope(&["a@example.com", "b@example.com"]),
            "RIA News Digest",
            "<html><body><p>Hello</p></body></html>",
        )
        .unwrap();

        assert_eq!(message.envelope().to().len(), 2);
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("FastTrackr AI"));
        assert!(formatted.contains("digest@example.com"));
        assert!(formatted.contains("a@example.com"));
        assert!(formatted.contains("b@example.com"));
        assert!(formatted.contains("multipart/alternative"));
        assert!(formatted.contains("text/plain"));
        assert!(formatted.contains("text/html"));
    }

    #[test]
    fn rejects_invalid_recipient() {
        let err = build_message(&envelope(&["not-an-address"]), "s", "<p>x</p>").unwrap_err();
        assert!(matches!(err, DeliveryError::Address(_)));
    }

    #[test]
    fn debug_hides_password() {
        let config = SmtpConfig::gmail("me@example.com".into(), "secret-app-password".into());
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-app-password"));
        assert_eq!(config.port, 587);
    }
}
