//! Mail transport abstraction and the SMTP implementation

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{MailConfig, MailCredentials, MailSecurity};
use crate::OutreachError;

/// A composed message for a single recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Abstraction over the mail relay for dependency injection
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait Mailer: Send + Sync {
    /// Send one message
    async fn send(&self, mail: &OutgoingMail) -> crate::Result<()>;
}

/// Production mailer backed by an SMTP relay
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Option<Mailbox>,
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("from", &self.from)
            .finish()
    }
}

impl SmtpMailer {
    /// Build the transport. Credentials are optional here: without them the
    /// relay rejects each send and the error surfaces per message.
    pub fn new(config: &MailConfig, credentials: &MailCredentials) -> crate::Result<Self> {
        let builder = match config.security {
            MailSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
                .map_err(|e| {
                    OutreachError::Config(format!("SMTP relay {}: {}", config.smtp_host, e))
                })?,
            MailSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host).map_err(
                    |e| OutreachError::Config(format!("SMTP relay {}: {}", config.smtp_host, e)),
                )?
            }
            MailSecurity::Plain => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            }
        };

        let mut builder = builder
            .port(config.smtp_port)
            .timeout(Some(Duration::from_secs(config.timeout_seconds)));

        if let (Some(address), Some(password)) = (&credentials.address, &credentials.app_password)
        {
            builder = builder.credentials(Credentials::new(address.clone(), password.clone()));
        }

        let from = match &credentials.address {
            Some(address) => {
                let address: Address = address.parse().map_err(|e| {
                    OutreachError::Config(format!("Invalid sender address '{}': {}", address, e))
                })?;
                Some(Mailbox::new(Some(config.from_name.clone()), address))
            }
            None => None,
        };

        tracing::debug!(
            "Created SMTP mailer for {}:{} ({:?})",
            config.smtp_host,
            config.smtp_port,
            config.security
        );

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, mail: &OutgoingMail) -> crate::Result<Message> {
        let from = self.from.clone().ok_or_else(|| {
            OutreachError::Transport("sender address is not configured".to_string())
        })?;
        let to: Mailbox = mail.to.trim().parse().map_err(|e| {
            OutreachError::Transport(format!("invalid recipient '{}': {}", mail.to, e))
        })?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(mail.subject.as_str())
            .multipart(MultiPart::alternative_plain_html(
                mail.text.clone(),
                mail.html.clone(),
            ))
            .map_err(|e| OutreachError::Transport(format!("building message: {}", e)))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> crate::Result<()> {
        let message = self.build_message(mail)?;

        tracing::debug!("Sending '{}' to {}", mail.subject, mail.to);
        let response = self.transport.send(message).await.map_err(|e| {
            OutreachError::Transport(format!("SMTP send to {} failed: {}", mail.to, e))
        })?;

        tracing::debug!("Relay accepted mail to {} ({})", mail.to, response.code());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> MailConfig {
        MailConfig {
            smtp_host: "127.0.0.1".to_string(),
            smtp_port: 1,
            security: MailSecurity::Plain,
            timeout_seconds: 2,
            ..MailConfig::default()
        }
    }

    fn credentials() -> MailCredentials {
        MailCredentials {
            address: Some("news@example.org".to_string()),
            app_password: Some("app-password".to_string()),
        }
    }

    fn mail(to: &str) -> OutgoingMail {
        OutgoingMail {
            to: to.to_string(),
            subject: "Hello".to_string(),
            html: "<p>Hi</p>".to_string(),
            text: "Hi".to_string(),
        }
    }

    #[test]
    fn rejects_invalid_sender_address() {
        let bad = MailCredentials {
            address: Some("not an address".to_string()),
            app_password: None,
        };
        let err = SmtpMailer::new(&local_config(), &bad).unwrap_err();
        assert!(matches!(err, OutreachError::Config(_)));
    }

    #[tokio::test]
    async fn missing_sender_fails_at_send() {
        let mailer = SmtpMailer::new(&local_config(), &MailCredentials::default()).unwrap();
        let err = mailer.send(&mail("kid@example.org")).await.unwrap_err();
        match err {
            OutreachError::Transport(msg) => assert!(msg.contains("sender"), "{msg}"),
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_recipient_is_transport_error() {
        let mailer = SmtpMailer::new(&local_config(), &credentials()).unwrap();
        let err = mailer.send(&mail("not-an-email")).await.unwrap_err();
        match err {
            OutreachError::Transport(msg) => {
                assert!(msg.starts_with("invalid recipient 'not-an-email'"), "{msg}")
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_relay_is_transport_error() {
        let mailer = SmtpMailer::new(&local_config(), &credentials()).unwrap();
        let err = mailer.send(&mail("kid@example.org")).await.unwrap_err();
        match err {
            OutreachError::Transport(msg) => {
                assert!(msg.starts_with("SMTP send to kid@example.org failed"), "{msg}")
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }
}
