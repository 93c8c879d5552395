//! Single reply sender

use std::sync::Arc;

use serde::Deserialize;

use crate::compose::reply_mail;
use crate::mailer::Mailer;
use crate::OutreachError;

/// Body of a reply request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub original_message: Option<String>,
}

/// Sends one reply through the mail transport. One attempt, no retry.
pub struct ReplySender {
    mailer: Arc<dyn Mailer>,
}

impl std::fmt::Debug for ReplySender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplySender").finish()
    }
}

fn required(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ReplySender {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Validate, compose and send. Returns the address the reply went to.
    pub async fn send(&self, request: &ReplyRequest) -> crate::Result<String> {
        let (Some(email), Some(subject), Some(content)) = (
            required(&request.email),
            required(&request.subject),
            required(&request.content),
        ) else {
            return Err(OutreachError::Validation(
                "Missing required fields".to_string(),
            ));
        };

        let mail = reply_mail(
            email,
            subject,
            content,
            request.original_message.as_deref(),
        );

        tracing::debug!("Sending reply '{}' to {}", mail.subject, mail.to);
        self.mailer.send(&mail).await?;
        tracing::info!("Reply sent to {}", mail.to);
        Ok(mail.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::MockMailer;

    fn request() -> ReplyRequest {
        ReplyRequest {
            email: Some("parent@example.org".to_string()),
            subject: Some("Re: Tutoring".to_string()),
            content: Some("Sessions start Monday.".to_string()),
            original_message: Some("When do sessions start?".to_string()),
        }
    }

    #[tokio::test]
    async fn sends_composed_reply() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|mail| {
                mail.to == "parent@example.org"
                    && mail.subject == "Re: Tutoring"
                    && mail.text.contains("Sessions start Monday.")
                    && mail.text.contains("> When do sessions start?")
            })
            .times(1)
            .returning(|_| Box::pin(async { Ok(()) }));

        let sender = ReplySender::new(Arc::new(mailer));
        let sent_to = sender.send(&request()).await.unwrap();
        assert_eq!(sent_to, "parent@example.org");
    }

    #[tokio::test]
    async fn missing_content_is_validation_error_without_send() {
        let mut mailer = MockMailer::new();
        mailer.expect_send().times(0);

        let sender = ReplySender::new(Arc::new(mailer));
        let err = sender
            .send(&ReplyRequest {
                content: None,
                ..request()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, OutreachError::Validation(_)));
    }

    #[tokio::test]
    async fn blank_email_is_validation_error() {
        let mut mailer = MockMailer::new();
        mailer.expect_send().times(0);

        let sender = ReplySender::new(Arc::new(mailer));
        let err = sender
            .send(&ReplyRequest {
                email: Some("   ".to_string()),
                ..request()
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields");
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let mut mailer = MockMailer::new();
        mailer.expect_send().times(1).returning(|_| {
            Box::pin(async { Err(OutreachError::Transport("timeout".to_string())) })
        });

        let sender = ReplySender::new(Arc::new(mailer));
        let err = sender.send(&request()).await.unwrap_err();
        assert!(matches!(err, OutreachError::Transport(_)));
    }

    #[test]
    fn request_parses_camel_case() {
        let request: ReplyRequest = serde_json::from_str(
            r#"{"email":"a@example.org","subject":"s","content":"c","originalMessage":"o"}"#,
        )
        .unwrap();
        assert_eq!(request.original_message.as_deref(), Some("o"));
    }
}
