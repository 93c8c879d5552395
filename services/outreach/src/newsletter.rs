//! Batched newsletter sender
//!
//! Recipients are split into fixed-size batches. Batches run strictly one
//! after another; inside a batch every send runs concurrently and all of them
//! settle before the pacer is awaited and the next batch starts. A failing
//! recipient is recorded and never stops the broadcast.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;

use crate::compose::newsletter_mail;
use crate::config::{NewsletterConfig, PacingConfig};
use crate::mailer::Mailer;
use crate::pacing::build_pacer;
use crate::OutreachError;

/// Default number of recipients per batch
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// A validated broadcast request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsletterJob {
    recipients: Vec<String>,
    subject: String,
    content: String,
}

impl NewsletterJob {
    pub fn new(
        recipients: Option<Vec<String>>,
        subject: Option<String>,
        content: Option<String>,
    ) -> crate::Result<Self> {
        let recipients = match recipients {
            Some(list) if !list.is_empty() => list,
            _ => {
                return Err(OutreachError::Validation(
                    "Email list is required and must be a non-empty array".to_string(),
                ))
            }
        };

        let subject = subject.filter(|s| !s.trim().is_empty());
        let content = content.filter(|c| !c.trim().is_empty());
        let (Some(subject), Some(content)) = (subject, content) else {
            return Err(OutreachError::Validation(
                "Subject and content are required".to_string(),
            ));
        };

        Ok(Self {
            recipients,
            subject,
            content,
        })
    }

    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Outcome of one broadcast
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub total_emails: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub failed_emails: Vec<String>,
}

impl BatchReport {
    fn record_success(&mut self) {
        self.success_count += 1;
    }

    fn record_failure(&mut self, recipient: &str) {
        self.failure_count += 1;
        self.failed_emails.push(recipient.to_string());
    }
}

/// Split recipients into consecutive batches of at most `size` addresses
pub fn chunk_recipients(recipients: &[String], size: usize) -> Vec<&[String]> {
    recipients.chunks(size.max(1)).collect()
}

/// Sends a newsletter job through the mail transport in paced batches
pub struct BatchSender {
    mailer: Arc<dyn Mailer>,
    batch_size: usize,
    pacing: PacingConfig,
}

impl std::fmt::Debug for BatchSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchSender")
            .field("batch_size", &self.batch_size)
            .field("pacing", &self.pacing)
            .finish()
    }
}

impl BatchSender {
    pub fn new(mailer: Arc<dyn Mailer>, config: &NewsletterConfig) -> Self {
        Self {
            mailer,
            batch_size: config.batch_size.max(1),
            pacing: config.pacing.clone(),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Send the job and account for every recipient
    pub async fn send(&self, job: &NewsletterJob) -> BatchReport {
        let pacer = build_pacer(&self.pacing);
        let batches = chunk_recipients(&job.recipients, self.batch_size);
        let batch_count = batches.len();
        let mut report = BatchReport {
            total_emails: job.recipients.len(),
            ..BatchReport::default()
        };

        tracing::info!(
            "Sending newsletter '{}' to {} recipients in {} batches",
            job.subject,
            report.total_emails,
            batch_count
        );

        for (index, batch) in batches.into_iter().enumerate() {
            tracing::debug!(
                "Batch {}/{}: {} recipients",
                index + 1,
                batch_count,
                batch.len()
            );

            let mut tasks = JoinSet::new();
            for (offset, recipient) in batch.iter().enumerate() {
                let mailer = Arc::clone(&self.mailer);
                let mail = newsletter_mail(recipient, &job.subject, &job.content);
                tasks.spawn(async move { (offset, mailer.send(&mail).await) });
            }

            let mut outcomes: Vec<Option<crate::Result<()>>> =
                (0..batch.len()).map(|_| None).collect();
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((offset, result)) => {
                        if let Some(slot) = outcomes.get_mut(offset) {
                            *slot = Some(result);
                        }
                    }
                    Err(e) => tracing::error!("Newsletter send task aborted: {}", e),
                }
            }

            for (recipient, outcome) in batch.iter().zip(outcomes) {
                match outcome {
                    Some(Ok(())) => report.record_success(),
                    Some(Err(e)) => {
                        tracing::warn!("Newsletter to {} failed: {}", recipient, e);
                        report.record_failure(recipient);
                    }
                    None => report.record_failure(recipient),
                }
            }

            if index + 1 < batch_count {
                pacer.pause().await;
            }
        }

        tracing::info!(
            "Newsletter '{}' finished: {} sent, {} failed",
            job.subject,
            report.success_count,
            report.failure_count
        );
        report
    }
}
