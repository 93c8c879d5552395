//! BDD test world for the outreach service

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request};
use cucumber::World;
use outreach::config::{Config, PacingConfig};
use outreach::mailer::{Mailer, OutgoingMail};
use outreach::router::{build_router, ServiceState};
use outreach::OutreachError;
use outreach_auth::{Actor, AuthGate, GateView};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tower::ServiceExt;

/// Mail relay stand-in that records deliveries and rejects listed recipients
#[derive(Debug, Default)]
pub struct RecordingMailer {
    pub rejected: HashSet<String>,
    pub sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingMailer {
    pub fn sent_count(&self) -> usize {
        self.sent.lock().map(|sent| sent.len()).unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> outreach::Result<()> {
        if self.rejected.contains(&mail.to) {
            return Err(OutreachError::Transport(format!(
                "550 mailbox unavailable: {}",
                mail.to
            )));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(mail.clone());
        }
        Ok(())
    }
}

#[derive(Debug, Default, World)]
pub struct OutreachWorld {
    // Gate testing
    pub gate: Option<Arc<AuthGate>>,
    pub gate_release: Option<Arc<Notify>>,
    pub gate_outcome: Arc<Mutex<Option<Actor>>>,
    pub gate_task: Option<JoinHandle<GateView>>,
    pub gate_view: Option<GateView>,

    // API testing
    pub mailer: Option<Arc<RecordingMailer>>,
    pub service: Option<ServiceState>,
    pub response_status: Option<u16>,
    pub response_json: Option<serde_json::Value>,
}

impl OutreachWorld {
    pub fn start_api(&mut self, rejected: HashSet<String>) {
        let mailer = Arc::new(RecordingMailer {
            rejected,
            ..RecordingMailer::default()
        });
        let mut config = Config::default();
        config.newsletter.pacing = PacingConfig::None;

        let service = ServiceState::from_config(&config, Arc::clone(&mailer) as Arc<dyn Mailer>)
            .expect("service state");
        self.mailer = Some(mailer);
        self.service = Some(service);
    }

    pub async fn post_json(&mut self, uri: &str, body: serde_json::Value) {
        let service = self.service.clone().expect("API not started");
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request");

        let response = build_router(service)
            .oneshot(request)
            .await
            .expect("router response");
        self.response_status = Some(response.status().as_u16());

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");
        self.response_json = serde_json::from_slice(&bytes).ok();
    }

    pub fn sent_count(&self) -> usize {
        self.mailer.as_ref().map(|m| m.sent_count()).unwrap_or(0)
    }
}
