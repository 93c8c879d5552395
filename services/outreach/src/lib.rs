//! Outreach - website, role-gated dashboards and mail relay
//!
//! Serves the public site and the admin, tutor and student dashboards, and
//! relays replies and batched newsletters through an SMTP transport.

pub mod api;
pub mod compose;
pub mod config;
pub mod content;
pub mod dashboard;
pub mod error;
pub mod mailer;
pub mod newsletter;
pub mod pacing;
pub mod reply;
pub mod router;
pub mod site;
pub mod store;

pub use config::{load_config, Config};
pub use error::{OutreachError, Result};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use outreach_auth::SessionHandle;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::mailer::{Mailer, SmtpMailer};
use crate::router::{build_router, with_cors, ServiceState};

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Builder for the outreach service.
///
/// Wires the mail transport, account directory and session registry, then
/// binds the HTTP listener.
pub struct OutreachBuilder {
    config: Config,
    mailer: Option<Arc<dyn Mailer>>,
    cancel: Option<CancellationToken>,
}

impl OutreachBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            mailer: None,
            cancel: None,
        }
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn with_cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub async fn build(self) -> Result<BoundOutreach> {
        let mailer: Arc<dyn Mailer> = match self.mailer {
            Some(mailer) => mailer,
            None => Arc::new(SmtpMailer::new(
                &self.config.mail,
                &self.config.credentials,
            )?),
        };

        let state = ServiceState::from_config(&self.config, mailer)?;
        let sessions = Arc::clone(&state.sessions);
        let router = with_cors(build_router(state), &self.config.server.allowed_origins)?;

        let listener = TcpListener::bind((
            self.config.server.bind_address.as_str(),
            self.config.server.port,
        ))
        .await?;
        tracing::info!("Outreach listening on http://{}", listener.local_addr()?);

        Ok(BoundOutreach {
            listener,
            router,
            sessions,
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

/// A bound, not yet serving, outreach service
pub struct BoundOutreach {
    listener: TcpListener,
    router: Router,
    sessions: SessionHandle,
    cancel: CancellationToken,
}

impl BoundOutreach {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the cancellation token fires or ctrl-c is received
    pub async fn start(self) -> Result<()> {
        let cancel_for_signal = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                signal = tokio::signal::ctrl_c() => match signal {
                    Ok(()) => {
                        tracing::info!("Shutdown signal received");
                        cancel_for_signal.cancel();
                    }
                    Err(e) => tracing::warn!("Failed to listen for ctrl-c: {}", e),
                },
                _ = cancel_for_signal.cancelled() => {}
            }
        });

        let sessions = Arc::clone(&self.sessions);
        let cancel_for_purge = self.cancel.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SESSION_PURGE_INTERVAL);
            loop {
                tokio::select! {
                    _ = cancel_for_purge.cancelled() => break,
                    _ = ticker.tick() => {
                        let purged = sessions.purge_expired().await;
                        if purged > 0 {
                            tracing::debug!("Purged {} expired sessions", purged);
                        }
                    }
                }
            }
        });

        let cancel = self.cancel.clone();
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await?;

        tracing::info!("Outreach service stopped");
        Ok(())
    }
}

/// Run the outreach service with the given configuration
pub async fn run(config: Config) -> Result<()> {
    OutreachBuilder::new(config).build().await?.start().await
}
