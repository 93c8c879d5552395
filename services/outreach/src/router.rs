//! HTTP router and shared request state

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use chrono::TimeDelta;
use outreach_auth::{AccountDirectory, Actor, SessionHandle, SessionRegistry};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;

use crate::config::Config;
use crate::mailer::Mailer;
use crate::newsletter::BatchSender;
use crate::reply::ReplySender;
use crate::{api, site, OutreachError};

/// Cookie names and flags
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub session: String,
    pub state: String,
    pub secure: bool,
}

/// State shared by every request handler
#[derive(Debug, Clone)]
pub struct ServiceState {
    pub accounts: Arc<AccountDirectory>,
    pub sessions: SessionHandle,
    pub reply: Arc<ReplySender>,
    pub newsletter: Arc<BatchSender>,
    pub cookies: CookieSettings,
    pub mail_api_requires_session: bool,
}

impl ServiceState {
    pub fn from_config(config: &Config, mailer: Arc<dyn Mailer>) -> crate::Result<Self> {
        let mut accounts = AccountDirectory::new();
        for account in &config.accounts {
            accounts.insert(
                Actor {
                    id: account.id.clone(),
                    name: account.name.clone(),
                    email: account.email.clone(),
                    role: account.role,
                },
                account.password_hash.clone(),
            )?;
        }
        tracing::debug!("Loaded {} accounts", accounts.len());

        if !config.server.mail_api_requires_session {
            tracing::warn!(
                "Mail endpoints accept requests without a session; set server.mail_api_requires_session to restrict them"
            );
        }

        let ttl = TimeDelta::minutes(i64::from(config.session.ttl_minutes));

        Ok(Self {
            accounts: Arc::new(accounts),
            sessions: Arc::new(SessionRegistry::new(ttl)),
            reply: Arc::new(ReplySender::new(Arc::clone(&mailer))),
            newsletter: Arc::new(BatchSender::new(mailer, &config.newsletter)),
            cookies: CookieSettings {
                session: config.session.cookie_name.clone(),
                state: config.session.state_cookie_name.clone(),
                secure: config.session.secure_cookies,
            },
            mail_api_requires_session: config.server.mail_api_requires_session,
        })
    }
}

/// Build the site and API router
pub fn build_router(state: ServiceState) -> Router {
    Router::new()
        .route("/", get(site::index))
        .route("/events/{id}", get(site::event_detail))
        .route("/login", get(site::student_login).post(site::login))
        .route("/admin/login", get(site::admin_login))
        .route("/tutor/login", get(site::tutor_login))
        .route("/logout", post(site::logout))
        .route("/admin", get(site::admin_dashboard))
        .route("/tutor", get(site::tutor_dashboard))
        .route("/student", get(site::student_dashboard))
        .route("/api/reply", post(api::reply))
        .route("/api/newsletter", post(api::newsletter))
        .route("/api/session", get(api::session))
        .route("/api/events", get(api::events))
        .route("/api/skills", get(api::skills))
        .route("/health", get(health_handler))
        .layer(CatchPanicLayer::custom(api::panic_response))
        .with_state(state)
}

/// Allow cross-origin calls from the listed origins. An empty list adds no
/// CORS layer, so browsers only reach the API from the site's own origin.
pub fn with_cors(router: Router, allowed_origins: &[String]) -> crate::Result<Router> {
    if allowed_origins.is_empty() {
        return Ok(router);
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| {
                OutreachError::Config(format!("Invalid allowed origin '{}': {}", origin, e))
            })
        })
        .collect::<crate::Result<Vec<_>>>()?;

    tracing::debug!("CORS enabled for {} origins", origins.len());
    Ok(router.layer(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
    ))
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}
