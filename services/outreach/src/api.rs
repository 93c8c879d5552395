//! JSON API endpoints

use std::any::Any;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use outreach_auth::Actor;

use crate::content;
use crate::newsletter::{BatchReport, NewsletterJob};
use crate::reply::ReplyRequest;
use crate::router::ServiceState;
use crate::OutreachError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyResponse {
    pub message: String,
    pub sent_to: String,
}

/// Newsletter request body. `emails` stays loosely typed so a non-array value
/// is reported as a validation error rather than a body rejection.
#[derive(Debug, Default, Deserialize)]
pub struct NewsletterRequest {
    #[serde(default)]
    pub emails: Option<Value>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl NewsletterRequest {
    fn recipients(&self) -> Option<Vec<String>> {
        match &self.emails {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NewsletterResponse {
    pub message: String,
    #[serde(flatten)]
    pub report: BatchReport,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> crate::Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| {
            OutreachError::Validation(format!("Invalid request body: {}", rejection.body_text()))
        })
}

async fn session_actor(service: &ServiceState, jar: &CookieJar) -> Option<Actor> {
    match jar.get(&service.cookies.session) {
        Some(cookie) => service.sessions.resolve(cookie.value()).await,
        None => None,
    }
}

async fn authorize_mail(service: &ServiceState, jar: &CookieJar) -> crate::Result<()> {
    if !service.mail_api_requires_session {
        return Ok(());
    }
    match session_actor(service, jar).await {
        Some(actor) => {
            tracing::debug!("Mail request by {}", actor.email);
            Ok(())
        }
        None => Err(OutreachError::Unauthorized),
    }
}

pub async fn reply(
    State(service): State<ServiceState>,
    jar: CookieJar,
    payload: Result<Json<ReplyRequest>, JsonRejection>,
) -> crate::Result<Json<ReplyResponse>> {
    authorize_mail(&service, &jar).await?;
    let request = body(payload)?;
    let sent_to = service.reply.send(&request).await?;
    Ok(Json(ReplyResponse {
        message: "Reply sent successfully".to_string(),
        sent_to,
    }))
}

pub async fn newsletter(
    State(service): State<ServiceState>,
    jar: CookieJar,
    payload: Result<Json<NewsletterRequest>, JsonRejection>,
) -> crate::Result<Json<NewsletterResponse>> {
    authorize_mail(&service, &jar).await?;
    let request = body(payload)?;
    let job = NewsletterJob::new(
        request.recipients(),
        request.subject.clone(),
        request.content.clone(),
    )?;

    let report = service.newsletter.send(&job).await;
    Ok(Json(NewsletterResponse {
        message: "Newsletter sending completed".to_string(),
        report,
    }))
}

/// Session check endpoint: the actor behind the session cookie, or 401
pub async fn session(State(service): State<ServiceState>, jar: CookieJar) -> Response {
    match session_actor(&service, &jar).await {
        Some(actor) => Json(actor).into_response(),
        None => OutreachError::Unauthorized.into_response(),
    }
}

pub async fn events() -> Json<&'static [content::Event]> {
    Json(content::events())
}

pub async fn skills() -> Json<&'static [content::Skill]> {
    Json(content::skills())
}

/// Turn a handler panic into a generic 500. The panic detail is logged only.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!("Request handler panicked: {}", detail);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "Internal server error" })),
    )
        .into_response()
}
