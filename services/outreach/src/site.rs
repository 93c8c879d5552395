//! Server-rendered pages: public site, login forms and gated dashboards

use async_trait::async_trait;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use outreach_auth::{
    Actor, AuthAction, AuthError, AuthGate, GateView, Role, SessionCheck, SessionHandle,
};
use serde::Deserialize;

use crate::compose::escape_html;
use crate::content::{self, Event, Skill};
use crate::dashboard::{self, AdminTab, DashboardTab, StudentTab, TutorTab};
use crate::router::{CookieSettings, ServiceState};
use crate::store::{self, Action, AppState};
use crate::OutreachError;

/// Session check backed by the registry and the visitor's session cookie
pub struct CookieSessionCheck {
    sessions: SessionHandle,
    token: Option<String>,
}

impl CookieSessionCheck {
    pub fn new(sessions: SessionHandle, token: Option<String>) -> Self {
        Self { sessions, token }
    }
}

#[async_trait]
impl SessionCheck for CookieSessionCheck {
    async fn check(&self) -> outreach_auth::Result<Option<Actor>> {
        match &self.token {
            Some(token) => Ok(self.sessions.resolve(token).await),
            None => Ok(None),
        }
    }
}

/// Wrap a page body in the shared chrome
pub fn layout(title: &str, actor: Option<&Actor>, body: &str) -> String {
    let account = match actor {
        Some(actor) => format!(
            r#"<a href="{route}" style="color: #fff;">{name}</a>
            <form method="post" action="/logout" style="display: inline;">
                <button type="submit" style="margin-left: 0.5rem;">Log out</button>
            </form>"#,
            route = actor.role.dashboard_route(),
            name = escape_html(&actor.name)
        ),
        None => r#"<a href="/login" style="color: #fff;">Log in</a>"#.to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title} | Outreach</title>
</head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; color: #212529;">
    <header style="display: flex; justify-content: space-between; align-items: center; padding: 1rem 2rem; background: #0d6efd; color: #fff;">
        <a href="/" style="color: #fff; font-weight: 700; text-decoration: none;">Outreach</a>
        <div>{account}</div>
    </header>
    <main style="max-width: 960px; margin: 2rem auto; padding: 0 1rem;">
{body}
    </main>
</body>
</html>"#,
        title = escape_html(title),
    )
}

/// Card grid of events
pub fn event_grid(events: &[Event]) -> String {
    let cards: String = events
        .iter()
        .map(|event| {
            let image = event
                .image
                .map(|src| {
                    format!(
                        r#"<img src="{}" alt="" style="width: 100%; border-radius: 0.25rem;">"#,
                        escape_html(src)
                    )
                })
                .unwrap_or_default();
            format!(
                r#"<article style="padding: 1rem; border: 1px solid #dee2e6; border-radius: 0.5rem;">
                    {image}
                    <h3><a href="/events/{id}">{title}</a></h3>
                    <p style="color: #6c757d;">{date} &middot; {location}</p>
                </article>"#,
                id = escape_html(event.id),
                title = escape_html(event.title),
                date = escape_html(event.date),
                location = escape_html(event.location),
            )
        })
        .collect();
    format!(
        r#"<div class="events" style="display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 1rem;">{cards}</div>"#
    )
}

/// Card grid of skills
pub fn skill_grid(skills: &[Skill]) -> String {
    let cards: String = skills
        .iter()
        .map(|skill| {
            format!(
                r#"<article style="padding: 1rem; border: 1px solid #dee2e6; border-radius: 0.5rem;">
                    <h3>{icon}{title}</h3>
                    <p>{description}</p>
                </article>"#,
                icon = skill
                    .icon
                    .map(|icon| format!("{} ", escape_html(icon)))
                    .unwrap_or_default(),
                title = escape_html(skill.title),
                description = escape_html(skill.description),
            )
        })
        .collect();
    format!(
        r#"<div class="skills" style="display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 1rem;">{cards}</div>"#
    )
}

fn session_token(cookies: &CookieSettings, jar: &CookieJar) -> Option<String> {
    jar.get(&cookies.session)
        .map(|cookie| cookie.value().to_string())
}

fn load_state(cookies: &CookieSettings, jar: &CookieJar) -> AppState {
    jar.get(&cookies.state)
        .map(|cookie| store::rehydrate(cookie.value()))
        .unwrap_or_default()
}

fn cookie(cookies: &CookieSettings, name: &str, value: String) -> Cookie<'static> {
    Cookie::build((name.to_string(), value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cookies.secure)
        .build()
}

fn removal(name: &str) -> Cookie<'static> {
    Cookie::build(name.to_string()).path("/").build()
}

fn store_state(
    cookies: &CookieSettings,
    jar: CookieJar,
    state: &AppState,
) -> crate::Result<CookieJar> {
    let blob = store::persist(state)?;
    Ok(jar.add(cookie(cookies, &cookies.state, blob)))
}

/// Mount a gate for `area` over the visitor's persisted state and settle it
async fn settle_gate(
    service: &ServiceState,
    jar: &CookieJar,
    area: Role,
) -> (AppState, GateView) {
    let persisted = load_state(&service.cookies, jar);
    let gate = AuthGate::rehydrated(area, persisted.auth.clone());
    let check = CookieSessionCheck::new(
        service.sessions.clone(),
        session_token(&service.cookies, jar),
    );
    let view = gate.resolve(&check).await;
    (
        AppState {
            auth: gate.state(),
            ..persisted
        },
        view,
    )
}

/// Response for a gate that did not render its children
fn leave_gate(
    service: &ServiceState,
    jar: CookieJar,
    state: &AppState,
    view: GateView,
) -> crate::Result<Response> {
    let mut jar = store_state(&service.cookies, jar, state)?;
    if !state.auth.is_authenticated() && jar.get(&service.cookies.session).is_some() {
        jar = jar.remove(removal(&service.cookies.session));
    }
    if let GateView::Redirect(route) = view {
        return Ok((jar, Redirect::to(&route)).into_response());
    }
    Ok((jar, Html(layout("Loading", None, "<p>Loading...</p>"))).into_response())
}

/// The signed-in actor for public pages, which are not gated
async fn current_actor(service: &ServiceState, jar: &CookieJar) -> Option<Actor> {
    match session_token(&service.cookies, jar) {
        Some(token) => service.sessions.resolve(&token).await,
        None => None,
    }
}

pub async fn index(State(service): State<ServiceState>, jar: CookieJar) -> impl IntoResponse {
    let actor = current_actor(&service, &jar).await;

    let body = format!(
        r#"<section>
    <h1>Learning together, one skill at a time</h1>
    <p>We pair volunteer tutors with students for free weekly sessions and community events.</p>
</section>
<section>
    <h2>Upcoming Events</h2>
    {events}
</section>
<section>
    <h2>What We Teach</h2>
    {skills}
</section>"#,
        events = event_grid(content::events()),
        skills = skill_grid(content::skills()),
    );
    Html(layout("Home", actor.as_ref(), &body))
}

pub async fn event_detail(
    State(service): State<ServiceState>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    let actor = current_actor(&service, &jar).await;
    match content::find_event(&id) {
        Some(event) => {
            let body = format!(
                r#"<article>
    <h1>{title}</h1>
    <p style="color: #6c757d;">{date} &middot; {location}</p>
    <p>{description}</p>
    <p><a href="/">Back to all events</a></p>
</article>"#,
                title = escape_html(event.title),
                date = escape_html(event.date),
                location = escape_html(event.location),
                description = escape_html(event.description),
            );
            Html(layout(event.title, actor.as_ref(), &body)).into_response()
        }
        None => {
            tracing::debug!("Unknown event '{}'", id);
            (
                StatusCode::NOT_FOUND,
                Html(layout(
                    "Event not found",
                    actor.as_ref(),
                    r#"<h1>Event not found</h1><p><a href="/">Back to all events</a></p>"#,
                )),
            )
                .into_response()
        }
    }
}

fn login_page(area: Role, error: Option<&str>) -> String {
    let error = error
        .map(|message| {
            format!(
                r#"<p class="error" style="padding: 0.75rem; border-radius: 0.25rem; color: #721c24; background-color: #f8d7da;">{}</p>"#,
                escape_html(message)
            )
        })
        .unwrap_or_default();
    let title = format!("{} Login", area);
    let body = format!(
        r#"<h1>{title}</h1>
{error}
<form method="post" action="/login" style="display: grid; gap: 0.75rem; max-width: 360px;">
    <input type="hidden" name="area" value="{area}">
    <label>Email <input name="email" type="email" required style="width: 100%;"></label>
    <label>Password <input name="password" type="password" required style="width: 100%;"></label>
    <button type="submit">Log in</button>
</form>"#,
        area = area.to_string().to_ascii_lowercase(),
    );
    layout(&title, None, &body)
}

pub async fn student_login() -> Html<String> {
    Html(login_page(Role::Student, None))
}

pub async fn admin_login() -> Html<String> {
    Html(login_page(Role::Admin, None))
}

pub async fn tutor_login() -> Html<String> {
    Html(login_page(Role::Tutor, None))
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub area: Option<Role>,
}

pub async fn login(
    State(service): State<ServiceState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> crate::Result<Response> {
    let area = form.area.unwrap_or(Role::Student);
    let accounts = service.accounts.clone();
    let email = form.email.clone();
    // argon2 verification is CPU bound
    let outcome = tokio::task::spawn_blocking(move || accounts.authenticate(&email, &form.password))
        .await
        .map_err(|e| OutreachError::Auth(AuthError::Check(e.to_string())))?;

    let actor = match outcome {
        Ok(actor) => actor,
        Err(AuthError::InvalidCredentials) => {
            tracing::info!("Rejected {} login for '{}'", area, form.email);
            return Ok((
                StatusCode::UNAUTHORIZED,
                Html(login_page(area, Some("Invalid email or password"))),
            )
                .into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let token = service.sessions.issue(actor.clone()).await;
    let route = actor.role.dashboard_route();
    let state = store::reduce(
        load_state(&service.cookies, &jar),
        Action::Auth(AuthAction::CheckSucceeded(actor)),
    );

    let jar = jar.add(cookie(&service.cookies, &service.cookies.session, token));
    let jar = store_state(&service.cookies, jar, &state)?;
    Ok((jar, Redirect::to(route)).into_response())
}

pub async fn logout(
    State(service): State<ServiceState>,
    jar: CookieJar,
) -> crate::Result<Response> {
    if let Some(token) = session_token(&service.cookies, &jar) {
        service.sessions.revoke(&token).await;
    }
    let state = store::reduce(
        load_state(&service.cookies, &jar),
        Action::Auth(AuthAction::LoggedOut),
    );
    let jar = jar.remove(removal(&service.cookies.session));
    let jar = store_state(&service.cookies, jar, &state)?;
    Ok((jar, Redirect::to("/")).into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct TabQuery {
    #[serde(default)]
    pub tab: Option<String>,
}

fn requested_tab<T: DashboardTab>(query: &TabQuery) -> Option<T> {
    query.tab.as_deref().and_then(T::parse)
}

pub async fn admin_dashboard(
    State(service): State<ServiceState>,
    jar: CookieJar,
    Query(query): Query<TabQuery>,
) -> crate::Result<Response> {
    let (state, view) = settle_gate(&service, &jar, Role::Admin).await;
    let GateView::Children(actor) = view else {
        return leave_gate(&service, jar, &state, view);
    };

    let state = match requested_tab::<AdminTab>(&query) {
        Some(tab) => store::reduce(state, Action::SelectAdminTab(tab)),
        None => state,
    };
    let body = dashboard::render_admin(&actor, state.ui.admin_tab, &service.accounts);
    let jar = store_state(&service.cookies, jar, &state)?;
    Ok((jar, Html(layout("Admin Dashboard", Some(&actor), &body))).into_response())
}

pub async fn tutor_dashboard(
    State(service): State<ServiceState>,
    jar: CookieJar,
    Query(query): Query<TabQuery>,
) -> crate::Result<Response> {
    let (state, view) = settle_gate(&service, &jar, Role::Tutor).await;
    let GateView::Children(actor) = view else {
        return leave_gate(&service, jar, &state, view);
    };

    let state = match requested_tab::<TutorTab>(&query) {
        Some(tab) => store::reduce(state, Action::SelectTutorTab(tab)),
        None => state,
    };
    let body = dashboard::render_tutor(&actor, state.ui.tutor_tab, &service.accounts);
    let jar = store_state(&service.cookies, jar, &state)?;
    Ok((jar, Html(layout("Tutor Dashboard", Some(&actor), &body))).into_response())
}

pub async fn student_dashboard(
    State(service): State<ServiceState>,
    jar: CookieJar,
    Query(query): Query<TabQuery>,
) -> crate::Result<Response> {
    let (state, view) = settle_gate(&service, &jar, Role::Student).await;
    let GateView::Children(actor) = view else {
        return leave_gate(&service, jar, &state, view);
    };

    let state = match requested_tab::<StudentTab>(&query) {
        Some(tab) => store::reduce(state, Action::SelectStudentTab(tab)),
        None => state,
    };
    let body = dashboard::render_student(&actor, state.ui.student_tab);
    let jar = store_state(&service.cookies, jar, &state)?;
    Ok((jar, Html(layout("Student Dashboard", Some(&actor), &body))).into_response())
}
