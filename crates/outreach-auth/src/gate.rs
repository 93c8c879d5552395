//! Auth gate and route guard
//!
//! A gate starts in `Loading`, runs one session check and settles in either
//! `Authenticated` or `Unauthenticated`. While loading it renders a
//! placeholder; once settled it renders its children or a redirect to the
//! area's login route. A settled gate never re-checks: a fresh navigation
//! builds a fresh gate.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::actor::{Actor, Role};
use crate::error::Result;
use crate::state::{reduce, AuthAction, AuthState, AuthStatus};

/// The session check a gate runs on mount
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait SessionCheck: Send + Sync {
    /// `Ok(None)` means no valid session
    async fn check(&self) -> Result<Option<Actor>>;
}

/// Decision of a route guard for one auth state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// The session check has not resolved yet
    Pending,
    Allow(Actor),
    Redirect(String),
}

/// Capability check evaluated before entering a gated area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteGuard {
    area: Role,
}

impl RouteGuard {
    pub fn new(area: Role) -> Self {
        Self { area }
    }

    pub fn area(&self) -> Role {
        self.area
    }

    /// Unauthenticated visitors go to the area's login route. Actors of
    /// another role go to their own dashboard.
    pub fn evaluate(&self, state: &AuthState) -> GuardDecision {
        match (state.status, &state.actor) {
            (AuthStatus::Loading, _) => GuardDecision::Pending,
            (AuthStatus::Authenticated, Some(actor)) if actor.role == self.area => {
                GuardDecision::Allow(actor.clone())
            }
            (AuthStatus::Authenticated, Some(actor)) => {
                tracing::debug!(
                    "{} '{}' denied {} area",
                    actor.role,
                    actor.email,
                    self.area
                );
                GuardDecision::Redirect(actor.role.dashboard_route().to_string())
            }
            (AuthStatus::Authenticated, None) | (AuthStatus::Unauthenticated, _) => {
                GuardDecision::Redirect(self.area.login_route().to_string())
            }
        }
    }
}

/// What a gate renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateView {
    Placeholder,
    Children(Actor),
    Redirect(String),
}

impl From<GuardDecision> for GateView {
    fn from(decision: GuardDecision) -> Self {
        match decision {
            GuardDecision::Pending => GateView::Placeholder,
            GuardDecision::Allow(actor) => GateView::Children(actor),
            GuardDecision::Redirect(route) => GateView::Redirect(route),
        }
    }
}

/// Gate for one mounted area
#[derive(Debug)]
pub struct AuthGate {
    guard: RouteGuard,
    state: watch::Sender<AuthState>,
    started: AtomicBool,
}

impl AuthGate {
    pub fn new(area: Role) -> Self {
        Self::rehydrated(area, AuthState::default())
    }

    /// Mount a gate over previously persisted auth state. The state goes
    /// back to `Loading` until the check resolves.
    pub fn rehydrated(area: Role, state: AuthState) -> Self {
        let (tx, _) = watch::channel(reduce(state, AuthAction::CheckStarted));
        Self {
            guard: RouteGuard::new(area),
            state: tx,
            started: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn view(&self) -> GateView {
        self.guard.evaluate(&self.state.borrow()).into()
    }

    pub fn observe(&self) -> GateObserver {
        GateObserver {
            guard: self.guard,
            rx: self.state.subscribe(),
        }
    }

    /// Run the session check. Only the first call checks; later calls return
    /// the current view.
    pub async fn resolve(&self, check: &dyn SessionCheck) -> GateView {
        if self.started.swap(true, Ordering::SeqCst) {
            return self.view();
        }

        let action = match check.check().await {
            Ok(Some(actor)) => AuthAction::CheckSucceeded(actor),
            Ok(None) => AuthAction::CheckFailed("no active session".to_string()),
            Err(e) => {
                tracing::warn!("Session check for {} area failed: {}", self.guard.area(), e);
                AuthAction::CheckFailed(e.to_string())
            }
        };

        self.state
            .send_modify(|state| *state = reduce(std::mem::take(state), action));
        let view = self.view();
        tracing::debug!("Gate for {} area settled: {:?}", self.guard.area(), view);
        view
    }
}

/// Read side of a gate
#[derive(Debug, Clone)]
pub struct GateObserver {
    guard: RouteGuard,
    rx: watch::Receiver<AuthState>,
}

impl GateObserver {
    pub fn view(&self) -> GateView {
        self.guard.evaluate(&self.rx.borrow()).into()
    }

    /// Wait until the gate leaves `Loading` and return what it renders
    pub async fn settled(&mut self) -> GateView {
        let guard = self.guard;
        let settled = self
            .rx
            .wait_for(|state| !state.is_loading())
            .await
            .map(|state| GateView::from(guard.evaluate(&state)));
        match settled {
            Ok(view) => view,
            Err(_) => self.view(),
        }
    }
}
