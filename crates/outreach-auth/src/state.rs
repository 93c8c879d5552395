//! Auth slice of the application state
//!
//! `reduce` is the only writer: every change goes through an [`AuthAction`].

use serde::{Deserialize, Serialize};

use crate::actor::Actor;

/// Where the session check stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    #[default]
    Loading,
    Authenticated,
    Unauthenticated,
}

/// Session flags for the current visitor
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthState {
    pub status: AuthStatus,
    pub actor: Option<Actor>,
    pub last_error: Option<String>,
}

/// Actions dispatched by the auth flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    CheckStarted,
    CheckSucceeded(Actor),
    CheckFailed(String),
    LoggedOut,
}

impl AuthState {
    pub fn is_loading(&self) -> bool {
        self.status == AuthStatus::Loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated && self.actor.is_some()
    }
}

/// Apply an action to the auth state
pub fn reduce(state: AuthState, action: AuthAction) -> AuthState {
    match action {
        AuthAction::CheckStarted => AuthState {
            status: AuthStatus::Loading,
            last_error: None,
            ..state
        },
        AuthAction::CheckSucceeded(actor) => AuthState {
            status: AuthStatus::Authenticated,
            actor: Some(actor),
            last_error: None,
        },
        AuthAction::CheckFailed(error) => AuthState {
            status: AuthStatus::Unauthenticated,
            actor: None,
            last_error: Some(error),
        },
        AuthAction::LoggedOut => AuthState {
            status: AuthStatus::Unauthenticated,
            actor: None,
            last_error: None,
        },
    }
}
