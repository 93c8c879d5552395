//! Application state for one visitor
//!
//! The state is a plain struct changed only through [`reduce`]. It crosses
//! requests through an explicit persist/rehydrate boundary (a cookie blob):
//! only the actor and the UI preferences are written, and a rehydrated state
//! always starts in `Loading` so the gate re-checks the session.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use outreach_auth::state::reduce as reduce_auth;
use outreach_auth::{Actor, AuthAction, AuthState, AuthStatus};
use serde::{Deserialize, Serialize};

use crate::dashboard::{AdminTab, StudentTab, TutorTab};

const PERSIST_VERSION: u32 = 1;

/// Per-visitor UI preferences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiPreferences {
    #[serde(default)]
    pub admin_tab: AdminTab,
    #[serde(default)]
    pub tutor_tab: TutorTab,
    #[serde(default)]
    pub student_tab: StudentTab,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub auth: AuthState,
    pub ui: UiPreferences,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Auth(AuthAction),
    SelectAdminTab(AdminTab),
    SelectTutorTab(TutorTab),
    SelectStudentTab(StudentTab),
}

pub fn reduce(state: AppState, action: Action) -> AppState {
    match action {
        Action::Auth(action) => AppState {
            auth: reduce_auth(state.auth, action),
            ..state
        },
        Action::SelectAdminTab(tab) => AppState {
            ui: UiPreferences {
                admin_tab: tab,
                ..state.ui
            },
            ..state
        },
        Action::SelectTutorTab(tab) => AppState {
            ui: UiPreferences {
                tutor_tab: tab,
                ..state.ui
            },
            ..state
        },
        Action::SelectStudentTab(tab) => AppState {
            ui: UiPreferences {
                student_tab: tab,
                ..state.ui
            },
            ..state
        },
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedState {
    version: u32,
    #[serde(default)]
    actor: Option<Actor>,
    #[serde(default)]
    ui: UiPreferences,
}

/// Serialize the persistable slices into a cookie-safe blob
pub fn persist(state: &AppState) -> crate::Result<String> {
    let persisted = PersistedState {
        version: PERSIST_VERSION,
        actor: if state.auth.is_authenticated() {
            state.auth.actor.clone()
        } else {
            None
        },
        ui: state.ui,
    };
    let json = serde_json::to_vec(&persisted)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Restore state from a blob written by [`persist`].
///
/// A corrupt or foreign blob rehydrates to the default state.
pub fn rehydrate(blob: &str) -> AppState {
    let persisted = URL_SAFE_NO_PAD
        .decode(blob.trim())
        .map_err(|e| e.to_string())
        .and_then(|bytes| {
            serde_json::from_slice::<PersistedState>(&bytes).map_err(|e| e.to_string())
        });

    match persisted {
        Ok(persisted) if persisted.version == PERSIST_VERSION => AppState {
            auth: AuthState {
                status: AuthStatus::Loading,
                actor: persisted.actor,
                last_error: None,
            },
            ui: persisted.ui,
        },
        Ok(persisted) => {
            tracing::warn!(
                "Discarding persisted state with version {}",
                persisted.version
            );
            AppState::default()
        }
        Err(e) => {
            tracing::warn!("Discarding unreadable persisted state: {}", e);
            AppState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outreach_auth::Role;

    fn admin() -> Actor {
        Actor {
            id: "a-1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.org".to_string(),
            role: Role::Admin,
        }
    }

    fn signed_in() -> AppState {
        reduce(
            AppState::default(),
            Action::Auth(AuthAction::CheckSucceeded(admin())),
        )
    }

    #[test]
    fn tab_selection_touches_only_its_slice() {
        let state = reduce(signed_in(), Action::SelectAdminTab(AdminTab::Newsletter));
        assert_eq!(state.ui.admin_tab, AdminTab::Newsletter);
        assert_eq!(state.ui.tutor_tab, TutorTab::default());
        assert!(state.auth.is_authenticated());
    }

    #[test]
    fn auth_actions_leave_ui_alone() {
        let state = reduce(
            AppState::default(),
            Action::SelectStudentTab(StudentTab::Skills),
        );
        let state = reduce(state, Action::Auth(AuthAction::LoggedOut));
        assert_eq!(state.ui.student_tab, StudentTab::Skills);
        assert_eq!(state.auth.status, AuthStatus::Unauthenticated);
    }

    #[test]
    fn rehydrated_state_is_loading_with_actor_and_ui() {
        let state = reduce(signed_in(), Action::SelectAdminTab(AdminTab::Accounts));
        let blob = persist(&state).unwrap();

        let restored = rehydrate(&blob);
        assert!(restored.auth.is_loading());
        assert_eq!(restored.auth.actor, Some(admin()));
        assert_eq!(restored.ui.admin_tab, AdminTab::Accounts);
    }

    #[test]
    fn unauthenticated_actor_is_not_persisted() {
        let state = reduce(
            signed_in(),
            Action::Auth(AuthAction::CheckFailed("expired".to_string())),
        );
        let restored = rehydrate(&persist(&state).unwrap());
        assert!(restored.auth.actor.is_none());
        assert!(restored.auth.last_error.is_none());
    }

    #[test]
    fn persisted_blob_is_cookie_safe() {
        let blob = persist(&signed_in()).unwrap();
        assert!(blob
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn corrupt_blob_rehydrates_to_default() {
        assert_eq!(rehydrate("%%% not base64"), AppState::default());
        let not_json = URL_SAFE_NO_PAD.encode("hello");
        assert_eq!(rehydrate(&not_json), AppState::default());
    }

    #[test]
    fn foreign_version_is_discarded() {
        let blob = URL_SAFE_NO_PAD.encode(r#"{"version":99,"ui":{"admin_tab":"accounts"}}"#);
        assert_eq!(rehydrate(&blob), AppState::default());
    }
}
