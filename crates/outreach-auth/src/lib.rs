//! Outreach authentication
//!
//! Actors and roles, password hashing, the session registry, and the
//! auth-gate state machine that guards the admin, tutor and student areas.

pub mod actor;
pub mod credentials;
pub mod error;
pub mod gate;
pub mod session;
pub mod state;

pub use actor::{Actor, Role};
pub use credentials::AccountDirectory;
pub use error::{AuthError, Result};
pub use gate::{AuthGate, GateView, GuardDecision, RouteGuard, SessionCheck};
pub use session::{SessionHandle, SessionRegistry};
pub use state::{AuthAction, AuthState, AuthStatus};
