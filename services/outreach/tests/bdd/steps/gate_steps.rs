//! BDD step definitions for the auth gate feature

use std::sync::{Arc, Mutex};

use cucumber::{given, then, when};
use outreach_auth::{Actor, AuthGate, GateView, Role, SessionCheck};
use tokio::sync::Notify;

use crate::world::OutreachWorld;

/// Session check that waits for the scenario to release it
struct ReleasableCheck {
    release: Arc<Notify>,
    outcome: Arc<Mutex<Option<Actor>>>,
}

#[async_trait::async_trait]
impl SessionCheck for ReleasableCheck {
    async fn check(&self) -> outreach_auth::Result<Option<Actor>> {
        self.release.notified().await;
        Ok(self.outcome.lock().ok().and_then(|outcome| outcome.clone()))
    }
}

fn actor(role: Role) -> Actor {
    let name = role.to_string();
    Actor {
        id: format!("{}-1", name.to_lowercase()),
        email: format!("{}@example.org", name.to_lowercase()),
        name,
        role,
    }
}

fn parse_role(role: &str) -> Role {
    role.parse().expect("known role")
}

// --- Given steps ---

#[given(regex = r"^an? (admin|tutor|student) gate whose session check is pending$")]
async fn pending_gate(world: &mut OutreachWorld, role: String) {
    let gate = Arc::new(AuthGate::new(parse_role(&role)));
    let release = Arc::new(Notify::new());
    let check = ReleasableCheck {
        release: Arc::clone(&release),
        outcome: Arc::clone(&world.gate_outcome),
    };

    let task = {
        let gate = Arc::clone(&gate);
        tokio::spawn(async move { gate.resolve(&check).await })
    };
    tokio::task::yield_now().await;

    world.gate = Some(gate);
    world.gate_release = Some(release);
    world.gate_task = Some(task);
}

// --- When steps ---

async fn release_check(world: &mut OutreachWorld, outcome: Option<Actor>) {
    if let Ok(mut slot) = world.gate_outcome.lock() {
        *slot = outcome;
    }
    world.gate_release.as_ref().expect("gate mounted").notify_one();
    let task = world.gate_task.take().expect("gate mounted");
    world.gate_view = Some(task.await.expect("gate task"));
}

#[when(regex = r"^the session check resolves with an? (admin|tutor|student) session$")]
async fn check_resolves_with_session(world: &mut OutreachWorld, role: String) {
    release_check(world, Some(actor(parse_role(&role)))).await;
}

#[when("the session check resolves with no session")]
async fn check_resolves_without_session(world: &mut OutreachWorld) {
    release_check(world, None).await;
}

#[when("the session check is asked to run again")]
async fn check_runs_again(world: &mut OutreachWorld) {
    let gate = world.gate.as_ref().expect("gate mounted");
    let check = ReleasableCheck {
        release: Arc::new(Notify::new()),
        outcome: Arc::new(Mutex::new(None)),
    };
    // A settled gate returns without awaiting the check
    world.gate_view = Some(gate.resolve(&check).await);
}

// --- Then steps ---

#[then("the gate renders the placeholder")]
fn gate_renders_placeholder(world: &mut OutreachWorld) {
    let gate = world.gate.as_ref().expect("gate mounted");
    assert_eq!(gate.view(), GateView::Placeholder);
    assert!(gate.state().is_loading());
}

#[then("the gate renders its children")]
fn gate_renders_children(world: &mut OutreachWorld) {
    let view = world.gate_view.as_ref().expect("gate settled");
    assert!(
        matches!(view, GateView::Children(_)),
        "expected children, got {:?}",
        view
    );
}

#[then(expr = "the gate redirects to {string}")]
fn gate_redirects(world: &mut OutreachWorld, route: String) {
    assert_eq!(world.gate_view, Some(GateView::Redirect(route)));
}
