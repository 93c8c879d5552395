//! BDD step definitions for the reply endpoint feature

use std::collections::HashSet;

use cucumber::{given, then, when};

use crate::world::OutreachWorld;

// --- Given steps ---

#[given("a running outreach API")]
fn running_api(world: &mut OutreachWorld) {
    world.start_api(HashSet::new());
}

#[given(expr = "a running outreach API whose mail relay rejects {string}")]
fn running_api_with_rejection(world: &mut OutreachWorld, address: String) {
    world.start_api(HashSet::from([address]));
}

// --- When steps ---

#[when(expr = "I post a reply to {string} with subject {string} and content {string}")]
async fn post_reply(world: &mut OutreachWorld, email: String, subject: String, content: String) {
    world
        .post_json(
            "/api/reply",
            serde_json::json!({
                "email": email,
                "subject": subject,
                "content": content,
                "originalMessage": "When do sessions start?"
            }),
        )
        .await;
}

#[when(expr = "I post a reply to {string} with subject {string} and no content")]
async fn post_reply_without_content(world: &mut OutreachWorld, email: String, subject: String) {
    world
        .post_json(
            "/api/reply",
            serde_json::json!({ "email": email, "subject": subject }),
        )
        .await;
}

// --- Then steps ---

#[then(expr = "the response status is {int}")]
fn response_status(world: &mut OutreachWorld, status: u16) {
    assert_eq!(world.response_status, Some(status));
}

#[then(expr = "the response field {string} is {string}")]
fn response_field(world: &mut OutreachWorld, field: String, value: String) {
    let json = world.response_json.as_ref().expect("JSON response");
    assert_eq!(json[field.as_str()], serde_json::Value::String(value));
}

#[then(regex = r"^(\d+) emails? (?:has|have) been sent$")]
fn emails_sent(world: &mut OutreachWorld, count: usize) {
    assert_eq!(world.sent_count(), count);
}
