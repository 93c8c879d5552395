//! BDD step definitions for the newsletter endpoint feature

use cucumber::{then, when};

use crate::world::OutreachWorld;

fn subscribers(count: usize, including: &str) -> Vec<String> {
    let mut emails: Vec<String> = (1..count)
        .map(|i| format!("subscriber{}@example.org", i))
        .collect();
    emails.insert(count / 2, including.to_string());
    emails
}

// --- When steps ---

#[when(expr = "I send a newsletter to {int} subscribers including {string}")]
async fn send_newsletter(world: &mut OutreachWorld, count: usize, including: String) {
    world
        .post_json(
            "/api/newsletter",
            serde_json::json!({
                "emails": subscribers(count, &including),
                "subject": "Spring term",
                "content": "<h1>Spring term</h1><p>Registration is open.</p>"
            }),
        )
        .await;
}

#[when("I send a newsletter to an empty list")]
async fn send_newsletter_to_empty_list(world: &mut OutreachWorld) {
    world
        .post_json(
            "/api/newsletter",
            serde_json::json!({ "emails": [], "subject": "Spring term", "content": "<p>Hi</p>" }),
        )
        .await;
}

#[when(expr = "I send a newsletter whose recipients are the string {string}")]
async fn send_newsletter_to_string(world: &mut OutreachWorld, emails: String) {
    world
        .post_json(
            "/api/newsletter",
            serde_json::json!({ "emails": emails, "subject": "Spring term", "content": "<p>Hi</p>" }),
        )
        .await;
}

// --- Then steps ---

#[then(expr = "the report counts {int} total, {int} succeeded and {int} failed")]
fn report_counts(world: &mut OutreachWorld, total: u64, succeeded: u64, failed: u64) {
    let json = world.response_json.as_ref().expect("JSON response");
    assert_eq!(json["totalEmails"], total);
    assert_eq!(json["successCount"], succeeded);
    assert_eq!(json["failureCount"], failed);
}

#[then(expr = "the failed emails are {string}")]
fn failed_emails(world: &mut OutreachWorld, address: String) {
    let json = world.response_json.as_ref().expect("JSON response");
    assert_eq!(json["failedEmails"], serde_json::json!([address]));
}
