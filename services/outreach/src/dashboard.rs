//! Admin, tutor and student dashboards
//!
//! Each dashboard is a tab container: it renders the tab bar and exactly one
//! panel, chosen by the visitor's stored tab preference.

use outreach_auth::{AccountDirectory, Actor, Role};
use serde::{Deserialize, Serialize};

use crate::compose::escape_html;
use crate::content;
use crate::site::{event_grid, skill_grid};

/// A tab of one dashboard
pub trait DashboardTab: Copy + PartialEq + 'static {
    fn all() -> &'static [Self];
    fn slug(&self) -> &'static str;
    fn label(&self) -> &'static str;

    fn parse(slug: &str) -> Option<Self> {
        Self::all().iter().copied().find(|tab| tab.slug() == slug)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminTab {
    #[default]
    Overview,
    Accounts,
    Newsletter,
    Messages,
}

impl DashboardTab for AdminTab {
    fn all() -> &'static [Self] {
        &[
            AdminTab::Overview,
            AdminTab::Accounts,
            AdminTab::Newsletter,
            AdminTab::Messages,
        ]
    }

    fn slug(&self) -> &'static str {
        match self {
            AdminTab::Overview => "overview",
            AdminTab::Accounts => "accounts",
            AdminTab::Newsletter => "newsletter",
            AdminTab::Messages => "messages",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            AdminTab::Overview => "Overview",
            AdminTab::Accounts => "Accounts",
            AdminTab::Newsletter => "Newsletter",
            AdminTab::Messages => "Messages",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TutorTab {
    #[default]
    Overview,
    Students,
    Schedule,
}

impl DashboardTab for TutorTab {
    fn all() -> &'static [Self] {
        &[TutorTab::Overview, TutorTab::Students, TutorTab::Schedule]
    }

    fn slug(&self) -> &'static str {
        match self {
            TutorTab::Overview => "overview",
            TutorTab::Students => "students",
            TutorTab::Schedule => "schedule",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            TutorTab::Overview => "Overview",
            TutorTab::Students => "My Students",
            TutorTab::Schedule => "Schedule",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentTab {
    #[default]
    Overview,
    Events,
    Skills,
}

impl DashboardTab for StudentTab {
    fn all() -> &'static [Self] {
        &[StudentTab::Overview, StudentTab::Events, StudentTab::Skills]
    }

    fn slug(&self) -> &'static str {
        match self {
            StudentTab::Overview => "overview",
            StudentTab::Events => "events",
            StudentTab::Skills => "skills",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            StudentTab::Overview => "Overview",
            StudentTab::Events => "Events",
            StudentTab::Skills => "Skills",
        }
    }
}

fn tab_bar<T: DashboardTab>(route: &str, active: T) -> String {
    let links: String = T::all()
        .iter()
        .map(|tab| {
            let style = if *tab == active {
                "padding: 0.5rem 1rem; border-bottom: 3px solid #0d6efd; font-weight: 600; color: #0d6efd; text-decoration: none;"
            } else {
                "padding: 0.5rem 1rem; border-bottom: 3px solid transparent; color: #495057; text-decoration: none;"
            };
            format!(
                r#"<a href="{route}?tab={slug}" style="{style}">{label}</a>"#,
                slug = tab.slug(),
                label = tab.label()
            )
        })
        .collect();
    format!(
        r#"<nav class="tabs" style="display: flex; gap: 0.25rem; border-bottom: 1px solid #dee2e6; margin-bottom: 1rem;">{links}</nav>"#
    )
}

fn stat_card(label: &str, value: usize) -> String {
    format!(
        r#"<div style="flex: 1; padding: 1rem; border: 1px solid #dee2e6; border-radius: 0.5rem;">
            <div style="font-size: 2rem; font-weight: 700;">{value}</div>
            <div style="color: #6c757d;">{label}</div>
        </div>"#
    )
}

fn actor_table(actors: &[&Actor]) -> String {
    if actors.is_empty() {
        return "<p>No accounts.</p>".to_string();
    }
    let rows: String = actors
        .iter()
        .map(|a| {
            format!(
                r#"<tr style="border-bottom: 1px solid #dee2e6;">
                    <td style="padding: 0.5rem;">{}</td>
                    <td style="padding: 0.5rem;">{}</td>
                    <td style="padding: 0.5rem;">{}</td>
                </tr>"#,
                escape_html(&a.name),
                escape_html(&a.email),
                a.role
            )
        })
        .collect();
    format!(
        r#"<table style="width: 100%; border-collapse: collapse;">
            <thead>
                <tr style="border-bottom: 2px solid #dee2e6;">
                    <th style="padding: 0.5rem; text-align: left;">Name</th>
                    <th style="padding: 0.5rem; text-align: left;">Email</th>
                    <th style="padding: 0.5rem; text-align: left;">Role</th>
                </tr>
            </thead>
            <tbody>{rows}</tbody>
        </table>"#
    )
}

fn students(accounts: &AccountDirectory) -> Vec<&Actor> {
    accounts
        .actors()
        .into_iter()
        .filter(|a| a.role == Role::Student)
        .collect()
}

fn count_role(accounts: &AccountDirectory, role: Role) -> usize {
    accounts.actors().iter().filter(|a| a.role == role).count()
}

fn welcome(actor: &Actor) -> String {
    format!(
        "<h2>Welcome back, {}</h2>",
        escape_html(actor.name.as_str())
    )
}

fn newsletter_panel(accounts: &AccountDirectory) -> String {
    let student_emails: Vec<String> = students(accounts)
        .iter()
        .map(|a| escape_html(&a.email))
        .collect();
    format!(
        r#"<section>
    <h2>Send Newsletter</h2>
    <form id="newsletter-form" style="display: grid; gap: 0.75rem;">
        <label>Recipients (one per line)
            <textarea name="emails" rows="6" style="width: 100%;">{recipients}</textarea>
        </label>
        <label>Subject <input name="subject" style="width: 100%;"></label>
        <label>Content (HTML)
            <textarea name="content" rows="10" style="width: 100%;"></textarea>
        </label>
        <button type="submit">Send</button>
    </form>
    <pre id="newsletter-result"></pre>
    <script>
        document.getElementById('newsletter-form').addEventListener('submit', e => {{
            e.preventDefault();
            const form = e.target;
            const emails = form.emails.value.split('\n').map(s => s.trim()).filter(s => s);
            fetch('/api/newsletter', {{
                method: 'POST',
                headers: {{ 'Content-Type': 'application/json' }},
                body: JSON.stringify({{ emails, subject: form.subject.value, content: form.content.value }})
            }})
                .then(r => r.json())
                .then(data => {{
                    document.getElementById('newsletter-result').textContent = JSON.stringify(data, null, 2);
                }});
        }});
    </script>
</section>"#,
        recipients = student_emails.join("\n")
    )
}

fn messages_panel() -> String {
    r#"<section>
    <h2>Reply to a Message</h2>
    <form id="reply-form" style="display: grid; gap: 0.75rem;">
        <label>To <input name="email" type="email" style="width: 100%;"></label>
        <label>Subject <input name="subject" style="width: 100%;"></label>
        <label>Reply <textarea name="content" rows="8" style="width: 100%;"></textarea></label>
        <label>Original message <textarea name="originalMessage" rows="4" style="width: 100%;"></textarea></label>
        <button type="submit">Send Reply</button>
    </form>
    <pre id="reply-result"></pre>
    <script>
        document.getElementById('reply-form').addEventListener('submit', e => {
            e.preventDefault();
            const form = e.target;
            fetch('/api/reply', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify({
                    email: form.email.value,
                    subject: form.subject.value,
                    content: form.content.value,
                    originalMessage: form.originalMessage.value || undefined
                })
            })
                .then(r => r.json())
                .then(data => {
                    document.getElementById('reply-result').textContent = data.error || data.message;
                });
        });
    </script>
</section>"#
        .to_string()
}

/// Render the admin dashboard body
pub fn render_admin(actor: &Actor, tab: AdminTab, accounts: &AccountDirectory) -> String {
    let panel = match tab {
        AdminTab::Overview => format!(
            r#"<section>{}<div style="display: flex; gap: 1rem;">{}{}{}{}</div></section>"#,
            welcome(actor),
            stat_card("Tutors", count_role(accounts, Role::Tutor)),
            stat_card("Students", count_role(accounts, Role::Student)),
            stat_card("Upcoming events", content::events().len()),
            stat_card("Skills offered", content::skills().len()),
        ),
        AdminTab::Accounts => format!(
            "<section><h2>Accounts</h2>{}</section>",
            actor_table(&accounts.actors())
        ),
        AdminTab::Newsletter => newsletter_panel(accounts),
        AdminTab::Messages => messages_panel(),
    };
    format!(
        "<h1>Admin Dashboard</h1>{}{}",
        tab_bar(Role::Admin.dashboard_route(), tab),
        panel
    )
}

/// Render the tutor dashboard body
pub fn render_tutor(actor: &Actor, tab: TutorTab, accounts: &AccountDirectory) -> String {
    let panel = match tab {
        TutorTab::Overview => format!(
            r#"<section>{}<div style="display: flex; gap: 1rem;">{}{}</div></section>"#,
            welcome(actor),
            stat_card("Students", count_role(accounts, Role::Student)),
            stat_card("Upcoming events", content::events().len()),
        ),
        TutorTab::Students => format!(
            "<section><h2>My Students</h2>{}</section>",
            actor_table(&students(accounts))
        ),
        TutorTab::Schedule => format!(
            "<section><h2>Schedule</h2>{}</section>",
            event_grid(content::events())
        ),
    };
    format!(
        "<h1>Tutor Dashboard</h1>{}{}",
        tab_bar(Role::Tutor.dashboard_route(), tab),
        panel
    )
}

/// Render the student dashboard body
pub fn render_student(actor: &Actor, tab: StudentTab) -> String {
    let panel = match tab {
        StudentTab::Overview => format!(
            "<section>{}<p>Check the events tab for what is coming up next.</p></section>",
            welcome(actor)
        ),
        StudentTab::Events => format!(
            "<section><h2>Events</h2>{}</section>",
            event_grid(content::events())
        ),
        StudentTab::Skills => format!(
            "<section><h2>Skills</h2>{}</section>",
            skill_grid(content::skills())
        ),
    };
    format!(
        "<h1>Student Dashboard</h1>{}{}",
        tab_bar(Role::Student.dashboard_route(), tab),
        panel
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(name: &str, role: Role) -> Actor {
        Actor {
            id: name.to_lowercase(),
            name: name.to_string(),
            email: format!("{}@example.org", name.to_lowercase()),
            role,
        }
    }

    fn directory() -> AccountDirectory {
        let mut accounts = AccountDirectory::new();
        for (name, role) in [
            ("Ada", Role::Admin),
            ("Tess", Role::Tutor),
            ("Sam", Role::Student),
            ("Kim", Role::Student),
        ] {
            accounts.insert(actor(name, role), String::new()).unwrap();
        }
        accounts
    }

    #[test]
    fn parse_tab_slugs() {
        assert_eq!(AdminTab::parse("newsletter"), Some(AdminTab::Newsletter));
        assert_eq!(TutorTab::parse("schedule"), Some(TutorTab::Schedule));
        assert_eq!(StudentTab::parse("skills"), Some(StudentTab::Skills));
        assert_eq!(AdminTab::parse("payroll"), None);
    }

    #[test]
    fn admin_renders_only_active_panel() {
        let accounts = directory();
        let html = render_admin(&actor("Ada", Role::Admin), AdminTab::Accounts, &accounts);
        assert!(html.contains("<h2>Accounts</h2>"));
        assert!(html.contains("tess@example.org"));
        assert!(!html.contains("Send Newsletter"));
        assert!(!html.contains("Reply to a Message"));
    }

    #[test]
    fn admin_newsletter_prefills_student_emails() {
        let accounts = directory();
        let html = render_admin(&actor("Ada", Role::Admin), AdminTab::Newsletter, &accounts);
        assert!(html.contains("Send Newsletter"));
        assert!(html.contains("kim@example.org\nsam@example.org"));
        assert!(!html.contains("tess@example.org"));
    }

    #[test]
    fn tutor_students_lists_only_students() {
        let accounts = directory();
        let html = render_tutor(&actor("Tess", Role::Tutor), TutorTab::Students, &accounts);
        assert!(html.contains("sam@example.org"));
        assert!(!html.contains("ada@example.org"));
    }

    #[test]
    fn student_overview_welcomes_by_name() {
        let html = render_student(&actor("Sam", Role::Student), StudentTab::Overview);
        assert!(html.contains("Welcome back, Sam"));
        assert!(html.contains(r#"href="/student?tab=events""#));
    }

    #[test]
    fn names_are_escaped() {
        let html = render_student(&actor("<b>x</b>", Role::Student), StudentTab::Overview);
        assert!(html.contains("&lt;b&gt;x&lt;/b&gt;"));
    }
}
