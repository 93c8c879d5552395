//! Email composition

use crate::mailer::OutgoingMail;

/// Width used when rendering the plain-text fallback
const TEXT_WIDTH: usize = 78;

/// Escape text for inclusion in HTML
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Escape text and keep its line breaks
fn paragraphs(input: &str) -> String {
    escape_html(input.trim()).replace("\r\n", "\n").replace('\n', "<br>")
}

fn html_document(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: system-ui, sans-serif; line-height: 1.5; color: #212529; max-width: 640px; margin: 0 auto; padding: 1rem;">
{body}
</body>
</html>"#
    )
}

/// Compose a reply, quoting the original message below it when present
pub fn reply_mail(
    to: &str,
    subject: &str,
    content: &str,
    original_message: Option<&str>,
) -> OutgoingMail {
    let original = original_message
        .map(str::trim)
        .filter(|message| !message.is_empty());

    let mut html_body = format!("<div>{}</div>", paragraphs(content));
    let mut text = content.trim().to_string();

    if let Some(original) = original {
        html_body.push_str(&format!(
            r#"
<hr style="border: none; border-top: 1px solid #dee2e6; margin: 1.5rem 0;">
<p style="color: #6c757d; font-size: 0.9em;">Your original message:</p>
<blockquote style="margin: 0; padding-left: 1rem; border-left: 3px solid #dee2e6; color: #6c757d;">{}</blockquote>"#,
            paragraphs(original)
        ));

        text.push_str("\n\n--- Your original message ---\n");
        let quoted: Vec<String> = original.lines().map(|line| format!("> {}", line)).collect();
        text.push_str(&quoted.join("\n"));
    }

    OutgoingMail {
        to: to.trim().to_string(),
        subject: subject.trim().to_string(),
        html: html_document(&html_body),
        text,
    }
}

/// Compose one copy of a newsletter.
///
/// The content is HTML authored in the admin dashboard; the plain-text
/// fallback is rendered from it.
pub fn newsletter_mail(to: &str, subject: &str, content: &str) -> OutgoingMail {
    let html = html_document(content.trim());
    let text = match html2text::from_read(content.as_bytes(), TEXT_WIDTH) {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            tracing::debug!("Falling back to raw newsletter text: {}", e);
            content.trim().to_string()
        }
    };

    OutgoingMail {
        to: to.trim().to_string(),
        subject: subject.trim().to_string(),
        html,
        text,
    }
}
