use std::borrow::Cow;

/// Maximum number of body characters sent to the classification service.
pub const MAX_BODY_CHARS: usize = 14_000;
const TRUNCATED_MARKER: &str = "\n\n...[truncated]";

/// Sampling temperature for every classification request.
pub const CLASSIFICATION_TEMPERATURE: f32 = 0.0;

/// Instructions sent with every classification request. The three JSON shapes
/// below are what [`crate::ClassificationDecision::from_response`] validates;
/// edit both together.
pub const SYSTEM_PROMPT: &str = r#"You are an assistant that reads an email subject and body and must classify it as one of:
  • A genuine application confirmation (e.g. "Thank you for applying", "we have received your application")
  • A status update, including rejections or interview invites (e.g. "we regret to inform you", "interview scheduled")
  • Or purely a job-posting/alert (e.g. "new jobs matching your profile", "This job is a match", "daily digest")

If it's a confirmation, reply ONLY with:
{
  "job_application": true,
  "company_name": "<company name>",
  "job_title": "<position title>",
  "application_date": "<ISO8601 date>",
  "application_url": "<posting URL>"
}

If it's a status update (including rejections or interview invites), reply ONLY with exactly this JSON, choosing one of:
  • "Interview"
  • "Rejected"
  • "Offer"
  • "Withdrawn"

{
  "job_update": true,
  "company_name": "<company name>",
  "job_title": "<position title>",
  "status": "<one of: Interview, Rejected, Offer, Withdrawn>"
}

If it's purely a job-posting or alert, or anything else, reply:
{ "job_application": false, "job_update": false }"#;

/// A fully assembled request for the classification service.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationRequest {
    pub system_prompt: &'static str,
    pub user_prompt: String,
    pub temperature: f32,
}

impl ClassificationRequest {
    /// Builds the request for one message, truncating the body to `max_body_chars`.
    pub fn new(subject: &str, body: &str, max_body_chars: usize) -> Self {
        let body = truncate_body(body, max_body_chars);
        Self {
            system_prompt: SYSTEM_PROMPT,
            user_prompt: format!("Subject:\n{subject}\n\nBody:\n{body}"),
            temperature: CLASSIFICATION_TEMPERATURE,
        }
    }
}

/// Cuts `body` to at most `max_chars` characters and appends a marker when
/// anything was dropped. Never splits a code point.
pub fn truncate_body(body: &str, max_chars: usize) -> Cow<'_, str> {
    match body.char_indices().nth(max_chars) {
        Some((end, _)) => Cow::Owned(format!("{}{TRUNCATED_MARKER}", &body[..end])),
        None => Cow::Borrowed(body),
    }
}
