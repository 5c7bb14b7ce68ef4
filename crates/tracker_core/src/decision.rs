use serde_json::Value;
use tracker_logging::{tracker_debug, tracker_warn};

use crate::status::{normalize_status, ApplicationStatus};

/// Validated outcome of classifying one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationDecision {
    NewApplication {
        company_name: String,
        job_title: String,
        /// May be empty when the message did not carry a posting link.
        application_url: String,
    },
    StatusUpdate {
        company_name: String,
        job_title: String,
        status: ApplicationStatus,
    },
    Irrelevant,
}

/// Discriminant of [`ClassificationDecision`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionKind {
    NewApplication,
    StatusUpdate,
    Irrelevant,
}

impl ClassificationDecision {
    pub fn kind(&self) -> DecisionKind {
        match self {
            ClassificationDecision::NewApplication { .. } => DecisionKind::NewApplication,
            ClassificationDecision::StatusUpdate { .. } => DecisionKind::StatusUpdate,
            ClassificationDecision::Irrelevant => DecisionKind::Irrelevant,
        }
    }

    /// True for decisions that lead to a ledger mutation.
    pub fn is_decisive(&self) -> bool {
        !matches!(self, ClassificationDecision::Irrelevant)
    }

    /// Validates a parsed model response into a decision.
    ///
    /// At least one of `job_application` / `job_update` must be a JSON boolean,
    /// otherwise the response is treated as irrelevant. A response claiming to be
    /// both an application and an update is rejected the same way. Only a literal
    /// `true` selects a kind; missing text fields become empty strings.
    pub fn from_response(parsed: &Value) -> Self {
        let application = parsed.get("job_application").and_then(Value::as_bool);
        let update = parsed.get("job_update").and_then(Value::as_bool);

        match (application, update) {
            (None, None) => {
                tracker_warn!("Invalid classification output, skipping: {}", parsed);
                ClassificationDecision::Irrelevant
            }
            (Some(true), Some(true)) => {
                tracker_warn!(
                    "Classification claims both application and update, skipping: {}",
                    parsed
                );
                ClassificationDecision::Irrelevant
            }
            (Some(true), _) => ClassificationDecision::NewApplication {
                company_name: text_field(parsed, "company_name"),
                job_title: text_field(parsed, "job_title"),
                application_url: text_field(parsed, "application_url"),
            },
            (_, Some(true)) => {
                let raw_status = text_field(parsed, "status");
                let status = normalize_status(&raw_status);
                tracker_debug!("Normalized status {:?} -> {}", raw_status, status);
                ClassificationDecision::StatusUpdate {
                    company_name: text_field(parsed, "company_name"),
                    job_title: text_field(parsed, "job_title"),
                    status,
                }
            }
            _ => ClassificationDecision::Irrelevant,
        }
    }
}

fn text_field(parsed: &Value, key: &str) -> String {
    match parsed.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
