use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracker_core::{
    parse_model_response, ClassificationDecision, ClassificationRequest, MAX_BODY_CHARS,
    SYSTEM_PROMPT,
};
use tracker_logging::{tracker_debug, tracker_error, tracker_info};

use crate::completion::CompletionService;

/// Turns one message into a validated decision. Every failure along the way
/// (transport, unparseable text, schema mismatch) degrades to
/// [`ClassificationDecision::Irrelevant`].
pub struct Classifier {
    service: Arc<dyn CompletionService>,
    max_body_chars: usize,
}

impl Classifier {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        tracker_info!(
            "Classifier using model {} (prompt {})",
            service.model_name(),
            prompt_fingerprint(service.model_name())
        );
        Self {
            service,
            max_body_chars: MAX_BODY_CHARS,
        }
    }

    pub fn with_max_body_chars(mut self, max_body_chars: usize) -> Self {
        self.max_body_chars = max_body_chars;
        self
    }

    pub async fn classify(&self, subject: &str, body: &str) -> ClassificationDecision {
        let request = ClassificationRequest::new(subject, body, self.max_body_chars);
        let text = match self.service.complete(&request).await {
            Ok(text) => text,
            Err(err) => {
                tracker_error!("Classification service error: {}", err);
                String::new()
            }
        };
        tracker_debug!("Model reply for {:?}: {:?}", subject, text);

        match parse_model_response(&text) {
            Ok(parsed) => ClassificationDecision::from_response(&parsed),
            Err(_) => ClassificationDecision::Irrelevant,
        }
    }
}

/// Short SHA-256 of the model name and system prompt; changes whenever the
/// prompt contract with the service changes.
pub fn prompt_fingerprint(model: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model.as_bytes());
    hasher.update(SYSTEM_PROMPT.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
