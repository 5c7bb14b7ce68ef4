use chrono::{DateTime, Utc};

use crate::ClassificationDecision;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadMsg {
    /// The next message (oldest-first) was classified.
    Classified {
        decision: ClassificationDecision,
        received: DateTime<Utc>,
    },
    /// No messages are left to classify.
    MessagesExhausted,
    /// All dispatch effects succeeded; request the checkpoint.
    Finalize,
}
