//! Tracker core: classification parsing, validation, and the pure per-thread
//! state machine.
mod decision;
mod effect;
mod msg;
mod prompt;
mod response;
mod state;
mod status;
mod summary;
mod update;
mod window;

pub use decision::{ClassificationDecision, DecisionKind};
pub use effect::{ThreadEffect, ThreadLabel};
pub use msg::ThreadMsg;
pub use prompt::{
    truncate_body, ClassificationRequest, CLASSIFICATION_TEMPERATURE, MAX_BODY_CHARS,
    SYSTEM_PROMPT,
};
pub use response::{parse_model_response, Unparseable};
pub use state::{ThreadPhase, ThreadState};
pub use status::{normalize_status, ApplicationStatus, UnknownStatus};
pub use summary::RunSummary;
pub use update::update;
pub use window::{LabelNames, SearchQuery, SearchWindow};
