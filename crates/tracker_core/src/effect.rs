use chrono::{DateTime, Utc};

use crate::{ApplicationStatus, LabelNames};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadEffect {
    RecordApplication {
        company_name: String,
        job_title: String,
        application_url: String,
        received: DateTime<Utc>,
    },
    UpdateStatus {
        company_name: String,
        job_title: String,
        status: ApplicationStatus,
    },
    AddLabel(ThreadLabel),
    /// Mark the chronologically first message of the thread as read.
    MarkOldestRead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreadLabel {
    Processed,
    Postings,
    Updates,
}

impl ThreadLabel {
    pub fn name<'a>(&self, names: &'a LabelNames) -> &'a str {
        match self {
            ThreadLabel::Processed => &names.processed,
            ThreadLabel::Postings => &names.postings,
            ThreadLabel::Updates => &names.updates,
        }
    }
}
