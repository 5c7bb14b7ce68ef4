use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Label names used as the observable contract with the message store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelNames {
    /// Checkpoint: the thread has been handled and must be skipped on rerun.
    pub processed: String,
    /// Category label for threads that produced a new application row.
    pub postings: String,
    /// Category label for threads that updated an existing row.
    pub updates: String,
}

impl Default for LabelNames {
    fn default() -> Self {
        Self {
            processed: "Job_Processed".to_string(),
            postings: "Job_Postings".to_string(),
            updates: "Job_Updates".to_string(),
        }
    }
}

/// Half-open calendar-day window `[start, start + 1 day)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    start: NaiveDate,
}

impl SearchWindow {
    pub fn for_day(start: NaiveDate) -> Self {
        Self { start }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Exclusive end of the window.
    pub fn end(&self) -> NaiveDate {
        self.start
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        let day = instant.date_naive();
        day >= self.start && day < self.end()
    }
}

/// Selects unseen inbox threads inside one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub window: SearchWindow,
    /// Threads carrying this label are excluded.
    pub excluded_label: String,
}

impl SearchQuery {
    pub fn new(window: SearchWindow, excluded_label: impl Into<String>) -> Self {
        Self {
            window,
            excluded_label: excluded_label.into(),
        }
    }

    /// Renders the query in mail-search syntax, e.g.
    /// `in:inbox after:2025/06/20 before:2025/06/21 -label:Job_Processed`.
    pub fn to_query_string(&self) -> String {
        [
            "in:inbox".to_string(),
            format!("after:{}", self.window.start().format("%Y/%m/%d")),
            format!("before:{}", self.window.end().format("%Y/%m/%d")),
            format!("-label:{}", self.excluded_label),
        ]
        .join(" ")
    }
}
