use std::borrow::Cow;

use scraper::Html;
use tracker_core::SearchQuery;

use crate::{MailMessage, MailThread, MessageId, StoreError, ThreadId};

/// The inbox the tracker scans and checkpoints.
#[async_trait::async_trait]
pub trait MessageStore: Send + Sync {
    /// Returns at most `limit` threads matching `query`, skipping the first `offset`.
    async fn search(
        &self,
        query: &SearchQuery,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<MailThread>, StoreError>;

    /// Create-or-get a label by name.
    async fn ensure_label(&self, name: &str) -> Result<(), StoreError>;

    async fn add_label(&self, thread: &ThreadId, name: &str) -> Result<(), StoreError>;

    async fn mark_read(&self, message: &MessageId) -> Result<(), StoreError>;
}

impl MailMessage {
    /// Text handed to the classifier: the plain body when present, otherwise the
    /// HTML body with tags replaced by line breaks.
    pub fn plain_text(&self) -> Cow<'_, str> {
        if !self.plain_body.trim().is_empty() {
            return Cow::Borrowed(&self.plain_body);
        }
        Cow::Owned(html_to_text(&self.html_body))
    }
}

pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
