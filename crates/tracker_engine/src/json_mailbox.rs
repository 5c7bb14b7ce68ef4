use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracker_core::SearchQuery;
use tracker_logging::{tracker_debug, tracker_info};

use crate::mailbox::MessageStore;
use crate::persist::AtomicFileWriter;
use crate::{MailMessage, MailThread, MessageId, StoreError, ThreadId};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct MailboxFile {
    #[serde(default)]
    labels: BTreeSet<String>,
    #[serde(default)]
    threads: Vec<StoredThread>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredThread {
    id: ThreadId,
    #[serde(default = "default_in_inbox")]
    in_inbox: bool,
    #[serde(default)]
    labels: BTreeSet<String>,
    messages: Vec<MailMessage>,
}

fn default_in_inbox() -> bool {
    true
}

impl StoredThread {
    fn latest(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.messages.iter().map(|m| m.date).max()
    }

    fn matches(&self, query: &SearchQuery) -> bool {
        self.in_inbox
            && !self.labels.contains(&query.excluded_label)
            && self.messages.iter().any(|m| query.window.contains(m.date))
    }

    fn to_thread(&self) -> MailThread {
        let mut messages = self.messages.clone();
        messages.sort_by_key(|m| m.date);
        MailThread {
            id: self.id.clone(),
            messages,
        }
    }
}

/// Message store backed by a JSON file, used for offline runs and fixtures.
///
/// Label and read-state mutations are written through to disk immediately so a
/// crash mid-batch leaves exactly the checkpoints that were applied.
pub struct JsonMailbox {
    writer: AtomicFileWriter,
    state: Mutex<MailboxFile>,
}

impl JsonMailbox {
    /// Opens `path`; a missing file is an empty mailbox.
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let state = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|err| {
                StoreError::Unavailable(format!("invalid mailbox file {:?}: {err}", path))
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => MailboxFile::default(),
            Err(err) => {
                return Err(StoreError::Unavailable(format!(
                    "cannot read mailbox file {:?}: {err}",
                    path
                )))
            }
        };
        tracker_info!(
            "Opened mailbox {:?} with {} threads",
            path,
            state.threads.len()
        );
        Ok(Self {
            writer: AtomicFileWriter::new(path),
            state: Mutex::new(state),
        })
    }

    /// Labels currently attached to `thread`.
    pub fn thread_labels(&self, thread: &ThreadId) -> Result<BTreeSet<String>, StoreError> {
        let state = self.lock()?;
        state
            .threads
            .iter()
            .find(|t| &t.id == thread)
            .map(|t| t.labels.clone())
            .ok_or_else(|| StoreError::UnknownThread(thread.clone()))
    }

    pub fn is_unread(&self, message: &MessageId) -> Result<bool, StoreError> {
        let state = self.lock()?;
        state
            .threads
            .iter()
            .flat_map(|t| t.messages.iter())
            .find(|m| &m.id == message)
            .map(|m| m.unread)
            .ok_or_else(|| StoreError::UnknownMessage(message.clone()))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MailboxFile>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("mailbox state poisoned".into()))
    }

    /// Persists `next` and only then makes it the live state, so a failed
    /// write leaves memory matching the file.
    fn commit(&self, state: &mut MailboxFile, next: MailboxFile) -> Result<(), StoreError> {
        let text = serde_json::to_vec_pretty(&next)
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        self.writer.write(&text)?;
        *state = next;
        Ok(())
    }
}

#[async_trait::async_trait]
impl MessageStore for JsonMailbox {
    async fn search(
        &self,
        query: &SearchQuery,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<MailThread>, StoreError> {
        let state = self.lock()?;
        let mut hits: Vec<&StoredThread> =
            state.threads.iter().filter(|t| t.matches(query)).collect();
        // Most recently active threads first.
        hits.sort_by(|a, b| b.latest().cmp(&a.latest()));
        let page: Vec<MailThread> = hits
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(StoredThread::to_thread)
            .collect();
        tracker_debug!(
            "search '{}' offset={} limit={} -> {} threads",
            query.to_query_string(),
            offset,
            limit,
            page.len()
        );
        Ok(page)
    }

    async fn ensure_label(&self, name: &str) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if state.labels.contains(name) {
            return Ok(());
        }
        let mut next = state.clone();
        next.labels.insert(name.to_string());
        self.commit(&mut state, next)
    }

    async fn add_label(&self, thread: &ThreadId, name: &str) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let mut next = state.clone();
        next.labels.insert(name.to_string());
        let stored = next
            .threads
            .iter_mut()
            .find(|t| &t.id == thread)
            .ok_or_else(|| StoreError::UnknownThread(thread.clone()))?;
        stored.labels.insert(name.to_string());
        self.commit(&mut state, next)
    }

    async fn mark_read(&self, message: &MessageId) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let mut next = state.clone();
        let stored = next
            .threads
            .iter_mut()
            .flat_map(|t| t.messages.iter_mut())
            .find(|m| &m.id == message)
            .ok_or_else(|| StoreError::UnknownMessage(message.clone()))?;
        stored.unread = false;
        self.commit(&mut state, next)
    }
}
