#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, Once};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tracker_core::{ClassificationRequest, LabelNames, SearchQuery};
use tracker_engine::{
    BatchRunner, BatchSettings, Classifier, Clock, CompletionError, CompletionService,
    FixedClock, LedgerColumn, LedgerError, LedgerRow, LedgerStore, LedgerSync, MailMessage,
    MailThread, MessageId, MessageStore, RowId, ScannedRow, StoreError, ThreadId,
    ThreadProcessor,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(tracker_logging::initialize_for_tests);
}

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 20).unwrap()
}

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 20, hour, minute, 0).unwrap()
}

pub fn message(id: &str, subject: &str, body: &str, date: DateTime<Utc>) -> MailMessage {
    MailMessage {
        id: MessageId(id.to_string()),
        subject: subject.to_string(),
        plain_body: body.to_string(),
        html_body: String::new(),
        date,
        unread: true,
    }
}

pub fn thread(id: &str, messages: Vec<MailMessage>) -> MailThread {
    MailThread {
        id: ThreadId(id.to_string()),
        messages,
    }
}

pub const IRRELEVANT: &str = r#"{ "job_application": false, "job_update": false }"#;

pub fn application_reply(company: &str, title: &str) -> String {
    format!(
        "```json\n{{\"job_application\": true, \"company_name\": \"{company}\", \"job_title\": \"{title}\", \"application_url\": \"https://jobs.example/{company}\"}}\n```"
    )
}

pub fn update_reply(company: &str, title: &str, status: &str) -> String {
    format!(
        "{{\"job_update\": true, \"company_name\": \"{company}\", \"job_title\": \"{title}\", \"status\": \"{status}\"}}"
    )
}

/// Replies keyed by message subject; unknown subjects are irrelevant.
#[derive(Default)]
pub struct ScriptedCompletion {
    replies: Mutex<HashMap<String, Result<String, CompletionError>>>,
    requests: Mutex<Vec<ClassificationRequest>>,
}

impl ScriptedCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, subject: &str, text: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(subject.to_string(), Ok(text.into()));
        self
    }

    pub fn fail(self, subject: &str, error: CompletionError) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(subject.to_string(), Err(error));
        self
    }

    pub fn requests(&self) -> Vec<ClassificationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn subjects_seen(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|r| subject_of(&r.user_prompt))
            .collect()
    }
}

fn subject_of(user_prompt: &str) -> Option<String> {
    let rest = user_prompt.strip_prefix("Subject:\n")?;
    let end = rest.find("\n\nBody:\n")?;
    Some(rest[..end].to_string())
}

#[async_trait::async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, request: &ClassificationRequest) -> Result<String, CompletionError> {
        self.requests.lock().unwrap().push(request.clone());
        let subject = subject_of(&request.user_prompt).unwrap_or_default();
        self.replies
            .lock()
            .unwrap()
            .get(&subject)
            .cloned()
            .unwrap_or_else(|| Ok(IRRELEVANT.to_string()))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// In-process message store with failure injection on label writes.
#[derive(Default)]
pub struct MemoryStore {
    threads: Mutex<Vec<(MailThread, BTreeSet<String>)>>,
    labels: Mutex<BTreeSet<String>>,
    read: Mutex<Vec<MessageId>>,
    queries: Mutex<Vec<(String, usize, usize)>>,
    failing_labels: Mutex<BTreeSet<String>>,
    failing_reads: Mutex<BTreeSet<MessageId>>,
}

impl MemoryStore {
    pub fn with_threads(threads: Vec<MailThread>) -> Self {
        let store = Self::default();
        *store.threads.lock().unwrap() =
            threads.into_iter().map(|t| (t, BTreeSet::new())).collect();
        store
    }

    pub fn fail_label(&self, name: &str) {
        self.failing_labels.lock().unwrap().insert(name.to_string());
    }

    pub fn fail_read(&self, message: &str) {
        self.failing_reads
            .lock()
            .unwrap()
            .insert(MessageId(message.to_string()));
    }

    pub fn heal(&self) {
        self.failing_labels.lock().unwrap().clear();
        self.failing_reads.lock().unwrap().clear();
    }

    pub fn labels_of(&self, thread: &str) -> BTreeSet<String> {
        self.threads
            .lock()
            .unwrap()
            .iter()
            .find(|(t, _)| t.id.as_str() == thread)
            .map(|(_, labels)| labels.clone())
            .unwrap_or_default()
    }

    pub fn known_labels(&self) -> BTreeSet<String> {
        self.labels.lock().unwrap().clone()
    }

    pub fn read_messages(&self) -> Vec<MessageId> {
        self.read.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<(String, usize, usize)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MessageStore for MemoryStore {
    async fn search(
        &self,
        query: &SearchQuery,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<MailThread>, StoreError> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_query_string(), offset, limit));
        Ok(self
            .threads
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, labels)| {
                !labels.contains(&query.excluded_label)
                    && t.messages.iter().any(|m| query.window.contains(m.date))
            })
            .skip(offset)
            .take(limit)
            .map(|(t, _)| t.clone())
            .collect())
    }

    async fn ensure_label(&self, name: &str) -> Result<(), StoreError> {
        self.labels.lock().unwrap().insert(name.to_string());
        Ok(())
    }

    async fn add_label(&self, thread: &ThreadId, name: &str) -> Result<(), StoreError> {
        if self.failing_labels.lock().unwrap().contains(name) {
            return Err(StoreError::Unavailable(format!("cannot add {name}")));
        }
        let mut threads = self.threads.lock().unwrap();
        let (_, labels) = threads
            .iter_mut()
            .find(|(t, _)| &t.id == thread)
            .ok_or_else(|| StoreError::UnknownThread(thread.clone()))?;
        labels.insert(name.to_string());
        Ok(())
    }

    async fn mark_read(&self, message: &MessageId) -> Result<(), StoreError> {
        if self.failing_reads.lock().unwrap().contains(message) {
            return Err(StoreError::UnknownMessage(message.clone()));
        }
        self.read.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// In-process ledger counting mutations.
#[derive(Default)]
pub struct MemoryLedger {
    rows: Mutex<Vec<LedgerRow>>,
    appends: Mutex<usize>,
    cell_writes: Mutex<Vec<(RowId, LedgerColumn, String)>>,
    fail_appends: Mutex<bool>,
}

impl MemoryLedger {
    pub fn with_rows(rows: Vec<LedgerRow>) -> Self {
        let ledger = Self::default();
        *ledger.rows.lock().unwrap() = rows;
        ledger
    }

    pub fn fail_appends(&self, fail: bool) {
        *self.fail_appends.lock().unwrap() = fail;
    }

    pub fn rows(&self) -> Vec<LedgerRow> {
        self.rows.lock().unwrap().clone()
    }

    pub fn appends(&self) -> usize {
        *self.appends.lock().unwrap()
    }

    pub fn cell_writes(&self) -> Vec<(RowId, LedgerColumn, String)> {
        self.cell_writes.lock().unwrap().clone()
    }

    /// Appends plus status updates.
    pub fn mutations(&self) -> usize {
        let status_writes = self
            .cell_writes()
            .iter()
            .filter(|(_, column, _)| *column == LedgerColumn::Status)
            .count();
        self.appends() + status_writes
    }
}

#[async_trait::async_trait]
impl LedgerStore for MemoryLedger {
    async fn append_row(&self, row: LedgerRow) -> Result<(), LedgerError> {
        if *self.fail_appends.lock().unwrap() {
            return Err(LedgerError::Unavailable("sheet offline".into()));
        }
        self.rows.lock().unwrap().push(row);
        *self.appends.lock().unwrap() += 1;
        Ok(())
    }

    async fn scan_rows(&self) -> Result<Vec<(RowId, ScannedRow)>, LedgerError> {
        Ok(self
            .rows()
            .into_iter()
            .enumerate()
            .map(|(idx, row)| (RowId(idx), ScannedRow::Valid(row)))
            .collect())
    }

    async fn update_cell(
        &self,
        row: RowId,
        column: LedgerColumn,
        value: String,
    ) -> Result<(), LedgerError> {
        let mut rows = self.rows.lock().unwrap();
        let target = rows.get_mut(row.0).ok_or(LedgerError::UnknownRow(row))?;
        match column {
            LedgerColumn::Status => {
                target.status = value
                    .parse::<tracker_core::ApplicationStatus>()
                    .map_err(|_| LedgerError::Unavailable(format!("bad status {value}")))?
            }
            LedgerColumn::LastUpdated => {
                target.last_updated = DateTime::parse_from_rfc3339(&value)
                    .map_err(|err| LedgerError::Unavailable(err.to_string()))?
                    .with_timezone(&Utc)
            }
            other => {
                return Err(LedgerError::Unavailable(format!(
                    "unexpected write to {other:?}"
                )))
            }
        }
        self.cell_writes.lock().unwrap().push((row, column, value));
        Ok(())
    }
}

pub fn ledger_row(company: &str, title: &str) -> LedgerRow {
    LedgerRow {
        company: company.to_string(),
        title: title.to_string(),
        url: String::new(),
        status: tracker_core::ApplicationStatus::Applied,
        applied_on: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        last_updated: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
    }
}

pub fn run_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(at(23, 0)))
}

pub fn processor(
    store: Arc<dyn MessageStore>,
    completion: Arc<dyn CompletionService>,
    ledger: Arc<dyn LedgerStore>,
) -> ThreadProcessor {
    ThreadProcessor::new(
        store,
        Classifier::new(completion),
        LedgerSync::new(ledger, run_clock()),
        LabelNames::default(),
    )
}

pub fn runner(
    store: Arc<dyn MessageStore>,
    completion: Arc<dyn CompletionService>,
    ledger: Arc<dyn LedgerStore>,
) -> BatchRunner {
    BatchRunner::new(
        store.clone(),
        processor(store, completion, ledger),
        run_clock(),
        BatchSettings::default(),
    )
}
