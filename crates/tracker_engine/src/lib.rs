//! Tracker engine: collaborator adapters and the thread/batch pipeline.
mod batch;
mod classifier;
mod clock;
mod completion;
mod csv_ledger;
mod dry_run;
mod json_mailbox;
mod ledger;
mod mailbox;
mod persist;
mod processor;
mod types;

pub use batch::{BatchRunner, BatchSettings};
pub use classifier::{prompt_fingerprint, Classifier};
pub use clock::{Clock, FixedClock, SystemClock};
pub use completion::{
    CompletionService, CompletionSettings, OpenAiChatClient, StubCompletionService,
};
pub use csv_ledger::CsvLedger;
pub use dry_run::{DryRunLedger, DryRunStore};
pub use json_mailbox::JsonMailbox;
pub use ledger::{
    format_date, format_timestamp, LedgerColumn, LedgerError, LedgerRow, LedgerStore,
    LedgerSync, RowId, ScannedRow, UpdateOutcome,
};
pub use mailbox::{html_to_text, MessageStore};
pub use persist::{ensure_parent_dir, AtomicFileWriter, PersistError};
pub use processor::{ThreadError, ThreadProcessor, ThreadReport};
pub use types::{
    CompletionError, FailureKind, MailMessage, MailThread, MessageId, StoreError, ThreadId,
};
