use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use tracker_core::SearchQuery;
use tracker_logging::tracker_info;

use crate::ledger::{LedgerColumn, LedgerError, LedgerRow, LedgerStore, RowId, ScannedRow};
use crate::mailbox::MessageStore;
use crate::{MailThread, MessageId, StoreError, ThreadId};

/// Message store that searches the real inbox but only logs label and read
/// mutations, so a dry run leaves every thread eligible for the next real run.
///
/// Labels are remembered in memory so paging behaves as if they had been
/// written: threads carrying the excluded label are skipped by shifting the
/// offset past them.
pub struct DryRunStore {
    inner: Arc<dyn MessageStore>,
    virtual_labels: Mutex<BTreeMap<String, BTreeSet<ThreadId>>>,
}

impl DryRunStore {
    pub fn new(inner: Arc<dyn MessageStore>) -> Self {
        Self {
            inner,
            virtual_labels: Mutex::new(BTreeMap::new()),
        }
    }

    fn labelled_count(&self, name: &str) -> Result<usize, StoreError> {
        let labels = self
            .virtual_labels
            .lock()
            .map_err(|_| StoreError::Unavailable("dry run state poisoned".into()))?;
        Ok(labels.get(name).map_or(0, BTreeSet::len))
    }
}

#[async_trait::async_trait]
impl MessageStore for DryRunStore {
    async fn search(
        &self,
        query: &SearchQuery,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<MailThread>, StoreError> {
        // Virtually labelled threads are exactly the ones the batch already
        // walked past, so they sit in front of the requested window.
        let skipped = self.labelled_count(&query.excluded_label)?;
        self.inner.search(query, offset + skipped, limit).await
    }

    async fn ensure_label(&self, name: &str) -> Result<(), StoreError> {
        tracker_info!("[dry run] would ensure label {}", name);
        Ok(())
    }

    async fn add_label(&self, thread: &ThreadId, name: &str) -> Result<(), StoreError> {
        tracker_info!("[dry run] would label thread {} with {}", thread, name);
        self.virtual_labels
            .lock()
            .map_err(|_| StoreError::Unavailable("dry run state poisoned".into()))?
            .entry(name.to_string())
            .or_default()
            .insert(thread.clone());
        Ok(())
    }

    async fn mark_read(&self, message: &MessageId) -> Result<(), StoreError> {
        tracker_info!("[dry run] would mark message {} read", message);
        Ok(())
    }
}

/// Ledger that reads through to an existing ledger, if any, and only logs
/// writes.
#[derive(Default)]
pub struct DryRunLedger {
    inner: Option<Arc<dyn LedgerStore>>,
}

impl DryRunLedger {
    pub fn new(inner: Option<Arc<dyn LedgerStore>>) -> Self {
        Self { inner }
    }
}

#[async_trait::async_trait]
impl LedgerStore for DryRunLedger {
    async fn append_row(&self, row: LedgerRow) -> Result<(), LedgerError> {
        tracker_info!("[dry run] would append {:?}", row.cells());
        Ok(())
    }

    async fn scan_rows(&self) -> Result<Vec<(RowId, ScannedRow)>, LedgerError> {
        match &self.inner {
            Some(inner) => inner.scan_rows().await,
            None => Ok(Vec::new()),
        }
    }

    async fn update_cell(
        &self,
        row: RowId,
        column: LedgerColumn,
        value: String,
    ) -> Result<(), LedgerError> {
        tracker_info!(
            "[dry run] would set {} {} to {:?}",
            row,
            column.header(),
            value
        );
        Ok(())
    }
}
