use std::sync::Arc;

use chrono::NaiveDate;
use tracker_core::{LabelNames, RunSummary, SearchQuery, SearchWindow};
use tracker_logging::{tracker_error, tracker_info};

use crate::clock::Clock;
use crate::mailbox::MessageStore;
use crate::processor::{ThreadError, ThreadProcessor};

#[derive(Debug, Clone)]
pub struct BatchSettings {
    /// Threads requested per search page.
    pub page_size: usize,
    /// Upper bound on threads considered in one run.
    pub max_threads: usize,
    /// Day to scan; defaults to the clock's current UTC date.
    pub day: Option<NaiveDate>,
    pub labels: LabelNames,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_threads: 500,
            day: None,
            labels: LabelNames::default(),
        }
    }
}

/// One scheduled invocation: search unseen threads of the day and process each.
pub struct BatchRunner {
    store: Arc<dyn MessageStore>,
    processor: ThreadProcessor,
    clock: Arc<dyn Clock>,
    settings: BatchSettings,
}

impl BatchRunner {
    pub fn new(
        store: Arc<dyn MessageStore>,
        processor: ThreadProcessor,
        clock: Arc<dyn Clock>,
        settings: BatchSettings,
    ) -> Self {
        Self {
            store,
            processor,
            clock,
            settings,
        }
    }

    pub fn query(&self) -> SearchQuery {
        let day = self
            .settings
            .day
            .unwrap_or_else(|| self.clock.now().date_naive());
        SearchQuery::new(
            SearchWindow::for_day(day),
            self.settings.labels.processed.clone(),
        )
    }

    /// Runs the batch. Never fails: search errors end the batch early and thread
    /// errors are logged and counted, leaving those threads for the next run.
    pub async fn run(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        let query = self.query();
        tracker_info!("Scanning '{}'", query.to_query_string());

        if let Err(err) = self.store.ensure_label(&self.settings.labels.processed).await {
            tracker_error!("Cannot prepare checkpoint label: {}", err);
            return summary;
        }

        let page_size = self.settings.page_size.max(1);
        // Checkpointed threads drop out of the result set, so only threads that
        // failed before their checkpoint still occupy offsets.
        let mut offset = 0;
        let mut considered = 0;
        while considered < self.settings.max_threads {
            let limit = page_size.min(self.settings.max_threads - considered);
            let threads = match self.store.search(&query, offset, limit).await {
                Ok(threads) => threads,
                Err(err) => {
                    tracker_error!("Search failed at offset {}: {}", offset, err);
                    break;
                }
            };
            if threads.is_empty() {
                break;
            }
            considered += threads.len();

            for thread in &threads {
                match self.processor.process(thread).await {
                    Ok(report) => summary.record_checkpointed(report.decided),
                    Err(ThreadError::AfterCheckpoint { decided, source }) => {
                        tracker_error!(
                            "ERROR on thread {} after checkpoint: {}",
                            thread.id,
                            source
                        );
                        summary.record_checkpointed(decided);
                    }
                    Err(err) => {
                        tracker_error!("ERROR on thread {}: {}", thread.id, err);
                        summary.record_failure();
                        offset += 1;
                    }
                }
            }

            if threads.len() < page_size {
                break;
            }
        }

        tracker_info!(
            "{} threads processed ({} failed, {} new applications, {} status updates)",
            summary.checkpointed,
            summary.failed,
            summary.applications_recorded,
            summary.statuses_updated
        );
        summary
    }
}
