use std::sync::Arc;

use anyhow::Context;
use tracker_core::{LabelNames, RunSummary};
use tracker_engine::{
    BatchRunner, BatchSettings, Classifier, Clock, CompletionService, CsvLedger, DryRunLedger,
    DryRunStore, JsonMailbox, LedgerStore, LedgerSync, MessageStore, OpenAiChatClient,
    StubCompletionService, SystemClock, ThreadProcessor,
};
use tracker_logging::tracker_info;

use crate::cli::Cli;
use crate::config::TrackerConfig;

/// Wires the file-backed collaborators and runs one batch. A dry run reads the
/// mailbox and ledger but writes neither.
pub async fn run(
    cli: &Cli,
    config: &TrackerConfig,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<RunSummary> {
    let mailbox_path = cli
        .mailbox
        .clone()
        .unwrap_or_else(|| config.mailbox_path.clone());
    let ledger_path = cli
        .ledger
        .clone()
        .unwrap_or_else(|| config.ledger_path.clone());

    let completion: Arc<dyn CompletionService> = if cli.dry_run {
        tracker_info!("Dry run: classification disabled");
        Arc::new(StubCompletionService::irrelevant())
    } else {
        let settings = config.completion_settings()?;
        Arc::new(OpenAiChatClient::new(settings).context("building chat client")?)
    };

    let mut store: Arc<dyn MessageStore> = Arc::new(
        JsonMailbox::open(mailbox_path.clone())
            .with_context(|| format!("opening mailbox {}", mailbox_path.display()))?,
    );
    let open_ledger = || -> anyhow::Result<Arc<dyn LedgerStore>> {
        let ledger = CsvLedger::open(ledger_path.clone())
            .with_context(|| format!("opening ledger {}", ledger_path.display()))?;
        Ok(Arc::new(ledger))
    };
    let ledger: Arc<dyn LedgerStore> = if cli.dry_run {
        store = Arc::new(DryRunStore::new(store));
        // Opening a missing ledger would create it.
        let existing = if ledger_path.exists() {
            Some(open_ledger()?)
        } else {
            None
        };
        Arc::new(DryRunLedger::new(existing))
    } else {
        open_ledger()?
    };

    let labels = LabelNames::default();
    let processor = ThreadProcessor::new(
        store.clone(),
        Classifier::new(completion),
        LedgerSync::new(ledger, clock.clone()),
        labels.clone(),
    );
    let runner = BatchRunner::new(
        store,
        processor,
        clock,
        BatchSettings {
            day: cli.day,
            labels,
            ..BatchSettings::default()
        },
    );
    Ok(runner.run().await)
}

/// Default system clock for production runs.
pub fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}
