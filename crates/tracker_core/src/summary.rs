use crate::DecisionKind;

/// Counters reported at the end of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Threads handed to the thread processor.
    pub scanned: usize,
    /// Threads that reached the checkpoint without an unrecovered error.
    pub checkpointed: usize,
    /// Threads left unchecked for the next run.
    pub failed: usize,
    pub applications_recorded: usize,
    pub statuses_updated: usize,
}

impl RunSummary {
    pub fn record_checkpointed(&mut self, decided: Option<DecisionKind>) {
        self.scanned += 1;
        self.checkpointed += 1;
        match decided {
            Some(DecisionKind::NewApplication) => self.applications_recorded += 1,
            Some(DecisionKind::StatusUpdate) => self.statuses_updated += 1,
            Some(DecisionKind::Irrelevant) | None => {}
        }
    }

    pub fn record_failure(&mut self) {
        self.scanned += 1;
        self.failed += 1;
    }
}
