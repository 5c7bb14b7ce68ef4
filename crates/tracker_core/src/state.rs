use crate::DecisionKind;

/// Where one thread is in its scan-decide-checkpoint lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThreadPhase {
    /// Messages are still being classified oldest-first.
    #[default]
    Scanning,
    /// A decisive message was found and dispatched; later messages are ignored.
    Decided(DecisionKind),
    /// Every message was irrelevant.
    Exhausted,
    /// The processed label and read marker have been requested.
    Checkpointed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThreadState {
    phase: ThreadPhase,
    messages_classified: usize,
}

impl ThreadState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ThreadPhase {
        self.phase
    }

    pub fn is_scanning(&self) -> bool {
        self.phase == ThreadPhase::Scanning
    }

    pub fn is_checkpointed(&self) -> bool {
        self.phase == ThreadPhase::Checkpointed
    }

    /// Kind of the decision that ended the scan, if any.
    pub fn decided(&self) -> Option<DecisionKind> {
        match self.phase {
            ThreadPhase::Decided(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn messages_classified(&self) -> usize {
        self.messages_classified
    }

    pub(crate) fn set_phase(&mut self, phase: ThreadPhase) {
        self.phase = phase;
    }

    pub(crate) fn count_classified(&mut self) {
        self.messages_classified += 1;
    }
}
