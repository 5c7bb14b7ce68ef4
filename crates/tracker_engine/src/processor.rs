use std::sync::Arc;

use tracker_core::{
    update, DecisionKind, LabelNames, ThreadEffect, ThreadLabel, ThreadMsg, ThreadState,
};
use tracker_logging::{enter_thread_scope, tracker_debug, tracker_info};

use crate::classifier::Classifier;
use crate::ledger::{LedgerError, LedgerSync};
use crate::mailbox::MessageStore;
use crate::{MailMessage, MailThread, StoreError, ThreadId};

/// Unrecovered failure while handling one thread. The thread is left without
/// its checkpoint label so the next run picks it up again.
#[derive(Debug, thiserror::Error)]
pub enum ThreadError {
    #[error("message store: {0}")]
    Store(#[from] StoreError),
    #[error("ledger: {0}")]
    Ledger(#[from] LedgerError),
    /// The processed label was written but a later effect failed. The thread
    /// has already left the unseen set and will not be retried.
    #[error("{source} (after checkpoint)")]
    AfterCheckpoint {
        decided: Option<DecisionKind>,
        source: Box<ThreadError>,
    },
}

impl ThreadError {
    pub fn is_checkpointed(&self) -> bool {
        matches!(self, ThreadError::AfterCheckpoint { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadReport {
    pub thread_id: ThreadId,
    pub decided: Option<DecisionKind>,
    pub messages_classified: usize,
}

pub struct ThreadProcessor {
    store: Arc<dyn MessageStore>,
    classifier: Classifier,
    ledger: LedgerSync,
    labels: LabelNames,
}

impl ThreadProcessor {
    pub fn new(
        store: Arc<dyn MessageStore>,
        classifier: Classifier,
        ledger: LedgerSync,
        labels: LabelNames,
    ) -> Self {
        Self {
            store,
            classifier,
            ledger,
            labels,
        }
    }

    /// Classifies messages oldest-first until one is decisive, dispatches that
    /// decision to the ledger, then checkpoints the thread.
    ///
    /// A collaborator error before the processed label is written leaves the
    /// thread for the next run; if it happens after a ledger mutation, the
    /// rerun repeats that mutation. An error after the label is written comes
    /// back as [`ThreadError::AfterCheckpoint`].
    pub async fn process(&self, thread: &MailThread) -> Result<ThreadReport, ThreadError> {
        let _scope = enter_thread_scope(thread.id.as_str());

        let mut messages: Vec<&MailMessage> = thread.messages.iter().collect();
        messages.sort_by_key(|m| m.date);

        let mut state = ThreadState::new();
        for message in &messages {
            if !state.is_scanning() {
                break;
            }
            let body = message.plain_text();
            let decision = self.classifier.classify(&message.subject, &body).await;
            tracker_debug!("message {} -> {:?}", message.id, decision.kind());

            let (next, effects) = update(
                state,
                ThreadMsg::Classified {
                    decision,
                    received: message.date,
                },
            );
            state = next;
            self.apply(thread, &messages, effects)
                .await
                .map_err(EffectError::into_inner)?;
        }

        if state.is_scanning() {
            let (next, _) = update(state, ThreadMsg::MessagesExhausted);
            state = next;
        }
        let decided = state.decided();
        let messages_classified = state.messages_classified();

        let (_state, effects) = update(state, ThreadMsg::Finalize);
        self.apply(thread, &messages, effects)
            .await
            .map_err(|err| match err {
                EffectError::Before(err) => err,
                EffectError::After(err) => ThreadError::AfterCheckpoint {
                    decided,
                    source: Box::new(err),
                },
            })?;

        tracker_info!(
            "checkpointed after {} message(s), decision {:?}",
            messages_classified,
            decided
        );
        Ok(ThreadReport {
            thread_id: thread.id.clone(),
            decided,
            messages_classified,
        })
    }

    /// Executes effects in order. Errors report whether the processed label
    /// had already been written.
    async fn apply(
        &self,
        thread: &MailThread,
        chronological: &[&MailMessage],
        effects: Vec<ThreadEffect>,
    ) -> Result<(), EffectError> {
        let mut checkpointed = false;
        for effect in effects {
            let marks_checkpoint =
                matches!(effect, ThreadEffect::AddLabel(ThreadLabel::Processed));
            if let Err(err) = self.apply_one(thread, chronological, effect).await {
                return Err(if checkpointed {
                    EffectError::After(err)
                } else {
                    EffectError::Before(err)
                });
            }
            checkpointed |= marks_checkpoint;
        }
        Ok(())
    }

    async fn apply_one(
        &self,
        thread: &MailThread,
        chronological: &[&MailMessage],
        effect: ThreadEffect,
    ) -> Result<(), ThreadError> {
        match effect {
            ThreadEffect::RecordApplication {
                company_name,
                job_title,
                application_url,
                received,
            } => {
                self.ledger
                    .record_new_application(&company_name, &job_title, &application_url, received)
                    .await?;
            }
            ThreadEffect::UpdateStatus {
                company_name,
                job_title,
                status,
            } => {
                self.ledger
                    .update_status(&company_name, &job_title, status)
                    .await?;
            }
            ThreadEffect::AddLabel(label) => {
                let name = label.name(&self.labels);
                self.store.ensure_label(name).await?;
                self.store.add_label(&thread.id, name).await?;
            }
            ThreadEffect::MarkOldestRead => match chronological.first() {
                Some(oldest) => self.store.mark_read(&oldest.id).await?,
                None => tracker_debug!("thread has no messages to mark read"),
            },
        }
        Ok(())
    }
}

enum EffectError {
    Before(ThreadError),
    After(ThreadError),
}

impl EffectError {
    fn into_inner(self) -> ThreadError {
        match self {
            EffectError::Before(err) | EffectError::After(err) => err,
        }
    }
}
