use crate::{ClassificationDecision, ThreadEffect, ThreadLabel, ThreadMsg, ThreadPhase, ThreadState};

/// Pure update function: applies a message to a thread's state and returns the
/// effects the caller must execute, in order.
///
/// Only the first decisive classification produces effects; anything arriving
/// after the scan ended is ignored, so a thread yields at most one ledger
/// mutation per run.
pub fn update(mut state: ThreadState, msg: ThreadMsg) -> (ThreadState, Vec<ThreadEffect>) {
    let effects = match (state.phase(), msg) {
        (ThreadPhase::Scanning, ThreadMsg::Classified { decision, received }) => {
            state.count_classified();
            let kind = decision.kind();
            match decision {
                ClassificationDecision::Irrelevant => Vec::new(),
                ClassificationDecision::NewApplication {
                    company_name,
                    job_title,
                    application_url,
                } => {
                    state.set_phase(ThreadPhase::Decided(kind));
                    vec![
                        ThreadEffect::RecordApplication {
                            company_name,
                            job_title,
                            application_url,
                            received,
                        },
                        ThreadEffect::AddLabel(ThreadLabel::Postings),
                    ]
                }
                ClassificationDecision::StatusUpdate {
                    company_name,
                    job_title,
                    status,
                } => {
                    state.set_phase(ThreadPhase::Decided(kind));
                    vec![
                        ThreadEffect::UpdateStatus {
                            company_name,
                            job_title,
                            status,
                        },
                        ThreadEffect::AddLabel(ThreadLabel::Updates),
                    ]
                }
            }
        }
        (ThreadPhase::Scanning, ThreadMsg::MessagesExhausted) => {
            state.set_phase(ThreadPhase::Exhausted);
            Vec::new()
        }
        (ThreadPhase::Decided(_) | ThreadPhase::Exhausted, ThreadMsg::Finalize) => {
            state.set_phase(ThreadPhase::Checkpointed);
            vec![
                ThreadEffect::AddLabel(ThreadLabel::Processed),
                ThreadEffect::MarkOldestRead,
            ]
        }
        _ => Vec::new(),
    };

    (state, effects)
}
