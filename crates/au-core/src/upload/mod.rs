//! Upload state machine
//!
//! Tracks one upload through the protocol:
//!
//! ```text
//! Idle ──BatchOpened──▶ BatchOpen ──ChunkUploaded──▶ ChunksUploading(i of N)
//!                           │                              │
//!                           └──CommitStarted (N = 0)       └──CommitStarted (i = N)
//!                                      ▼                          ▼
//!                                  Committing ──Committed──▶ Done
//!
//! any non-terminal state ──Failed──▶ Failed
//! ```
//!
//! `Done` and `Failed` are terminal. A failed upload is restarted from a fresh
//! machine and a fresh batch.

use thiserror::Error;

use crate::ids::BatchId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    BatchOpen {
        batch: BatchId,
        total_chunks: usize,
    },
    ChunksUploading {
        batch: BatchId,
        completed: usize,
        total_chunks: usize,
    },
    Committing {
        batch: BatchId,
    },
    Done,
    Failed {
        reason: String,
    },
}

impl UploadState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadState::Done | UploadState::Failed { .. })
    }

    /// Batch held by the upload, if it has one that is not committed yet.
    pub fn open_batch(&self) -> Option<BatchId> {
        match self {
            UploadState::BatchOpen { batch, .. }
            | UploadState::ChunksUploading { batch, .. }
            | UploadState::Committing { batch } => Some(*batch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    BatchOpened { batch: BatchId, total_chunks: usize },
    ChunkUploaded,
    CommitStarted,
    Committed,
    Failed { reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid upload transition from {from:?} on {event:?}")]
pub struct InvalidUploadTransition {
    pub from: UploadState,
    pub event: UploadEvent,
}

#[derive(Debug, Clone)]
pub struct UploadStateMachine {
    state: UploadState,
}

impl Default for UploadStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadStateMachine {
    pub fn new() -> Self {
        Self {
            state: UploadState::Idle,
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// Apply an event. On an invalid transition the state is left unchanged.
    pub fn handle_event(
        &mut self,
        event: UploadEvent,
    ) -> Result<&UploadState, InvalidUploadTransition> {
        let next = match (&self.state, &event) {
            (UploadState::Idle, UploadEvent::BatchOpened { batch, total_chunks }) => {
                Some(UploadState::BatchOpen {
                    batch: *batch,
                    total_chunks: *total_chunks,
                })
            }
            (UploadState::BatchOpen { batch, total_chunks }, UploadEvent::ChunkUploaded)
                if *total_chunks > 0 =>
            {
                Some(UploadState::ChunksUploading {
                    batch: *batch,
                    completed: 1,
                    total_chunks: *total_chunks,
                })
            }
            (
                UploadState::ChunksUploading {
                    batch,
                    completed,
                    total_chunks,
                },
                UploadEvent::ChunkUploaded,
            ) if completed < total_chunks => Some(UploadState::ChunksUploading {
                batch: *batch,
                completed: completed + 1,
                total_chunks: *total_chunks,
            }),
            (
                UploadState::BatchOpen {
                    batch,
                    total_chunks: 0,
                },
                UploadEvent::CommitStarted,
            ) => Some(UploadState::Committing { batch: *batch }),
            (
                UploadState::ChunksUploading {
                    batch,
                    completed,
                    total_chunks,
                },
                UploadEvent::CommitStarted,
            ) if completed == total_chunks => Some(UploadState::Committing { batch: *batch }),
            (UploadState::Committing { .. }, UploadEvent::Committed) => Some(UploadState::Done),
            (state, UploadEvent::Failed { reason }) if !state.is_terminal() => {
                Some(UploadState::Failed {
                    reason: reason.clone(),
                })
            }
            _ => None,
        };

        match next {
            Some(state) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(from = ?self.state, to = ?state, "upload state transition");
                self.state = state;
                Ok(&self.state)
            }
            None => Err(InvalidUploadTransition {
                from: self.state.clone(),
                event,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opened(machine: &mut UploadStateMachine, total_chunks: usize) {
        machine
            .handle_event(UploadEvent::BatchOpened {
                batch: BatchId::new(1),
                total_chunks,
            })
            .unwrap();
    }

    #[test]
    fn test_happy_path_reaches_done() {
        let mut machine = UploadStateMachine::new();
        opened(&mut machine, 2);
        machine.handle_event(UploadEvent::ChunkUploaded).unwrap();
        let state = machine.handle_event(UploadEvent::ChunkUploaded).unwrap();
        assert_eq!(
            state,
            &UploadState::ChunksUploading {
                batch: BatchId::new(1),
                completed: 2,
                total_chunks: 2
            }
        );
        machine.handle_event(UploadEvent::CommitStarted).unwrap();
        machine.handle_event(UploadEvent::Committed).unwrap();
        assert_eq!(machine.state(), &UploadState::Done);
        assert!(machine.state().is_terminal());
    }

    #[test]
    fn test_zero_chunk_upload_commits_straight_from_batch_open() {
        let mut machine = UploadStateMachine::new();
        opened(&mut machine, 0);
        assert!(machine.handle_event(UploadEvent::ChunkUploaded).is_err());
        machine.handle_event(UploadEvent::CommitStarted).unwrap();
        machine.handle_event(UploadEvent::Committed).unwrap();
        assert_eq!(machine.state(), &UploadState::Done);
    }

    #[test]
    fn test_commit_before_all_chunks_is_rejected() {
        let mut machine = UploadStateMachine::new();
        opened(&mut machine, 3);
        machine.handle_event(UploadEvent::ChunkUploaded).unwrap();
        let err = machine.handle_event(UploadEvent::CommitStarted).unwrap_err();
        assert_eq!(err.event, UploadEvent::CommitStarted);
        assert_eq!(machine.state().open_batch(), Some(BatchId::new(1)));
    }

    #[test]
    fn test_failed_is_terminal() {
        let mut machine = UploadStateMachine::new();
        opened(&mut machine, 1);
        machine
            .handle_event(UploadEvent::Failed {
                reason: "boom".to_string(),
            })
            .unwrap();
        assert_eq!(machine.state().open_batch(), None);
        assert!(machine.handle_event(UploadEvent::ChunkUploaded).is_err());
        assert!(machine
            .handle_event(UploadEvent::Failed {
                reason: "again".to_string()
            })
            .is_err());
    }

    #[test]
    fn test_idle_can_fail_before_a_batch_exists() {
        let mut machine = UploadStateMachine::new();
        let state = machine
            .handle_event(UploadEvent::Failed {
                reason: "open failed".to_string(),
            })
            .unwrap();
        assert_eq!(
            state,
            &UploadState::Failed {
                reason: "open failed".to_string()
            }
        );
    }
}
