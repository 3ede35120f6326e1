//! Checkpoint contract.
//!
//! Callers only ever ask for a checkpoint to be taken now; how it is
//! persisted and retried is up to the implementation.

use std::sync::RwLock;
use std::time::SystemTime;

use log::info;

/// A component that can take a checkpoint on demand.
pub trait Checkpoint: Send + Sync {
    /// Take a checkpoint now.
    fn do_checkpoint(&self);
}

/// Checkpointer that records when checkpoints were requested and nothing else.
#[derive(Debug, Default)]
pub struct SimpleCheckpoint {
    state: RwLock<CheckpointState>,
}

#[derive(Debug, Default)]
struct CheckpointState {
    /// Number of checkpoints taken so far.
    checkpoints_taken: u64,
    last_checkpoint_at: Option<SystemTime>,
}

impl SimpleCheckpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn checkpoints_taken(&self) -> u64 {
        self.state
            .read()
            .map(|state| state.checkpoints_taken)
            .unwrap_or_else(|poisoned| poisoned.into_inner().checkpoints_taken)
    }

    pub fn last_checkpoint_at(&self) -> Option<SystemTime> {
        self.state
            .read()
            .map(|state| state.last_checkpoint_at)
            .unwrap_or_else(|poisoned| poisoned.into_inner().last_checkpoint_at)
    }
}

impl Checkpoint for SimpleCheckpoint {
    fn do_checkpoint(&self) {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state.checkpoints_taken += 1;
        state.last_checkpoint_at = Some(SystemTime::now());
        info!("checkpoint #{} taken", state.checkpoints_taken);
    }
}
