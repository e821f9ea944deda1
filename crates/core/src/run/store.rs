//! Run persistence trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::platform::Platform;

use super::{Run, RunStatus};

/// Error type for run persistence.
#[derive(Debug, Error)]
pub enum RunStoreError {
    #[error("run not found: {0}")]
    NotFound(String),

    /// A status write that would violate monotonicity.
    #[error("invalid run status transition for {run_id}: {from} -> {to}")]
    InvalidTransition {
        run_id: String,
        from: RunStatus,
        to: RunStatus,
    },

    #[error("run backend error: {0}")]
    Backend(String),
}

/// Request to create a run record.
#[derive(Debug, Clone)]
pub struct NewRun {
    pub template_id: String,
    pub template_kind: String,
    pub platform: Platform,
    pub run_name: String,
    pub payload: Value,
}

/// Trait for the run record backend.
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Persist a new run in `pending` state and return it with its id.
    async fn create(&self, new_run: NewRun) -> Result<Run, RunStoreError>;

    /// Move a run to a new status, optionally stamping start/completion
    /// times. Implementations must reject non-monotonic transitions.
    async fn set_status(
        &self,
        run_id: &str,
        status: RunStatus,
        started_at: Option<DateTime<Utc>>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), RunStoreError>;
}
