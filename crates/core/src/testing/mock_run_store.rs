//! Mock run store for testing.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::run::{NewRun, Run, RunStatus, RunStore, RunStoreError};

/// Mock implementation of the RunStore trait.
///
/// Mints `run-N` ids, enforces monotonic status transitions like a real
/// backend would, and records every transition for assertions.
#[derive(Default)]
pub struct MockRunStore {
    runs: Arc<RwLock<Vec<Run>>>,
    counter: Arc<RwLock<u32>>,
    transitions: Arc<RwLock<Vec<(String, RunStatus)>>>,
    next_error: Arc<RwLock<Option<RunStoreError>>>,
}

impl MockRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All runs created so far, in creation order.
    pub async fn runs(&self) -> Vec<Run> {
        self.runs.read().await.clone()
    }

    /// One run by id.
    pub async fn run(&self, run_id: &str) -> Option<Run> {
        self.runs
            .read()
            .await
            .iter()
            .find(|run| run.id == run_id)
            .cloned()
    }

    /// Every status transition applied, in order.
    pub async fn transitions(&self) -> Vec<(String, RunStatus)> {
        self.transitions.read().await.clone()
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: RunStoreError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl RunStore for MockRunStore {
    async fn create(&self, new_run: NewRun) -> Result<Run, RunStoreError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let id = {
            let mut counter = self.counter.write().await;
            *counter += 1;
            format!("run-{}", *counter)
        };

        let run = Run {
            id,
            template_id: new_run.template_id,
            template_kind: new_run.template_kind,
            platform: new_run.platform,
            run_name: new_run.run_name,
            payload: new_run.payload,
            status: RunStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        };
        self.runs.write().await.push(run.clone());
        Ok(run)
    }

    async fn set_status(
        &self,
        run_id: &str,
        status: RunStatus,
        started_at: Option<DateTime<Utc>>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), RunStoreError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let mut runs = self.runs.write().await;
        let run = runs
            .iter_mut()
            .find(|run| run.id == run_id)
            .ok_or_else(|| RunStoreError::NotFound(run_id.to_string()))?;

        if !run.status.can_transition_to(status) {
            return Err(RunStoreError::InvalidTransition {
                run_id: run_id.to_string(),
                from: run.status,
                to: status,
            });
        }

        run.status = status;
        if started_at.is_some() {
            run.started_at = started_at;
        }
        if completed_at.is_some() {
            run.completed_at = completed_at;
        }
        self.transitions
            .write()
            .await
            .push((run_id.to_string(), status));
        Ok(())
    }
}
