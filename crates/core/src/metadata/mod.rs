//! Lifecycle event sink for observability surfaces.
//!
//! The sink receives hunt and run lifecycle events so UIs can render
//! progress without polling the database. It is never authoritative: the
//! orchestrator makes no control decision based on it, and every call is
//! fire-and-forget.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::platform::Platform;

/// Lifecycle event sink.
#[async_trait]
pub trait MetadataSink: Send + Sync {
    async fn hunt_started(&self, session_id: &str);
    async fn hunt_stopped(&self);
    async fn run_started(&self, run_id: &str, template_kind: &str, platform: Platform);
    async fn run_completed(&self, run_id: &str);
    async fn run_failed(&self, run_id: &str);
    /// A run that ended without finishing its pass (verification challenge
    /// or operator stop). Distinct from `run_failed`, mirroring the
    /// `stopped` run status.
    async fn run_stopped(&self, run_id: &str);
}

/// Sink that drops every event. Useful when no UI is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetadata;

#[async_trait]
impl MetadataSink for NoopMetadata {
    async fn hunt_started(&self, _session_id: &str) {}
    async fn hunt_stopped(&self) {}
    async fn run_started(&self, _run_id: &str, _template_kind: &str, _platform: Platform) {}
    async fn run_completed(&self, _run_id: &str) {}
    async fn run_failed(&self, _run_id: &str) {}
    async fn run_stopped(&self, _run_id: &str) {}
}

/// Metadata for the run currently in flight.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentRunMetadata {
    pub run_id: String,
    pub template_kind: String,
    pub platform: Platform,
    pub started_at: DateTime<Utc>,
}

/// Point-in-time view of the hunt session for UI reads.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HuntMetadataSnapshot {
    pub is_running: bool,
    pub session_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub runs_created: u64,
    pub runs_by_template: HashMap<String, u64>,
    pub current_run: Option<CurrentRunMetadata>,
    pub last_activity_at: Option<DateTime<Utc>>,
}

/// In-memory sink keeping a queryable snapshot of the session.
#[derive(Debug, Default)]
pub struct InMemoryMetadata {
    state: Arc<RwLock<HuntMetadataSnapshot>>,
}

impl InMemoryMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot, cloned so readers never hold the lock.
    pub async fn snapshot(&self) -> HuntMetadataSnapshot {
        self.state.read().await.clone()
    }
}

#[async_trait]
impl MetadataSink for InMemoryMetadata {
    async fn hunt_started(&self, session_id: &str) {
        let mut state = self.state.write().await;
        *state = HuntMetadataSnapshot {
            is_running: true,
            session_id: Some(session_id.to_string()),
            started_at: Some(Utc::now()),
            last_activity_at: Some(Utc::now()),
            ..Default::default()
        };
    }

    async fn hunt_stopped(&self) {
        let mut state = self.state.write().await;
        state.is_running = false;
        state.current_run = None;
        state.last_activity_at = Some(Utc::now());
    }

    async fn run_started(&self, run_id: &str, template_kind: &str, platform: Platform) {
        let mut state = self.state.write().await;
        state.runs_created += 1;
        *state
            .runs_by_template
            .entry(template_kind.to_string())
            .or_insert(0) += 1;
        state.current_run = Some(CurrentRunMetadata {
            run_id: run_id.to_string(),
            template_kind: template_kind.to_string(),
            platform,
            started_at: Utc::now(),
        });
        state.last_activity_at = Some(Utc::now());
    }

    async fn run_completed(&self, run_id: &str) {
        self.clear_current(run_id).await;
    }

    async fn run_failed(&self, run_id: &str) {
        self.clear_current(run_id).await;
    }

    async fn run_stopped(&self, run_id: &str) {
        self.clear_current(run_id).await;
    }
}

impl InMemoryMetadata {
    async fn clear_current(&self, run_id: &str) {
        let mut state = self.state.write().await;
        if state
            .current_run
            .as_ref()
            .is_some_and(|current| current.run_id == run_id)
        {
            state.current_run = None;
        }
        state.last_activity_at = Some(Utc::now());
    }
}
