//! Mock settings store for testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::settings::{SettingsError, SettingsRecord, SettingsStore, SettingsUpdate};

/// Mock implementation of the SettingsStore trait.
///
/// Holds one record in memory, applies partial updates to it, and records
/// every update for assertions. `shared_record` exposes the underlying slot
/// so other mocks (the template registry) can mutate the same row, the way
/// the real backend does.
#[derive(Default)]
pub struct MockSettingsStore {
    record: Arc<RwLock<Option<SettingsRecord>>>,
    updates: Arc<RwLock<Vec<SettingsUpdate>>>,
    next_error: Arc<RwLock<Option<SettingsError>>>,
}

impl MockSettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: SettingsRecord) -> Self {
        Self {
            record: Arc::new(RwLock::new(Some(record))),
            ..Self::new()
        }
    }

    /// Shared handle to the record slot.
    pub fn shared_record(&self) -> Arc<RwLock<Option<SettingsRecord>>> {
        Arc::clone(&self.record)
    }

    pub async fn set_record(&self, record: SettingsRecord) {
        *self.record.write().await = Some(record);
    }

    pub async fn clear_record(&self) {
        *self.record.write().await = None;
    }

    /// Mutate the stored record in place.
    pub async fn modify_record(&self, f: impl FnOnce(&mut SettingsRecord)) {
        if let Some(record) = self.record.write().await.as_mut() {
            f(record);
        }
    }

    /// Current record, if any.
    pub async fn record(&self) -> Option<SettingsRecord> {
        self.record.read().await.clone()
    }

    /// All updates applied so far, in order.
    pub async fn updates(&self) -> Vec<SettingsUpdate> {
        self.updates.read().await.clone()
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: SettingsError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl SettingsStore for MockSettingsStore {
    async fn get(&self) -> Result<Option<SettingsRecord>, SettingsError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        Ok(self.record.read().await.clone())
    }

    async fn update(&self, update: SettingsUpdate) -> Result<(), SettingsError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        if let Some(record) = self.record.write().await.as_mut() {
            if let Some(status) = update.status {
                record.status = status;
            }
            if let Some(session_id) = &update.session_id {
                record.session_id = Some(session_id.clone());
            }
            if let Some(last_run_id) = &update.last_run_id {
                record.last_run_id = Some(last_run_id.clone());
            }
        }

        self.updates.write().await.push(update);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::HuntStatus;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_partial_update_leaves_other_fields() {
        let store = MockSettingsStore::new();
        store.set_record(fixtures::settings_record(&["t-1"])).await;

        store
            .update(SettingsUpdate::new().with_last_run_id("run-7"))
            .await
            .unwrap();

        let record = store.record().await.unwrap();
        assert_eq!(record.last_run_id.as_deref(), Some("run-7"));
        assert_eq!(record.status, HuntStatus::Running);
        assert_eq!(store.updates().await.len(), 1);
    }
}
