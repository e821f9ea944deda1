//! Mock template registry for testing.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::settings::SettingsRecord;
use crate::template::{TemplateError, TemplateRegistry};

use super::MockSettingsStore;

/// Mock implementation of the TemplateRegistry trait.
///
/// By default every id exists. `set_existing` narrows the set to simulate
/// deleted templates. When linked to a [`MockSettingsStore`], block and
/// unblock mutate `blocked_template_ids` on the shared record, mirroring the
/// real backend where both operate on the same row.
#[derive(Default)]
pub struct MockTemplateRegistry {
    existing: Arc<RwLock<Option<HashSet<String>>>>,
    blocked: Arc<RwLock<HashSet<String>>>,
    block_calls: Arc<RwLock<Vec<String>>>,
    unblock_calls: Arc<RwLock<Vec<String>>>,
    next_error: Arc<RwLock<Option<TemplateError>>>,
    settings_record: Option<Arc<RwLock<Option<SettingsRecord>>>>,
}

impl MockTemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link block/unblock to the settings store's record.
    pub fn linked(settings: &MockSettingsStore) -> Self {
        Self {
            settings_record: Some(settings.shared_record()),
            ..Self::default()
        }
    }

    /// Restrict existence to exactly these ids.
    pub async fn set_existing(&self, ids: &[&str]) {
        *self.existing.write().await = Some(ids.iter().map(|id| id.to_string()).collect());
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: TemplateError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn blocked(&self) -> HashSet<String> {
        self.blocked.read().await.clone()
    }

    pub async fn block_calls(&self) -> Vec<String> {
        self.block_calls.read().await.clone()
    }

    pub async fn unblock_calls(&self) -> Vec<String> {
        self.unblock_calls.read().await.clone()
    }

    async fn sync_record(&self) {
        if let Some(record) = &self.settings_record {
            if let Some(record) = record.write().await.as_mut() {
                let blocked = self.blocked.read().await;
                record.blocked_template_ids = blocked.iter().cloned().collect();
            }
        }
    }
}

#[async_trait]
impl TemplateRegistry for MockTemplateRegistry {
    async fn list_existing(&self, ids: &[String]) -> Result<Vec<String>, TemplateError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        match self.existing.read().await.as_ref() {
            Some(existing) => Ok(ids
                .iter()
                .filter(|id| existing.contains(*id))
                .cloned()
                .collect()),
            None => Ok(ids.to_vec()),
        }
    }

    async fn block(&self, template_id: &str) -> Result<(), TemplateError> {
        self.block_calls.write().await.push(template_id.to_string());
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        self.blocked.write().await.insert(template_id.to_string());
        self.sync_record().await;
        Ok(())
    }

    async fn unblock(&self, template_id: &str) -> Result<(), TemplateError> {
        self.unblock_calls
            .write()
            .await
            .push(template_id.to_string());
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        self.blocked.write().await.remove(template_id);
        self.sync_record().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_existence_filter_preserves_order() {
        let registry = MockTemplateRegistry::new();
        registry.set_existing(&["a", "c"]).await;

        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let existing = registry.list_existing(&ids).await.unwrap();
        assert_eq!(existing, vec!["a".to_string(), "c".to_string()]);
    }

    #[tokio::test]
    async fn test_linked_block_updates_settings_record() {
        let settings = MockSettingsStore::with_record(fixtures::settings_record(&["t-1", "t-2"]));
        let registry = MockTemplateRegistry::linked(&settings);

        registry.block("t-1").await.unwrap();
        let record = settings.record().await.unwrap();
        assert_eq!(record.blocked_template_ids, vec!["t-1".to_string()]);

        registry.unblock("t-1").await.unwrap();
        let record = settings.record().await.unwrap();
        assert!(record.blocked_template_ids.is_empty());
    }
}
