//! Mock credential store for testing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::credentials::{CredentialStore, LlmCredentials};

/// Mock implementation of the CredentialStore trait.
///
/// Credentials are keyed by provider and apply to every run. An empty store
/// simulates credentials that are never provisioned.
#[derive(Default)]
pub struct MockCredentialStore {
    credentials: Arc<RwLock<HashMap<String, LlmCredentials>>>,
    requests: Arc<RwLock<Vec<(String, String)>>>,
}

impl MockCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make credentials available for a provider.
    pub async fn provision(&self, provider: &str, credentials: LlmCredentials) {
        self.credentials
            .write()
            .await
            .insert(provider.to_string(), credentials);
    }

    /// Recorded (run_id, provider) lookups.
    pub async fn requests(&self) -> Vec<(String, String)> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn load(&self, run_id: &str, provider: &str) -> Option<LlmCredentials> {
        self.requests
            .write()
            .await
            .push((run_id.to_string(), provider.to_string()));
        self.credentials.read().await.get(provider).cloned()
    }
}
