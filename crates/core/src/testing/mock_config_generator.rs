//! Mock config generator for testing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::generator::{ConfigGenerator, GenerateConfigRequest, GeneratedConfig, GeneratorError};

/// Mock implementation of the ConfigGenerator trait.
///
/// Responses are scripted per template id; an unscripted id fails, as does
/// any id marked with `script_failure`. Every request is recorded for
/// assertions.
#[derive(Default)]
pub struct MockConfigGenerator {
    responses: Arc<RwLock<HashMap<String, GeneratedConfig>>>,
    failures: Arc<RwLock<HashSet<String>>>,
    requests: Arc<RwLock<Vec<GenerateConfigRequest>>>,
}

impl MockConfigGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful response for a template id.
    pub async fn script_response(&self, template_id: &str, generated: GeneratedConfig) {
        self.responses
            .write()
            .await
            .insert(template_id.to_string(), generated);
    }

    /// Make generation fail for a template id.
    pub async fn script_failure(&self, template_id: &str) {
        self.failures.write().await.insert(template_id.to_string());
    }

    /// All generation requests seen so far.
    pub async fn requests(&self) -> Vec<GenerateConfigRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl ConfigGenerator for MockConfigGenerator {
    async fn generate(
        &self,
        request: &GenerateConfigRequest,
    ) -> Result<GeneratedConfig, GeneratorError> {
        self.requests.write().await.push(request.clone());

        if self.failures.read().await.contains(&request.template_id) {
            return Err(GeneratorError::Backend(format!(
                "scripted failure for {}",
                request.template_id
            )));
        }

        self.responses
            .read()
            .await
            .get(&request.template_id)
            .cloned()
            .ok_or_else(|| {
                GeneratorError::Backend(format!(
                    "no scripted response for {}",
                    request.template_id
                ))
            })
    }
}
