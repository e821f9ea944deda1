//! Service-gateway backed template registry.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, warn};

use crate::config::GatewayConfig;

use super::{TemplateError, TemplateRegistry};

#[derive(Debug, Deserialize)]
struct TemplateSummary {
    id: String,
}

/// Template registry backed by the service gateway HTTP API.
pub struct GatewayTemplateRegistry {
    client: Client,
    config: GatewayConfig,
}

impl GatewayTemplateRegistry {
    pub fn new(config: GatewayConfig) -> Result<Self, TemplateError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TemplateError::Backend(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn post_template_action(
        &self,
        action: &str,
        template_id: &str,
    ) -> Result<(), TemplateError> {
        let url = self.url(&format!("api/infinite-runs/{action}"));
        let response = self
            .authorize(self.client.post(&url))
            .json(&json!({ "agent_run_template_id": template_id }))
            .send()
            .await
            .map_err(|e| TemplateError::Backend(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TemplateError::Backend(format!(
                "{action} for {template_id} returned {status}: {body}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TemplateRegistry for GatewayTemplateRegistry {
    /// Existence check is fail-open: if the gateway cannot be reached, the
    /// input ids are returned unchanged and later steps fail per-template
    /// instead of wiping the whole cycle.
    async fn list_existing(&self, ids: &[String]) -> Result<Vec<String>, TemplateError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.url("api/agent-run-templates/");
        let response = match self.authorize(self.client.get(&url)).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to fetch templates from gateway: {e}");
                return Ok(ids.to_vec());
            }
        };

        if !response.status().is_success() {
            error!(
                "Template listing returned {}, keeping unvalidated ids",
                response.status()
            );
            return Ok(ids.to_vec());
        }

        let templates: Vec<TemplateSummary> = match response.json().await {
            Ok(templates) => templates,
            Err(e) => {
                warn!("Unexpected template listing payload: {e}");
                return Ok(ids.to_vec());
            }
        };
        debug!("Fetched {} templates from gateway", templates.len());

        let existing: HashSet<String> = templates.into_iter().map(|t| t.id).collect();
        Ok(ids
            .iter()
            .filter(|id| {
                let found = existing.contains(*id);
                if !found {
                    warn!("Template {id} not found in registry (deleted?), skipping");
                }
                found
            })
            .cloned()
            .collect())
    }

    async fn block(&self, template_id: &str) -> Result<(), TemplateError> {
        self.post_template_action("block-template", template_id)
            .await
    }

    async fn unblock(&self, template_id: &str) -> Result<(), TemplateError> {
        self.post_template_action("unblock-template", template_id)
            .await
    }
}
