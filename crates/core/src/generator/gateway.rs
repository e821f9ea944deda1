//! Service-gateway backed config generator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::GatewayConfig;

use super::{ConfigGenerator, GenerateConfigRequest, GeneratedConfig, GeneratorError};

/// Config generator backed by the service gateway's generate-config API.
///
/// The gateway responds with configs keyed by template id:
/// `{"workflow_configs": {"<template-id>": {"config": {...}, "thinking": "..."}}}`.
/// Older gateway versions return the bare config object instead of the
/// config/thinking wrapper; both forms are accepted.
pub struct GatewayConfigGenerator {
    client: Client,
    config: GatewayConfig,
}

impl GatewayConfigGenerator {
    pub fn new(config: GatewayConfig) -> Result<Self, GeneratorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GeneratorError::Backend(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn unwrap_config_entry(entry: Value) -> (Value, Option<String>) {
        match entry {
            Value::Object(ref map) if map.contains_key("config") => {
                let reasoning = map
                    .get("thinking")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string);
                let config = map.get("config").cloned().unwrap_or(Value::Null);
                (config, reasoning)
            }
            other => (other, None),
        }
    }
}

#[async_trait]
impl ConfigGenerator for GatewayConfigGenerator {
    async fn generate(
        &self,
        request: &GenerateConfigRequest,
    ) -> Result<GeneratedConfig, GeneratorError> {
        let url = format!(
            "{}/api/infinite-runs/generate-config",
            self.config.base_url.trim_end_matches('/')
        );

        let mut http_request = self.client.post(&url).json(request);
        if let Some(token) = &self.config.auth_token {
            http_request = http_request.bearer_auth(token);
        } else {
            warn!("No auth token configured for config generation");
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| GeneratorError::Backend(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeneratorError::Backend(format!(
                "generate-config returned {status}: {body}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| GeneratorError::UnusableResponse(e.to_string()))?;

        let configs: &Map<String, Value> = body
            .get("workflow_configs")
            .and_then(Value::as_object)
            .filter(|map| !map.is_empty())
            .ok_or_else(|| {
                GeneratorError::UnusableResponse("missing or empty workflow_configs".to_string())
            })?;

        // The gateway keys by template id; fall back to the first entry on
        // key mismatch.
        let entry = configs
            .get(&request.template_id)
            .or_else(|| configs.values().next())
            .cloned()
            .ok_or_else(|| {
                GeneratorError::UnusableResponse("no config entry in response".to_string())
            })?;

        let (config, reasoning) = Self::unwrap_config_entry(entry);
        if !config.is_object() {
            return Err(GeneratorError::UnusableResponse(format!(
                "config for {} is not an object",
                request.template_id
            )));
        }

        let template_kind = config
            .get("workflow_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                GeneratorError::UnusableResponse("generated config lacks workflow_id".to_string())
            })?;

        if let Some(reasoning) = &reasoning {
            debug!("Config reasoning for {}: {reasoning}", request.template_id);
        }
        info!(
            "Generated {} config for template {}",
            template_kind, request.template_id
        );

        Ok(GeneratedConfig {
            template_kind,
            config,
            reasoning,
        })
    }
}
