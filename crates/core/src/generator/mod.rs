//! Config generation seam.
//!
//! Turns a template id plus the user's free-text instructions into a
//! concrete bot configuration. The generation backend is an opaque,
//! possibly-failing call; a failure skips the template for the cycle.

mod gateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use gateway::GatewayConfigGenerator;

/// Fallback prompt used when the user left the instructions empty.
pub const DEFAULT_INSTRUCTIONS: &str =
    "Find high-signal roles that match the user's resume and preferences.";

/// Error type for config generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The generation backend rejected the request or was unreachable.
    #[error("config generation backend error: {0}")]
    Backend(String),

    /// The backend responded but the payload was unusable.
    #[error("unusable generated config: {0}")]
    UnusableResponse(String),
}

/// Request for one template's generated configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConfigRequest {
    pub instructions: String,
    #[serde(rename = "agent_run_template_id")]
    pub template_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ats_template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_ats_optimized: Option<bool>,
}

impl GenerateConfigRequest {
    /// Build a request, substituting the default prompt for blank
    /// instructions.
    pub fn new(instructions: &str, template_id: impl Into<String>) -> Self {
        let instructions = if instructions.trim().is_empty() {
            DEFAULT_INSTRUCTIONS.to_string()
        } else {
            instructions.to_string()
        };
        Self {
            instructions,
            template_id: template_id.into(),
            session_id: None,
            resume_id: None,
            ats_template_id: None,
            use_ats_optimized: None,
        }
    }
}

/// A generated bot configuration for one template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedConfig {
    /// Template kind the config targets (e.g. "indeed-search").
    pub template_kind: String,
    /// Platform-shaped configuration object.
    pub config: Value,
    /// Optional model reasoning, surfaced on the run for traceability.
    pub reasoning: Option<String>,
}

/// Trait for the config generation backend.
#[async_trait]
pub trait ConfigGenerator: Send + Sync {
    async fn generate(
        &self,
        request: &GenerateConfigRequest,
    ) -> Result<GeneratedConfig, GeneratorError>;
}
