//! LLM credential seam for autonomous runs.
//!
//! Credentials are provisioned out-of-band (the desktop app writes them
//! after the run record exists), so the orchestrator polls for them with a
//! bounded, interruptible wait before launching an autonomous bot.

use async_trait::async_trait;

/// Credentials for one LLM provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmCredentials {
    pub api_key: String,
    /// Provider model override, if stored alongside the key.
    pub model: Option<String>,
    /// Endpoint override (Azure deployments).
    pub endpoint: Option<String>,
}

/// Source of provisioned LLM credentials, keyed by run and provider.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns credentials once they have been provisioned for this run.
    async fn load(&self, run_id: &str, provider: &str) -> Option<LlmCredentials>;
}
