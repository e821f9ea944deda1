//! Application configuration types.

use serde::{Deserialize, Serialize};

use crate::orchestrator::ManagerConfig;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HuntConfig {
    /// Hunt manager tunables.
    #[serde(default)]
    pub manager: ManagerConfig,

    /// Service gateway connection. Absent when every backend is wired in
    /// directly (tests, embedded use).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<GatewayConfig>,
}

/// Connection settings for the service gateway the remote-backed stores
/// talk to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL, e.g. "http://localhost:8000".
    pub base_url: String,

    /// Bearer token, if the gateway requires one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_defaults() {
        let toml = r#"base_url = "http://localhost:8000""#;
        let config: GatewayConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config: HuntConfig = toml::from_str("").unwrap();
        assert!(config.gateway.is_none());
        assert_eq!(config.manager.poll_interval_ms, 15_000);
    }
}
