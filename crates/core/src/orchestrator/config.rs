//! Orchestrator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the hunt manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// How long the idle branch of the main loop sleeps between settings
    /// reads (milliseconds). Also the back-off after an unexpected cycle
    /// error.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Pause between templates within a cycle (milliseconds). Gives the
    /// settings backend time to observe status writes before the next
    /// launch.
    #[serde(default = "default_per_platform_delay")]
    pub per_platform_delay_ms: u64,

    /// Completion watcher poll interval (milliseconds).
    #[serde(default = "default_watcher_poll")]
    pub watcher_poll_interval_ms: u64,

    /// Grace delay before the watcher's first poll (milliseconds), so a
    /// freshly launched bot has a chance to flip its running flag.
    #[serde(default = "default_watcher_grace")]
    pub watcher_grace_delay_ms: u64,

    /// Interval for the watcher's progress log lines (seconds).
    #[serde(default = "default_progress_log")]
    pub watcher_progress_log_secs: u64,

    /// Bounded wait for LLM credentials before an autonomous launch
    /// (seconds).
    #[serde(default = "default_credentials_timeout")]
    pub credentials_wait_timeout_secs: u64,

    /// Poll interval while waiting for credentials (milliseconds).
    #[serde(default = "default_credentials_poll")]
    pub credentials_poll_interval_ms: u64,

    /// Upper bound on how long `stop()` waits for the worker to exit
    /// (milliseconds).
    #[serde(default = "default_stop_join_timeout")]
    pub stop_join_timeout_ms: u64,

    /// User id attached to launches when the settings record carries none.
    #[serde(default = "default_user_id")]
    pub default_user_id: String,
}

fn default_poll_interval() -> u64 {
    15_000
}

fn default_per_platform_delay() -> u64 {
    5_000
}

fn default_watcher_poll() -> u64 {
    2_000
}

fn default_watcher_grace() -> u64 {
    500
}

fn default_progress_log() -> u64 {
    30
}

fn default_credentials_timeout() -> u64 {
    120
}

fn default_credentials_poll() -> u64 {
    2_000
}

fn default_stop_join_timeout() -> u64 {
    5_000
}

fn default_user_id() -> String {
    "infinite_hunt_user".to_string()
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            per_platform_delay_ms: default_per_platform_delay(),
            watcher_poll_interval_ms: default_watcher_poll(),
            watcher_grace_delay_ms: default_watcher_grace(),
            watcher_progress_log_secs: default_progress_log(),
            credentials_wait_timeout_secs: default_credentials_timeout(),
            credentials_poll_interval_ms: default_credentials_poll(),
            stop_join_timeout_ms: default_stop_join_timeout(),
            default_user_id: default_user_id(),
        }
    }
}

impl ManagerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn per_platform_delay(&self) -> Duration {
        Duration::from_millis(self.per_platform_delay_ms)
    }

    pub fn watcher_poll_interval(&self) -> Duration {
        Duration::from_millis(self.watcher_poll_interval_ms)
    }

    pub fn watcher_grace_delay(&self) -> Duration {
        Duration::from_millis(self.watcher_grace_delay_ms)
    }

    pub fn watcher_progress_log(&self) -> Duration {
        Duration::from_secs(self.watcher_progress_log_secs)
    }

    pub fn credentials_wait_timeout(&self) -> Duration {
        Duration::from_secs(self.credentials_wait_timeout_secs)
    }

    pub fn credentials_poll_interval(&self) -> Duration {
        Duration::from_millis(self.credentials_poll_interval_ms)
    }

    pub fn stop_join_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_join_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ManagerConfig::default();
        assert_eq!(config.poll_interval_ms, 15_000);
        assert_eq!(config.per_platform_delay_ms, 5_000);
        assert_eq!(config.watcher_poll_interval_ms, 2_000);
        assert_eq!(config.watcher_grace_delay_ms, 500);
        assert_eq!(config.default_user_id, "infinite_hunt_user");
    }

    #[test]
    fn test_deserialize_minimal() {
        let toml = r#"
            poll_interval_ms = 1000
        "#;
        let config: ManagerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.watcher_poll_interval_ms, 2_000);
        assert_eq!(config.credentials_wait_timeout_secs, 120);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
            poll_interval_ms = 10000
            per_platform_delay_ms = 2000
            watcher_poll_interval_ms = 500
            watcher_grace_delay_ms = 100
            watcher_progress_log_secs = 10
            credentials_wait_timeout_secs = 60
            credentials_poll_interval_ms = 1000
            stop_join_timeout_ms = 3000
            default_user_id = "tester"
        "#;
        let config: ManagerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.per_platform_delay_ms, 2000);
        assert_eq!(config.watcher_grace_delay_ms, 100);
        assert_eq!(config.default_user_id, "tester");
        assert_eq!(config.stop_join_timeout(), Duration::from_millis(3000));
    }
}
