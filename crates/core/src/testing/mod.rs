//! Testing utilities and mock implementations for orchestrator tests.
//!
//! This module provides mock implementations of all the orchestrator's
//! backend traits, allowing full hunt lifecycle testing without real
//! infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use hunt_core::testing::{
//!     fixtures, MockBotController, MockConfigGenerator, MockRunStore,
//!     MockSettingsStore, MockTemplateRegistry,
//! };
//!
//! let settings = MockSettingsStore::with_record(fixtures::settings_record(&["t-1"]));
//! let templates = MockTemplateRegistry::linked(&settings);
//! let generator = MockConfigGenerator::new();
//! generator.script_response("t-1", fixtures::generated_indeed()).await;
//!
//! // Wire into a HuntManager...
//! ```

mod mock_bot_controller;
mod mock_config_generator;
mod mock_credential_store;
mod mock_run_store;
mod mock_settings_store;
mod mock_template_registry;

pub use mock_bot_controller::{BotScript, MockBotController, RecordedLaunch};
pub use mock_config_generator::MockConfigGenerator;
pub use mock_credential_store::MockCredentialStore;
pub use mock_run_store::MockRunStore;
pub use mock_settings_store::MockSettingsStore;
pub use mock_template_registry::MockTemplateRegistry;

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::json;

    use crate::generator::GeneratedConfig;
    use crate::orchestrator::ManagerConfig;
    use crate::settings::{HuntStatus, SettingsRecord};

    /// A settings record in running state with the given templates enabled.
    pub fn settings_record(template_ids: &[&str]) -> SettingsRecord {
        SettingsRecord {
            id: "settings-1".to_string(),
            user_id: "user-1".to_string(),
            status: HuntStatus::Running,
            session_id: None,
            template_ids: template_ids.iter().map(|id| id.to_string()).collect(),
            blocked_template_ids: Vec::new(),
            resume_id: Some("resume-1".to_string()),
            ats_template_id: None,
            use_ats_optimized: false,
            max_jobs_per_platform: 10,
            instructions: "remote rust roles".to_string(),
            headless: true,
            last_run_id: None,
            updated_at: None,
        }
    }

    /// Manager config with all waits shrunk so tests finish quickly.
    pub fn fast_manager_config() -> ManagerConfig {
        ManagerConfig {
            poll_interval_ms: 20,
            per_platform_delay_ms: 1,
            watcher_poll_interval_ms: 5,
            watcher_grace_delay_ms: 1,
            credentials_wait_timeout_secs: 1,
            credentials_poll_interval_ms: 5,
            stop_join_timeout_ms: 2_000,
            ..ManagerConfig::default()
        }
    }

    /// A valid generated LinkedIn apply config.
    pub fn generated_linkedin() -> GeneratedConfig {
        GeneratedConfig {
            template_kind: "linkedin-apply".to_string(),
            config: json!({
                "search_keywords": "rust engineer",
                "location_preferences": "Remote",
                "auto_apply": true,
                "platform_filters": {
                    "linkedin": {"remote_types": [1], "experience_levels": [4]}
                }
            }),
            reasoning: Some("Focused on remote senior roles".to_string()),
        }
    }

    /// A valid generated Indeed search config.
    pub fn generated_indeed() -> GeneratedConfig {
        GeneratedConfig {
            template_kind: "indeed-search".to_string(),
            config: json!({
                "search_keywords": ["rust developer", "backend engineer"],
                "location": "Remote",
                "platform_filters": {"date_posted": "7"}
            }),
            reasoning: None,
        }
    }

    /// A valid generated config for one of the plain board kinds.
    pub fn generated_board(template_kind: &str) -> GeneratedConfig {
        GeneratedConfig {
            template_kind: template_kind.to_string(),
            config: json!({
                "search_keywords": ["software engineer"],
                "location": "New York, NY"
            }),
            reasoning: None,
        }
    }

    /// A valid generated autonomous agent config.
    pub fn generated_autonomous() -> GeneratedConfig {
        GeneratedConfig {
            template_kind: "autonomous-auto-search".to_string(),
            config: json!({
                "custom_criteria": "senior rust roles, remote only",
                "starting_url": "https://example.com/jobs",
                "llm_provider": "openai",
                "llm_model": "gpt-4o",
                "max_jobs_per_platform": 5
            }),
            reasoning: None,
        }
    }
}
