pub mod bot;
pub mod config;
pub mod credentials;
pub mod generator;
pub mod metadata;
pub mod orchestrator;
pub mod plan;
pub mod platform;
pub mod run;
pub mod settings;
pub mod template;
pub mod testing;

pub use bot::{BotController, BotHandle, ControllerMap, LaunchOutcome};
pub use config::{load_config, load_config_from_str, ConfigError, GatewayConfig, HuntConfig};
pub use credentials::{CredentialStore, LlmCredentials};
pub use generator::{
    ConfigGenerator, GatewayConfigGenerator, GenerateConfigRequest, GeneratedConfig,
    GeneratorError,
};
pub use metadata::{HuntMetadataSnapshot, InMemoryMetadata, MetadataSink, NoopMetadata};
pub use orchestrator::{ActiveRun, HuntError, HuntManager, ManagerConfig, ManagerStatus};
pub use plan::{AgentRunBuilder, PlanError, RunPlan};
pub use platform::Platform;
pub use run::{NewRun, Run, RunStatus, RunStore, RunStoreError};
pub use settings::{
    HuntSettings, HuntStatus, SettingsError, SettingsRecord, SettingsStore, SettingsUpdate,
};
pub use template::{GatewayTemplateRegistry, TemplateError, TemplateRegistry};
