//! Per-platform bot configuration schemas.
//!
//! These validate the generator's output before a run plan is built.
//! Optional fields take defaults; a field that fails validation fails the
//! whole plan for that cycle.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_true() -> bool {
    true
}

fn default_application_limit() -> Option<u32> {
    Some(10)
}

fn default_max_jobs() -> u32 {
    10
}

/// LinkedIn search filter codes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkedInFilters {
    /// LinkedIn country filter code.
    #[serde(default)]
    pub country: Option<String>,
    /// Minimum salary requirement in USD.
    #[serde(default)]
    pub salary_bound: Option<i64>,
    /// Experience level codes (1=Internship ... 6=Executive).
    #[serde(default)]
    pub experience_levels: Vec<i32>,
    /// Remote preference codes (1=Remote, 2=Hybrid, 3=On-site).
    #[serde(default)]
    pub remote_types: Vec<i32>,
    /// Preferred metro areas or cities.
    #[serde(default)]
    pub specific_locations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedInBotConfig {
    /// Job title/keyword used to seed the search.
    #[serde(default)]
    pub search_keywords: String,
    /// Plain-text description of the preferred location.
    #[serde(default)]
    pub location_preferences: String,
    /// Optional pre-built search URL to open first.
    #[serde(default)]
    pub linkedin_starter_url: Option<String>,
    #[serde(default)]
    pub semantic_instructions: Option<String>,
    #[serde(default)]
    pub blacklist_companies: Vec<String>,
    /// Enable native EasyApply submissions.
    #[serde(default)]
    pub auto_apply: bool,
    #[serde(default = "default_true")]
    pub generate_cover_letter: bool,
    #[serde(default)]
    pub send_connection_request: bool,
    #[serde(default)]
    pub submit_confident_application: bool,
    /// Upper bound for applications per batch (must be >= 1 when set).
    #[serde(default = "default_application_limit")]
    pub daily_application_limit: Option<u32>,
    #[serde(default = "default_true")]
    pub skip_previously_skipped_jobs: bool,
    #[serde(default = "default_true")]
    pub skip_staffing_companies: bool,
    #[serde(default)]
    pub platform_filters: LinkedInFilters,
    #[serde(default)]
    pub selected_resume_id: Option<String>,
    #[serde(default)]
    pub selected_cover_letter_template_id: Option<String>,
    #[serde(default)]
    pub selected_ats_template_id: Option<String>,
    #[serde(default)]
    pub use_ats_optimized: bool,
}

impl LinkedInBotConfig {
    /// Parse a generated config, accepting both nested
    /// `{"platform_filters": {"linkedin": {...}}}` and flat filter objects.
    pub fn from_value(mut value: Value) -> Result<Self, serde_json::Error> {
        if let Some(filters) = value.get_mut("platform_filters") {
            if let Some(nested) = filters.get("linkedin").cloned() {
                *filters = nested;
            }
        }
        let config: LinkedInBotConfig = serde_json::from_value(value)?;
        if config.daily_application_limit == Some(0) {
            return Err(serde::de::Error::custom(
                "daily_application_limit must be >= 1",
            ));
        }
        Ok(config)
    }
}

/// Indeed date-posted filter ("fromage", in days).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndeedFilters {
    #[serde(default = "IndeedFilters::default_date_posted")]
    pub date_posted: String,
}

impl IndeedFilters {
    fn default_date_posted() -> String {
        "1".to_string()
    }

    /// Only a fixed set of day windows is accepted by Indeed.
    pub fn is_valid(&self) -> bool {
        matches!(self.date_posted.as_str(), "1" | "3" | "7" | "14")
    }
}

impl Default for IndeedFilters {
    fn default() -> Self {
        Self {
            date_posted: Self::default_date_posted(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndeedBotConfig {
    #[serde(default)]
    pub search_keywords: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub semantic_instructions: Option<String>,
    #[serde(default)]
    pub blacklist_companies: Vec<String>,
    #[serde(default)]
    pub platform_filters: IndeedFilters,
    #[serde(default = "default_true")]
    pub skip_previously_skipped_jobs: bool,
    #[serde(default = "default_true")]
    pub skip_staffing_companies: bool,
    #[serde(default)]
    pub selected_resume_id: Option<String>,
    #[serde(default)]
    pub selected_ats_template_id: Option<String>,
    #[serde(default)]
    pub use_ats_optimized: bool,
}

impl IndeedBotConfig {
    pub fn from_value(mut value: Value) -> Result<Self, serde_json::Error> {
        if let Some(filters) = value.get_mut("platform_filters") {
            if let Some(nested) = filters.get("indeed").cloned() {
                *filters = nested;
            }
        }
        let config: IndeedBotConfig = serde_json::from_value(value)?;
        if !config.platform_filters.is_valid() {
            return Err(serde::de::Error::custom(format!(
                "date_posted must be one of 1/3/7/14, got {}",
                config.platform_filters.date_posted
            )));
        }
        Ok(config)
    }
}

/// Shared shape for the boards with free-form filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardBotConfig {
    #[serde(default)]
    pub search_keywords: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub semantic_instructions: Option<String>,
    #[serde(default)]
    pub blacklist_companies: Vec<String>,
    #[serde(default = "default_true")]
    pub skip_previously_skipped_jobs: bool,
    #[serde(default = "default_true")]
    pub skip_staffing_companies: bool,
    #[serde(default)]
    pub selected_resume_id: Option<String>,
    #[serde(default)]
    pub selected_ats_template_id: Option<String>,
    #[serde(default)]
    pub use_ats_optimized: bool,
    /// Reserved for future board-specific filters.
    #[serde(default)]
    pub platform_filters: Map<String, Value>,
}

pub type ZipRecruiterBotConfig = BoardBotConfig;
pub type GlassdoorBotConfig = BoardBotConfig;
pub type DiceBotConfig = BoardBotConfig;

/// Per-board instructions consumed by the autonomous agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutonomousPlatformSettings {
    /// Display name for the platform.
    pub name: String,
    /// Default URL to seed the browser agent.
    #[serde(default)]
    pub search_url: Option<String>,
    /// Platform-specific scraping instructions.
    #[serde(default)]
    pub instructions: Option<String>,
    /// Whether the agent should attempt applications.
    #[serde(default = "default_true")]
    pub allow_apply: bool,
    /// Optional override for jobs saved per platform.
    #[serde(default)]
    pub max_jobs: Option<u32>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutonomousBotConfig {
    /// High-level instructions for the agent.
    pub custom_criteria: String,
    /// Seed job board URL.
    pub starting_url: String,
    /// Additional agent prompt injected per step.
    #[serde(default)]
    pub agent_instructions: Option<String>,
    #[serde(default = "default_max_jobs")]
    pub max_jobs_per_platform: u32,
    #[serde(default)]
    pub blacklist_companies: Vec<String>,
    #[serde(default = "default_true")]
    pub skip_staffing_companies: bool,
    #[serde(default)]
    pub generate_ats_resume: bool,
    #[serde(default)]
    pub selected_ats_template_id: Option<String>,
    /// Resume UUID to send when ATS generation is disabled.
    #[serde(default)]
    pub resume_id: Option<String>,
    /// Provider name (openai, azure, claude).
    pub llm_provider: String,
    pub llm_model: String,
    /// Azure OpenAI endpoint (required when llm_provider == "azure").
    #[serde(default)]
    pub llm_endpoint: Option<String>,
    #[serde(default = "default_true")]
    pub use_vision: bool,
    /// Optional cap in minutes for the agent session.
    #[serde(default)]
    pub max_running_time: Option<u32>,
    #[serde(default)]
    pub platforms: Vec<AutonomousPlatformSettings>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl AutonomousBotConfig {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let config: AutonomousBotConfig = serde_json::from_value(value)?;
        if config.max_jobs_per_platform == 0 {
            return Err(serde::de::Error::custom(
                "max_jobs_per_platform must be >= 1",
            ));
        }
        Ok(config)
    }
}
