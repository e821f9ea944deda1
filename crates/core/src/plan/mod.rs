//! Run plan construction.
//!
//! `AgentRunBuilder` is a pure transformation from a generated config into a
//! validated, platform-typed run plan. Settings inherited from the hunt
//! configuration always overwrite generated values: the user's explicit
//! resume/ATS/instruction selections must never lose to model output.

mod configs;

use chrono::Local;
use serde_json::{json, Map, Value};
use thiserror::Error;

pub use configs::{
    AutonomousBotConfig, AutonomousPlatformSettings, BoardBotConfig, DiceBotConfig,
    GlassdoorBotConfig, IndeedBotConfig, IndeedFilters, LinkedInBotConfig, LinkedInFilters,
    ZipRecruiterBotConfig,
};

use crate::generator::GeneratedConfig;
use crate::platform::{Platform, UnknownPlatform};
use crate::settings::HuntSettings;

/// Error type for plan building. Either way, the template is skipped for
/// the current cycle and retried on the next one.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    UnknownPlatform(#[from] UnknownPlatform),

    /// The generated config did not satisfy the platform schema.
    #[error("invalid {kind} config: {message}")]
    InvalidConfig { kind: String, message: String },
}

/// A validated, settings-merged configuration for one run.
///
/// Created fresh per template per cycle; never reused.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub template_id: String,
    pub template_kind: String,
    pub platform: Platform,
    pub run_name: String,
    /// JSON payload persisted on the run record and handed to the bot.
    pub payload: Value,
    pub reasoning: Option<String>,
    /// LLM provider the run needs credentials for before launch, if any.
    pub llm_provider: Option<String>,
}

/// Builds run plans from generated configs and the cycle's settings
/// snapshot.
pub struct AgentRunBuilder {
    settings: HuntSettings,
    session_id: Option<String>,
}

impl AgentRunBuilder {
    pub fn new(settings: HuntSettings, session_id: Option<String>) -> Self {
        Self {
            settings,
            session_id,
        }
    }

    /// Build a plan for one template.
    ///
    /// Validates the generated config against the platform schema, builds
    /// the launch payload, and applies the inherited settings overrides.
    pub fn build_plan(
        &self,
        template_id: &str,
        generated: &GeneratedConfig,
    ) -> Result<RunPlan, PlanError> {
        let kind = generated.template_kind.as_str();
        let platform = Platform::for_template_kind(kind)?;

        let (mut payload, llm_provider) = match platform {
            Platform::LinkedIn => (self.linkedin_payload(kind, generated)?, None),
            Platform::Indeed => (self.board_payload_indeed(kind, generated)?, None),
            Platform::ZipRecruiter | Platform::Glassdoor | Platform::Dice => {
                (self.board_payload(platform, kind, generated)?, None)
            }
            Platform::Autonomous => {
                let (payload, provider) = self.autonomous_payload(kind, generated)?;
                (payload, Some(provider))
            }
        };

        let run_name = Self::make_run_name(kind, platform);
        let object = payload
            .as_object_mut()
            .expect("payload is always a JSON object");
        object.insert("workflow_id".to_string(), json!(kind));
        object.insert("run_name".to_string(), json!(run_name));
        object.insert("platform".to_string(), json!(platform.as_str()));
        object.insert("agent_run_template_id".to_string(), json!(template_id));
        if let Some(reasoning) = &generated.reasoning {
            object.insert("config_reasoning".to_string(), json!(reasoning));
        }

        Ok(RunPlan {
            template_id: template_id.to_string(),
            template_kind: kind.to_string(),
            platform,
            run_name,
            payload,
            reasoning: generated.reasoning.clone(),
            llm_provider,
        })
    }

    /// Overwrite the payload fields that the hunt settings own.
    fn apply_inherited_settings(&self, payload: &mut Map<String, Value>) {
        payload.insert("selected_resume_id".to_string(), json!(self.settings.resume_id));
        payload.insert(
            "selected_ats_template_id".to_string(),
            json!(self.settings.ats_template_id),
        );
        payload.insert(
            "use_ats_optimized".to_string(),
            json!(self.settings.use_ats_optimized),
        );
        payload.insert("hunt_session_id".to_string(), json!(self.session_id));
        payload.insert("headless_on".to_string(), json!(self.settings.headless));
        // The user's prompt always wins over generated instructions.
        payload.insert(
            "semantic_instructions".to_string(),
            json!(self.settings.instructions),
        );
    }

    fn invalid(kind: &str, err: impl ToString) -> PlanError {
        PlanError::InvalidConfig {
            kind: kind.to_string(),
            message: err.to_string(),
        }
    }

    fn linkedin_payload(&self, kind: &str, generated: &GeneratedConfig) -> Result<Value, PlanError> {
        let model = LinkedInBotConfig::from_value(generated.config.clone())
            .map_err(|e| Self::invalid(kind, e))?;

        // Keywords are stored as a list even though LinkedIn takes one
        // string.
        let search_keywords: Vec<String> = if model.search_keywords.is_empty() {
            vec![]
        } else {
            vec![model.search_keywords.clone()]
        };

        let mut payload = json!({
            "search_keywords": search_keywords,
            "location_preferences": model.location_preferences,
            "semantic_instructions": model.semantic_instructions,
            "blacklist_companies": model.blacklist_companies,
            "auto_apply": model.auto_apply,
            "generate_cover_letter": model.generate_cover_letter,
            "send_connection_request": model.send_connection_request,
            "submit_confident_application": true,
            "daily_application_limit": model.daily_application_limit.unwrap_or(10),
            "skip_previously_skipped_jobs": model.skip_previously_skipped_jobs,
            "skip_staffing_companies": model.skip_staffing_companies,
            "platform_filters": {"linkedin": model.platform_filters},
            "linkedin_starter_url": model.linkedin_starter_url,
        });
        self.apply_inherited_settings(payload.as_object_mut().unwrap());
        Ok(payload)
    }

    fn board_payload_indeed(
        &self,
        kind: &str,
        generated: &GeneratedConfig,
    ) -> Result<Value, PlanError> {
        let model = IndeedBotConfig::from_value(generated.config.clone())
            .map_err(|e| Self::invalid(kind, e))?;

        let mut payload = json!({
            "search_keywords": model.search_keywords,
            "location_preferences": model.location,
            "semantic_instructions": model.semantic_instructions,
            "blacklist_companies": model.blacklist_companies,
            "skip_staffing_companies": model.skip_staffing_companies,
            "skip_previously_skipped_jobs": model.skip_previously_skipped_jobs,
            "platform_filters": {"indeed": model.platform_filters},
        });
        self.apply_inherited_settings(payload.as_object_mut().unwrap());
        Ok(payload)
    }

    fn board_payload(
        &self,
        platform: Platform,
        kind: &str,
        generated: &GeneratedConfig,
    ) -> Result<Value, PlanError> {
        let model: BoardBotConfig = serde_json::from_value(generated.config.clone())
            .map_err(|e| Self::invalid(kind, e))?;

        let mut filters = Map::new();
        filters.insert(
            platform.as_str().to_string(),
            Value::Object(model.platform_filters.clone()),
        );
        let mut payload = json!({
            "search_keywords": model.search_keywords,
            "location_preferences": model.location,
            "semantic_instructions": model.semantic_instructions,
            "blacklist_companies": model.blacklist_companies,
            "skip_staffing_companies": model.skip_staffing_companies,
            "skip_previously_skipped_jobs": model.skip_previously_skipped_jobs,
            "platform_filters": filters,
        });
        self.apply_inherited_settings(payload.as_object_mut().unwrap());
        Ok(payload)
    }

    fn autonomous_payload(
        &self,
        kind: &str,
        generated: &GeneratedConfig,
    ) -> Result<(Value, String), PlanError> {
        let model = AutonomousBotConfig::from_value(generated.config.clone())
            .map_err(|e| Self::invalid(kind, e))?;

        let max_jobs = if model.max_jobs_per_platform > 0 {
            model.max_jobs_per_platform
        } else {
            self.settings.max_jobs_per_platform
        };

        let mut payload = json!({
            "semantic_instructions": model.custom_criteria,
            "platform_filters": {
                "autonomous": {
                    "platforms": model.platforms,
                    "instructions": model.agent_instructions,
                    "starting_url": model.starting_url,
                    "max_jobs_per_platform": max_jobs,
                    "llm_provider": model.llm_provider,
                    "llm_model": model.llm_model,
                    "llm_endpoint": model.llm_endpoint,
                    "use_vision": model.use_vision,
                    "max_running_time": model.max_running_time,
                    "metadata": model.metadata,
                }
            },
        });
        let object = payload.as_object_mut().unwrap();
        self.apply_inherited_settings(object);

        // The autonomous agent may pin its own resume/ATS selections.
        if let Some(resume_id) = &model.resume_id {
            object.insert("selected_resume_id".to_string(), json!(resume_id));
        }
        if let Some(ats_id) = &model.selected_ats_template_id {
            object.insert("selected_ats_template_id".to_string(), json!(ats_id));
        }

        Ok((payload, model.llm_provider))
    }

    fn make_run_name(kind: &str, platform: Platform) -> String {
        let label = Platform::label_for_kind(kind).unwrap_or_else(|| platform.label());
        let timestamp = Local::now().format("%b %d, %H:%M");
        format!("[Infinite] {label} - {timestamp}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings() -> HuntSettings {
        HuntSettings {
            resume_id: Some("resume-7".to_string()),
            ats_template_id: Some("ats-3".to_string()),
            use_ats_optimized: true,
            max_jobs_per_platform: 15,
            instructions: "remote rust roles only".to_string(),
            headless: true,
        }
    }

    fn generated(kind: &str, config: Value) -> GeneratedConfig {
        GeneratedConfig {
            template_kind: kind.to_string(),
            config,
            reasoning: Some("looks promising".to_string()),
        }
    }

    #[test]
    fn test_inherited_settings_override_generated_values() {
        let builder = AgentRunBuilder::new(settings(), Some("sess-1".to_string()));
        let plan = builder
            .build_plan(
                "tmpl-1",
                &generated(
                    "linkedin-apply",
                    json!({
                        "search_keywords": "rust",
                        "semantic_instructions": "model-invented instructions",
                        "selected_resume_id": "model-invented-resume",
                        "use_ats_optimized": false
                    }),
                ),
            )
            .unwrap();

        assert_eq!(plan.payload["selected_resume_id"], "resume-7");
        assert_eq!(plan.payload["selected_ats_template_id"], "ats-3");
        assert_eq!(plan.payload["use_ats_optimized"], true);
        assert_eq!(plan.payload["semantic_instructions"], "remote rust roles only");
        assert_eq!(plan.payload["hunt_session_id"], "sess-1");
        assert_eq!(plan.payload["headless_on"], true);
    }

    #[test]
    fn test_plan_carries_identity_fields() {
        let builder = AgentRunBuilder::new(settings(), None);
        let plan = builder
            .build_plan(
                "tmpl-2",
                &generated("indeed-search", json!({"search_keywords": ["sre"]})),
            )
            .unwrap();

        assert_eq!(plan.platform, Platform::Indeed);
        assert_eq!(plan.payload["workflow_id"], "indeed-search");
        assert_eq!(plan.payload["platform"], "indeed");
        assert_eq!(plan.payload["agent_run_template_id"], "tmpl-2");
        assert_eq!(plan.payload["config_reasoning"], "looks promising");
        assert!(plan.run_name.starts_with("[Infinite] Indeed Auto Search - "));
        assert!(plan.llm_provider.is_none());
    }

    #[test]
    fn test_unknown_platform_produces_no_plan() {
        let builder = AgentRunBuilder::new(settings(), None);
        let result = builder.build_plan("tmpl-3", &generated("monster-search", json!({})));
        assert!(matches!(result, Err(PlanError::UnknownPlatform(_))));
    }

    #[test]
    fn test_schema_failure_produces_no_plan() {
        let builder = AgentRunBuilder::new(settings(), None);
        let result = builder.build_plan(
            "tmpl-4",
            &generated(
                "indeed-search",
                json!({"platform_filters": {"date_posted": "90"}}),
            ),
        );
        assert!(matches!(result, Err(PlanError::InvalidConfig { .. })));
    }

    #[test]
    fn test_autonomous_keeps_own_resume_override_and_provider() {
        let builder = AgentRunBuilder::new(settings(), Some("sess-2".to_string()));
        let plan = builder
            .build_plan(
                "tmpl-5",
                &generated(
                    "autonomous-auto-search",
                    json!({
                        "custom_criteria": "staff rust roles",
                        "starting_url": "https://example.com/jobs",
                        "llm_provider": "azure",
                        "llm_model": "gpt-4o",
                        "resume_id": "agent-resume"
                    }),
                ),
            )
            .unwrap();

        assert_eq!(plan.llm_provider.as_deref(), Some("azure"));
        // Autonomous config re-overrides the inherited resume selection.
        assert_eq!(plan.payload["selected_resume_id"], "agent-resume");
        assert_eq!(plan.payload["semantic_instructions"], "remote rust roles only");
        assert_eq!(
            plan.payload["platform_filters"]["autonomous"]["max_jobs_per_platform"],
            10
        );
    }

    #[test]
    fn test_linkedin_keyword_wrapped_in_list() {
        let builder = AgentRunBuilder::new(HuntSettings::default(), None);
        let plan = builder
            .build_plan(
                "t",
                &generated("linkedin-search", json!({"search_keywords": "kernel dev"})),
            )
            .unwrap();
        assert_eq!(plan.payload["search_keywords"], json!(["kernel dev"]));
        assert_eq!(plan.payload["submit_confident_application"], true);
    }
}
