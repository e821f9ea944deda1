//! Settings record and per-cycle snapshot types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User-visible state of the hunt loop.
///
/// Finer-grained failure detail is attached to individual run records, never
/// to this status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HuntStatus {
    Idle,
    Running,
    Paused,
    Stopped,
}

impl HuntStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HuntStatus::Idle => "idle",
            HuntStatus::Running => "running",
            HuntStatus::Paused => "paused",
            HuntStatus::Stopped => "stopped",
        }
    }
}

impl fmt::Display for HuntStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HuntStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(HuntStatus::Idle),
            "running" => Ok(HuntStatus::Running),
            "paused" => Ok(HuntStatus::Paused),
            "stopped" => Ok(HuntStatus::Stopped),
            other => Err(format!("unknown hunt status: {other}")),
        }
    }
}

/// The persisted infinite hunt configuration row for a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsRecord {
    /// Record id.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Current external status.
    pub status: HuntStatus,
    /// Session id of the current (or last) activation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Enabled templates, in user-specified execution order.
    #[serde(default)]
    pub template_ids: Vec<String>,
    /// Templates excluded from scheduling after a verification challenge.
    #[serde(default)]
    pub blocked_template_ids: Vec<String>,
    /// Resume selection that overrides any generated value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_id: Option<String>,
    /// ATS resume template selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ats_template_id: Option<String>,
    /// Whether runs should generate ATS-optimized resumes.
    #[serde(default)]
    pub use_ats_optimized: bool,
    /// Cap on jobs handled per platform in one run.
    #[serde(default = "default_max_jobs")]
    pub max_jobs_per_platform: u32,
    /// Free-text instructions ("what jobs are you looking for").
    #[serde(default)]
    pub instructions: String,
    /// Run browsers headless.
    #[serde(default)]
    pub headless: bool,
    /// Id of the most recently finished run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_max_jobs() -> u32 {
    10
}

impl SettingsRecord {
    /// Snapshot the per-run settings for one cycle.
    ///
    /// Instructions are trimmed; the snapshot never changes within a cycle.
    pub fn snapshot(&self) -> HuntSettings {
        HuntSettings {
            resume_id: self.resume_id.clone(),
            ats_template_id: self.ats_template_id.clone(),
            use_ats_optimized: self.use_ats_optimized,
            max_jobs_per_platform: self.max_jobs_per_platform,
            instructions: self.instructions.trim().to_string(),
            headless: self.headless,
        }
    }

    /// Enabled template ids with the blocked set removed, order preserved.
    pub fn schedulable_template_ids(&self) -> Vec<String> {
        self.template_ids
            .iter()
            .filter(|id| !self.blocked_template_ids.contains(id))
            .cloned()
            .collect()
    }
}

/// Settings inherited by every run generated in a cycle.
///
/// These always win over generated config values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HuntSettings {
    pub resume_id: Option<String>,
    pub ats_template_id: Option<String>,
    pub use_ats_optimized: bool,
    pub max_jobs_per_platform: u32,
    pub instructions: String,
    pub headless: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SettingsRecord {
        SettingsRecord {
            id: "rec-1".to_string(),
            user_id: "user-1".to_string(),
            status: HuntStatus::Running,
            session_id: Some("sess-1".to_string()),
            template_ids: vec!["a".into(), "b".into(), "c".into()],
            blocked_template_ids: vec!["b".into()],
            resume_id: Some("resume-1".to_string()),
            ats_template_id: None,
            use_ats_optimized: true,
            max_jobs_per_platform: 10,
            instructions: "  remote rust roles  ".to_string(),
            headless: true,
            last_run_id: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_schedulable_excludes_blocked_preserves_order() {
        let ids = record().schedulable_template_ids();
        assert_eq!(ids, vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_snapshot_trims_instructions() {
        let snap = record().snapshot();
        assert_eq!(snap.instructions, "remote rust roles");
        assert!(snap.headless);
        assert_eq!(snap.resume_id.as_deref(), Some("resume-1"));
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            HuntStatus::Idle,
            HuntStatus::Running,
            HuntStatus::Paused,
            HuntStatus::Stopped,
        ] {
            assert_eq!(status.as_str().parse::<HuntStatus>().unwrap(), status);
        }
        assert!("cancelled".parse::<HuntStatus>().is_err());
    }

    #[test]
    fn test_record_deserialize_defaults() {
        let json = r#"{"id":"r","user_id":"u","status":"idle"}"#;
        let rec: SettingsRecord = serde_json::from_str(json).unwrap();
        assert!(rec.template_ids.is_empty());
        assert_eq!(rec.max_jobs_per_platform, 10);
        assert!(!rec.headless);
    }
}
