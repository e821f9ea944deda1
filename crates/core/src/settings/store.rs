//! Settings storage trait.

use async_trait::async_trait;
use thiserror::Error;

use super::{HuntStatus, SettingsRecord};

/// Error type for settings store operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The backing store rejected the request.
    #[error("settings backend error: {0}")]
    Backend(String),

    /// The response could not be decoded.
    #[error("invalid settings payload: {0}")]
    InvalidPayload(String),
}

/// Partial update of the runtime fields on the settings record.
///
/// Unset fields are left unchanged by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsUpdate {
    pub status: Option<HuntStatus>,
    pub session_id: Option<String>,
    pub last_run_id: Option<String>,
}

impl SettingsUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: HuntStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_last_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.last_run_id = Some(run_id.into());
        self
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.session_id.is_none() && self.last_run_id.is_none()
    }
}

/// Trait for the persisted hunt settings backend.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Fetch the current settings record, if one exists.
    async fn get(&self) -> Result<Option<SettingsRecord>, SettingsError>;

    /// Patch runtime fields; unset fields are unchanged.
    async fn update(&self, update: SettingsUpdate) -> Result<(), SettingsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_builder() {
        let update = SettingsUpdate::new()
            .with_status(HuntStatus::Running)
            .with_session_id("sess-9");
        assert_eq!(update.status, Some(HuntStatus::Running));
        assert_eq!(update.session_id.as_deref(), Some("sess-9"));
        assert!(update.last_run_id.is_none());
        assert!(!update.is_empty());
        assert!(SettingsUpdate::new().is_empty());
    }
}
