//! Bot controller seam.
//!
//! One controller exists per platform. The orchestrator launches runs
//! through it and infers completion purely by polling the controller's
//! handle registry; it never owns a join primitive for the automation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::platform::Platform;

/// Snapshot of an in-flight bot's externally-owned state.
///
/// A handle is absent from the registry until the bot registers itself, so
/// "not found" and "not running" are distinct observations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BotHandle {
    /// Whether the bot's own worker is currently running.
    pub is_running: bool,
    /// Set when the bot hit an anti-automation challenge and stopped.
    pub verification_required: bool,
}

/// Result of a launch attempt. `launch` returns quickly; the automation
/// itself proceeds on the controller's own concurrency.
#[derive(Debug, Clone)]
pub struct LaunchOutcome {
    pub success: bool,
    pub message: String,
}

impl LaunchOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Minimal capability the orchestrator requires from a platform controller.
#[async_trait]
pub trait BotController: Send + Sync {
    /// Start the automation for a run. Must not block on the automation.
    async fn launch(&self, user_id: &str, run_id: &str, payload: &Value) -> LaunchOutcome;

    /// Look up the bot handle for a run, if the bot has registered.
    async fn handle(&self, run_id: &str) -> Option<BotHandle>;

    /// Best-effort stop request; fire-and-forget.
    async fn request_stop(&self, run_id: &str);

    /// Make the run visible to external status polling. Called exactly once
    /// per run, before launch.
    async fn register_polling(&self, run_id: &str);

    /// Remove the run from external status polling. Called exactly once per
    /// run, regardless of how it terminated.
    async fn unregister_polling(&self, run_id: &str);
}

/// Strategy map from platform to its controller.
///
/// Adding a platform means adding one entry here, not touching dispatch
/// logic anywhere else.
#[derive(Clone, Default)]
pub struct ControllerMap {
    controllers: HashMap<Platform, Arc<dyn BotController>>,
}

impl ControllerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_controller(
        mut self,
        platform: Platform,
        controller: Arc<dyn BotController>,
    ) -> Self {
        self.controllers.insert(platform, controller);
        self
    }

    pub fn get(&self, platform: Platform) -> Option<Arc<dyn BotController>> {
        self.controllers.get(&platform).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullController;

    #[async_trait]
    impl BotController for NullController {
        async fn launch(&self, _user_id: &str, _run_id: &str, _payload: &Value) -> LaunchOutcome {
            LaunchOutcome::rejected("null controller")
        }

        async fn handle(&self, _run_id: &str) -> Option<BotHandle> {
            None
        }

        async fn request_stop(&self, _run_id: &str) {}

        async fn register_polling(&self, _run_id: &str) {}

        async fn unregister_polling(&self, _run_id: &str) {}
    }

    #[test]
    fn test_controller_map_lookup() {
        let map = ControllerMap::new()
            .with_controller(Platform::Indeed, Arc::new(NullController))
            .with_controller(Platform::Dice, Arc::new(NullController));

        assert_eq!(map.len(), 2);
        assert!(map.get(Platform::Indeed).is_some());
        assert!(map.get(Platform::LinkedIn).is_none());
    }
}
