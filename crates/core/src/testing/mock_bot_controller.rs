//! Mock bot controller for testing.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::bot::{BotController, BotHandle, LaunchOutcome};

/// How a mock bot behaves after launch, expressed in handle polls.
#[derive(Debug, Clone, Copy)]
pub struct BotScript {
    /// `handle()` returns `None` this many times before the bot registers.
    pub polls_before_registration: u32,
    /// Then the handle reports running this many times.
    pub polls_while_running: u32,
    /// The terminal handle carries the verification flag.
    pub verification_on_stop: bool,
}

impl Default for BotScript {
    fn default() -> Self {
        Self {
            polls_before_registration: 0,
            polls_while_running: 2,
            verification_on_stop: false,
        }
    }
}

impl BotScript {
    /// A bot whose running flag never clears on its own; only an external
    /// stop request ends it.
    pub fn never_finishes() -> Self {
        Self {
            polls_while_running: u32::MAX,
            ..Self::default()
        }
    }
}

/// A recorded launch for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedLaunch {
    pub user_id: String,
    pub run_id: String,
    pub payload: Value,
}

#[derive(Debug)]
struct BotState {
    script: BotScript,
    polls_seen: u32,
    stop_requested: bool,
}

/// Mock implementation of the BotController trait.
///
/// Each launch consumes the next queued script (or the default one) and
/// replays it through `handle()` polls, so tests control exactly when the
/// bot appears registered, running, and stopped.
#[derive(Default)]
pub struct MockBotController {
    default_script: Arc<RwLock<BotScript>>,
    script_queue: Arc<RwLock<VecDeque<BotScript>>>,
    launch_outcomes: Arc<RwLock<VecDeque<LaunchOutcome>>>,
    states: Arc<RwLock<HashMap<String, BotState>>>,
    launches: Arc<RwLock<Vec<RecordedLaunch>>>,
    registered: Arc<RwLock<HashSet<String>>>,
    register_calls: Arc<RwLock<Vec<String>>>,
    unregister_calls: Arc<RwLock<Vec<String>>>,
    stop_requests: Arc<RwLock<Vec<String>>>,
}

impl MockBotController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script applied to launches with no queued script.
    pub async fn set_default_script(&self, script: BotScript) {
        *self.default_script.write().await = script;
    }

    /// Queue a script for the next launch.
    pub async fn queue_script(&self, script: BotScript) {
        self.script_queue.write().await.push_back(script);
    }

    /// Queue an outcome for the next launch attempt.
    pub async fn queue_launch_outcome(&self, outcome: LaunchOutcome) {
        self.launch_outcomes.write().await.push_back(outcome);
    }

    /// All launches seen so far.
    pub async fn launches(&self) -> Vec<RecordedLaunch> {
        self.launches.read().await.clone()
    }

    /// Run ids currently visible to external status polling.
    pub async fn currently_registered(&self) -> HashSet<String> {
        self.registered.read().await.clone()
    }

    pub async fn register_calls(&self) -> Vec<String> {
        self.register_calls.read().await.clone()
    }

    pub async fn unregister_calls(&self) -> Vec<String> {
        self.unregister_calls.read().await.clone()
    }

    pub async fn stop_requests(&self) -> Vec<String> {
        self.stop_requests.read().await.clone()
    }
}

#[async_trait]
impl BotController for MockBotController {
    async fn launch(&self, user_id: &str, run_id: &str, payload: &Value) -> LaunchOutcome {
        self.launches.write().await.push(RecordedLaunch {
            user_id: user_id.to_string(),
            run_id: run_id.to_string(),
            payload: payload.clone(),
        });

        if let Some(outcome) = self.launch_outcomes.write().await.pop_front() {
            if !outcome.success {
                return outcome;
            }
        }

        let script = self
            .script_queue
            .write()
            .await
            .pop_front()
            .unwrap_or(*self.default_script.read().await);

        self.states.write().await.insert(
            run_id.to_string(),
            BotState {
                script,
                polls_seen: 0,
                stop_requested: false,
            },
        );
        LaunchOutcome::ok("mock bot launched")
    }

    async fn handle(&self, run_id: &str) -> Option<BotHandle> {
        let mut states = self.states.write().await;
        let state = states.get_mut(run_id)?;

        if state.stop_requested {
            return Some(BotHandle {
                is_running: false,
                verification_required: false,
            });
        }

        state.polls_seen += 1;
        let script = state.script;
        if state.polls_seen <= script.polls_before_registration {
            return None;
        }
        let running_until = script
            .polls_before_registration
            .saturating_add(script.polls_while_running);
        if state.polls_seen <= running_until {
            return Some(BotHandle {
                is_running: true,
                verification_required: false,
            });
        }
        Some(BotHandle {
            is_running: false,
            verification_required: script.verification_on_stop,
        })
    }

    async fn request_stop(&self, run_id: &str) {
        self.stop_requests.write().await.push(run_id.to_string());
        if let Some(state) = self.states.write().await.get_mut(run_id) {
            state.stop_requested = true;
        }
    }

    async fn register_polling(&self, run_id: &str) {
        self.register_calls.write().await.push(run_id.to_string());
        self.registered.write().await.insert(run_id.to_string());
    }

    async fn unregister_polling(&self, run_id: &str) {
        self.unregister_calls
            .write()
            .await
            .push(run_id.to_string());
        self.registered.write().await.remove(run_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_script_replay() {
        let controller = MockBotController::new();
        controller
            .queue_script(BotScript {
                polls_before_registration: 1,
                polls_while_running: 1,
                verification_on_stop: true,
            })
            .await;

        let outcome = controller.launch("user", "run-1", &json!({})).await;
        assert!(outcome.success);

        assert_eq!(controller.handle("run-1").await, None);
        assert_eq!(
            controller.handle("run-1").await,
            Some(BotHandle {
                is_running: true,
                verification_required: false
            })
        );
        assert_eq!(
            controller.handle("run-1").await,
            Some(BotHandle {
                is_running: false,
                verification_required: true
            })
        );
    }

    #[tokio::test]
    async fn test_stop_request_halts_bot() {
        let controller = MockBotController::new();
        controller.set_default_script(BotScript::never_finishes()).await;
        controller.launch("user", "run-1", &json!({})).await;

        assert!(controller.handle("run-1").await.unwrap().is_running);
        controller.request_stop("run-1").await;
        assert!(!controller.handle("run-1").await.unwrap().is_running);
    }

    #[tokio::test]
    async fn test_rejected_launch_creates_no_bot() {
        let controller = MockBotController::new();
        controller
            .queue_launch_outcome(LaunchOutcome::rejected("browser session unavailable"))
            .await;

        let outcome = controller.launch("user", "run-1", &json!({})).await;
        assert!(!outcome.success);
        assert_eq!(controller.handle("run-1").await, None);
    }
}
