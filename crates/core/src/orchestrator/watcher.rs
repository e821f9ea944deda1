//! Run completion watcher.
//!
//! Completion is inferred, never joined: the watcher polls the controller's
//! handle registry and declares a run finished only once the bot has been
//! seen, has been seen running, and is no longer running. The "seen running"
//! requirement protects against declaring victory during the startup window
//! where the handle exists but the worker has not flipped its running flag
//! yet.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::bot::BotController;

use super::config::ManagerConfig;
use super::types::WatchVerdict;

/// Sleep that aborts early when the shutdown channel fires (or closes).
///
/// Returns `true` when the sleep was interrupted by shutdown.
pub(super) async fn sleep_or_shutdown(
    duration: Duration,
    shutdown: &mut broadcast::Receiver<()>,
) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        _ = shutdown.recv() => true,
    }
}

/// Poll the controller until the run's bot is observed finished.
///
/// The verification flag is sticky: once seen on any poll it decides the
/// verdict even if a later poll no longer reports it.
pub(super) async fn watch_for_completion(
    controller: &Arc<dyn BotController>,
    run_id: &str,
    config: &ManagerConfig,
    shutdown: &mut broadcast::Receiver<()>,
) -> WatchVerdict {
    // Give a freshly launched bot time to register and flip its running
    // flag before the first poll.
    if sleep_or_shutdown(config.watcher_grace_delay(), shutdown).await {
        return WatchVerdict::Cancelled;
    }

    let mut found = false;
    let mut ever_started = false;
    let mut verification_seen = false;
    let mut waited = Duration::ZERO;
    let mut since_progress_log = Duration::ZERO;
    let progress_log_every = config.watcher_progress_log();

    loop {
        let running_now = match controller.handle(run_id).await {
            Some(handle) => {
                found = true;
                if handle.verification_required {
                    verification_seen = true;
                }
                if handle.is_running {
                    ever_started = true;
                }
                handle.is_running
            }
            None => {
                if !found {
                    debug!(run_id, waited_secs = waited.as_secs(), "bot not registered yet");
                }
                false
            }
        };

        if found && ever_started && !running_now {
            if verification_seen {
                warn!(run_id, "bot stopped on a verification challenge");
                return WatchVerdict::VerificationRequired;
            }
            info!(run_id, waited_secs = waited.as_secs(), "bot finished");
            return WatchVerdict::Completed;
        }

        if since_progress_log >= progress_log_every {
            since_progress_log = Duration::ZERO;
            info!(
                run_id,
                waited_secs = waited.as_secs(),
                found,
                ever_started,
                "still waiting for bot completion"
            );
        }

        let interval = config.watcher_poll_interval();
        if sleep_or_shutdown(interval, shutdown).await {
            info!(run_id, "completion watch interrupted by shutdown");
            return WatchVerdict::Cancelled;
        }
        waited += interval;
        since_progress_log += interval;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::Value;

    use crate::bot::{BotHandle, LaunchOutcome};

    use super::*;

    /// Controller that replays a fixed sequence of handle observations,
    /// repeating the last one forever.
    struct ScriptedController {
        script: Vec<Option<BotHandle>>,
        cursor: AtomicUsize,
    }

    impl ScriptedController {
        fn new(script: Vec<Option<BotHandle>>) -> Arc<dyn BotController> {
            Arc::new(Self {
                script,
                cursor: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl BotController for ScriptedController {
        async fn launch(&self, _user_id: &str, _run_id: &str, _payload: &Value) -> LaunchOutcome {
            LaunchOutcome::ok("scripted")
        }

        async fn handle(&self, _run_id: &str) -> Option<BotHandle> {
            let index = self.cursor.fetch_add(1, Ordering::SeqCst);
            self.script[index.min(self.script.len() - 1)]
        }

        async fn request_stop(&self, _run_id: &str) {}

        async fn register_polling(&self, _run_id: &str) {}

        async fn unregister_polling(&self, _run_id: &str) {}
    }

    fn fast_config() -> ManagerConfig {
        ManagerConfig {
            watcher_poll_interval_ms: 10,
            watcher_grace_delay_ms: 1,
            ..ManagerConfig::default()
        }
    }

    fn running() -> Option<BotHandle> {
        Some(BotHandle {
            is_running: true,
            verification_required: false,
        })
    }

    fn stopped() -> Option<BotHandle> {
        Some(BotHandle {
            is_running: false,
            verification_required: false,
        })
    }

    fn stopped_on_verification() -> Option<BotHandle> {
        Some(BotHandle {
            is_running: false,
            verification_required: true,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_to_completion() {
        let controller = ScriptedController::new(vec![running(), running(), stopped()]);
        let (tx, mut rx) = broadcast::channel(1);
        let verdict =
            watch_for_completion(&controller, "run-1", &fast_config(), &mut rx).await;
        assert_eq!(verdict, WatchVerdict::Completed);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_window_is_not_completion() {
        // Handle exists but the worker has not started; then it never runs
        // before the stop observation would be reachable. The watcher must
        // not finish until a running observation has happened.
        let controller =
            ScriptedController::new(vec![stopped(), stopped(), running(), stopped()]);
        let (tx, mut rx) = broadcast::channel(1);
        let verdict =
            watch_for_completion(&controller, "run-1", &fast_config(), &mut rx).await;
        assert_eq!(verdict, WatchVerdict::Completed);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_registration() {
        let controller = ScriptedController::new(vec![None, None, running(), stopped()]);
        let (tx, mut rx) = broadcast::channel(1);
        let verdict =
            watch_for_completion(&controller, "run-1", &fast_config(), &mut rx).await;
        assert_eq!(verdict, WatchVerdict::Completed);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn test_verification_challenge_is_sticky() {
        let controller =
            ScriptedController::new(vec![running(), stopped_on_verification(), stopped()]);
        let (tx, mut rx) = broadcast::channel(1);
        let verdict =
            watch_for_completion(&controller, "run-1", &fast_config(), &mut rx).await;
        assert_eq!(verdict, WatchVerdict::VerificationRequired);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_watch() {
        // Bot never stops running; only the shutdown signal ends the watch.
        let controller = ScriptedController::new(vec![running()]);
        let (tx, mut rx) = broadcast::channel(1);
        tx.send(()).unwrap();
        let verdict =
            watch_for_completion(&controller, "run-1", &fast_config(), &mut rx).await;
        assert_eq!(verdict, WatchVerdict::Cancelled);
    }
}
