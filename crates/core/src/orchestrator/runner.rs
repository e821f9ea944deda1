//! The hunt manager.
//!
//! Owns the background worker that executes hunt cycles:
//! - Reads the persisted settings at the top of every cycle
//! - Launches at most one bot at a time, in template order
//! - Infers completion by polling controller-exposed bot state
//! - Blocks templates that hit verification challenges
//!
//! `start()` and `stop()` are idempotent; a stop request interrupts any
//! in-flight sleep or completion watch through the shutdown channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::bot::{BotController, ControllerMap};
use crate::credentials::CredentialStore;
use crate::generator::{ConfigGenerator, GenerateConfigRequest};
use crate::metadata::MetadataSink;
use crate::plan::{AgentRunBuilder, RunPlan};
use crate::run::{NewRun, RunStatus, RunStore};
use crate::settings::{HuntStatus, SettingsRecord, SettingsStore, SettingsUpdate};
use crate::template::TemplateRegistry;

use super::config::ManagerConfig;
use super::types::{ActiveRun, HuntError, ManagerStatus, WatchVerdict};
use super::watcher::{sleep_or_shutdown, watch_for_completion};

/// The infinite hunt manager.
pub struct HuntManager {
    config: ManagerConfig,
    settings: Arc<dyn SettingsStore>,
    templates: Arc<dyn TemplateRegistry>,
    generator: Arc<dyn ConfigGenerator>,
    runs: Arc<dyn RunStore>,
    controllers: ControllerMap,
    metadata: Arc<dyn MetadataSink>,
    credentials: Option<Arc<dyn CredentialStore>>,

    // Runtime state
    running: Arc<AtomicBool>,
    active: Arc<RwLock<Option<ActiveRun>>>,
    session_id: Arc<RwLock<Option<String>>>,
    shutdown_tx: broadcast::Sender<()>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl HuntManager {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: ManagerConfig,
        settings: Arc<dyn SettingsStore>,
        templates: Arc<dyn TemplateRegistry>,
        generator: Arc<dyn ConfigGenerator>,
        runs: Arc<dyn RunStore>,
        controllers: ControllerMap,
        metadata: Arc<dyn MetadataSink>,
        credentials: Option<Arc<dyn CredentialStore>>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            settings,
            templates,
            generator,
            runs,
            controllers,
            metadata,
            credentials,
            running: Arc::new(AtomicBool::new(false)),
            active: Arc::new(RwLock::new(None)),
            session_id: Arc::new(RwLock::new(None)),
            shutdown_tx,
            worker: Mutex::new(None),
        }
    }

    /// Start the hunt (spawns the worker loop). A second call while running
    /// is a no-op.
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Hunt manager already running");
            return;
        }

        let session_id = Uuid::new_v4().to_string();
        info!(%session_id, "Starting infinite hunt");

        *self.session_id.write().await = Some(session_id.clone());
        self.metadata.hunt_started(&session_id).await;

        if let Err(e) = self
            .settings
            .update(
                SettingsUpdate::new()
                    .with_status(HuntStatus::Running)
                    .with_session_id(session_id.clone()),
            )
            .await
        {
            // The worker re-asserts the status at the top of each cycle.
            warn!("Failed to persist running status at start: {e}");
        }

        let worker = CycleWorker {
            config: self.config.clone(),
            settings: Arc::clone(&self.settings),
            templates: Arc::clone(&self.templates),
            generator: Arc::clone(&self.generator),
            runs: Arc::clone(&self.runs),
            controllers: self.controllers.clone(),
            metadata: Arc::clone(&self.metadata),
            credentials: self.credentials.clone(),
            running: Arc::clone(&self.running),
            active: Arc::clone(&self.active),
            session_id,
            shutdown_rx: self.shutdown_tx.subscribe(),
        };

        let handle = tokio::spawn(async move { worker.run_loop().await });
        *self.worker.lock().await = Some(handle);
    }

    /// Stop the hunt. Interrupts the worker's current wait, asks the
    /// controller to halt any in-flight bot, and joins the worker within a
    /// bounded timeout.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Hunt manager not running");
            return;
        }

        info!("Stopping infinite hunt");
        let _ = self.shutdown_tx.send(());

        if let Some(active) = self.active.read().await.clone() {
            if let Some(controller) = self.controllers.get(active.platform) {
                controller.request_stop(&active.run_id).await;
            }
        }

        let handle = self.worker.lock().await.take();
        if let Some(mut handle) = handle {
            if tokio::time::timeout(self.config.stop_join_timeout(), &mut handle)
                .await
                .is_err()
            {
                warn!("Hunt worker did not stop within the bound; aborting it");
                handle.abort();
            }
        }

        // If the worker was aborted mid-run, finish its cleanup here:
        // release the polling registration and finalize the run record.
        if let Some(active) = self.active.write().await.take() {
            if let Some(controller) = self.controllers.get(active.platform) {
                controller.unregister_polling(&active.run_id).await;
            }
            if let Err(e) = self
                .runs
                .set_status(&active.run_id, RunStatus::Stopped, None, Some(Utc::now()))
                .await
            {
                debug!(
                    run_id = %active.run_id,
                    "Active run already finalized during shutdown: {e}"
                );
            }
        }

        self.metadata.hunt_stopped().await;
        *self.session_id.write().await = None;
        info!("Infinite hunt stopped");
    }

    /// Current manager status.
    pub async fn status(&self) -> ManagerStatus {
        ManagerStatus {
            is_running: self.is_running(),
            session_id: self.session_id().await,
            active_run: self.active_run().await,
        }
    }

    /// Whether the worker loop is alive.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Session id minted at the latest `start()`, if any.
    pub async fn session_id(&self) -> Option<String> {
        self.session_id.read().await.clone()
    }

    /// The run currently in flight, if any.
    pub async fn active_run(&self) -> Option<ActiveRun> {
        self.active.read().await.clone()
    }

    /// Controller driving the active run, for status-reporting surfaces.
    pub async fn active_controller(&self) -> Option<Arc<dyn BotController>> {
        let active = self.active.read().await.clone()?;
        self.controllers.get(active.platform)
    }
}

/// State the spawned worker task owns for the lifetime of one activation.
struct CycleWorker {
    config: ManagerConfig,
    settings: Arc<dyn SettingsStore>,
    templates: Arc<dyn TemplateRegistry>,
    generator: Arc<dyn ConfigGenerator>,
    runs: Arc<dyn RunStore>,
    controllers: ControllerMap,
    metadata: Arc<dyn MetadataSink>,
    credentials: Option<Arc<dyn CredentialStore>>,
    running: Arc<AtomicBool>,
    active: Arc<RwLock<Option<ActiveRun>>>,
    session_id: String,
    shutdown_rx: broadcast::Receiver<()>,
}

impl CycleWorker {
    async fn run_loop(mut self) {
        info!("Hunt worker loop started");

        loop {
            if !self.running.load(Ordering::Relaxed) {
                break;
            }

            let record = match self.settings.get().await {
                Ok(Some(record)) => record,
                Ok(None) => {
                    // Nothing to hunt for and nothing to write back to; the
                    // hunt cannot meaningfully continue.
                    warn!("Hunt settings record missing; stopping hunt");
                    if let Err(e) = self
                        .settings
                        .update(SettingsUpdate::new().with_status(HuntStatus::Stopped))
                        .await
                    {
                        warn!("Failed to persist stopped status: {e}");
                    }
                    self.running.store(false, Ordering::SeqCst);
                    self.metadata.hunt_stopped().await;
                    break;
                }
                Err(e) => {
                    warn!("Failed to read hunt settings: {e}");
                    if self.sleep(self.config.poll_interval()).await {
                        break;
                    }
                    continue;
                }
            };

            if record.status != HuntStatus::Running {
                debug!(status = %record.status, "Hunt status not running; idling");
                if self.sleep(self.config.poll_interval()).await {
                    break;
                }
                continue;
            }

            // Idempotent confirmation; tolerates status flips between reads.
            if let Err(e) = self
                .settings
                .update(SettingsUpdate::new().with_status(HuntStatus::Running))
                .await
            {
                warn!("Failed to confirm running status: {e}");
            }

            if let Err(e) = self.run_cycle(record).await {
                // The per-template paths absorb their own failures; an error
                // here means something unexpected. Park the hunt rather than
                // spin on it.
                error!("Hunt cycle failed: {e}");
                if let Err(e) = self
                    .settings
                    .update(SettingsUpdate::new().with_status(HuntStatus::Stopped))
                    .await
                {
                    warn!("Failed to persist stopped status after cycle error: {e}");
                }
            }

            if self.sleep(self.config.poll_interval()).await {
                break;
            }
        }

        info!("Hunt worker loop exited");
    }

    /// One pass over the schedulable templates, one run at a time.
    async fn run_cycle(&mut self, record: SettingsRecord) -> Result<(), HuntError> {
        let schedulable = record.schedulable_template_ids();
        if schedulable.is_empty() {
            warn!("No schedulable templates; waiting for settings changes");
            return Ok(());
        }

        // Templates can be deleted at any time; re-validate existence on
        // every cycle. A registry outage must not halt the hunt, so fall
        // back to the unverified list.
        let template_ids = match self.templates.list_existing(&schedulable).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Template existence check failed, proceeding unverified: {e}");
                schedulable
            }
        };
        if template_ids.is_empty() {
            warn!("All schedulable templates have been deleted; waiting");
            return Ok(());
        }

        let user_id = if record.user_id.is_empty() {
            self.config.default_user_id.clone()
        } else {
            record.user_id.clone()
        };
        let settings = record.snapshot();
        let builder = AgentRunBuilder::new(settings.clone(), Some(self.session_id.clone()));

        info!(
            templates = template_ids.len(),
            session_id = %self.session_id,
            "Starting hunt cycle"
        );

        for template_id in &template_ids {
            if !self.running.load(Ordering::Relaxed) {
                break;
            }

            if self.sleep(self.config.per_platform_delay()).await {
                break;
            }

            // A pause or stop flips the external status between runs; abort
            // the rest of the cycle as soon as it is observed.
            match self.settings.get().await {
                Ok(Some(current)) if current.status == HuntStatus::Running => {}
                Ok(Some(current)) => {
                    info!(status = %current.status, "Hunt status changed mid-cycle; aborting cycle");
                    break;
                }
                Ok(None) => {
                    warn!("Hunt settings vanished mid-cycle; aborting cycle");
                    break;
                }
                Err(e) => {
                    warn!("Failed to re-read settings mid-cycle, aborting cycle: {e}");
                    break;
                }
            }

            let mut request = GenerateConfigRequest::new(&settings.instructions, template_id);
            request.session_id = Some(self.session_id.clone());
            request.resume_id = settings.resume_id.clone();
            request.ats_template_id = settings.ats_template_id.clone();
            request.use_ats_optimized = Some(settings.use_ats_optimized);

            let generated = match self.generator.generate(&request).await {
                Ok(generated) => generated,
                Err(e) => {
                    warn!(%template_id, "Config generation failed, skipping template: {e}");
                    continue;
                }
            };

            let plan = match builder.build_plan(template_id, &generated) {
                Ok(plan) => plan,
                Err(e) => {
                    warn!(%template_id, "Generated config rejected, skipping template: {e}");
                    continue;
                }
            };

            self.execute_single_run(&user_id, plan).await;
        }

        Ok(())
    }

    /// Create, launch, watch and finalize one run. Always leaves no active
    /// run and no polling registration behind.
    async fn execute_single_run(&mut self, user_id: &str, plan: RunPlan) {
        let Some(controller) = self.controllers.get(plan.platform) else {
            error!(
                platform = %plan.platform.as_str(),
                template_id = %plan.template_id,
                "No bot controller registered for platform; skipping template"
            );
            return;
        };

        let run = match self
            .runs
            .create(NewRun {
                template_id: plan.template_id.clone(),
                template_kind: plan.template_kind.clone(),
                platform: plan.platform,
                run_name: plan.run_name.clone(),
                payload: plan.payload.clone(),
            })
            .await
        {
            Ok(run) => run,
            Err(e) => {
                error!(template_id = %plan.template_id, "Failed to create run record: {e}");
                return;
            }
        };

        info!(
            run_id = %run.id,
            template_kind = %plan.template_kind,
            run_name = %plan.run_name,
            "Created run"
        );

        *self.active.write().await = Some(ActiveRun {
            run_id: run.id.clone(),
            template_id: plan.template_id.clone(),
            template_kind: plan.template_kind.clone(),
            platform: plan.platform,
        });
        self.metadata
            .run_started(&run.id, &plan.template_kind, plan.platform)
            .await;
        controller.register_polling(&run.id).await;

        self.drive_run(user_id, &controller, &run.id, &plan).await;

        controller.unregister_polling(&run.id).await;
        *self.active.write().await = None;
    }

    async fn drive_run(
        &mut self,
        user_id: &str,
        controller: &Arc<dyn BotController>,
        run_id: &str,
        plan: &RunPlan,
    ) {
        if let Err(e) = self
            .runs
            .set_status(run_id, RunStatus::Running, Some(Utc::now()), None)
            .await
        {
            error!(run_id, "Failed to mark run running: {e}");
            self.finalize_failed(run_id).await;
            return;
        }

        if let Some(provider) = &plan.llm_provider {
            let provider = provider.clone();
            if !self.wait_for_credentials(run_id, &provider).await {
                warn!(run_id, %provider, "LLM credentials never arrived; failing run");
                self.finalize_failed(run_id).await;
                return;
            }
        }

        let outcome = controller.launch(user_id, run_id, &plan.payload).await;
        if !outcome.success {
            warn!(run_id, message = %outcome.message, "Bot launch rejected");
            self.finalize_failed(run_id).await;
            return;
        }
        info!(run_id, "Bot launched");

        // A successful launch proves the template is usable again; lift any
        // verification block from an earlier run.
        if let Err(e) = self.templates.unblock(&plan.template_id).await {
            warn!(template_id = %plan.template_id, "Failed to unblock template: {e}");
        }

        let verdict =
            watch_for_completion(controller, run_id, &self.config, &mut self.shutdown_rx).await;

        match verdict {
            WatchVerdict::Completed => {
                if let Err(e) = self
                    .runs
                    .set_status(run_id, RunStatus::Completed, None, Some(Utc::now()))
                    .await
                {
                    error!(run_id, "Failed to mark run completed: {e}");
                }
                self.record_last_run(run_id).await;
                self.metadata.run_completed(run_id).await;
                info!(run_id, "Run completed");
            }
            WatchVerdict::VerificationRequired => {
                if let Err(e) = self.templates.block(&plan.template_id).await {
                    warn!(template_id = %plan.template_id, "Failed to block template: {e}");
                }
                if let Err(e) = self
                    .runs
                    .set_status(run_id, RunStatus::Stopped, None, Some(Utc::now()))
                    .await
                {
                    error!(run_id, "Failed to mark run stopped: {e}");
                }
                self.record_last_run(run_id).await;
                self.metadata.run_stopped(run_id).await;
                warn!(
                    run_id,
                    template_id = %plan.template_id,
                    "Run hit a verification challenge; template blocked"
                );
            }
            WatchVerdict::Cancelled => {
                controller.request_stop(run_id).await;
                if let Err(e) = self
                    .runs
                    .set_status(run_id, RunStatus::Stopped, None, Some(Utc::now()))
                    .await
                {
                    debug!(run_id, "Run already finalized during shutdown: {e}");
                }
                self.metadata.run_stopped(run_id).await;
                info!(run_id, "Run stopped by shutdown");
            }
        }
    }

    async fn finalize_failed(&self, run_id: &str) {
        if let Err(e) = self
            .runs
            .set_status(run_id, RunStatus::Failed, None, Some(Utc::now()))
            .await
        {
            error!(run_id, "Failed to mark run failed: {e}");
        }
        self.metadata.run_failed(run_id).await;
    }

    async fn record_last_run(&self, run_id: &str) {
        if let Err(e) = self
            .settings
            .update(SettingsUpdate::new().with_last_run_id(run_id))
            .await
        {
            warn!(run_id, "Failed to record last run id: {e}");
        }
    }

    /// Poll for provisioned credentials within the configured bound.
    /// Returns false on timeout, shutdown, or a missing credential store.
    async fn wait_for_credentials(&mut self, run_id: &str, provider: &str) -> bool {
        let store = match self.credentials.as_ref() {
            Some(store) => Arc::clone(store),
            None => {
                warn!(run_id, provider, "No credential store configured");
                return false;
            }
        };

        let deadline = tokio::time::Instant::now() + self.config.credentials_wait_timeout();
        loop {
            if store.load(run_id, provider).await.is_some() {
                info!(run_id, provider, "LLM credentials provisioned");
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            if self.sleep(self.config.credentials_poll_interval()).await {
                return false;
            }
        }
    }

    /// Interruptible sleep; true when stop was requested.
    ///
    /// The broadcast message is consumed by whichever wait is in flight
    /// when `stop()` fires, so later waits must rely on the running flag.
    async fn sleep(&mut self, duration: Duration) -> bool {
        if !self.running.load(Ordering::Relaxed) {
            return true;
        }
        sleep_or_shutdown(duration, &mut self.shutdown_rx).await
    }
}
