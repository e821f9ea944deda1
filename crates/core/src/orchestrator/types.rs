//! Orchestrator error and status types.

use serde::Serialize;
use thiserror::Error;

use crate::generator::GeneratorError;
use crate::plan::PlanError;
use crate::platform::Platform;
use crate::run::RunStoreError;
use crate::settings::SettingsError;
use crate::template::TemplateError;

/// Error type for the hunt manager.
#[derive(Debug, Error)]
pub enum HuntError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error(transparent)]
    RunStore(#[from] RunStoreError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    /// No controller is registered for the plan's platform.
    #[error("no bot controller registered for platform: {0}")]
    NoController(Platform),

    /// Credentials for an autonomous run never arrived within the bound.
    #[error("credentials for provider {provider} not provisioned for run {run_id}")]
    MissingCredentials { run_id: String, provider: String },
}

/// The run currently in flight, if any. At most one exists.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveRun {
    pub run_id: String,
    pub template_id: String,
    pub template_kind: String,
    pub platform: Platform,
}

/// Point-in-time view of the manager for callers.
#[derive(Debug, Clone, Serialize)]
pub struct ManagerStatus {
    /// Whether the worker loop is alive.
    pub is_running: bool,
    /// Session id minted at the latest `start()`, if any.
    pub session_id: Option<String>,
    pub active_run: Option<ActiveRun>,
}

/// How a watched run terminated, as inferred from polled bot state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchVerdict {
    /// The bot ran and stopped without raising a verification challenge.
    Completed,
    /// The bot stopped after hitting an anti-automation challenge; the
    /// template must be blocked.
    VerificationRequired,
    /// The watch was interrupted by a shutdown signal before the bot
    /// finished.
    Cancelled,
}
