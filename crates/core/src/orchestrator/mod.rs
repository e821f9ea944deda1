//! The infinite hunt orchestrator.
//!
//! Owns the background loop that turns the persisted hunt settings into a
//! sequence of isolated, single-flight automation runs:
//! - **Cycle**: one pass over the enabled templates, one run at a time
//! - **Completion**: inferred by polling controller-exposed bot state
//! - **Blocking**: templates that hit verification challenges are excluded
//!   from scheduling until a later launch of that same template succeeds

mod config;
mod runner;
mod types;
mod watcher;

pub use config::ManagerConfig;
pub use runner::HuntManager;
pub use types::{ActiveRun, HuntError, ManagerStatus, WatchVerdict};
