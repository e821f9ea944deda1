//! Persisted hunt settings and the store seam.
//!
//! The settings record is the user-facing configuration for the infinite
//! hunt loop: which templates run, in what order, and the selections that
//! must override anything the config generator suggests.

mod store;
mod types;

pub use store::{SettingsError, SettingsStore, SettingsUpdate};
pub use types::{HuntSettings, HuntStatus, SettingsRecord};
