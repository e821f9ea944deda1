//! Run records and the persistence seam.

mod store;
mod types;

pub use store::{NewRun, RunStore, RunStoreError};
pub use types::{Run, RunStatus};
