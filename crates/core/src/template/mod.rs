//! Template registry seam.
//!
//! Templates are user-created automation blueprints; they can be deleted at
//! any time, so the orchestrator re-validates existence on every cycle and
//! never caches validity.

mod gateway;

use async_trait::async_trait;
use thiserror::Error;

pub use gateway::GatewayTemplateRegistry;

/// Error type for template registry operations.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The backing service rejected the request.
    #[error("template backend error: {0}")]
    Backend(String),

    /// The response could not be decoded.
    #[error("invalid template payload: {0}")]
    InvalidPayload(String),
}

/// Source of truth for template existence and blocking.
#[async_trait]
pub trait TemplateRegistry: Send + Sync {
    /// Filter the given ids down to the ones that still exist, preserving
    /// the input order.
    async fn list_existing(&self, ids: &[String]) -> Result<Vec<String>, TemplateError>;

    /// Exclude a template from scheduling after a verification challenge.
    async fn block(&self, template_id: &str) -> Result<(), TemplateError>;

    /// Re-admit a template to scheduling.
    async fn unblock(&self, template_id: &str) -> Result<(), TemplateError>;
}
