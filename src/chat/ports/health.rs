//! Readiness port for collaborating services.

use super::existence::ExistenceResult;
use crate::chat::context::OperationContext;
use async_trait::async_trait;

/// Capability reporting whether the user directory is ready to answer.
#[async_trait]
pub trait UpstreamHealth: Send + Sync {
    /// Probes the collaborator.
    ///
    /// # Errors
    ///
    /// Returns [`ExistenceError`](super::ExistenceError) when the
    /// collaborator is unreachable, not ready, or the deadline elapses.
    async fn ready(&self, ctx: &OperationContext) -> ExistenceResult<()>;
}
