//! Existence collaborator port.
//!
//! Users and games live in services this crate does not own. The store only
//! needs one question answered about them: does this identifier exist?

use crate::chat::context::OperationContext;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for existence checks.
pub type ExistenceResult<T> = Result<T, ExistenceError>;

/// Kind of externally owned entity being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A user in the user directory.
    User,
    /// A game in the game registry.
    Game,
}

impl EntityKind {
    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Game => "game",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability answering whether an external entity exists.
///
/// `Ok(false)` means the collaborator confirmed the entity is absent.
/// `Err(_)` means existence could not be confirmed either way; the
/// [`UnconfirmedPolicy`](crate::chat::validation::UnconfirmedPolicy) decides
/// what a write does with that.
#[async_trait]
pub trait ExistenceCheck: Send + Sync {
    /// Checks whether `id` of the given `kind` exists.
    ///
    /// Implementations must not outlive `ctx`'s deadline.
    ///
    /// # Errors
    ///
    /// Returns [`ExistenceError`] when the collaborator cannot be reached or
    /// the deadline elapses.
    async fn exists(
        &self,
        ctx: &OperationContext,
        kind: EntityKind,
        id: &str,
    ) -> ExistenceResult<bool>;
}

/// Reasons an existence check could not be answered.
#[derive(Debug, Clone, Error)]
pub enum ExistenceError {
    /// The caller's deadline elapsed before the collaborator answered.
    #[error("{0} existence check timed out")]
    DeadlineExceeded(EntityKind),

    /// The collaborator could not be reached or answered unusably.
    #[error("{kind} existence check failed: {cause}")]
    Unreachable {
        /// Entity kind being checked.
        kind: EntityKind,
        /// Underlying transport failure.
        cause: Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl ExistenceError {
    /// Wraps a transport failure.
    pub fn unreachable(
        kind: EntityKind,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Unreachable {
            kind,
            cause: Arc::new(err),
        }
    }
}
