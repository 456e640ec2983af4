//! Error taxonomy shared by every store backend.
//!
//! Backends classify foreign failures (database, HTTP, serialisation) into
//! these variants at the adapter boundary so callers can map each one to a
//! user-visible code deterministically.

use super::domain::{ConversationId, GameId, MessageId, UserId};
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by [`TextChatStore`](super::ports::TextChatStore)
/// operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// No message matched the lookup.
    #[error("message not found: {0}")]
    MessageNotFound(MessageId),

    /// The conversation does not exist in this store.
    #[error("conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    /// The user directory does not know this user.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The game registry does not know this game.
    #[error("game not found: {0}")]
    GameNotFound(GameId),

    /// The backend could not be established. Callers must not continue.
    #[error("connection failure: {0}")]
    Connection(String),

    /// A transient backend or collaborator failure.
    #[error("unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),

    /// The caller's deadline elapsed before the operation finished.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Stored data could not be decoded into an entity.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Wraps a transient failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }

    /// Creates a connection failure.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Creates a corrupt-record error.
    #[must_use]
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt(message.into())
    }

    /// Returns `true` for message and conversation not-found errors.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::MessageNotFound(_) | Self::ConversationNotFound(_)
        )
    }

    /// Returns `true` when a referenced user or game is missing.
    #[must_use]
    pub const fn is_referential(&self) -> bool {
        matches!(self, Self::UserNotFound(_) | Self::GameNotFound(_))
    }

    /// Returns `true` when retrying later may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::DeadlineExceeded)
    }
}

/// Lock poisoning surfaced as a transient failure.
pub(crate) fn lock_poisoned(err: impl std::fmt::Display) -> StoreError {
    StoreError::unavailable(std::io::Error::other(format!("lock poisoned: {err}")))
}
