//! The store backend contract.
//!
//! Every backend implements the same operations with the same error
//! semantics, so callers and tests can swap the in-memory store for the
//! persistent one without behavioural differences.

use crate::chat::{
    context::OperationContext,
    domain::{
        Conversation, ConversationId, MembershipUpdate, Message, MessageId, NewConversation,
        NewMessage,
    },
    error::StoreError,
};
use async_trait::async_trait;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence contract for messages and conversations.
///
/// # Implementation Notes
///
/// Implementations must ensure:
/// - identifiers and timestamps are assigned by the store, never the caller
/// - referential checks run before any mutation, in the order conversation,
///   users, game (see [`ReferentialValidator`])
/// - a failed or cancelled operation leaves no partial write
/// - concurrent callers cannot corrupt the collections
///
/// [`ReferentialValidator`]: crate::chat::validation::ReferentialValidator
#[async_trait]
pub trait TextChatStore: Send + Sync {
    /// Retrieves a message by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MessageNotFound`] when no message matches.
    async fn get_message_by_id(
        &self,
        ctx: &OperationContext,
        id: &MessageId,
    ) -> StoreResult<Message>;

    /// Retrieves a conversation by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ConversationNotFound`] when no conversation
    /// matches.
    async fn get_conversation_by_id(
        &self,
        ctx: &OperationContext,
        id: &ConversationId,
    ) -> StoreResult<Conversation>;

    /// Retrieves every message of a conversation, oldest first.
    ///
    /// An empty result is reported as [`StoreError::MessageNotFound`] keyed
    /// by the conversation identifier, so "no messages yet" and "no such
    /// conversation" look the same. Existing callers depend on this.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MessageNotFound`] when nothing matches.
    async fn get_messages_by_conversation_id(
        &self,
        ctx: &OperationContext,
        id: &ConversationId,
    ) -> StoreResult<Vec<Message>>;

    /// Stores a new message after checking its conversation and author.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ConversationNotFound`] or
    /// [`StoreError::UserNotFound`], checked in that order.
    async fn add_message(
        &self,
        ctx: &OperationContext,
        message: NewMessage,
    ) -> StoreResult<Message>;

    /// Stores a new conversation after checking every participant and the
    /// game.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UserNotFound`] for the first unknown
    /// participant, then [`StoreError::GameNotFound`].
    async fn add_conversation(
        &self,
        ctx: &OperationContext,
        conversation: NewConversation,
    ) -> StoreResult<Conversation>;

    /// Replaces the participant list of an existing conversation after
    /// checking every participant and the update's game reference. The
    /// stored game scope is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ConversationNotFound`],
    /// [`StoreError::UserNotFound`], or [`StoreError::GameNotFound`],
    /// checked in that order.
    async fn add_user_to_conversation(
        &self,
        ctx: &OperationContext,
        update: MembershipUpdate,
    ) -> StoreResult<Conversation>;

    /// Deletes a message.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MessageNotFound`] when no message matches.
    async fn delete_message(&self, ctx: &OperationContext, id: &MessageId) -> StoreResult<()>;

    /// Deletes a conversation. Its messages are left in place.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ConversationNotFound`] when no conversation
    /// matches.
    async fn delete_conversation(
        &self,
        ctx: &OperationContext,
        id: &ConversationId,
    ) -> StoreResult<()>;

    /// Establishes backend resources.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`]; the caller must not proceed.
    async fn connect(&self) -> StoreResult<()>;

    /// Liveness probe for readiness checks, bounded by the caller's
    /// deadline.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the backend cannot answer
    /// and [`StoreError::DeadlineExceeded`] when the deadline passes first.
    async fn ping_db(&self, ctx: &OperationContext) -> StoreResult<()>;

    /// Releases backend resources. Idempotent and best-effort; failures
    /// are logged, never returned.
    async fn close_db(&self);
}
