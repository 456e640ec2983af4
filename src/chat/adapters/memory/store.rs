//! In-memory implementation of the [`TextChatStore`] port.
//!
//! Two ordered vectors are the single source of truth, searched by linear
//! scan. Suitable for unit tests and local development; nothing survives the
//! process.

use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};

use crate::chat::{
    context::OperationContext,
    domain::{
        Conversation, ConversationId, MembershipUpdate, Message, MessageId, NewConversation,
        NewMessage, stamp,
    },
    error::{StoreError, lock_poisoned},
    ports::{StoreResult, TextChatStore},
    validation::ReferentialValidator,
};

/// In-memory implementation of [`TextChatStore`].
///
/// Clones share the same collections, so one instance can be handed to many
/// callers; separate instances never share state. The internal lock is
/// never held across an `.await`: writes run their external checks first,
/// then take the write lock, re-check local preconditions, and mutate.
#[derive(Clone)]
pub struct InMemoryTextChatStore {
    state: Arc<RwLock<InMemoryChatState>>,
    validator: ReferentialValidator,
    clock: Arc<dyn Clock + Send + Sync>,
}

#[derive(Debug, Default)]
struct InMemoryChatState {
    messages: Vec<Message>,
    conversations: Vec<Conversation>,
}

impl InMemoryChatState {
    fn message_index(&self, id: &MessageId) -> Option<usize> {
        self.messages.iter().position(|message| message.id() == id)
    }

    fn conversation_index(&self, id: &ConversationId) -> Option<usize> {
        self.conversations
            .iter()
            .position(|conversation| conversation.id() == id)
    }

    fn has_conversation(&self, id: &ConversationId) -> bool {
        self.conversation_index(id).is_some()
    }
}

impl fmt::Debug for InMemoryTextChatStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryTextChatStore")
            .field("state", &self.state)
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

impl InMemoryTextChatStore {
    /// Creates an empty store stamping entities with the system clock.
    #[must_use]
    pub fn new(validator: ReferentialValidator) -> Self {
        Self {
            state: Arc::default(),
            validator,
            clock: Arc::new(DefaultClock),
        }
    }

    /// Replaces the clock used for `created_on`/`updated_on`.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the stored collections with pre-existing entities.
    ///
    /// Seeded entities bypass referential checks; they are taken as
    /// already stored.
    #[must_use]
    pub fn with_seed(
        mut self,
        conversations: impl IntoIterator<Item = Conversation>,
        messages: impl IntoIterator<Item = Message>,
    ) -> Self {
        self.state = Arc::new(RwLock::new(InMemoryChatState {
            messages: messages.into_iter().collect(),
            conversations: conversations.into_iter().collect(),
        }));
        self
    }

    /// Returns the number of stored messages.
    ///
    /// Returns `0` if the internal lock is poisoned. For error-propagating
    /// access, use the store trait methods instead.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.state
            .read()
            .map(|guard| guard.messages.len())
            .unwrap_or(0)
    }

    /// Returns the number of stored conversations.
    ///
    /// Returns `0` if the internal lock is poisoned.
    #[must_use]
    pub fn conversation_count(&self) -> usize {
        self.state
            .read()
            .map(|guard| guard.conversations.len())
            .unwrap_or(0)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, InMemoryChatState>> {
        self.state.read().map_err(lock_poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, InMemoryChatState>> {
        self.state.write().map_err(lock_poisoned)
    }

    fn require_conversation(&self, id: &ConversationId) -> StoreResult<()> {
        if self.read()?.has_conversation(id) {
            Ok(())
        } else {
            Err(StoreError::ConversationNotFound(id.clone()))
        }
    }
}

#[async_trait]
impl TextChatStore for InMemoryTextChatStore {
    async fn get_message_by_id(
        &self,
        ctx: &OperationContext,
        id: &MessageId,
    ) -> StoreResult<Message> {
        ctx.ensure_live()?;
        let state = self.read()?;
        state
            .message_index(id)
            .and_then(|index| state.messages.get(index))
            .cloned()
            .ok_or_else(|| StoreError::MessageNotFound(id.clone()))
    }

    async fn get_conversation_by_id(
        &self,
        ctx: &OperationContext,
        id: &ConversationId,
    ) -> StoreResult<Conversation> {
        ctx.ensure_live()?;
        let state = self.read()?;
        state
            .conversation_index(id)
            .and_then(|index| state.conversations.get(index))
            .cloned()
            .ok_or_else(|| StoreError::ConversationNotFound(id.clone()))
    }

    async fn get_messages_by_conversation_id(
        &self,
        ctx: &OperationContext,
        id: &ConversationId,
    ) -> StoreResult<Vec<Message>> {
        ctx.ensure_live()?;
        let mut messages: Vec<Message> = self
            .read()?
            .messages
            .iter()
            .filter(|message| message.conversation_id() == id)
            .cloned()
            .collect();

        if messages.is_empty() {
            tracing::debug!(conversation_id = %id, "no messages for conversation");
            return Err(StoreError::MessageNotFound(MessageId::new(id.as_str())));
        }

        // Stable sort keeps insertion order for equal timestamps.
        messages.sort_by_key(Message::created_on);
        Ok(messages)
    }

    async fn add_message(
        &self,
        ctx: &OperationContext,
        message: NewMessage,
    ) -> StoreResult<Message> {
        ctx.ensure_live()?;
        self.require_conversation(message.conversation_id())?;
        self.validator.check_user(ctx, message.user_id()).await?;
        ctx.ensure_live()?;

        let now = stamp(self.clock.as_ref());
        let stored = Message::create(message, MessageId::generate(), now);

        let mut state = self.write()?;
        // The conversation may have been deleted while the user check ran.
        if !state.has_conversation(stored.conversation_id()) {
            return Err(StoreError::ConversationNotFound(
                stored.conversation_id().clone(),
            ));
        }
        state.messages.push(stored.clone());
        drop(state);

        tracing::info!(
            message_id = %stored.id(),
            conversation_id = %stored.conversation_id(),
            "inserted message"
        );
        Ok(stored)
    }

    async fn add_conversation(
        &self,
        ctx: &OperationContext,
        conversation: NewConversation,
    ) -> StoreResult<Conversation> {
        ctx.ensure_live()?;
        self.validator
            .check_membership(ctx, conversation.user_ids(), conversation.game_id())
            .await?;
        ctx.ensure_live()?;

        let now = stamp(self.clock.as_ref());
        let stored = Conversation::create(conversation, ConversationId::generate(), now);
        self.write()?.conversations.push(stored.clone());

        tracing::info!(conversation_id = %stored.id(), "inserted conversation");
        Ok(stored)
    }

    async fn add_user_to_conversation(
        &self,
        ctx: &OperationContext,
        update: MembershipUpdate,
    ) -> StoreResult<Conversation> {
        ctx.ensure_live()?;
        self.require_conversation(update.conversation_id())?;
        self.validator
            .check_membership(ctx, update.user_ids(), update.game_id())
            .await?;
        ctx.ensure_live()?;

        let now = stamp(self.clock.as_ref());
        let conversation_id = update.conversation_id().clone();
        let mut state = self.write()?;
        let conversation = state
            .conversation_index(&conversation_id)
            .and_then(|index| state.conversations.get_mut(index))
            .ok_or_else(|| StoreError::ConversationNotFound(conversation_id.clone()))?;
        conversation.replace_membership(update, now);
        let updated = conversation.clone();
        drop(state);

        tracing::info!(
            conversation_id = %conversation_id,
            members = updated.user_ids().len(),
            "replaced conversation membership"
        );
        Ok(updated)
    }

    async fn delete_message(&self, ctx: &OperationContext, id: &MessageId) -> StoreResult<()> {
        ctx.ensure_live()?;
        let mut state = self.write()?;
        let index = state
            .message_index(id)
            .ok_or_else(|| StoreError::MessageNotFound(id.clone()))?;
        state.messages.remove(index);
        drop(state);

        tracing::info!(message_id = %id, "deleted message");
        Ok(())
    }

    async fn delete_conversation(
        &self,
        ctx: &OperationContext,
        id: &ConversationId,
    ) -> StoreResult<()> {
        ctx.ensure_live()?;
        let mut state = self.write()?;
        let index = state
            .conversation_index(id)
            .ok_or_else(|| StoreError::ConversationNotFound(id.clone()))?;
        state.conversations.remove(index);
        drop(state);

        tracing::info!(conversation_id = %id, "deleted conversation");
        Ok(())
    }

    async fn connect(&self) -> StoreResult<()> {
        tracing::info!("using in-memory chat store");
        Ok(())
    }

    async fn ping_db(&self, ctx: &OperationContext) -> StoreResult<()> {
        ctx.ensure_live()?;
        self.read().map(|_| ())
    }

    async fn close_db(&self) {
        tracing::info!("in-memory chat store closed");
    }
}
