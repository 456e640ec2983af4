//! The message entity and the input used to create one.

use super::{ConversationId, MessageId, UserId, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single authored text entry belonging to exactly one conversation.
///
/// Only the store creates messages: it assigns the identifier and stamps
/// both timestamps. Callers describe content through [`NewMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    user_id: UserId,
    conversation_id: ConversationId,
    text: String,
    created_on: DateTime<Utc>,
    updated_on: DateTime<Utc>,
}

/// Stored message fields used to rebuild a [`Message`] from persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedMessageData {
    /// Store-assigned identifier.
    pub id: MessageId,
    /// Authoring user.
    pub user_id: UserId,
    /// Owning conversation.
    pub conversation_id: ConversationId,
    /// Message content.
    pub text: String,
    /// Creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_on: DateTime<Utc>,
}

impl Message {
    /// Builds a freshly stored message from validated input.
    pub(crate) fn create(input: NewMessage, id: MessageId, now: DateTime<Utc>) -> Self {
        let NewMessage {
            user_id,
            conversation_id,
            text,
        } = input;
        Self {
            id,
            user_id,
            conversation_id,
            text,
            created_on: now,
            updated_on: now,
        }
    }

    /// Reconstructs a message loaded from a backend.
    #[must_use]
    pub fn from_persisted(data: PersistedMessageData) -> Self {
        Self {
            id: data.id,
            user_id: data.user_id,
            conversation_id: data.conversation_id,
            text: data.text,
            created_on: data.created_on,
            updated_on: data.updated_on,
        }
    }

    /// Returns the message identifier.
    #[must_use]
    pub const fn id(&self) -> &MessageId {
        &self.id
    }

    /// Returns the authoring user.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the owning conversation.
    #[must_use]
    pub const fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    /// Returns the message text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_on(&self) -> DateTime<Utc> {
        self.created_on
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_on(&self) -> DateTime<Utc> {
        self.updated_on
    }
}

/// Caller-owned content for a new message.
///
/// Holding a `NewMessage` proves the input passed shape validation; JSON
/// decoding goes through the same checks.
///
/// # Examples
///
/// ```
/// use text_chat_store::chat::domain::{NewMessage, ValidationError};
///
/// assert!(NewMessage::new("user-1", "conv-1", "hello").is_ok());
/// assert_eq!(
///     NewMessage::new("user-1", "conv-1", "   "),
///     Err(ValidationError::EmptyText)
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNewMessage")]
pub struct NewMessage {
    user_id: UserId,
    conversation_id: ConversationId,
    text: String,
}

impl NewMessage {
    /// Creates a validated message input.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyIdentifier`] when the user or
    /// conversation identifier is blank, and [`ValidationError::EmptyText`]
    /// when the text is blank.
    pub fn new(
        user_id: impl Into<String>,
        conversation_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let user = user_id.into();
        let conversation = conversation_id.into();
        let content = text.into();

        if user.trim().is_empty() {
            return Err(ValidationError::EmptyIdentifier("user_id"));
        }
        if conversation.trim().is_empty() {
            return Err(ValidationError::EmptyIdentifier("conversation_id"));
        }
        if content.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }

        Ok(Self {
            user_id: UserId::new(user),
            conversation_id: ConversationId::new(conversation),
            text: content,
        })
    }

    /// Returns the authoring user.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the target conversation.
    #[must_use]
    pub const fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    /// Returns the message text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Deserialize)]
struct RawNewMessage {
    user_id: String,
    conversation_id: String,
    text: String,
}

impl TryFrom<RawNewMessage> for NewMessage {
    type Error = ValidationError;

    fn try_from(raw: RawNewMessage) -> Result<Self, Self::Error> {
        Self::new(raw.user_id, raw.conversation_id, raw.text)
    }
}
