//! The conversation entity and the inputs that create or update one.

use super::{ConversationId, GameId, UserId, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A group of participant users, optionally scoped to a game.
///
/// Participants keep the order they were supplied in, which matters for
/// display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    id: ConversationId,
    #[serde(rename = "user_id")]
    user_ids: Vec<UserId>,
    game_id: GameId,
    created_on: DateTime<Utc>,
    updated_on: DateTime<Utc>,
}

/// Stored conversation fields used to rebuild a [`Conversation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedConversationData {
    /// Store-assigned identifier.
    pub id: ConversationId,
    /// Participants in display order.
    pub user_ids: Vec<UserId>,
    /// Game scope, empty for none.
    pub game_id: GameId,
    /// Creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_on: DateTime<Utc>,
}

impl Conversation {
    /// Builds a freshly stored conversation from validated input.
    pub(crate) fn create(input: NewConversation, id: ConversationId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_ids: input.user_ids,
            game_id: input.game_id,
            created_on: now,
            updated_on: now,
        }
    }

    /// Reconstructs a conversation loaded from a backend.
    #[must_use]
    pub fn from_persisted(data: PersistedConversationData) -> Self {
        Self {
            id: data.id,
            user_ids: data.user_ids,
            game_id: data.game_id,
            created_on: data.created_on,
            updated_on: data.updated_on,
        }
    }

    /// Replaces the participant list wholesale and refreshes `updated_on`.
    /// The game scope set at creation is kept.
    pub(crate) fn replace_membership(&mut self, update: MembershipUpdate, now: DateTime<Utc>) {
        self.user_ids = update.user_ids;
        self.updated_on = now;
    }

    /// Returns the conversation identifier.
    #[must_use]
    pub const fn id(&self) -> &ConversationId {
        &self.id
    }

    /// Returns the participants in display order.
    #[must_use]
    pub fn user_ids(&self) -> &[UserId] {
        &self.user_ids
    }

    /// Returns the game scope; see [`GameId::is_none`].
    #[must_use]
    pub const fn game_id(&self) -> &GameId {
        &self.game_id
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

/// Caller-owned content for a new conversation.
///
/// # Examples
///
/// ```
/// use text_chat_store::chat::domain::{NewConversation, ValidationError};
///
/// let input = NewConversation::new(["u1", "u2"], "").expect("valid input");
/// assert!(input.game_id().is_none());
///
/// let empty: [&str; 0] = [];
/// assert_eq!(
///     NewConversation::new(empty, ""),
///     Err(ValidationError::NoParticipants)
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNewConversation")]
pub struct NewConversation {
    #[serde(rename = "user_id")]
    user_ids: Vec<UserId>,
    game_id: GameId,
}

impl NewConversation {
    /// Creates a validated conversation input.
    ///
    /// A blank `game_id` means the conversation is not scoped to a game.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NoParticipants`] when `user_ids` is empty
    /// and [`ValidationError::EmptyIdentifier`] when any entry is blank.
    pub fn new<I, S>(user_ids: I, game_id: impl Into<String>) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            user_ids: participants(user_ids)?,
            game_id: game_scope(game_id.into()),
        })
    }

    /// Returns the requested participants.
    #[must_use]
    pub fn user_ids(&self) -> &[UserId] {
        &self.user_ids
    }

    /// Returns the requested game scope.
    #[must_use]
    pub const fn game_id(&self) -> &GameId {
        &self.game_id
    }
}

/// Replacement membership for an existing conversation.
///
/// The store swaps the whole participant list; it never merges with the
/// previous membership. The game reference is checked again but the
/// conversation keeps the game scope it was created with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMembershipUpdate")]
pub struct MembershipUpdate {
    #[serde(rename = "id")]
    conversation_id: ConversationId,
    #[serde(rename = "user_id")]
    user_ids: Vec<UserId>,
    game_id: GameId,
}

impl MembershipUpdate {
    /// Creates a validated membership replacement.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyIdentifier`] when the conversation
    /// identifier or any participant is blank, and
    /// [`ValidationError::NoParticipants`] when `user_ids` is empty.
    pub fn new<I, S>(
        conversation_id: impl Into<String>,
        user_ids: I,
        game_id: impl Into<String>,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let conversation = conversation_id.into();
        if conversation.trim().is_empty() {
            return Err(ValidationError::EmptyIdentifier("id"));
        }
        Ok(Self {
            conversation_id: ConversationId::new(conversation),
            user_ids: participants(user_ids)?,
            game_id: game_scope(game_id.into()),
        })
    }

    /// Returns the conversation being updated.
    #[must_use]
    pub const fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    /// Returns the replacement participants.
    #[must_use]
    pub fn user_ids(&self) -> &[UserId] {
        &self.user_ids
    }

    /// Returns the game reference checked alongside the participants.
    #[must_use]
    pub const fn game_id(&self) -> &GameId {
        &self.game_id
    }
}

fn participants<I, S>(user_ids: I) -> Result<Vec<UserId>, ValidationError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let ids = user_ids
        .into_iter()
        .map(|id| {
            let raw = id.into();
            if raw.trim().is_empty() {
                Err(ValidationError::EmptyIdentifier("user_id"))
            } else {
                Ok(UserId::new(raw))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    if ids.is_empty() {
        return Err(ValidationError::NoParticipants);
    }
    Ok(ids)
}

fn game_scope(raw: String) -> GameId {
    if raw.trim().is_empty() {
        GameId::none()
    } else {
        GameId::new(raw)
    }
}

#[derive(Deserialize)]
struct RawNewConversation {
    user_id: Vec<String>,
    #[serde(default)]
    game_id: String,
}

impl TryFrom<RawNewConversation> for NewConversation {
    type Error = ValidationError;

    fn try_from(raw: RawNewConversation) -> Result<Self, Self::Error> {
        Self::new(raw.user_id, raw.game_id)
    }
}

#[derive(Deserialize)]
struct RawMembershipUpdate {
    id: String,
    user_id: Vec<String>,
    #[serde(default)]
    game_id: String,
}

impl TryFrom<RawMembershipUpdate> for MembershipUpdate {
    type Error = ValidationError;

    fn try_from(raw: RawMembershipUpdate) -> Result<Self, Self::Error> {
        Self::new(raw.id, raw.user_id, raw.game_id)
    }
}
