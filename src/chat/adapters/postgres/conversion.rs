//! Conversions between row models and domain entities.

use super::models::{ConversationRow, MessageRow};
use crate::chat::{
    domain::{
        Conversation, ConversationId, GameId, Message, MessageId, PersistedConversationData,
        PersistedMessageData, UserId,
    },
    error::StoreError,
    ports::StoreResult,
};

pub(super) fn message_to_row(message: &Message) -> MessageRow {
    MessageRow {
        id: message.id().as_str().to_owned(),
        user_id: message.user_id().as_str().to_owned(),
        conversation_id: message.conversation_id().as_str().to_owned(),
        text: message.text().to_owned(),
        created_on: message.created_on(),
        updated_on: message.updated_on(),
    }
}

/// Rebuilds a message from its row.
///
/// # Errors
///
/// Returns [`StoreError::Corrupt`] when a required column is blank.
pub(super) fn row_to_message(row: MessageRow) -> StoreResult<Message> {
    if row.user_id.is_empty() || row.conversation_id.is_empty() {
        return Err(StoreError::corrupt(format!(
            "message {} is missing its author or conversation",
            row.id
        )));
    }

    Ok(Message::from_persisted(PersistedMessageData {
        id: MessageId::new(row.id),
        user_id: UserId::new(row.user_id),
        conversation_id: ConversationId::new(row.conversation_id),
        text: row.text,
        created_on: row.created_on,
        updated_on: row.updated_on,
    }))
}

pub(super) fn conversation_to_row(conversation: &Conversation) -> StoreResult<ConversationRow> {
    Ok(ConversationRow {
        id: conversation.id().as_str().to_owned(),
        user_ids: user_ids_to_json(conversation.user_ids())?,
        game_id: conversation.game_id().as_str().to_owned(),
        created_on: conversation.created_on(),
        updated_on: conversation.updated_on(),
    })
}

pub(super) fn user_ids_to_json(user_ids: &[UserId]) -> StoreResult<serde_json::Value> {
    serde_json::to_value(user_ids).map_err(|err| StoreError::corrupt(err.to_string()))
}

/// Rebuilds a conversation from its row.
///
/// # Errors
///
/// Returns [`StoreError::Corrupt`] when `user_ids` is not a non-empty array
/// of strings.
pub(super) fn row_to_conversation(row: ConversationRow) -> StoreResult<Conversation> {
    let user_ids: Vec<UserId> = serde_json::from_value(row.user_ids).map_err(|err| {
        StoreError::corrupt(format!("conversation {} participants: {err}", row.id))
    })?;
    if user_ids.is_empty() {
        return Err(StoreError::corrupt(format!(
            "conversation {} has no participants",
            row.id
        )));
    }

    let game_id = if row.game_id.is_empty() {
        GameId::none()
    } else {
        GameId::new(row.game_id)
    };

    Ok(Conversation::from_persisted(PersistedConversationData {
        id: ConversationId::new(row.id),
        user_ids,
        game_id,
        created_on: row.created_on,
        updated_on: row.updated_on,
    }))
}
