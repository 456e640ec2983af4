//! Diesel row models for chat persistence.

use super::schema::{conversations, messages};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Message table row, used for both reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MessageRow {
    /// Store-assigned identifier.
    pub id: String,
    /// Authoring user.
    pub user_id: String,
    /// Owning conversation.
    pub conversation_id: String,
    /// Message content.
    pub text: String,
    /// Creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_on: DateTime<Utc>,
}

/// Conversation table row, used for both reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = conversations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ConversationRow {
    /// Store-assigned identifier.
    pub id: String,
    /// Participants as a JSON array.
    pub user_ids: Value,
    /// Game scope; empty when unscoped.
    pub game_id: String,
    /// Creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_on: DateTime<Utc>,
}
