//! Domain model for chat storage.
//!
//! Entities are created by the store only. Callers describe what they want
//! stored through validated inputs; referential checks happen later, inside
//! the store.

use chrono::{DateTime, SubsecRound, Utc};
use mockable::Clock;

mod conversation;
mod error;
mod ids;
mod message;

pub use conversation::{
    Conversation, MembershipUpdate, NewConversation, PersistedConversationData,
};
pub use error::ValidationError;
pub use ids::{ConversationId, GameId, MessageId, UserId};
pub use message::{Message, NewMessage, PersistedMessageData};

/// Reads `clock` truncated to microseconds, the finest precision
/// `PostgreSQL` stores, so a written entity equals what a later read
/// returns on every backend.
pub(crate) fn stamp(clock: &(dyn Clock + Send + Sync)) -> DateTime<Utc> {
    clock.utc().trunc_subsecs(6)
}
