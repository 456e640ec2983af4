//! Message and conversation storage with referential integrity.
//!
//! # Architecture
//!
//! - **Domain**: [`domain::Message`], [`domain::Conversation`] and the
//!   validated inputs callers hand to the store
//! - **Ports**: [`ports::TextChatStore`] (backend contract) and
//!   [`ports::ExistenceCheck`] (user/game existence collaborator)
//! - **Adapters**: [`adapters::memory::InMemoryTextChatStore`],
//!   [`adapters::postgres::PostgresTextChatStore`],
//!   [`adapters::http::HttpExistenceCheck`]
//! - **Validation**: [`validation::ReferentialValidator`], shared by every
//!   backend so they report identical errors in identical order
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use text_chat_store::chat::adapters::memory::{InMemoryExistenceCheck, InMemoryTextChatStore};
//! use text_chat_store::chat::context::OperationContext;
//! use text_chat_store::chat::domain::{NewConversation, NewMessage};
//! use text_chat_store::chat::ports::TextChatStore;
//! use text_chat_store::chat::validation::ReferentialValidator;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let directory = InMemoryExistenceCheck::new().with_users(["u1", "u2"]);
//! let store = InMemoryTextChatStore::new(ReferentialValidator::new(Arc::new(directory)));
//! let ctx = OperationContext::background();
//!
//! let conversation = store
//!     .add_conversation(&ctx, NewConversation::new(["u1", "u2"], "").unwrap())
//!     .await
//!     .unwrap();
//! let message = store
//!     .add_message(&ctx, NewMessage::new("u1", conversation.id().as_str(), "hi").unwrap())
//!     .await
//!     .unwrap();
//! assert_eq!(message.text(), "hi");
//! # });
//! ```

pub mod adapters;
pub mod context;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod validation;

#[cfg(test)]
mod tests;
