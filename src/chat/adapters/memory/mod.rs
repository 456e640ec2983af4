//! In-memory adapters for tests and local development.

mod existence;
mod store;

pub use existence::InMemoryExistenceCheck;
pub use store::InMemoryTextChatStore;
