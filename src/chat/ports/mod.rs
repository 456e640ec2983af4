//! Port trait definitions for chat storage.
//!
//! Ports define the abstract interfaces the store requires from
//! infrastructure and the contract it offers to callers.

pub mod existence;
pub mod health;
pub mod store;

pub use existence::{EntityKind, ExistenceCheck, ExistenceError, ExistenceResult};
pub use health::UpstreamHealth;
pub use store::{StoreResult, TextChatStore};
