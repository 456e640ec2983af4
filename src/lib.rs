//! Text-chat record store for a multiplayer-game backend.
//!
//! This crate persists chat messages and conversations and enforces
//! referential integrity between them and against two services it does not
//! own: a user directory and a game registry.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: entities, identifiers, and shape validation
//! - **Ports**: the [`chat::ports::TextChatStore`] backend contract and the
//!   [`chat::ports::ExistenceCheck`] collaborator capability
//! - **Adapters**: in-memory and `PostgreSQL` stores, plus in-memory and
//!   HTTP existence checks
//!
//! # Modules
//!
//! - [`chat`]: the store contract, its backends, and referential validation
//! - [`config`]: store and collaborator configuration

pub mod chat;
pub mod config;
