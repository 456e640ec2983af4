//! `PostgreSQL` persistence for messages and conversations using Diesel.

pub(crate) mod blocking;
mod conversion;
mod models;
mod schema;
mod store;

pub use blocking::PgPool;
pub use store::{PostgresTextChatStore, SCHEMA_SQL};
