//! HTTP adapters for the collaborating user and game services.

mod existence;

pub use existence::HttpExistenceCheck;
