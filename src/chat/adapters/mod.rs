//! Adapter implementations of the chat ports.

pub mod http;
pub mod memory;
pub mod postgres;
