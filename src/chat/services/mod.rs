//! Application services built on the chat ports.

mod readiness;

pub use readiness::{ReadinessError, ReadinessProbe};
