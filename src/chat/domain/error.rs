//! Shape validation errors for caller-supplied chat inputs.

use thiserror::Error;

/// Errors returned while constructing store inputs.
///
/// These cover shape only. Whether a referenced user, game, or conversation
/// exists is decided by the store at write time.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required identifier field is empty or whitespace-only.
    #[error("{0} must not be empty")]
    EmptyIdentifier(&'static str),

    /// The message text is empty or whitespace-only.
    #[error("message text must not be empty")]
    EmptyText,

    /// A conversation must have at least one participant.
    #[error("conversation must have at least one participant")]
    NoParticipants,
}
