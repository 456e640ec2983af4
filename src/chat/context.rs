//! Per-operation context carrying the caller's deadline.
//!
//! Every outbound call an operation makes (database statement, existence
//! check) is bounded by the same deadline, so no operation outlives its
//! caller.

use super::error::StoreError;
use super::ports::StoreResult;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Deadline carrier passed to every store operation.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use text_chat_store::chat::context::OperationContext;
///
/// let ctx = OperationContext::background();
/// assert!(ctx.remaining().is_none());
///
/// let bounded = OperationContext::with_timeout(Duration::from_secs(5));
/// assert!(bounded.remaining().is_some());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationContext {
    deadline: Option<Instant>,
}

impl OperationContext {
    /// A context without a deadline.
    #[must_use]
    pub const fn background() -> Self {
        Self { deadline: None }
    }

    /// A context that expires `timeout` from now.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context that expires at `deadline`.
    #[must_use]
    pub const fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the time left before the deadline.
    ///
    /// `None` means unbounded; an elapsed deadline yields `Duration::ZERO`.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Returns `true` once the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|left| left.is_zero())
    }

    /// Fails fast when the deadline has already passed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DeadlineExceeded`] when expired.
    pub fn ensure_live(&self) -> StoreResult<()> {
        if self.is_expired() {
            return Err(StoreError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Runs `operation`, abandoning it when the deadline passes.
    ///
    /// # Errors
    ///
    /// Returns the operation's own error, or
    /// [`StoreError::DeadlineExceeded`] when the deadline elapses first.
    pub async fn run<F, T>(&self, operation: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match self.deadline {
            None => operation.await,
            Some(deadline) => tokio::time::timeout_at(deadline, operation)
                .await
                .map_err(|_| StoreError::DeadlineExceeded)?,
        }
    }
}
