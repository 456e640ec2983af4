//! Readiness probe combining the store and the user directory.

use std::sync::Arc;

use thiserror::Error;

use crate::chat::{
    context::OperationContext,
    error::StoreError,
    ports::{ExistenceError, TextChatStore, UpstreamHealth},
};

/// Why the service is not ready to accept requests.
#[derive(Debug, Clone, Error)]
pub enum ReadinessError {
    /// The store backend did not answer its ping.
    #[error("database unavailable: {0}")]
    Database(#[source] StoreError),
    /// The user service did not report ready.
    #[error("user service unavailable: {0}")]
    UserService(#[source] ExistenceError),
}

/// Checks every dependency a request needs, store first.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use text_chat_store::chat::adapters::memory::{InMemoryExistenceCheck, InMemoryTextChatStore};
/// use text_chat_store::chat::context::OperationContext;
/// use text_chat_store::chat::services::ReadinessProbe;
/// use text_chat_store::chat::validation::ReferentialValidator;
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let directory = Arc::new(InMemoryExistenceCheck::permissive());
/// let store = InMemoryTextChatStore::new(ReferentialValidator::new(directory.clone()));
/// let probe = ReadinessProbe::new(Arc::new(store), directory);
///
/// assert!(probe.check(&OperationContext::background()).await.is_ok());
/// # });
/// ```
#[derive(Clone)]
pub struct ReadinessProbe {
    store: Arc<dyn TextChatStore>,
    users: Arc<dyn UpstreamHealth>,
}

impl ReadinessProbe {
    /// Creates a probe over a store and the user directory.
    #[must_use]
    pub const fn new(store: Arc<dyn TextChatStore>, users: Arc<dyn UpstreamHealth>) -> Self {
        Self { store, users }
    }

    /// Pings the store, then the user service.
    ///
    /// # Errors
    ///
    /// Returns [`ReadinessError::Database`] when the store ping fails, and
    /// [`ReadinessError::UserService`] when the user service is not ready.
    pub async fn check(&self, ctx: &OperationContext) -> Result<(), ReadinessError> {
        self.store.ping_db(ctx).await.map_err(|err| {
            tracing::error!(error = %err, "database unavailable");
            ReadinessError::Database(err)
        })?;

        self.users.ready(ctx).await.map_err(|err| {
            tracing::error!(error = %err, "user service unavailable");
            ReadinessError::UserService(err)
        })
    }
}
