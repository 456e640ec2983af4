//! Shared world state for text chat BDD scenarios.

use std::sync::Arc;

use eyre::eyre;
use rstest::fixture;
use text_chat_store::chat::{
    adapters::memory::{InMemoryExistenceCheck, InMemoryTextChatStore},
    context::OperationContext,
    domain::Conversation,
    error::StoreError,
    validation::ReferentialValidator,
};

/// Scenario world for text chat behaviour tests.
pub struct ChatWorld {
    /// Directory the store validates against.
    pub directory: InMemoryExistenceCheck,
    /// The store under test.
    pub store: InMemoryTextChatStore,
    /// Context passed to every store call.
    pub ctx: OperationContext,
    /// Conversation created by the scenario, if any.
    pub conversation: Option<Conversation>,
    /// Outcome of the last write.
    pub last_write: Option<Result<(), StoreError>>,
}

impl ChatWorld {
    /// Creates a world over an empty directory.
    #[must_use]
    pub fn new() -> Self {
        let directory = InMemoryExistenceCheck::new();
        let store =
            InMemoryTextChatStore::new(ReferentialValidator::new(Arc::new(directory.clone())));
        Self {
            directory,
            store,
            ctx: OperationContext::background(),
            conversation: None,
            last_write: None,
        }
    }

    /// Returns the scenario conversation.
    pub fn conversation(&self) -> Result<&Conversation, eyre::Report> {
        self.conversation
            .as_ref()
            .ok_or_else(|| eyre!("no conversation in scenario world"))
    }

    /// Returns the error of the last write.
    pub fn last_error(&self) -> Result<&StoreError, eyre::Report> {
        match &self.last_write {
            Some(Err(err)) => Ok(err),
            Some(Ok(())) => Err(eyre!("expected the last write to fail")),
            None => Err(eyre!("no write attempted in scenario world")),
        }
    }
}

impl Default for ChatWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ChatWorld {
    ChatWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
