//! In-memory directory of users and games.
//!
//! Stands in for the external user and game services in tests and local
//! development. Outages and slow responses can be simulated per entity kind.

use std::collections::HashSet;
use std::io;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::chat::{
    context::OperationContext,
    ports::{EntityKind, ExistenceCheck, ExistenceError, ExistenceResult, UpstreamHealth},
};

/// In-memory implementation of [`ExistenceCheck`].
///
/// Unknown identifiers are reported absent unless the directory was built
/// with [`Self::accepting_all_users`] or [`Self::accepting_all_games`].
/// Clones share state, so a test can keep a handle and flip registrations
/// or outages while a store holds another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryExistenceCheck {
    state: Arc<RwLock<DirectoryState>>,
}

#[derive(Debug, Default)]
struct DirectoryState {
    users: HashSet<String>,
    games: HashSet<String>,
    all_users_exist: bool,
    all_games_exist: bool,
    unreachable: HashSet<EntityKind>,
    latency: Duration,
    calls: Vec<(EntityKind, String)>,
}

impl DirectoryState {
    fn registry_mut(&mut self, kind: EntityKind) -> &mut HashSet<String> {
        match kind {
            EntityKind::User => &mut self.users,
            EntityKind::Game => &mut self.games,
        }
    }

    fn knows(&self, kind: EntityKind, id: &str) -> bool {
        match kind {
            EntityKind::User => self.all_users_exist || self.users.contains(id),
            EntityKind::Game => self.all_games_exist || self.games.contains(id),
        }
    }
}

impl InMemoryExistenceCheck {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory in which every user and game exists.
    #[must_use]
    pub fn permissive() -> Self {
        Self::new().accepting_all_users().accepting_all_games()
    }

    /// Registers users.
    #[must_use]
    pub fn with_users<I, S>(self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.configure(|state| state.users.extend(users.into_iter().map(Into::into)))
    }

    /// Registers games.
    #[must_use]
    pub fn with_games<I, S>(self, games: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.configure(|state| state.games.extend(games.into_iter().map(Into::into)))
    }

    /// Reports every user as existing.
    #[must_use]
    pub fn accepting_all_users(self) -> Self {
        self.configure(|state| state.all_users_exist = true)
    }

    /// Reports every game as existing.
    #[must_use]
    pub fn accepting_all_games(self) -> Self {
        self.configure(|state| state.all_games_exist = true)
    }

    /// Delays every answer by `latency`.
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.configure(|state| state.latency = latency)
    }

    /// Adds an identifier after construction.
    ///
    /// # Errors
    ///
    /// Returns [`ExistenceError::Unreachable`] if the internal lock is
    /// poisoned.
    pub fn register(&self, kind: EntityKind, id: impl Into<String>) -> ExistenceResult<()> {
        let entry = id.into();
        self.update(kind, |state| {
            state.registry_mut(kind).insert(entry);
        })
    }

    /// Removes an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ExistenceError::Unreachable`] if the internal lock is
    /// poisoned.
    pub fn unregister(&self, kind: EntityKind, id: &str) -> ExistenceResult<()> {
        self.update(kind, |state| {
            state.registry_mut(kind).remove(id);
        })
    }

    /// Simulates an outage of the collaborator owning `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ExistenceError::Unreachable`] if the internal lock is
    /// poisoned.
    pub fn set_unreachable(&self, kind: EntityKind, unreachable: bool) -> ExistenceResult<()> {
        self.update(kind, |state| {
            if unreachable {
                state.unreachable.insert(kind);
            } else {
                state.unreachable.remove(&kind);
            }
        })
    }

    /// Returns every check answered so far, in call order.
    ///
    /// Returns an empty list if the internal lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<(EntityKind, String)> {
        self.state
            .read()
            .map(|state| state.calls.clone())
            .unwrap_or_default()
    }

    fn configure(self, apply: impl FnOnce(&mut DirectoryState)) -> Self {
        if let Ok(mut state) = self.state.write() {
            apply(&mut state);
        }
        self
    }

    fn update(
        &self,
        kind: EntityKind,
        apply: impl FnOnce(&mut DirectoryState),
    ) -> ExistenceResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| poisoned(kind, &err.to_string()))?;
        apply(&mut state);
        Ok(())
    }

    fn latency(&self, kind: EntityKind) -> ExistenceResult<Duration> {
        self.state
            .read()
            .map(|state| state.latency)
            .map_err(|err| poisoned(kind, &err.to_string()))
    }
}

fn poisoned(kind: EntityKind, detail: &str) -> ExistenceError {
    ExistenceError::unreachable(kind, io::Error::other(format!("lock poisoned: {detail}")))
}

#[async_trait]
impl ExistenceCheck for InMemoryExistenceCheck {
    async fn exists(
        &self,
        ctx: &OperationContext,
        kind: EntityKind,
        id: &str,
    ) -> ExistenceResult<bool> {
        let latency = self.latency(kind)?;
        if !latency.is_zero() {
            let pause = tokio::time::sleep(latency);
            match ctx.deadline() {
                None => pause.await,
                Some(deadline) => tokio::time::timeout_at(deadline, pause)
                    .await
                    .map_err(|_| ExistenceError::DeadlineExceeded(kind))?,
            }
        }

        let mut state = self
            .state
            .write()
            .map_err(|err| poisoned(kind, &err.to_string()))?;
        state.calls.push((kind, id.to_owned()));

        if state.unreachable.contains(&kind) {
            return Err(ExistenceError::unreachable(
                kind,
                io::Error::new(
                    io::ErrorKind::ConnectionRefused,
                    format!("{kind} directory unreachable"),
                ),
            ));
        }
        Ok(state.knows(kind, id))
    }
}

#[async_trait]
impl UpstreamHealth for InMemoryExistenceCheck {
    async fn ready(&self, ctx: &OperationContext) -> ExistenceResult<()> {
        let kind = EntityKind::User;
        if ctx.is_expired() {
            return Err(ExistenceError::DeadlineExceeded(kind));
        }
        let state = self
            .state
            .read()
            .map_err(|err| poisoned(kind, &err.to_string()))?;
        if state.unreachable.contains(&kind) {
            return Err(ExistenceError::unreachable(
                kind,
                io::Error::new(io::ErrorKind::ConnectionRefused, "user directory unreachable"),
            ));
        }
        Ok(())
    }
}
