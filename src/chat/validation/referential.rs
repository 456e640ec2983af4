//! Write-time checks that foreign identifiers designate existing entities.
//!
//! Conversation existence is local to each backend, so backends check it
//! themselves before calling in here. This module covers users and games,
//! which are owned by external collaborators.

use crate::chat::{
    context::OperationContext,
    domain::{GameId, UserId},
    error::StoreError,
    ports::{EntityKind, ExistenceCheck, ExistenceError, StoreResult},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// What a write does when an existence check cannot be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnconfirmedPolicy {
    /// Treat the entity as missing and fail with the matching not-found
    /// error. Writes are rejected while a collaborator is down.
    #[default]
    #[serde(rename = "fail-closed")]
    TreatAsMissing,
    /// Fail with [`StoreError::Unavailable`] so callers can tell an outage
    /// from a bad reference.
    #[serde(rename = "surface")]
    Surface,
}

impl UnconfirmedPolicy {
    /// Returns the configuration spelling of the policy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TreatAsMissing => "fail-closed",
            Self::Surface => "surface",
        }
    }
}

impl fmt::Display for UnconfirmedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown policy name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown existence policy '{0}', expected fail-closed or surface")]
pub struct ParsePolicyError(pub String);

impl FromStr for UnconfirmedPolicy {
    type Err = ParsePolicyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fail-closed" => Ok(Self::TreatAsMissing),
            "surface" => Ok(Self::Surface),
            _ => Err(ParsePolicyError(value.to_owned())),
        }
    }
}

/// Referential validator shared by the in-memory and persistent backends.
///
/// Checks run in a fixed order so every backend reports the same error for
/// the same input: participants in list order, then the game. The first
/// failure aborts; nothing is written by the caller afterwards.
#[derive(Clone)]
pub struct ReferentialValidator {
    checker: Arc<dyn ExistenceCheck>,
    policy: UnconfirmedPolicy,
}

impl fmt::Debug for ReferentialValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferentialValidator")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ReferentialValidator {
    /// Creates a fail-closed validator over the given collaborator.
    #[must_use]
    pub fn new(checker: Arc<dyn ExistenceCheck>) -> Self {
        Self {
            checker,
            policy: UnconfirmedPolicy::default(),
        }
    }

    /// Sets the policy for checks that cannot be answered.
    #[must_use]
    pub const fn with_policy(mut self, policy: UnconfirmedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the active policy.
    #[must_use]
    pub const fn policy(&self) -> UnconfirmedPolicy {
        self.policy
    }

    /// Confirms that a message author exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UserNotFound`], or under
    /// [`UnconfirmedPolicy::Surface`] [`StoreError::Unavailable`].
    /// [`StoreError::DeadlineExceeded`] is returned whenever the deadline
    /// elapses, regardless of policy.
    pub async fn check_user(&self, ctx: &OperationContext, user: &UserId) -> StoreResult<()> {
        if self.confirm(ctx, EntityKind::User, user.as_str()).await? {
            Ok(())
        } else {
            Err(StoreError::UserNotFound(user.clone()))
        }
    }

    /// Confirms every participant, in order, and then the game scope.
    ///
    /// An empty game identifier is not checked.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UserNotFound`] for the first unknown
    /// participant, then [`StoreError::GameNotFound`]; transient failures
    /// follow [`Self::check_user`].
    pub async fn check_membership(
        &self,
        ctx: &OperationContext,
        users: &[UserId],
        game: &GameId,
    ) -> StoreResult<()> {
        for user in users {
            self.check_user(ctx, user).await?;
        }

        if game.is_none() {
            return Ok(());
        }
        if self.confirm(ctx, EntityKind::Game, game.as_str()).await? {
            Ok(())
        } else {
            Err(StoreError::GameNotFound(game.clone()))
        }
    }

    async fn confirm(
        &self,
        ctx: &OperationContext,
        kind: EntityKind,
        id: &str,
    ) -> StoreResult<bool> {
        ctx.ensure_live()?;

        let check = self.checker.exists(ctx, kind, id);
        let outcome = match ctx.deadline() {
            None => check.await,
            Some(deadline) => tokio::time::timeout_at(deadline, check)
                .await
                .unwrap_or(Err(ExistenceError::DeadlineExceeded(kind))),
        };

        match outcome {
            Ok(found) => {
                if !found {
                    tracing::debug!(%kind, id, "existence check reported entity absent");
                }
                Ok(found)
            }
            Err(ExistenceError::DeadlineExceeded(_)) => {
                tracing::warn!(%kind, id, "existence check ran past the deadline");
                Err(StoreError::DeadlineExceeded)
            }
            Err(err) => {
                tracing::warn!(
                    %kind,
                    id,
                    error = %err,
                    policy = %self.policy,
                    "existence check could not be confirmed"
                );
                match self.policy {
                    UnconfirmedPolicy::TreatAsMissing => Ok(false),
                    UnconfirmedPolicy::Surface => Err(StoreError::unavailable(err)),
                }
            }
        }
    }
}
