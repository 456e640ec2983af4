//! HTTP existence checks against the user and game services.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use crate::chat::{
    context::OperationContext,
    ports::{EntityKind, ExistenceCheck, ExistenceError, ExistenceResult, UpstreamHealth},
};
use crate::config::ServiceConfig;

const USER_AGENT: &str = concat!("text-chat-store/", env!("CARGO_PKG_VERSION"));

/// [`ExistenceCheck`] backed by the user and game services.
///
/// A user exists when `GET {user_service_url}/users/{id}` answers with a
/// success status; any other status confirms absence. Games follow the same
/// rule against `{game_service_url}/games/{id}` when a game service is
/// configured, and are otherwise all taken to exist. Transport failures and
/// timeouts are reported as errors, never as absence.
#[derive(Debug, Clone)]
pub struct HttpExistenceCheck {
    http: Client,
    user_service: String,
    game_service: Option<String>,
}

impl HttpExistenceCheck {
    /// Creates a checker for the given user service.
    #[must_use]
    pub fn new(user_service_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            user_service: user_service_url.into(),
            game_service: None,
        }
    }

    /// Creates a checker from service configuration.
    #[must_use]
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            game_service: config.game_service_url.clone(),
            ..Self::new(config.user_service_url.clone())
        }
    }

    /// Checks games against a game service instead of accepting them all.
    #[must_use]
    pub fn with_game_service(mut self, game_service_url: impl Into<String>) -> Self {
        self.game_service = Some(game_service_url.into());
        self
    }

    /// Replaces the HTTP client.
    #[must_use]
    pub fn with_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    async fn get(
        &self,
        ctx: &OperationContext,
        kind: EntityKind,
        url: Url,
    ) -> ExistenceResult<StatusCode> {
        let mut request = self.http.get(url);
        if let Some(remaining) = ctx.remaining() {
            if remaining.is_zero() {
                return Err(ExistenceError::DeadlineExceeded(kind));
            }
            request = request.timeout(remaining);
        }

        match request.send().await {
            Ok(response) => Ok(response.status()),
            Err(err) if err.is_timeout() && ctx.is_expired() => {
                Err(ExistenceError::DeadlineExceeded(kind))
            }
            Err(err) => Err(ExistenceError::unreachable(kind, err)),
        }
    }
}

/// Appends percent-encoded path segments to a base URL.
fn endpoint(base: &str, segments: &[&str], kind: EntityKind) -> ExistenceResult<Url> {
    let mut url = Url::parse(base).map_err(|err| ExistenceError::unreachable(kind, err))?;
    url.path_segments_mut()
        .map_err(|()| {
            ExistenceError::unreachable(
                kind,
                std::io::Error::other(format!("{base} cannot be a base URL")),
            )
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[async_trait]
impl ExistenceCheck for HttpExistenceCheck {
    async fn exists(
        &self,
        ctx: &OperationContext,
        kind: EntityKind,
        id: &str,
    ) -> ExistenceResult<bool> {
        let (base, collection) = match (kind, &self.game_service) {
            (EntityKind::User, _) => (self.user_service.as_str(), "users"),
            (EntityKind::Game, Some(base)) => (base.as_str(), "games"),
            (EntityKind::Game, None) => return Ok(true),
        };

        let url = endpoint(base, &[collection, id], kind)?;
        let status = self.get(ctx, kind, url).await?;
        tracing::debug!(%kind, id, status = status.as_u16(), "existence check answered");
        Ok(status.is_success())
    }
}

#[async_trait]
impl UpstreamHealth for HttpExistenceCheck {
    /// Probes `{user_service_url}/health/ready`; only a success status
    /// counts as ready.
    async fn ready(&self, ctx: &OperationContext) -> ExistenceResult<()> {
        let kind = EntityKind::User;
        let url = endpoint(&self.user_service, &["health", "ready"], kind)?;
        let status = self.get(ctx, kind, url).await?;
        if status.is_success() {
            Ok(())
        } else {
            Err(ExistenceError::unreachable(
                kind,
                std::io::Error::other(format!("user service not ready: {status}")),
            ))
        }
    }
}
