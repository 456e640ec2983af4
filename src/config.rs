//! Runtime configuration for the store and its collaborators.
//!
//! Configuration comes from environment variables ([`StoreConfig::from_env`])
//! or a TOML document ([`StoreConfig::from_toml_str`]). Both paths produce
//! the same validated [`StoreConfig`].

use std::fmt;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chat::validation::UnconfirmedPolicy;

/// Database name used when `DB_NAME` is not set.
pub const DEFAULT_DB_NAME: &str = "ubivius";

/// Pool size used when `DB_POOL_SIZE` is not set.
pub const DEFAULT_POOL_SIZE: u32 = 10;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Errors raised while loading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is unset or blank.
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    /// A variable is set but its value cannot be used.
    #[error("invalid value for {name}: {reason}")]
    InvalidVar {
        /// Variable or field name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

/// Complete store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database coordinates.
    pub database: DatabaseConfig,
    /// Collaborator service locations.
    pub services: ServiceConfig,
    /// What writes do when an existence check cannot be answered.
    #[serde(default)]
    pub existence_policy: UnconfirmedPolicy,
}

/// Database coordinates and pool sizing.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database host name.
    pub hostname: String,
    /// Database port.
    pub port: u16,
    /// Login role.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Database name.
    #[serde(default = "default_db_name")]
    pub name: String,
    /// Maximum pooled connections.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    /// Seconds to wait for a pooled connection at startup.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// Locations of the user and game services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the user service.
    pub user_service_url: String,
    /// Base URL of the game service; without one every game exists.
    #[serde(default)]
    pub game_service_url: Option<String>,
}

fn default_db_name() -> String {
    DEFAULT_DB_NAME.to_owned()
}

const fn default_pool_size() -> u32 {
    DEFAULT_POOL_SIZE
}

const fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("pool_size", &self.pool_size)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl DatabaseConfig {
    /// Returns the libpq connection URL with credentials and database name
    /// percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidVar`] naming `DB_HOSTNAME` when the host
    /// cannot form a URL.
    pub fn url(&self) -> Result<String, ConfigError> {
        let invalid_host = |reason: String| ConfigError::InvalidVar {
            name: "DB_HOSTNAME",
            reason,
        };
        let mut url = Url::parse(&format!("postgres://{}:{}/", self.hostname, self.port))
            .map_err(|err| invalid_host(err.to_string()))?;
        url.set_username(&self.username)
            .and_then(|()| url.set_password(Some(&self.password)))
            .map_err(|()| invalid_host("URL has no host".to_owned()))?;
        url.path_segments_mut()
            .map_err(|()| invalid_host("URL cannot carry a database name".to_owned()))?
            .pop_if_empty()
            .push(&self.name);
        Ok(url.into())
    }

    /// Returns the pool checkout timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl StoreConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] when `DB_HOSTNAME`, `DB_PORT`,
    /// `DB_USERNAME`, `DB_PASSWORD` or `USER_SERVICE_URL` is unset, and
    /// [`ConfigError::InvalidVar`] when a value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &'static str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let required = |name: &'static str| optional(name).ok_or(ConfigError::MissingVar(name));

        let database = DatabaseConfig {
            hostname: required("DB_HOSTNAME")?,
            port: parse_var("DB_PORT", &required("DB_PORT")?)?,
            username: required("DB_USERNAME")?,
            password: required("DB_PASSWORD")?,
            name: optional("DB_NAME").unwrap_or_else(default_db_name),
            pool_size: optional("DB_POOL_SIZE")
                .map(|raw| parse_var("DB_POOL_SIZE", &raw))
                .transpose()?
                .unwrap_or(DEFAULT_POOL_SIZE),
            connect_timeout_secs: optional("DB_CONNECT_TIMEOUT_SECS")
                .map(|raw| parse_var("DB_CONNECT_TIMEOUT_SECS", &raw))
                .transpose()?
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let services = ServiceConfig {
            user_service_url: required("USER_SERVICE_URL")?,
            game_service_url: optional("GAME_SERVICE_URL"),
        };
        let existence_policy = optional("EXISTENCE_POLICY")
            .map(|raw| parse_var("EXISTENCE_POLICY", &raw))
            .transpose()?
            .unwrap_or_default();

        let config = Self {
            database,
            services,
            existence_policy,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed documents and
    /// [`ConfigError::InvalidVar`] for values that parse but cannot be used.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(document).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.pool_size == 0 {
            return Err(ConfigError::InvalidVar {
                name: "DB_POOL_SIZE",
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.services.user_service_url.trim().is_empty() {
            return Err(ConfigError::MissingVar("USER_SERVICE_URL"));
        }
        Ok(())
    }
}

fn parse_var<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.parse().map_err(|err: T::Err| ConfigError::InvalidVar {
        name,
        reason: err.to_string(),
    })
}
