//! Client configuration
//!
//! A [`ClientConfig`] can be written by hand, loaded from a YAML (or JSON)
//! file, and then overridden from the environment:
//!
//! ```yaml
//! user_agent: "linux:my-bot:v0.1 (by /u/me)"
//! timeout_secs: 20
//! credentials:
//!   client_id: abc
//!   client_secret: shh
//! ```

use crate::auth::{AuthConfig, DEFAULT_TOKEN_URL};
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClientConfig, RateLimiterConfig, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variables read by [`ClientConfig::apply_env`]
pub const ENV_CLIENT_ID: &str = "REDPAGE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "REDPAGE_CLIENT_SECRET";
pub const ENV_USERNAME: &str = "REDPAGE_USERNAME";
pub const ENV_PASSWORD: &str = "REDPAGE_PASSWORD";
pub const ENV_USER_AGENT: &str = "REDPAGE_USER_AGENT";

const OAUTH_HOST: &str = "oauth.reddit.com";

// ============================================================================
// Client Config
// ============================================================================

/// Everything needed to build a [`crate::Client`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API host
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// OAuth2 token endpoint
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Reddit bans generic user agents; use `platform:app:version (by /u/you)`
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Sustained request rate
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    /// Requests allowed back to back before throttling
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,

    /// App credentials; anonymous when absent
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_user_agent() -> String {
    format!("redpage/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_requests_per_minute() -> u32 {
    RateLimiterConfig::default().requests_per_minute
}

fn default_burst_size() -> u32 {
    RateLimiterConfig::default().burst_size
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_url: default_token_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            requests_per_minute: default_requests_per_minute(),
            burst_size: default_burst_size(),
            credentials: None,
        }
    }
}

/// OAuth2 app credentials
///
/// With `username` and `password` the script-app password grant is used,
/// otherwise the app-only client credentials grant.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    /// Load a config file (YAML or JSON) and validate it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Parse and check a YAML (or JSON) document
    ///
    /// Credentials may still come from the environment, so their presence
    /// is only required by [`ClientConfig::validate`].
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate_fields()?;
        Ok(config)
    }

    /// Override fields from `REDPAGE_*` environment variables
    #[must_use]
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Override fields from an arbitrary variable lookup
    ///
    /// Credentials are only created when both the id and the secret are
    /// known, either from the lookup or from the existing config.
    #[must_use]
    pub fn apply_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(agent) = var(ENV_USER_AGENT) {
            self.user_agent = agent;
        }

        let existing = self.credentials.take();
        let client_id = var(ENV_CLIENT_ID).or_else(|| existing.as_ref().map(|c| c.client_id.clone()));
        let client_secret =
            var(ENV_CLIENT_SECRET).or_else(|| existing.as_ref().map(|c| c.client_secret.clone()));

        self.credentials = match (client_id, client_secret) {
            (Some(client_id), Some(client_secret)) => Some(Credentials {
                client_id,
                client_secret,
                username: var(ENV_USERNAME)
                    .or_else(|| existing.as_ref().and_then(|c| c.username.clone())),
                password: var(ENV_PASSWORD)
                    .or_else(|| existing.as_ref().and_then(|c| c.password.clone())),
            }),
            _ => existing,
        };

        self
    }

    /// Check that the config can be used to build a client
    ///
    /// Reddit's OAuth host rejects anonymous requests, so it needs
    /// credentials.
    pub fn validate(&self) -> Result<()> {
        self.validate_fields()?;

        let host = url::Url::parse(&self.base_url)?;
        if self.credentials.is_none() && host.host_str() == Some(OAUTH_HOST) {
            return Err(Error::config(format!(
                "{} requires credentials; set {ENV_CLIENT_ID} and {ENV_CLIENT_SECRET}",
                self.base_url
            )));
        }
        Ok(())
    }

    fn validate_fields(&self) -> Result<()> {
        url::Url::parse(&self.base_url)?;
        url::Url::parse(&self.token_url)?;

        if self.user_agent.trim().is_empty() {
            return Err(Error::config("user_agent must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(Error::config("timeout_secs must be positive"));
        }
        if let Some(creds) = &self.credentials {
            if creds.username.is_some() != creds.password.is_some() {
                return Err(Error::config(
                    "username and password must be given together",
                ));
            }
        }
        Ok(())
    }

    /// Settings for the HTTP transport
    pub fn to_http_config(&self) -> HttpClientConfig {
        HttpClientConfig::builder()
            .base_url(self.base_url.clone())
            .user_agent(self.user_agent.clone())
            .timeout(Duration::from_secs(self.timeout_secs))
            .max_retries(self.max_retries)
            .rate_limit(RateLimiterConfig::new(
                self.requests_per_minute,
                self.burst_size,
            ))
            .build()
    }

    /// Authentication implied by the credentials
    pub fn auth_config(&self) -> AuthConfig {
        let Some(creds) = &self.credentials else {
            return AuthConfig::None;
        };

        match (&creds.username, &creds.password) {
            (Some(username), Some(password)) => AuthConfig::Password {
                token_url: self.token_url.clone(),
                client_id: creds.client_id.clone(),
                client_secret: creds.client_secret.clone(),
                username: username.clone(),
                password: password.clone(),
            },
            _ => AuthConfig::ClientCredentials {
                token_url: self.token_url.clone(),
                client_id: creds.client_id.clone(),
                client_secret: creds.client_secret.clone(),
            },
        }
    }
}
