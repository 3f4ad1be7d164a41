//! Client configuration.
//!
//! Precedence for every field is explicit setter > environment > default.
//! Credentials follow their own precedence, see [`crate::credentials`].

use std::path::PathBuf;

use crate::auth::GrantType;
use crate::credentials::CredentialsConfig;
use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://api.stubhub.com";

pub const ENV_BASE_URL: &str = "STUBHUB_BASE_URL";
pub const ENV_SECRETS_DIR: &str = "STUBHUB_SECRETS_DIR";
pub const ENV_GRANT_TYPE: &str = "STUBHUB_GRANT_TYPE";
pub const ENV_SCOPE: &str = "STUBHUB_SCOPE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL without a trailing `/`.
    pub base_url: String,
    pub grant_type: GrantType,
    /// Only sent with the password grant.
    pub scope: Option<String>,
    pub credentials: CredentialsConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            grant_type: GrantType::default(),
            scope: None,
            credentials: CredentialsConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `STUBHUB_*` environment variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`ClientConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config = config.with_base_url(&base_url);
        }
        if let Some(dir) = lookup(ENV_SECRETS_DIR) {
            config.credentials.secrets_dir = PathBuf::from(dir);
        }
        if let Some(grant) = lookup(ENV_GRANT_TYPE) {
            config.grant_type = grant.parse().map_err(|_| ApiError::InvalidParam {
                name: ENV_GRANT_TYPE.to_string(),
                value: grant.clone(),
            })?;
        }
        if let Some(scope) = lookup(ENV_SCOPE) {
            config.scope = Some(scope);
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_grant_type(mut self, grant_type: GrantType) -> Self {
        self.grant_type = grant_type;
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_credentials(mut self, credentials: CredentialsConfig) -> Self {
        self.credentials = credentials;
        self
    }
}
