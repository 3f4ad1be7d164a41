//! Credential resolution for the token exchange.
//!
//! Explicit values given in `CredentialsConfig` take precedence. When any of
//! the basic token, username or password is missing, the four secret files
//! are read from the secrets directory and fill the gaps. A secret file that
//! cannot be read in that fallback is an error. An explicit empty string is
//! treated as missing.

use std::fs;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::ApiError;

pub const DEFAULT_SECRETS_DIR: &str = ".secrets";

pub const CONSUMER_KEY_FILE: &str = "consumer.key";
pub const CONSUMER_SECRET_FILE: &str = "consumer.secret";
pub const USERNAME_FILE: &str = "username";
pub const PASSWORD_FILE: &str = "password";

/// Where credentials come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialsConfig {
    pub basic_token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub secrets_dir: PathBuf,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            basic_token: None,
            username: None,
            password: None,
            secrets_dir: PathBuf::from(DEFAULT_SECRETS_DIR),
        }
    }
}

impl CredentialsConfig {
    /// All three values given explicitly; the secrets directory is never read.
    pub fn explicit(basic_token: &str, username: &str, password: &str) -> Self {
        Self {
            basic_token: Some(basic_token.to_string()),
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            ..Self::default()
        }
    }

    pub fn with_secrets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.secrets_dir = dir.into();
        self
    }

    fn is_complete(&self) -> bool {
        provided(&self.basic_token).is_some()
            && provided(&self.username).is_some()
            && provided(&self.password).is_some()
    }
}

/// The four secret files, as read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretFiles {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub username: String,
    pub password: String,
}

impl SecretFiles {
    pub fn read(dir: &Path) -> Result<Self, ApiError> {
        Ok(Self {
            consumer_key: read_secret(dir, CONSUMER_KEY_FILE)?,
            consumer_secret: read_secret(dir, CONSUMER_SECRET_FILE)?,
            username: read_secret(dir, USERNAME_FILE)?,
            password: read_secret(dir, PASSWORD_FILE)?,
        })
    }

    pub fn basic_token(&self) -> String {
        basic_token(&self.consumer_key, &self.consumer_secret)
    }
}

fn read_secret(dir: &Path, name: &str) -> Result<String, ApiError> {
    let path = dir.join(name);
    match fs::read_to_string(&path) {
        Ok(contents) => Ok(contents.trim().to_string()),
        Err(_) => Err(ApiError::MissingSecret { path }),
    }
}

/// `base64("consumer_key:consumer_secret")`.
pub fn basic_token(consumer_key: &str, consumer_secret: &str) -> String {
    STANDARD.encode(format!("{consumer_key}:{consumer_secret}"))
}

/// Resolved credentials for the token exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub basic_token: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("basic_token", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn load(config: &CredentialsConfig) -> Result<Self, ApiError> {
        if config.is_complete() {
            return Ok(Self {
                basic_token: provided(&config.basic_token).unwrap_or_default(),
                username: provided(&config.username).unwrap_or_default(),
                password: provided(&config.password).unwrap_or_default(),
            });
        }

        tracing::debug!(dir = %config.secrets_dir.display(), "Reading secret files");
        let files = SecretFiles::read(&config.secrets_dir)?;
        Ok(Self {
            basic_token: provided(&config.basic_token).unwrap_or_else(|| files.basic_token()),
            username: provided(&config.username).unwrap_or(files.username),
            password: provided(&config.password).unwrap_or(files.password),
        })
    }
}

/// An explicit value counts only when it is non-empty.
fn provided(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}
