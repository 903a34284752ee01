//! Portal connection configuration and credential resolution.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::repository::{ErrorContext, PortalError, PortalResult};
use super::settings::PortalSettings;

pub const DEFAULT_HOST: &str = "https://fritz.science";
pub const TOKEN_FILE_NAME: &str = "token.txt";
pub const HOST_ENV: &str = "FRITZ_HOST";
pub const TOKEN_ENV: &str = "FRITZ_TOKEN";

/// Portal API token.
///
/// Never validated locally; a bad token surfaces on the first remote call.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value.
    pub fn header_value(&self) -> String {
        format!("token {}", self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

fn non_empty(value: &str) -> Option<Token> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(Token::new(trimmed))
    }
}

fn read_token_file(path: &Path, required: bool) -> PortalResult<Option<Token>> {
    if !path.exists() {
        if required {
            return Err(PortalError::ConfigurationError {
                message: format!("Configured token file {} does not exist", path.display()),
                context: ErrorContext::new("resolve_token").with_entity_id(path.display()),
            });
        }
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|e| PortalError::ConfigurationError {
        message: format!("Failed to read token file: {}", e),
        context: ErrorContext::new("resolve_token").with_entity_id(path.display()),
    })?;
    Ok(non_empty(&content))
}

/// Resolve the API token.
///
/// # Resolution Order
/// 1. `explicit` (the `--token` flag), if non-blank
/// 2. `FRITZ_TOKEN` environment variable
/// 3. `token_file` from the settings file, when configured
/// 4. `token.txt` in the working directory
///
/// A configured `token_file` must exist; a blank one falls through to step 4.
///
/// # Errors
/// `ConfigurationError` when no source yields a non-blank token, or the
/// configured token file is missing or unreadable.
pub fn resolve_token(explicit: Option<&str>, token_file: Option<&Path>) -> PortalResult<Token> {
    if let Some(token) = explicit.and_then(non_empty) {
        debug!("Using token from command line");
        return Ok(token);
    }

    if let Some(token) = env::var(TOKEN_ENV).ok().as_deref().and_then(non_empty) {
        debug!("Using token from {}", TOKEN_ENV);
        return Ok(token);
    }

    if let Some(path) = token_file {
        if let Some(token) = read_token_file(path, true)? {
            debug!("Using token from {}", path.display());
            return Ok(token);
        }
    }

    let fallback = PathBuf::from(TOKEN_FILE_NAME);
    if let Some(token) = read_token_file(&fallback, false)? {
        debug!("Using token from {}", fallback.display());
        return Ok(token);
    }

    Err(PortalError::ConfigurationError {
        message: format!(
            "No API token: pass --token, set {} or create {}",
            TOKEN_ENV, TOKEN_FILE_NAME
        ),
        context: ErrorContext::new("resolve_token"),
    })
}

/// Everything needed to talk to one portal instance.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub host: String,
    pub token: Token,
}

impl PortalConfig {
    pub fn new(host: impl Into<String>, token: Token) -> Self {
        Self {
            host: host.into(),
            token,
        }
    }

    /// Build the configuration from settings plus command-line overrides.
    ///
    /// Host precedence: `host_override`, then `FRITZ_HOST`, then the settings
    /// file. The token is resolved with [`resolve_token`].
    pub fn from_settings(
        settings: &PortalSettings,
        host_override: Option<&str>,
        token_override: Option<&str>,
    ) -> PortalResult<Self> {
        let host = host_override
            .map(str::to_string)
            .or_else(|| env::var(HOST_ENV).ok())
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| settings.portal.host.trim().to_string());

        if host.is_empty() {
            return Err(PortalError::configuration("Portal host is empty"));
        }

        let token = resolve_token(token_override, settings.portal.token_file.as_deref())?;

        Ok(Self { host, token })
    }
}
