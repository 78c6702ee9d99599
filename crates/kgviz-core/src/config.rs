//! Environment configuration
//!
//! Built once at process start from an optional TOML file plus `KGVIZ_*`
//! environment overrides, validated, then shared as `Arc<EnvironmentConfig>`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Override for [`EnvironmentConfig::production`]
pub const ENV_PRODUCTION: &str = "KGVIZ_PRODUCTION";
/// Override for [`EnvironmentConfig::oauth_enabled`]
pub const ENV_OAUTH_ENABLED: &str = "KGVIZ_OAUTH_ENABLED";
/// Override for [`EnvironmentConfig::oauth_issuer`]
pub const ENV_OAUTH_ISSUER: &str = "KGVIZ_OAUTH_ISSUER";
/// Override for [`EnvironmentConfig::oauth_client_id`]
pub const ENV_OAUTH_CLIENT_ID: &str = "KGVIZ_OAUTH_CLIENT_ID";
/// Override for [`EnvironmentConfig::api_base_url`]
pub const ENV_API_BASE_URL: &str = "KGVIZ_API_BASE_URL";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parsed but are inconsistent
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Immutable deployment settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentConfig {
    /// Production deployment
    pub production: bool,
    /// Require OAuth sign-in
    pub oauth_enabled: bool,
    /// OAuth issuer URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_issuer: Option<String>,
    /// OAuth client id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_client_id: Option<String>,
    /// Base URL of the knowledge-graph API
    pub api_base_url: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            production: false,
            oauth_enabled: false,
            oauth_issuer: None,
            oauth_client_id: None,
            api_base_url: "http://localhost:8080/api".to_string(),
        }
    }
}

impl EnvironmentConfig {
    /// Parse from TOML; missing keys take their defaults
    ///
    /// # Errors
    /// - `ConfigError::Parse` on malformed TOML or unknown keys
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::Parse` on malformed TOML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply `KGVIZ_*` overrides read through `lookup`
    ///
    /// An empty issuer or client id clears the field.
    ///
    /// # Errors
    /// - `ConfigError::Invalid` if a boolean override is not recognised
    pub fn apply_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_PRODUCTION) {
            self.production = parse_bool(ENV_PRODUCTION, &raw)?;
        }
        if let Some(raw) = lookup(ENV_OAUTH_ENABLED) {
            self.oauth_enabled = parse_bool(ENV_OAUTH_ENABLED, &raw)?;
        }
        if let Some(raw) = lookup(ENV_OAUTH_ISSUER) {
            self.oauth_issuer = non_empty(raw);
        }
        if let Some(raw) = lookup(ENV_OAUTH_CLIENT_ID) {
            self.oauth_client_id = non_empty(raw);
        }
        if let Some(raw) = lookup(ENV_API_BASE_URL) {
            self.api_base_url = raw;
        }
        Ok(self)
    }

    /// Check cross-field consistency
    ///
    /// # Errors
    /// - `ConfigError::Invalid` describing the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api_base_url must not be empty".to_string()));
        }
        if self.oauth_enabled {
            let issuer = self
                .oauth_issuer
                .as_deref()
                .ok_or_else(|| ConfigError::Invalid("oauth_enabled requires oauth_issuer".to_string()))?;
            if !(issuer.starts_with("https://") || issuer.starts_with("http://")) {
                return Err(ConfigError::Invalid(format!(
                    "oauth_issuer must be an http(s) URL, got {issuer:?}"
                )));
            }
            if self.oauth_client_id.is_none() {
                return Err(ConfigError::Invalid(
                    "oauth_enabled requires oauth_client_id".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Load the process configuration: file (or defaults), then the process
    /// environment, then validation
    ///
    /// # Errors
    /// - Any [`ConfigError`]
    pub fn load(path: Option<&Path>) -> Result<Arc<Self>, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = base.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        tracing::debug!(
            production = config.production,
            oauth = config.oauth_enabled,
            "environment configuration loaded"
        );
        Ok(Arc::new(config))
    }

    /// Render as TOML
    ///
    /// # Errors
    /// - `ConfigError::Invalid` if serialization fails
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Ok(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Ok(false),
        other => Err(ConfigError::Invalid(format!("{key}: expected a boolean, got {other:?}"))),
    }
}

fn non_empty(raw: String) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw)
    }
}

/// Programmatic construction of an [`EnvironmentConfig`]
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: EnvironmentConfig,
}

impl ConfigBuilder {
    /// Start from defaults
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With production flag
    #[inline]
    #[must_use]
    pub fn with_production(mut self, production: bool) -> Self {
        self.config.production = production;
        self
    }

    /// With OAuth enabled for the given issuer and client
    #[inline]
    #[must_use]
    pub fn with_oauth(mut self, issuer: impl Into<String>, client_id: impl Into<String>) -> Self {
        self.config.oauth_enabled = true;
        self.config.oauth_issuer = Some(issuer.into());
        self.config.oauth_client_id = Some(client_id.into());
        self
    }

    /// With API base URL
    #[inline]
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    /// Validate and finish
    ///
    /// # Errors
    /// - `ConfigError::Invalid` from [`EnvironmentConfig::validate`]
    pub fn build(self) -> Result<Arc<EnvironmentConfig>, ConfigError> {
        self.config.validate()?;
        Ok(Arc::new(self.config))
    }
}
