//! Credential and endpoint configuration for the Confluence client.
//!
//! Resolves the (base URL, username, API key) triple from explicit
//! configuration values with environment variable fallback. Explicit values
//! win; a value that is empty after checking both sources is a hard error.

use serde::Deserialize;

/// Environment fallback for the Confluence base URL.
pub const ENV_BASE_URL: &str = "CONFLUENCE_BASE_URL";
/// Environment fallback for the Confluence username.
pub const ENV_USERNAME: &str = "CONFLUENCE_USERNAME";
/// Environment fallback for the Confluence API key.
pub const ENV_API_KEY: &str = "CONFLUENCE_API_KEY";

/// Confluence Cloud API credentials and endpoint.
///
/// Immutable for the process lifetime once resolved; passed by reference
/// into each client, never held as shared mutable state.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfluenceConfig {
    /// Service endpoint, e.g. `https://<unique>.atlassian.net`.
    pub base_url: String,
    /// Username of the API credentials.
    pub username: String,
    /// API key paired with the username.
    pub api_key: String,
}

impl ConfluenceConfig {
    /// Resolve configuration from explicit values with environment fallback.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] for any value that is unset or empty
    /// in both the explicit configuration and the environment.
    pub fn resolve(
        base_url: Option<String>,
        username: Option<String>,
        api_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: resolve_value(base_url, ENV_BASE_URL, "base_url")?,
            username: resolve_value(username, ENV_USERNAME, "username")?,
            api_key: resolve_value(api_key, ENV_API_KEY, "api_key")?,
        })
    }
}

/// Explicit value overrides the environment; empty counts as unset.
fn resolve_value(
    explicit: Option<String>,
    env_var: &'static str,
    field: &'static str,
) -> Result<String, ConfigError> {
    explicit
        .filter(|value| !value.is_empty())
        .or_else(|| std::env::var(env_var).ok().filter(|value| !value.is_empty()))
        .ok_or(ConfigError::Missing { field, env_var })
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A credential is empty after checking both sources.
    #[error(
        "missing Confluence {field}: set it in the configuration or via the {env_var} environment variable"
    )]
    Missing {
        /// Configuration field name.
        field: &'static str,
        /// Environment variable consulted as fallback.
        env_var: &'static str,
    },
}
