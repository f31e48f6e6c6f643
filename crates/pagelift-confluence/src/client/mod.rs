//! Confluence REST API client.
//!
//! Sync HTTP client for the Confluence Cloud pages API with HTTP Basic
//! authentication. Each operation is a single blocking call; no state is
//! carried across operations.

mod pages;

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use ureq::Agent;

use pagelift_config::ConfluenceConfig;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Confluence REST API client.
pub struct PageClient {
    agent: Agent,
    base_url: String,
    auth_header: String,
}

impl PageClient {
    /// Create a client from resolved configuration.
    ///
    /// Statuses are never raised as transport errors by the agent; every
    /// operation inspects the status itself.
    #[must_use]
    pub fn new(config: &ConfluenceConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        let credentials = STANDARD.encode(format!("{}:{}", config.username, config.api_key));

        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            auth_header: format!("Basic {credentials}"),
        }
    }

    /// Base URL of the v2 pages API.
    fn pages_url(&self) -> String {
        format!("{}/wiki/api/v2/pages", self.base_url)
    }

    /// Version deletion is only available through the v1 content API.
    fn version_url(&self, id: i64) -> String {
        format!("{}/wiki/rest/api/content/{id}/version/1", self.base_url)
    }
}
