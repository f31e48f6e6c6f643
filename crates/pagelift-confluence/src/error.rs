//! Error types for the page lifecycle client.

use crate::validator::ValidationError;

/// Error from Confluence page operations.
///
/// Rejection variants keep the raw response body so callers can diagnose
/// store-side failures; nothing here is retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// HTTP transport failure (connection, timeout, undecodable body).
    #[error("HTTP request failed")]
    Http(#[from] ureq::Error),

    /// The store rejected a page creation.
    #[error("error creating page: status {status} - body: {body}")]
    CreateRejected {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The store rejected a page update.
    #[error("error updating page {id}: status {status} - body: {body}")]
    UpdateRejected {
        /// Page id.
        id: i64,
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The store rejected a page deletion.
    #[error("error deleting page {id}: status {status} - body: {body}")]
    DeleteRejected {
        /// Page id.
        id: i64,
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The parent lookup during create did not yield a usable page.
    #[error("parent page {parent_id} lookup failed with status {status}")]
    ParentLookup {
        /// Parent page id.
        parent_id: i64,
        /// HTTP status returned by the fetch.
        status: u16,
    },

    /// A required fetch failed (update precondition or canonical re-read).
    #[error("page {id} fetch failed with status {status}")]
    PageLookup {
        /// Page id.
        id: i64,
        /// HTTP status returned by the fetch.
        status: u16,
    },

    /// Markup failed validation; no mutating call was issued.
    #[error(transparent)]
    Markup(#[from] ValidationError),

    /// Version pruning must retain at least one version.
    #[error("version pruning must keep at least 1 version, got {keep}")]
    KeepTooSmall {
        /// Requested number of versions to keep.
        keep: i64,
    },
}
