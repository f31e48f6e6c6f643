//! Wire types for the Confluence v2 pages API.

use serde::{Deserialize, Serialize};

/// Canonical server-side view of a page, as returned by a fetch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    /// Store-assigned page id, immutable once created.
    pub id: i64,
    /// Page title.
    pub title: String,
    /// Containing space, inherited from the parent at creation time.
    #[serde(default)]
    pub space_id: i64,
    /// Id of the containing page.
    #[serde(default)]
    pub parent_id: i64,
    /// Creation timestamp (RFC 3339, carried opaquely).
    #[serde(default)]
    pub created_at: String,
    /// Current version information.
    pub version: ContentVersion,
    /// Page body content.
    #[serde(default)]
    pub body: ContentBody,
}

impl ContentRecord {
    /// Storage-format markup of the current version.
    #[must_use]
    pub fn body_markup(&self) -> &str {
        self.body.storage.as_ref().map_or("", |s| s.value.as_str())
    }
}

/// Page version metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentVersion {
    /// Version number, starting at 1.
    pub number: i64,
    /// Timestamp of this version (RFC 3339, carried opaquely).
    #[serde(default)]
    pub created_at: String,
}

/// Page body envelope.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContentBody {
    /// Storage format content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageBody>,
}

impl ContentBody {
    /// Wrap markup in a storage-format body.
    #[must_use]
    pub fn storage(markup: &str) -> Self {
        Self {
            storage: Some(StorageBody::new(markup)),
        }
    }
}

/// Storage format representation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageBody {
    /// Markup in Confluence storage format.
    pub value: String,
    /// Content representation (always "storage").
    pub representation: String,
}

impl StorageBody {
    /// Storage-format body from markup.
    #[must_use]
    pub fn new(markup: &str) -> Self {
        Self {
            value: markup.to_owned(),
            representation: "storage".to_owned(),
        }
    }
}

/// Outcome of a fetch.
///
/// The HTTP status is always passed through: different callers react
/// differently to 404 (absence vs. hard error), so this layer does not
/// convert non-2xx statuses into errors.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// HTTP status of the fetch.
    pub status: u16,
    /// Decoded record, present only on a 200 response.
    pub record: Option<ContentRecord>,
}

impl FetchResult {
    /// Whether the store reported the page as absent.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.status == 404
    }
}

/// Request body for creating a page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageRequest {
    /// Content status (always "current").
    pub status: String,
    /// Page title.
    pub title: String,
    /// Space inherited from the parent page.
    pub space_id: i64,
    /// Storage-format body.
    pub body: ContentBody,
    /// Containing page id.
    pub parent_id: i64,
}

impl CreatePageRequest {
    /// Build a creation request for a page under `parent_id`.
    #[must_use]
    pub fn new(title: &str, space_id: i64, markup: &str, parent_id: i64) -> Self {
        Self {
            status: "current".to_owned(),
            title: title.to_owned(),
            space_id,
            body: ContentBody::storage(markup),
            parent_id,
        }
    }
}

/// Request body for updating a page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePageRequest {
    /// Page id.
    pub id: i64,
    /// Content status (always "current").
    pub status: String,
    /// Title carried over unchanged; update never renames.
    pub title: String,
    /// Space carried over unchanged; update never re-parents.
    pub space_id: i64,
    /// Replacement storage-format body.
    pub body: ContentBody,
    /// Version to write.
    pub version: VersionRef,
}

/// Version number reference in a mutation request.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VersionRef {
    /// Version number.
    pub number: i64,
}

impl UpdatePageRequest {
    /// Build the next-version write from the current canonical record.
    ///
    /// The version-number read in `current` must happen before this write;
    /// the store expects exactly current + 1.
    #[must_use]
    pub fn next_version(current: &ContentRecord, markup: &str) -> Self {
        Self {
            id: current.id,
            status: "current".to_owned(),
            title: current.title.clone(),
            space_id: current.space_id,
            body: ContentBody::storage(markup),
            version: VersionRef {
                number: current.version.number + 1,
            },
        }
    }
}
