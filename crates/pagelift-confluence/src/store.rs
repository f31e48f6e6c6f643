//! Seam between the lifecycle operations and the remote store.

use crate::error::ConfluenceError;
use crate::types::{CreatePageRequest, FetchResult, UpdatePageRequest};

/// Remote content store, one method per wire call.
///
/// The version-delete endpoint always targets the oldest revision relative
/// to the store's *current* numbering (the history renumbers after every
/// delete), so it is exposed as a single `delete_oldest_version` primitive.
/// Deciding how many times to call it belongs to the lifecycle layer, which
/// keeps that renumbering assumption isolated and testable against a fake.
pub trait ContentStore {
    /// Fetch a page by id, passing the HTTP status through to the caller.
    ///
    /// Only transport failures are errors; non-200 statuses come back in
    /// the [`FetchResult`] for the caller to interpret.
    fn fetch(&self, id: i64) -> Result<FetchResult, ConfluenceError>;

    /// Create a page and return the new id.
    ///
    /// Only the id from the creation response is trusted; canonical fields
    /// must be re-fetched.
    fn create(&self, request: &CreatePageRequest) -> Result<i64, ConfluenceError>;

    /// Replace a page's content with the next version.
    fn update(&self, id: i64, request: &UpdatePageRequest) -> Result<(), ConfluenceError>;

    /// Delete a page.
    fn delete(&self, id: i64) -> Result<(), ConfluenceError>;

    /// Delete the oldest retained version of a page, returning the HTTP
    /// status. Treating a non-204 status as fatal or not is the caller's
    /// policy decision.
    fn delete_oldest_version(&self, id: i64) -> Result<u16, ConfluenceError>;
}
