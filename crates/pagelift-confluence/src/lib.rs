//! Confluence page lifecycle client.
//!
//! Create/read/update/delete operations against the Confluence Cloud v2
//! pages API, with storage-format markup validation before every mutating
//! call and version pruning back to a single retained version after updates.
//!
//! The remote store is the single source of truth: canonical page state is
//! only ever taken from a fetch, never from a mutation response.

mod client;
mod error;
mod lifecycle;
mod store;
mod types;
pub mod validator;

pub use client::PageClient;
pub use error::ConfluenceError;
pub use lifecycle::PageLifecycle;
pub use store::ContentStore;
pub use types::{
    ContentBody, ContentRecord, ContentVersion, CreatePageRequest, FetchResult, StorageBody,
    UpdatePageRequest, VersionRef,
};
pub use validator::ValidationError;
