//! Page lifecycle operations.
//!
//! Owns the multi-step create/read/update/delete/prune flows on top of a
//! [`ContentStore`]. Nothing is cached across calls: every operation
//! re-fetches the state it needs, so the remote store stays the single
//! source of truth.
//!
//! The pre-write fetch and the post-write fetch are deliberately separate
//! calls with separate names. The first obtains a mutation precondition
//! (the current version number); the second returns the server's normalized
//! truth. Collapsing them would risk writing with stale data.

use tracing::{info, warn};

use crate::error::ConfluenceError;
use crate::store::ContentStore;
use crate::types::{ContentRecord, CreatePageRequest, UpdatePageRequest};
use crate::validator;

/// How many versions an update leaves behind in the remote history.
const VERSIONS_RETAINED: i64 = 1;

/// Page lifecycle operations over a content store.
pub struct PageLifecycle<'a, S: ContentStore> {
    store: &'a S,
}

impl<'a, S: ContentStore> PageLifecycle<'a, S> {
    /// Create a lifecycle handle over a store.
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Create a page under `parent_id`, inheriting the parent's space.
    ///
    /// The creation response is not trusted as canonical; the returned
    /// record comes from a follow-up fetch of the new id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError::ParentLookup`] when the parent cannot be
    /// fetched, the validator's error for unacceptable markup (before any
    /// mutating call), and [`ConfluenceError::CreateRejected`] when the
    /// store refuses the creation.
    pub fn create(
        &self,
        parent_id: i64,
        title: &str,
        body: &str,
    ) -> Result<ContentRecord, ConfluenceError> {
        let lookup = self.store.fetch(parent_id)?;
        let status = lookup.status;
        let Some(parent) = lookup.record.filter(|_| status == 200) else {
            return Err(ConfluenceError::ParentLookup { parent_id, status });
        };

        validator::check(body)?;

        let request = CreatePageRequest::new(title, parent.space_id, body, parent_id);
        let new_id = self.store.create(&request)?;
        info!("Created page {} in space {}", new_id, parent.space_id);

        self.canonical(new_id)
    }

    /// Read a page, mapping 404 to absence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError::PageLookup`] for statuses other than 200
    /// and 404; a 404 is `Ok(None)`, the signal for callers to treat the
    /// page as no longer existing.
    pub fn read(&self, id: i64) -> Result<Option<ContentRecord>, ConfluenceError> {
        let result = self.store.fetch(id)?;
        if result.is_missing() {
            return Ok(None);
        }

        let status = result.status;
        match result.record.filter(|_| status == 200) {
            Some(record) => Ok(Some(record)),
            None => Err(ConfluenceError::PageLookup { id, status }),
        }
    }

    /// Replace a page's body with a new version.
    ///
    /// Title and space are carried over unchanged; update never renames or
    /// re-parents. With `prune_previous` set, the remote history is pruned
    /// back to a single retained version after the write.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError::PageLookup`] when the precondition fetch
    /// fails (no PUT is issued), the validator's error for unacceptable
    /// markup, and [`ConfluenceError::UpdateRejected`] when the store
    /// refuses the write.
    pub fn update(
        &self,
        id: i64,
        body: &str,
        prune_previous: bool,
    ) -> Result<ContentRecord, ConfluenceError> {
        let current = self.required_fetch(id)?;

        validator::check(body)?;

        let request = UpdatePageRequest::next_version(&current, body);
        self.store.update(id, &request)?;
        info!("Updated page {} to version {}", id, request.version.number);

        if prune_previous {
            // The version just written is current; no re-read needed to
            // size the deletion loop.
            self.delete_back_to(id, request.version.number, VERSIONS_RETAINED)?;
        }

        self.canonical(id)
    }

    /// Delete the remote history down to the `keep` most recent versions.
    ///
    /// Returns the number of delete calls issued.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError::KeepTooSmall`] for `keep < 1` before any
    /// network call, and [`ConfluenceError::PageLookup`] when the current
    /// version cannot be fetched.
    pub fn prune(&self, id: i64, keep: i64) -> Result<u32, ConfluenceError> {
        if keep < 1 {
            return Err(ConfluenceError::KeepTooSmall { keep });
        }

        let current = self.required_fetch(id)?;
        self.delete_back_to(id, current.version.number, keep)
    }

    /// Delete a page. Single call; no version pruning, no child cleanup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError::DeleteRejected`] on a non-200 response.
    pub fn delete(&self, id: i64) -> Result<(), ConfluenceError> {
        self.store.delete(id)
    }

    /// Issue `current_version - keep` oldest-version deletes.
    ///
    /// The store renumbers the history after each delete, so the loop
    /// counts down locally instead of re-reading remote state. Best-effort:
    /// a rejected delete is logged and the loop continues; a partial prune
    /// leaves extra old versions but never touches the current one.
    fn delete_back_to(&self, id: i64, current_version: i64, keep: i64) -> Result<u32, ConfluenceError> {
        let mut to_delete = current_version - keep;
        let mut issued = 0u32;

        while to_delete > 0 {
            info!("Deleting oldest version of page {} ({} remaining)", id, to_delete);
            let status = self.store.delete_oldest_version(id)?;
            if status != 204 {
                warn!("Unable to delete version of page {}: status {}", id, status);
            }
            issued += 1;
            to_delete -= 1;
        }

        Ok(issued)
    }

    /// Precondition fetch: the page must exist and decode.
    fn required_fetch(&self, id: i64) -> Result<ContentRecord, ConfluenceError> {
        let result = self.store.fetch(id)?;
        let status = result.status;
        result
            .record
            .filter(|_| status == 200)
            .ok_or(ConfluenceError::PageLookup { id, status })
    }

    /// Post-write fetch returning the server's normalized truth.
    fn canonical(&self, id: i64) -> Result<ContentRecord, ConfluenceError> {
        self.required_fetch(id)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::{ContentBody, ContentVersion, FetchResult};

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        Fetch(i64),
        Create,
        Update { id: i64, version: i64 },
        Delete(i64),
        DeleteOldestVersion(i64),
    }

    #[derive(Debug, Clone)]
    struct FakePage {
        title: String,
        space_id: i64,
        parent_id: i64,
        markup: String,
        version: i64,
        stored_versions: i64,
    }

    /// In-memory store recording every wire call.
    struct FakeStore {
        calls: RefCell<Vec<Call>>,
        pages: RefCell<BTreeMap<i64, FakePage>>,
        next_id: Cell<i64>,
        version_delete_status: Cell<u16>,
    }

    impl FakeStore {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                pages: RefCell::new(BTreeMap::new()),
                next_id: Cell::new(500),
                version_delete_status: Cell::new(204),
            }
        }

        fn seed(&self, id: i64, space_id: i64, parent_id: i64, version: i64) {
            self.pages.borrow_mut().insert(
                id,
                FakePage {
                    title: format!("Page {id}"),
                    space_id,
                    parent_id,
                    markup: "<p>seeded</p>".to_owned(),
                    version,
                    stored_versions: version,
                },
            );
        }

        fn record(id: i64, page: &FakePage) -> ContentRecord {
            ContentRecord {
                id,
                title: page.title.clone(),
                space_id: page.space_id,
                parent_id: page.parent_id,
                created_at: "2024-03-01T09:30:00.000Z".to_owned(),
                version: ContentVersion {
                    number: page.version,
                    created_at: "2024-03-02T10:00:00.000Z".to_owned(),
                },
                body: ContentBody::storage(&page.markup),
            }
        }

        fn calls(&self) -> std::cell::Ref<'_, Vec<Call>> {
            self.calls.borrow()
        }

        fn version_delete_calls(&self) -> usize {
            self.calls()
                .iter()
                .filter(|call| matches!(call, Call::DeleteOldestVersion(_)))
                .count()
        }
    }

    impl ContentStore for FakeStore {
        fn fetch(&self, id: i64) -> Result<FetchResult, ConfluenceError> {
            self.calls.borrow_mut().push(Call::Fetch(id));
            Ok(match self.pages.borrow().get(&id) {
                Some(page) => FetchResult {
                    status: 200,
                    record: Some(Self::record(id, page)),
                },
                None => FetchResult {
                    status: 404,
                    record: None,
                },
            })
        }

        fn create(&self, request: &CreatePageRequest) -> Result<i64, ConfluenceError> {
            self.calls.borrow_mut().push(Call::Create);
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            self.pages.borrow_mut().insert(
                id,
                FakePage {
                    title: request.title.clone(),
                    space_id: request.space_id,
                    parent_id: request.parent_id,
                    markup: request
                        .body
                        .storage
                        .as_ref()
                        .map_or_else(String::new, |s| s.value.clone()),
                    version: 1,
                    stored_versions: 1,
                },
            );
            Ok(id)
        }

        fn update(&self, id: i64, request: &UpdatePageRequest) -> Result<(), ConfluenceError> {
            self.calls.borrow_mut().push(Call::Update {
                id,
                version: request.version.number,
            });
            let mut pages = self.pages.borrow_mut();
            let page = pages.get_mut(&id).expect("update of unknown page");
            page.markup = request
                .body
                .storage
                .as_ref()
                .map_or_else(String::new, |s| s.value.clone());
            page.version = request.version.number;
            page.stored_versions += 1;
            Ok(())
        }

        fn delete(&self, id: i64) -> Result<(), ConfluenceError> {
            self.calls.borrow_mut().push(Call::Delete(id));
            self.pages.borrow_mut().remove(&id);
            Ok(())
        }

        fn delete_oldest_version(&self, id: i64) -> Result<u16, ConfluenceError> {
            self.calls.borrow_mut().push(Call::DeleteOldestVersion(id));
            let status = self.version_delete_status.get();
            if status == 204 {
                if let Some(page) = self.pages.borrow_mut().get_mut(&id) {
                    page.stored_versions -= 1;
                }
            }
            Ok(status)
        }
    }

    #[test]
    fn create_inherits_parent_space_and_returns_canonical_record() {
        let store = FakeStore::new();
        store.seed(7, 42, 1, 1);
        let lifecycle = PageLifecycle::new(&store);

        let record = lifecycle.create(7, "New page", "<p>body</p>").unwrap();

        assert_eq!(record.space_id, 42);
        assert_eq!(record.parent_id, 7);
        assert_eq!(record.title, "New page");
        assert_eq!(record.body_markup(), "<p>body</p>");
        assert_eq!(record.version.number, 1);
        assert_eq!(
            *store.calls(),
            vec![Call::Fetch(7), Call::Create, Call::Fetch(record.id)]
        );
    }

    #[test]
    fn create_fails_on_missing_parent_without_posting() {
        let store = FakeStore::new();
        let lifecycle = PageLifecycle::new(&store);

        let err = lifecycle.create(99, "Orphan", "<p>body</p>").unwrap_err();

        assert!(matches!(
            err,
            ConfluenceError::ParentLookup {
                parent_id: 99,
                status: 404
            }
        ));
        assert_eq!(*store.calls(), vec![Call::Fetch(99)]);
    }

    #[test]
    fn create_rejects_invalid_markup_before_posting() {
        let store = FakeStore::new();
        store.seed(7, 42, 1, 1);
        let lifecycle = PageLifecycle::new(&store);

        let err = lifecycle.create(7, "Bad", "<p>never closed").unwrap_err();

        assert!(matches!(err, ConfluenceError::Markup(_)));
        assert_eq!(*store.calls(), vec![Call::Fetch(7)]);
    }

    #[test]
    fn update_bumps_version_and_prunes_back_to_one() {
        let store = FakeStore::new();
        store.seed(100, 42, 7, 1);
        let lifecycle = PageLifecycle::new(&store);

        let record = lifecycle.update(100, "<p>v2</p>", true).unwrap();

        assert_eq!(record.version.number, 2);
        assert_eq!(record.body_markup(), "<p>v2</p>");
        // One GET for the precondition, the PUT, exactly one version
        // delete, then the canonical GET.
        assert_eq!(
            *store.calls(),
            vec![
                Call::Fetch(100),
                Call::Update {
                    id: 100,
                    version: 2
                },
                Call::DeleteOldestVersion(100),
                Call::Fetch(100),
            ]
        );
        assert_eq!(store.pages.borrow()[&100].stored_versions, 1);
    }

    #[test]
    fn update_on_missing_page_issues_no_put() {
        let store = FakeStore::new();
        let lifecycle = PageLifecycle::new(&store);

        let err = lifecycle.update(100, "<p>v2</p>", true).unwrap_err();

        assert!(matches!(
            err,
            ConfluenceError::PageLookup {
                id: 100,
                status: 404
            }
        ));
        assert_eq!(*store.calls(), vec![Call::Fetch(100)]);
    }

    #[test]
    fn update_rejects_invalid_markup_before_put() {
        let store = FakeStore::new();
        store.seed(100, 42, 7, 1);
        let lifecycle = PageLifecycle::new(&store);

        let err = lifecycle.update(100, "<p>ok</p><br>", true).unwrap_err();

        assert!(err.to_string().contains("<br />"));
        assert_eq!(*store.calls(), vec![Call::Fetch(100)]);
    }

    #[test]
    fn update_without_pruning_leaves_history_alone() {
        let store = FakeStore::new();
        store.seed(100, 42, 7, 3);
        let lifecycle = PageLifecycle::new(&store);

        let record = lifecycle.update(100, "<p>v4</p>", false).unwrap();

        assert_eq!(record.version.number, 4);
        assert_eq!(store.version_delete_calls(), 0);
    }

    #[test]
    fn prune_issues_one_delete_per_excess_version() {
        let store = FakeStore::new();
        store.seed(100, 42, 7, 5);
        let lifecycle = PageLifecycle::new(&store);

        let issued = lifecycle.prune(100, 2).unwrap();

        assert_eq!(issued, 3);
        assert_eq!(store.version_delete_calls(), 3);
        assert_eq!(store.pages.borrow()[&100].stored_versions, 2);
    }

    #[test]
    fn prune_is_a_noop_when_nothing_exceeds_keep() {
        let store = FakeStore::new();
        store.seed(100, 42, 7, 1);
        let lifecycle = PageLifecycle::new(&store);

        let issued = lifecycle.prune(100, 1).unwrap();

        assert_eq!(issued, 0);
        assert_eq!(store.version_delete_calls(), 0);
    }

    #[test]
    fn prune_refuses_to_keep_less_than_one_version() {
        let store = FakeStore::new();
        store.seed(100, 42, 7, 5);
        let lifecycle = PageLifecycle::new(&store);

        let err = lifecycle.prune(100, 0).unwrap_err();

        assert!(matches!(err, ConfluenceError::KeepTooSmall { keep: 0 }));
        // Guard fires before any network call.
        assert!(store.calls().is_empty());
    }

    #[test]
    fn prune_continues_past_rejected_version_deletes() {
        let store = FakeStore::new();
        store.seed(100, 42, 7, 4);
        store.version_delete_status.set(500);
        let lifecycle = PageLifecycle::new(&store);

        let issued = lifecycle.prune(100, 1).unwrap();

        // Best-effort: every delete is attempted even though all fail.
        assert_eq!(issued, 3);
        assert_eq!(store.version_delete_calls(), 3);
    }

    #[test]
    fn read_maps_404_to_absence() {
        let store = FakeStore::new();
        let lifecycle = PageLifecycle::new(&store);

        assert!(lifecycle.read(100).unwrap().is_none());
    }

    #[test]
    fn read_returns_the_record() {
        let store = FakeStore::new();
        store.seed(100, 42, 7, 2);
        let lifecycle = PageLifecycle::new(&store);

        let record = lifecycle.read(100).unwrap().unwrap();

        assert_eq!(record.id, 100);
        assert_eq!(record.version.number, 2);
    }

    #[test]
    fn delete_is_a_single_call_with_no_pruning() {
        let store = FakeStore::new();
        store.seed(100, 42, 7, 5);
        let lifecycle = PageLifecycle::new(&store);

        lifecycle.delete(100).unwrap();

        assert_eq!(*store.calls(), vec![Call::Delete(100)]);
        assert!(store.pages.borrow().get(&100).is_none());
    }

    #[test]
    fn replace_sequence_tolerates_delete_then_create() {
        // The surrounding framework models re-parenting as destroy followed
        // by create with a new identity.
        let store = FakeStore::new();
        store.seed(7, 42, 1, 1);
        store.seed(100, 42, 7, 3);
        let lifecycle = PageLifecycle::new(&store);

        lifecycle.delete(100).unwrap();
        let replacement = lifecycle.create(7, "Replacement", "<p>again</p>").unwrap();

        assert_ne!(replacement.id, 100);
        assert_eq!(replacement.version.number, 1);
        assert_eq!(replacement.space_id, 42);
    }
}
