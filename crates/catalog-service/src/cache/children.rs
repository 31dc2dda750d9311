//! Lazily loaded sub-family views, one per expanded family row.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use uuid::Uuid;

use super::debounce::SearchDebouncer;
use super::paged::{FetchOutcome, FetchRequest, PagedSlot, PagedView, check_page};
use crate::error::ServiceResult;
use crate::model::{PageQuery, SubFamilyRecord};
use crate::store::FamilyStore;
use crate::sync::lock;

struct ChildEntry {
    slot: PagedSlot<SubFamilyRecord>,
    expanded: bool,
    /// Invalidated while collapsed; refetch on next expansion.
    stale: bool,
}

impl ChildEntry {
    fn new() -> Self {
        Self {
            slot: PagedSlot::new(),
            expanded: false,
            stale: false,
        }
    }
}

#[derive(Default)]
struct ChildCacheState {
    next_ticket: u64,
    entries: HashMap<Uuid, ChildEntry>,
}

impl ChildCacheState {
    fn begin(&mut self, parent_id: Uuid, page: u32, query: &str) -> FetchRequest {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let entry = self.entries.entry(parent_id).or_insert_with(ChildEntry::new);
        entry.stale = false;
        entry.slot.begin(ticket, page, query)
    }

    fn requested(&mut self, parent_id: Uuid) -> (u32, String) {
        let entry = self.entries.entry(parent_id).or_insert_with(ChildEntry::new);
        let (page, query) = entry.slot.requested();
        (page, query.to_owned())
    }
}

/// Per-family cache of paginated, searchable sub-family views.
///
/// An absent entry means "never loaded", not "no children". Entries are
/// independent: requests, tickets and debounce timers of one family never
/// affect another.
pub struct ChildCache {
    store: Arc<dyn FamilyStore>,
    page_size: u32,
    state: Mutex<ChildCacheState>,
    debouncer: SearchDebouncer<Uuid>,
}

impl ChildCache {
    #[must_use]
    pub fn new(store: Arc<dyn FamilyStore>, page_size: u32, debounce: Duration) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
            state: Mutex::new(ChildCacheState::default()),
            debouncer: SearchDebouncer::new(debounce),
        }
    }

    /// Snapshot of the view for `parent_id`, if it was ever loaded.
    #[must_use]
    pub fn view(&self, parent_id: Uuid) -> Option<PagedView<SubFamilyRecord>> {
        lock(&self.state)
            .entries
            .get(&parent_id)
            .map(|entry| entry.slot.view().clone())
    }

    #[must_use]
    pub fn is_expanded(&self, parent_id: Uuid) -> bool {
        lock(&self.state)
            .entries
            .get(&parent_id)
            .is_some_and(|entry| entry.expanded)
    }

    /// ## Summary
    /// Loads page 1 of `parent_id`'s children unless a view already exists.
    ///
    /// A loaded or loading view is a cache hit. A view invalidated while
    /// collapsed, or whose latest fetch failed, is refetched with its last
    /// requested page and query.
    ///
    /// ## Errors
    /// Returns the fetch error; a previously loaded view stays on display.
    #[tracing::instrument(skip(self))]
    pub async fn ensure_loaded(&self, parent_id: Uuid) -> ServiceResult<FetchOutcome> {
        self.load(parent_id, false).await
    }

    /// Marks the row expanded and loads its view if needed.
    ///
    /// ## Errors
    /// See [`ensure_loaded`](Self::ensure_loaded).
    #[tracing::instrument(skip(self))]
    pub async fn expand(&self, parent_id: Uuid) -> ServiceResult<FetchOutcome> {
        self.load(parent_id, true).await
    }

    /// Marks the row collapsed. The view stays cached.
    pub fn collapse(&self, parent_id: Uuid) {
        if let Some(entry) = lock(&self.state).entries.get_mut(&parent_id) {
            entry.expanded = false;
        }
    }

    /// ## Summary
    /// Fetches `page` of `parent_id`'s children with the current search query.
    ///
    /// ## Errors
    /// Returns `ValidationError` for page 0, or the fetch error.
    #[tracing::instrument(skip(self))]
    pub async fn set_page(&self, parent_id: Uuid, page: u32) -> ServiceResult<FetchOutcome> {
        check_page(page)?;
        let request = {
            let mut state = lock(&self.state);
            let (_, query) = state.requested(parent_id);
            state.begin(parent_id, page, &query)
        };
        self.fetch(parent_id, request).await
    }

    /// ## Summary
    /// Fetches page 1 of `parent_id`'s children filtered by `query`.
    ///
    /// ## Errors
    /// Returns the fetch error.
    #[tracing::instrument(skip(self))]
    pub async fn set_search(&self, parent_id: Uuid, query: &str) -> ServiceResult<FetchOutcome> {
        let request = lock(&self.state).begin(parent_id, 1, query.trim());
        self.fetch(parent_id, request).await
    }

    /// ## Summary
    /// Debounced [`set_search`](Self::set_search): the search runs only if no
    /// newer keystroke for the same family arrives within the debounce delay.
    ///
    /// ## Errors
    /// Returns the fetch error of a search that ran.
    pub async fn search_debounced(
        &self,
        parent_id: Uuid,
        query: &str,
    ) -> ServiceResult<FetchOutcome> {
        if !self.debouncer.settle(&parent_id).await {
            return Ok(FetchOutcome::Superseded);
        }
        self.set_search(parent_id, query).await
    }

    /// ## Summary
    /// Refreshes `parent_id`'s view after a mutation.
    ///
    /// An expanded row is refetched with its current page and query. A
    /// collapsed row is only marked stale and refetches on next expansion.
    /// A family that was never loaded has nothing to refresh.
    ///
    /// ## Errors
    /// Returns the fetch error of an immediate refetch.
    #[tracing::instrument(skip(self))]
    pub async fn invalidate(&self, parent_id: Uuid) -> ServiceResult<FetchOutcome> {
        let request = {
            let mut state = lock(&self.state);
            match state.entries.get_mut(&parent_id) {
                None => return Ok(FetchOutcome::Deferred),
                Some(entry) if !entry.expanded => {
                    tracing::debug!("Collapsed child view marked stale");
                    entry.stale = true;
                    return Ok(FetchOutcome::Deferred);
                }
                Some(_) => {
                    let (page, query) = state.requested(parent_id);
                    state.begin(parent_id, page, &query)
                }
            }
        };
        self.fetch(parent_id, request).await
    }

    /// Drops the view of a deleted family. Responses still in flight for it
    /// are discarded on arrival.
    pub fn evict(&self, parent_id: Uuid) {
        lock(&self.state).entries.remove(&parent_id);
        self.debouncer.forget(&parent_id);
    }

    /// Reflects a sequence edit in the cached rows before the server confirms it.
    pub fn apply_local_sequence(&self, parent_id: Uuid, id: Uuid, sequence: u32) -> bool {
        lock(&self.state)
            .entries
            .get_mut(&parent_id)
            .is_some_and(|entry| entry.slot.apply_local_sequence(id, sequence))
    }

    async fn load(&self, parent_id: Uuid, expand: bool) -> ServiceResult<FetchOutcome> {
        let request = {
            let mut state = lock(&self.state);
            let request = match state.entries.get(&parent_id) {
                Some(entry) if !entry.stale && !entry.slot.needs_fetch() => None,
                Some(_) => {
                    let (page, query) = state.requested(parent_id);
                    Some(state.begin(parent_id, page, &query))
                }
                None => Some(state.begin(parent_id, 1, "")),
            };
            if expand && let Some(entry) = state.entries.get_mut(&parent_id) {
                entry.expanded = true;
            }
            request
        };

        match request {
            Some(request) => self.fetch(parent_id, request).await,
            None => {
                tracing::trace!("Child view cache hit");
                Ok(FetchOutcome::Cached)
            }
        }
    }

    #[tracing::instrument(skip(self, request), fields(ticket = request.ticket, page = request.page))]
    async fn fetch(&self, parent_id: Uuid, request: FetchRequest) -> ServiceResult<FetchOutcome> {
        let query = PageQuery::new(request.page, self.page_size).with_search(&request.query);
        let result = self.store.list_children(parent_id, &query).await;

        let mut state = lock(&self.state);
        match state.entries.get_mut(&parent_id) {
            Some(entry) => {
                let outcome = entry.slot.complete(&request, result);
                // The view still owes a successful fetch.
                if outcome.is_err() {
                    entry.stale = true;
                }
                outcome
            }
            None => {
                tracing::debug!("Child view evicted while fetching, dropping response");
                Ok(FetchOutcome::Discarded)
            }
        }
    }
}
