//! The top-level family table.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use uuid::Uuid;

use super::debounce::SearchDebouncer;
use super::paged::{FetchOutcome, FetchRequest, PagedSlot, PagedView, check_page};
use crate::error::ServiceResult;
use crate::model::{FamilyRecord, PageQuery};
use crate::store::FamilyStore;
use crate::sync::lock;

#[derive(Default)]
struct FamilyTableState {
    next_ticket: u64,
    slot: Option<PagedSlot<FamilyRecord>>,
}

impl FamilyTableState {
    fn begin(&mut self, page: u32, query: &str) -> FetchRequest {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.slot
            .get_or_insert_with(PagedSlot::new)
            .begin(ticket, page, query)
    }

    fn requested(&self) -> (u32, String) {
        self.slot.as_ref().map_or((1, String::new()), |slot| {
            let (page, query) = slot.requested();
            (page, query.to_owned())
        })
    }
}

/// Paginated, searchable list of families, with the same last-request-wins
/// rule as the per-family child views.
pub struct FamilyTable {
    store: Arc<dyn FamilyStore>,
    page_size: u32,
    state: Mutex<FamilyTableState>,
    debouncer: SearchDebouncer<()>,
}

impl FamilyTable {
    #[must_use]
    pub fn new(store: Arc<dyn FamilyStore>, page_size: u32, debounce: Duration) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
            state: Mutex::new(FamilyTableState::default()),
            debouncer: SearchDebouncer::new(debounce),
        }
    }

    #[must_use]
    pub fn view(&self) -> Option<PagedView<FamilyRecord>> {
        lock(&self.state).slot.as_ref().map(|slot| slot.view().clone())
    }

    /// Looks up a family on the current page.
    #[must_use]
    pub fn row(&self, id: Uuid) -> Option<FamilyRecord> {
        lock(&self.state)
            .slot
            .as_ref()
            .and_then(|slot| slot.view().items.iter().find(|f| f.id == id).cloned())
    }

    /// ## Summary
    /// Loads page 1 unless the table was already loaded. A table whose latest
    /// fetch failed is fetched again with its last requested page and query.
    ///
    /// ## Errors
    /// Returns the fetch error.
    #[tracing::instrument(skip(self))]
    pub async fn ensure_loaded(&self) -> ServiceResult<FetchOutcome> {
        let request = {
            let mut state = lock(&self.state);
            if state.slot.as_ref().is_some_and(|slot| !slot.needs_fetch()) {
                return Ok(FetchOutcome::Cached);
            }
            let (page, query) = state.requested();
            state.begin(page, &query)
        };
        self.fetch(request).await
    }

    /// ## Errors
    /// Returns `ValidationError` for page 0, or the fetch error.
    #[tracing::instrument(skip(self))]
    pub async fn set_page(&self, page: u32) -> ServiceResult<FetchOutcome> {
        check_page(page)?;
        let request = {
            let mut state = lock(&self.state);
            let (_, query) = state.requested();
            state.begin(page, &query)
        };
        self.fetch(request).await
    }

    /// ## Errors
    /// Returns the fetch error.
    #[tracing::instrument(skip(self))]
    pub async fn set_search(&self, query: &str) -> ServiceResult<FetchOutcome> {
        let request = lock(&self.state).begin(1, query.trim());
        self.fetch(request).await
    }

    /// Debounced [`set_search`](Self::set_search).
    ///
    /// ## Errors
    /// Returns the fetch error of a search that ran.
    pub async fn search_debounced(&self, query: &str) -> ServiceResult<FetchOutcome> {
        if !self.debouncer.settle(&()).await {
            return Ok(FetchOutcome::Superseded);
        }
        self.set_search(query).await
    }

    /// ## Summary
    /// Refetches the current page and query after a mutation. A table that
    /// was never loaded is left alone.
    ///
    /// ## Errors
    /// Returns the fetch error.
    #[tracing::instrument(skip(self))]
    pub async fn invalidate(&self) -> ServiceResult<FetchOutcome> {
        let request = {
            let mut state = lock(&self.state);
            if state.slot.is_none() {
                return Ok(FetchOutcome::Deferred);
            }
            let (page, query) = state.requested();
            state.begin(page, &query)
        };
        self.fetch(request).await
    }

    pub fn apply_local_sequence(&self, id: Uuid, sequence: u32) -> bool {
        lock(&self.state)
            .slot
            .as_mut()
            .is_some_and(|slot| slot.apply_local_sequence(id, sequence))
    }

    #[tracing::instrument(skip(self, request), fields(ticket = request.ticket, page = request.page))]
    async fn fetch(&self, request: FetchRequest) -> ServiceResult<FetchOutcome> {
        let query = PageQuery::new(request.page, self.page_size).with_search(&request.query);
        let result = self.store.list_families(&query).await;

        match lock(&self.state).slot.as_mut() {
            Some(slot) => slot.complete(&request, result),
            None => Ok(FetchOutcome::Discarded),
        }
    }
}
