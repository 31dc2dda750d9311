//! Paged view state shared by the family table and the per-family child views.
//!
//! ## Summary
//! Every fetch is tagged with a ticket drawn from a counter that only grows.
//! A response is applied only if its ticket is still the latest one issued
//! for the view; anything older is dropped, so a slow page-1 response can
//! never overwrite a page-2 response that was requested after it.

use crate::error::{ServiceError, ServiceResult};
use crate::model::{Page, Sequenced, sort_by_sequence};

/// What a load/refresh call ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The view was already present; nothing was fetched.
    Cached,
    /// A response was fetched and applied.
    Applied,
    /// A response arrived after a newer request was issued and was dropped.
    Discarded,
    /// Nothing to refresh now; the view will refetch when next shown.
    Deferred,
    /// A newer debounced search for the same view replaced this one.
    Superseded,
}

/// Snapshot of one paginated, searchable view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedView<T> {
    /// Rows of the last applied response, ordered by sequence then id.
    pub items: Vec<T>,
    pub total_count: u64,
    pub total_pages: u32,
    /// Page of the last applied response.
    pub current_page: u32,
    /// A request is in flight.
    pub loading: bool,
    /// Search query of the last applied response.
    pub last_search_query: String,
    /// Message of the last failed fetch, cleared by the next applied one.
    pub last_error: Option<String>,
}

impl<T> Default for PagedView<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            total_pages: 0,
            current_page: 1,
            loading: false,
            last_search_query: String::new(),
            last_error: None,
        }
    }
}

/// Request issued for a view: which page and query to fetch, and the ticket
/// its response must present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FetchRequest {
    pub(crate) ticket: u64,
    pub(crate) page: u32,
    pub(crate) query: String,
}

/// Mutable state behind a [`PagedView`].
#[derive(Debug)]
pub(crate) struct PagedSlot<T> {
    view: PagedView<T>,
    requested_page: u32,
    requested_query: String,
    latest_ticket: u64,
    /// Some response was applied at least once.
    applied: bool,
}

impl<T: Clone + Sequenced> PagedSlot<T> {
    pub(crate) fn new() -> Self {
        Self {
            view: PagedView::default(),
            requested_page: 1,
            requested_query: String::new(),
            latest_ticket: 0,
            applied: false,
        }
    }

    pub(crate) const fn view(&self) -> &PagedView<T> {
        &self.view
    }

    /// `true` if showing this view must fetch again: nothing was ever
    /// applied, or the latest request failed. A request in flight counts as
    /// loading, not missing.
    pub(crate) const fn needs_fetch(&self) -> bool {
        !self.view.loading && (!self.applied || self.view.last_error.is_some())
    }

    /// Page and query of the most recent request, applied or not.
    pub(crate) fn requested(&self) -> (u32, &str) {
        (self.requested_page, &self.requested_query)
    }

    /// Marks the view loading and records `ticket` as the only response
    /// that may still be applied.
    pub(crate) fn begin(&mut self, ticket: u64, page: u32, query: &str) -> FetchRequest {
        self.latest_ticket = ticket;
        self.requested_page = page;
        query.clone_into(&mut self.requested_query);
        self.view.loading = true;

        FetchRequest {
            ticket,
            page,
            query: query.to_owned(),
        }
    }

    /// ## Summary
    /// Applies the response to `request` if it is still the latest.
    ///
    /// A failed latest response keeps the previous rows on display and only
    /// records the error.
    ///
    /// ## Errors
    /// Returns the fetch error when the failed request is still the latest.
    pub(crate) fn complete(
        &mut self,
        request: &FetchRequest,
        result: ServiceResult<Page<T>>,
    ) -> ServiceResult<FetchOutcome> {
        if request.ticket != self.latest_ticket {
            tracing::debug!(
                ticket = request.ticket,
                latest = self.latest_ticket,
                failed = result.is_err(),
                "Discarding superseded response"
            );
            return Ok(FetchOutcome::Discarded);
        }

        self.view.loading = false;

        match result {
            Ok(page) => {
                let mut items = page.docs;
                sort_by_sequence(&mut items);

                self.view.items = items;
                self.view.total_count = page.total_docs;
                self.view.total_pages = page.total_pages;
                self.view.current_page = request.page;
                self.view.last_search_query.clone_from(&request.query);
                self.view.last_error = None;
                self.applied = true;
                Ok(FetchOutcome::Applied)
            }
            Err(e) => {
                tracing::warn!(error = %e, page = request.page, "Fetch failed, keeping previous rows");
                self.view.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Updates one row's sequence locally and re-sorts the rows.
    ///
    /// Returns `false` if the row is not on the current page.
    pub(crate) fn apply_local_sequence(&mut self, id: uuid::Uuid, sequence: u32) -> bool {
        let Some(row) = self.view.items.iter_mut().find(|row| row.id() == id) else {
            return false;
        };
        row.set_sequence(sequence);
        sort_by_sequence(&mut self.view.items);
        true
    }
}

/// ## Errors
/// Returns `ValidationError` for page 0.
pub(crate) fn check_page(page: u32) -> ServiceResult<()> {
    if page == 0 {
        return Err(ServiceError::ValidationError("page must be at least 1".into()));
    }
    Ok(())
}
