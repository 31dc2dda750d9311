use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};

/// Pagination and search parameters of a list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    /// Free-text filter; `None` lists everything.
    pub search: Option<String>,
}

impl PageQuery {
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            search: None,
        }
    }

    /// Sets the search filter, treating a blank query as no filter.
    #[must_use]
    pub fn with_search(mut self, search: &str) -> Self {
        let search = search.trim();
        self.search = (!search.is_empty()).then(|| search.to_owned());
        self
    }

    /// ## Errors
    /// Returns `ValidationError` if `page` or `limit` is zero.
    pub fn validate(&self) -> ServiceResult<()> {
        if self.page == 0 {
            return Err(ServiceError::ValidationError("page must be at least 1".into()));
        }
        if self.limit == 0 {
            return Err(ServiceError::ValidationError("limit must be at least 1".into()));
        }
        Ok(())
    }
}

/// One page of a list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub docs: Vec<T>,
    pub total_docs: u64,
    pub total_pages: u32,
    pub page: u32,
}

impl<T> Page<T> {
    /// Cuts page `query.page` out of an already filtered and ordered list.
    ///
    /// An empty list still reports one (empty) page.
    #[must_use]
    pub fn slice(all: Vec<T>, query: &PageQuery) -> Self {
        let total_docs = all.len() as u64;
        let limit = query.limit.max(1) as usize;
        let total_pages = u32::try_from(all.len().div_ceil(limit))
            .unwrap_or(u32::MAX)
            .max(1);
        let skip = (query.page.saturating_sub(1) as usize).saturating_mul(limit);

        Self {
            docs: all.into_iter().skip(skip).take(limit).collect(),
            total_docs,
            total_pages,
            page: query.page,
        }
    }
}
