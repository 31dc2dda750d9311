//! SKU-family hierarchy manager.
//!
//! ## Module Organization
//!
//! - `model`: reference entities, family/sub-family records, forms and pages
//! - `store`: collaborator traits for the backing service, plus an in-memory implementation
//! - `resolver`: get-or-create of reference entities from free-text labels
//! - `cache`: last-request-wins paged views (family table, per-family child views)
//! - `sequence`: inline edit/commit/cancel of display sequences
//! - `catalog`: resolve-then-save and delete flows tying the above together

pub mod cache;
pub mod catalog;
pub mod error;
pub mod model;
pub mod resolver;
pub mod sequence;
pub mod store;

mod sync;

pub use cache::{ChildCache, FamilyTable, FetchOutcome, PagedView, SearchDebouncer};
pub use catalog::CatalogService;
pub use error::{ServiceError, ServiceResult};
pub use resolver::ReferenceResolver;
pub use sequence::{CommitOutcome, SequenceEditor};
pub use store::{FamilyStore, InMemoryCatalog, ReferenceStore};
