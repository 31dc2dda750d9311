//! Client-side caches of paged catalog listings.
//!
//! ## Module Organization
//!
//! - `paged`: ticketed view state shared by every listing
//! - `families`: the top-level family table
//! - `children`: lazily loaded sub-family views keyed by family id
//! - `debounce`: per-key search debouncing

mod children;
mod debounce;
mod families;
mod paged;

pub use children::ChildCache;
pub use debounce::SearchDebouncer;
pub use families::FamilyTable;
pub use paged::{FetchOutcome, PagedView};
