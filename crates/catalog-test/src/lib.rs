//! SKU-family catalog - integration test support.
//!
//! Re-exports the workspace crates so integration tests can use a single
//! `catalog_test::` path.

pub use catalog_core as core;
pub use catalog_service as service;
