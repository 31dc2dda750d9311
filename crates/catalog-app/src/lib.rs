//! Batch import of family/sub-family forms.

pub mod import;
