use serde::{Deserialize, Serialize};

/// Shared master-data row (brand, category, condition, storage, RAM, color).
///
/// `title` is unique case-insensitively within its kind; `code` is assigned
/// once at creation and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntity {
    pub id: uuid::Uuid,
    pub title: String,
    pub code: String,
}

/// Body of a create-reference call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReference {
    pub title: String,
    pub code: String,
}
