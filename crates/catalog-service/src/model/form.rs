//! Free-text forms as submitted by an editor, before reference resolution.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

const fn first_sequence() -> u32 {
    1
}

/// Family create/edit form. Master fields hold the label the user typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyForm {
    /// Record being edited; `None` creates a new family.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub brand: String,
    #[serde(default)]
    pub product_category: String,
    #[serde(default)]
    pub condition_category: String,
    #[serde(default = "first_sequence")]
    pub sequence: u32,
}

impl FamilyForm {
    #[must_use]
    pub fn new(name: impl Into<String>, brand: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            brand: brand.into(),
            product_category: String::new(),
            condition_category: String::new(),
            sequence: first_sequence(),
        }
    }
}

/// Sub-family create/edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubFamilyForm {
    #[serde(default)]
    pub id: Option<Uuid>,
    /// Blank falls back to the parent family's name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub storage: String,
    #[serde(default)]
    pub ram: String,
    #[serde(default)]
    pub color: String,
    #[serde(default = "first_sequence")]
    pub sequence: u32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub videos: Vec<String>,
}

impl Default for SubFamilyForm {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            storage: String::new(),
            ram: String::new(),
            color: String::new(),
            sequence: first_sequence(),
            images: Vec::new(),
            videos: Vec::new(),
        }
    }
}
