//! Family (parent) and sub-family (child) records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};

/// Maximum number of images attached to one sub-family.
pub const MAX_IMAGES: usize = 10;
/// Maximum number of videos attached to one sub-family.
pub const MAX_VIDEOS: usize = 2;

/// Top-level catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyRecord {
    pub id: Uuid,
    pub name: String,
    pub brand_id: Uuid,
    pub product_category_id: Option<Uuid>,
    pub condition_category_id: Option<Uuid>,
    pub sequence: u32,
    /// Server-assigned, immutable.
    pub code: String,
}

/// Variant of a family. Owned by its parent through `parent_id` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubFamilyRecord {
    pub id: Uuid,
    pub parent_id: Uuid,
    /// Never empty: a blank name is replaced by the parent's name on save.
    pub name: String,
    pub storage_id: Option<Uuid>,
    pub ram_id: Option<Uuid>,
    pub color_id: Option<Uuid>,
    pub sequence: u32,
    /// Server-assigned, immutable.
    pub code: String,
    pub images: Vec<String>,
    pub videos: Vec<String>,
}

/// Resolved reference ids of a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyRefs {
    pub brand_id: Uuid,
    pub product_category_id: Option<Uuid>,
    pub condition_category_id: Option<Uuid>,
}

/// Resolved reference ids of a sub-family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubFamilyRefs {
    pub storage_id: Option<Uuid>,
    pub ram_id: Option<Uuid>,
    pub color_id: Option<Uuid>,
}

/// Family fields sent to the store alongside its [`FamilyRefs`].
///
/// `id: None` creates a record, `Some` updates it in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyDraft {
    pub id: Option<Uuid>,
    pub name: String,
    pub sequence: u32,
}

/// Sub-family fields sent to the store alongside its [`SubFamilyRefs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubFamilyDraft {
    pub id: Option<Uuid>,
    pub name: String,
    pub sequence: u32,
    pub images: Vec<String>,
    pub videos: Vec<String>,
}

/// Result of a save call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedRecord {
    pub id: Uuid,
    pub code: String,
}

/// Record whose sequence can be edited inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceTarget {
    Family(Uuid),
    SubFamily { parent_id: Uuid, id: Uuid },
}

impl std::fmt::Display for SequenceTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Family(id) => write!(f, "family:{id}"),
            Self::SubFamily { parent_id, id } => write!(f, "sub_family:{parent_id}/{id}"),
        }
    }
}

/// Rows ordered by display sequence.
pub trait Sequenced {
    fn id(&self) -> Uuid;
    fn sequence(&self) -> u32;
    fn set_sequence(&mut self, sequence: u32);
}

impl Sequenced for FamilyRecord {
    fn id(&self) -> Uuid {
        self.id
    }

    fn sequence(&self) -> u32 {
        self.sequence
    }

    fn set_sequence(&mut self, sequence: u32) {
        self.sequence = sequence;
    }
}

impl Sequenced for SubFamilyRecord {
    fn id(&self) -> Uuid {
        self.id
    }

    fn sequence(&self) -> u32 {
        self.sequence
    }

    fn set_sequence(&mut self, sequence: u32) {
        self.sequence = sequence;
    }
}

/// Sorts by ascending sequence; equal sequences fall back to id order.
pub fn sort_by_sequence<T: Sequenced>(items: &mut [T]) {
    items.sort_by_key(|item| (item.sequence(), item.id()));
}

/// ## Errors
/// Returns `ValidationError` if `sequence` is zero.
pub fn validate_sequence(sequence: u32) -> ServiceResult<()> {
    if sequence == 0 {
        return Err(ServiceError::ValidationError(
            "sequence must be at least 1".into(),
        ));
    }
    Ok(())
}

/// ## Errors
/// Returns `ValidationError` if more than [`MAX_IMAGES`] images or
/// [`MAX_VIDEOS`] videos are attached.
pub fn validate_media(images: &[String], videos: &[String]) -> ServiceResult<()> {
    if images.len() > MAX_IMAGES {
        return Err(ServiceError::ValidationError(format!(
            "at most {MAX_IMAGES} images allowed, got {}",
            images.len()
        )));
    }
    if videos.len() > MAX_VIDEOS {
        return Err(ServiceError::ValidationError(format!(
            "at most {MAX_VIDEOS} videos allowed, got {}",
            videos.len()
        )));
    }
    Ok(())
}
