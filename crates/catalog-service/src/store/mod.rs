//! Collaborator interfaces of the catalog core.
//!
//! Transport is not this crate's concern: implementations may call a REST
//! API, an RPC service or, as [`InMemoryCatalog`] does, hold everything locally.

mod in_memory;

use async_trait::async_trait;
use catalog_core::types::ReferenceKind;
use uuid::Uuid;

use crate::error::ServiceResult;
use crate::model::{
    FamilyDraft, FamilyRecord, FamilyRefs, NewReference, Page, PageQuery, ReferenceEntity,
    SavedRecord, SequenceTarget, SubFamilyDraft, SubFamilyRecord, SubFamilyRefs,
};

pub use in_memory::InMemoryCatalog;

/// Reference entity listing and creation.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    /// Lists one page of reference entities of `kind`.
    async fn list_references(
        &self,
        kind: ReferenceKind,
        page: u32,
        limit: u32,
    ) -> ServiceResult<Page<ReferenceEntity>>;

    /// Creates a reference entity.
    ///
    /// Fails with `Conflict` if `new.code` (or the title) already exists for `kind`.
    async fn create_reference(
        &self,
        kind: ReferenceKind,
        new: &NewReference,
    ) -> ServiceResult<ReferenceEntity>;
}

/// Family and sub-family persistence.
#[async_trait]
pub trait FamilyStore: Send + Sync {
    async fn list_families(&self, query: &PageQuery) -> ServiceResult<Page<FamilyRecord>>;

    async fn list_children(
        &self,
        parent_id: Uuid,
        query: &PageQuery,
    ) -> ServiceResult<Page<SubFamilyRecord>>;

    /// Fails with `ValidationError` if `sequence` is below 1.
    async fn update_sequence(&self, target: SequenceTarget, sequence: u32) -> ServiceResult<()>;

    async fn save_family(
        &self,
        record: &FamilyDraft,
        refs: &FamilyRefs,
    ) -> ServiceResult<SavedRecord>;

    async fn save_sub_family(
        &self,
        parent_id: Uuid,
        record: &SubFamilyDraft,
        refs: &SubFamilyRefs,
    ) -> ServiceResult<SavedRecord>;

    async fn delete_family(&self, id: Uuid) -> ServiceResult<()>;

    async fn delete_sub_family(&self, id: Uuid) -> ServiceResult<()>;
}
