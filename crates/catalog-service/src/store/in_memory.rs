//! `InMemoryCatalog` - `HashMap`-backed collaborator for tests, tooling and embedding.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use catalog_core::types::ReferenceKind;
use catalog_core::util::label::labels_match;
use uuid::Uuid;

use super::{FamilyStore, ReferenceStore};
use crate::error::{ServiceError, ServiceResult};
use crate::model::{
    FamilyDraft, FamilyRecord, FamilyRefs, NewReference, Page, PageQuery, ReferenceEntity,
    SavedRecord, SequenceTarget, SubFamilyDraft, SubFamilyRecord, SubFamilyRefs,
    sort_by_sequence, validate_media, validate_sequence,
};
use crate::sync::lock;

/// Prefix of server-assigned family codes.
const FAMILY_CODE_PREFIX: &str = "FAM";
/// Prefix of server-assigned sub-family codes.
const SUB_FAMILY_CODE_PREFIX: &str = "SUB";
/// Minimum number of digits in a record code.
const RECORD_CODE_WIDTH: usize = 6;

/// Formats a server-assigned record code, e.g. `FAM000001`. Serials wider
/// than [`RECORD_CODE_WIDTH`] digits simply grow the code.
fn record_code(prefix: &str, serial: u64) -> String {
    format!("{prefix}{serial:0width$}", width = RECORD_CODE_WIDTH)
}

#[derive(Default)]
struct CatalogState {
    references: HashMap<ReferenceKind, Vec<ReferenceEntity>>,
    families: BTreeMap<Uuid, FamilyRecord>,
    sub_families: BTreeMap<Uuid, SubFamilyRecord>,
    /// Last serial handed out per record type; never reused after a delete.
    family_serial: u64,
    sub_family_serial: u64,
}

impl CatalogState {
    fn has_reference(&self, kind: ReferenceKind, id: Uuid) -> bool {
        self.references
            .get(&kind)
            .is_some_and(|entities| entities.iter().any(|e| e.id == id))
    }

    fn check_reference(&self, kind: ReferenceKind, id: Option<Uuid>) -> ServiceResult<()> {
        match id {
            Some(id) if !self.has_reference(kind, id) => Err(ServiceError::ValidationError(
                format!("unknown {kind} reference {id}"),
            )),
            _ => Ok(()),
        }
    }
}

/// In-memory catalog backed by ordered maps.
///
/// Clone-friendly via `Arc`; every clone sees the same data.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<Mutex<CatalogState>>,
}

impl InMemoryCatalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a reference entity directly, bypassing code allocation.
    ///
    /// ## Errors
    /// Returns `Conflict` if the code or title is already taken for `kind`.
    pub fn seed_reference(
        &self,
        kind: ReferenceKind,
        title: &str,
        code: &str,
    ) -> ServiceResult<ReferenceEntity> {
        let mut state = lock(&self.state);
        insert_reference(
            &mut state,
            kind,
            &NewReference {
                title: title.to_owned(),
                code: code.to_owned(),
            },
        )
    }

    /// Snapshot of every reference entity of `kind`, in creation order.
    #[must_use]
    pub fn references(&self, kind: ReferenceKind) -> Vec<ReferenceEntity> {
        lock(&self.state)
            .references
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn family(&self, id: Uuid) -> Option<FamilyRecord> {
        lock(&self.state).families.get(&id).cloned()
    }

    #[must_use]
    pub fn sub_family(&self, id: Uuid) -> Option<SubFamilyRecord> {
        lock(&self.state).sub_families.get(&id).cloned()
    }
}

fn insert_reference(
    state: &mut CatalogState,
    kind: ReferenceKind,
    new: &NewReference,
) -> ServiceResult<ReferenceEntity> {
    let title = new.title.trim();
    if title.is_empty() {
        return Err(ServiceError::ValidationError(format!(
            "{kind} title must not be empty"
        )));
    }

    let entities = state.references.entry(kind).or_default();
    if entities.iter().any(|e| e.code == new.code) {
        return Err(ServiceError::Conflict(format!(
            "{kind} code '{}' already exists",
            new.code
        )));
    }
    if entities.iter().any(|e| labels_match(&e.title, title)) {
        return Err(ServiceError::Conflict(format!(
            "{kind} title '{title}' already exists"
        )));
    }

    let entity = ReferenceEntity {
        id: Uuid::now_v7(),
        title: title.to_owned(),
        code: new.code.clone(),
    };
    entities.push(entity.clone());
    Ok(entity)
}

fn matches_search(search: Option<&str>, name: &str, code: &str) -> bool {
    search.is_none_or(|needle| {
        let needle = needle.to_lowercase();
        name.to_lowercase().contains(&needle) || code.to_lowercase().contains(&needle)
    })
}

fn require_name(name: &str, what: &str) -> ServiceResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::ValidationError(format!(
            "{what} name must not be empty"
        )));
    }
    Ok(name.to_owned())
}

#[async_trait]
impl ReferenceStore for InMemoryCatalog {
    async fn list_references(
        &self,
        kind: ReferenceKind,
        page: u32,
        limit: u32,
    ) -> ServiceResult<Page<ReferenceEntity>> {
        let query = PageQuery::new(page, limit);
        query.validate()?;
        Ok(Page::slice(self.references(kind), &query))
    }

    async fn create_reference(
        &self,
        kind: ReferenceKind,
        new: &NewReference,
    ) -> ServiceResult<ReferenceEntity> {
        let mut state = lock(&self.state);
        insert_reference(&mut state, kind, new)
    }
}

#[async_trait]
impl FamilyStore for InMemoryCatalog {
    async fn list_families(&self, query: &PageQuery) -> ServiceResult<Page<FamilyRecord>> {
        query.validate()?;
        let state = lock(&self.state);

        let mut rows: Vec<FamilyRecord> = state
            .families
            .values()
            .filter(|f| matches_search(query.search.as_deref(), &f.name, &f.code))
            .cloned()
            .collect();
        sort_by_sequence(&mut rows);

        Ok(Page::slice(rows, query))
    }

    async fn list_children(
        &self,
        parent_id: Uuid,
        query: &PageQuery,
    ) -> ServiceResult<Page<SubFamilyRecord>> {
        query.validate()?;
        let state = lock(&self.state);

        if !state.families.contains_key(&parent_id) {
            return Err(ServiceError::NotFound(format!("family {parent_id}")));
        }

        let mut rows: Vec<SubFamilyRecord> = state
            .sub_families
            .values()
            .filter(|s| s.parent_id == parent_id)
            .filter(|s| matches_search(query.search.as_deref(), &s.name, &s.code))
            .cloned()
            .collect();
        sort_by_sequence(&mut rows);

        Ok(Page::slice(rows, query))
    }

    async fn update_sequence(&self, target: SequenceTarget, sequence: u32) -> ServiceResult<()> {
        validate_sequence(sequence)?;
        let mut state = lock(&self.state);

        match target {
            SequenceTarget::Family(id) => {
                let family = state
                    .families
                    .get_mut(&id)
                    .ok_or_else(|| ServiceError::NotFound(format!("family {id}")))?;
                family.sequence = sequence;
            }
            SequenceTarget::SubFamily { parent_id, id } => {
                let sub_family = state
                    .sub_families
                    .get_mut(&id)
                    .filter(|s| s.parent_id == parent_id)
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("sub-family {id} of family {parent_id}"))
                    })?;
                sub_family.sequence = sequence;
            }
        }
        Ok(())
    }

    async fn save_family(
        &self,
        record: &FamilyDraft,
        refs: &FamilyRefs,
    ) -> ServiceResult<SavedRecord> {
        validate_sequence(record.sequence)?;
        let name = require_name(&record.name, "family")?;
        let mut state = lock(&self.state);

        state.check_reference(ReferenceKind::Brand, Some(refs.brand_id))?;
        state.check_reference(ReferenceKind::ProductCategory, refs.product_category_id)?;
        state.check_reference(ReferenceKind::ConditionCategory, refs.condition_category_id)?;

        let (id, code) = match record.id {
            Some(id) => {
                let existing = state
                    .families
                    .get(&id)
                    .ok_or_else(|| ServiceError::NotFound(format!("family {id}")))?;
                (id, existing.code.clone())
            }
            None => {
                state.family_serial += 1;
                (
                    Uuid::now_v7(),
                    record_code(FAMILY_CODE_PREFIX, state.family_serial),
                )
            }
        };

        state.families.insert(
            id,
            FamilyRecord {
                id,
                name,
                brand_id: refs.brand_id,
                product_category_id: refs.product_category_id,
                condition_category_id: refs.condition_category_id,
                sequence: record.sequence,
                code: code.clone(),
            },
        );

        Ok(SavedRecord { id, code })
    }

    async fn save_sub_family(
        &self,
        parent_id: Uuid,
        record: &SubFamilyDraft,
        refs: &SubFamilyRefs,
    ) -> ServiceResult<SavedRecord> {
        validate_sequence(record.sequence)?;
        validate_media(&record.images, &record.videos)?;
        let name = require_name(&record.name, "sub-family")?;
        let mut state = lock(&self.state);

        if !state.families.contains_key(&parent_id) {
            return Err(ServiceError::NotFound(format!("family {parent_id}")));
        }
        state.check_reference(ReferenceKind::Storage, refs.storage_id)?;
        state.check_reference(ReferenceKind::Ram, refs.ram_id)?;
        state.check_reference(ReferenceKind::Color, refs.color_id)?;

        let (id, code) = match record.id {
            Some(id) => {
                let existing = state
                    .sub_families
                    .get(&id)
                    .ok_or_else(|| ServiceError::NotFound(format!("sub-family {id}")))?;
                if existing.parent_id != parent_id {
                    return Err(ServiceError::ValidationError(format!(
                        "sub-family {id} belongs to family {}",
                        existing.parent_id
                    )));
                }
                (id, existing.code.clone())
            }
            None => {
                state.sub_family_serial += 1;
                (
                    Uuid::now_v7(),
                    record_code(SUB_FAMILY_CODE_PREFIX, state.sub_family_serial),
                )
            }
        };

        state.sub_families.insert(
            id,
            SubFamilyRecord {
                id,
                parent_id,
                name,
                storage_id: refs.storage_id,
                ram_id: refs.ram_id,
                color_id: refs.color_id,
                sequence: record.sequence,
                code: code.clone(),
                images: record.images.clone(),
                videos: record.videos.clone(),
            },
        );

        Ok(SavedRecord { id, code })
    }

    async fn delete_family(&self, id: Uuid) -> ServiceResult<()> {
        let mut state = lock(&self.state);

        if !state.families.contains_key(&id) {
            return Err(ServiceError::NotFound(format!("family {id}")));
        }
        let children = state
            .sub_families
            .values()
            .filter(|s| s.parent_id == id)
            .count();
        if children > 0 {
            return Err(ServiceError::Conflict(format!(
                "family {id} still has {children} sub-families"
            )));
        }

        state.families.remove(&id);
        Ok(())
    }

    async fn delete_sub_family(&self, id: Uuid) -> ServiceResult<()> {
        lock(&self.state)
            .sub_families
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| ServiceError::NotFound(format!("sub-family {id}")))
    }
}
