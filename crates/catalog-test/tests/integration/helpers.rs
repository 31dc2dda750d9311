#![allow(clippy::expect_used, dead_code)]
//! Test helpers for integration tests.
//!
//! Provides utilities for:
//! - Recording every collaborator call made by the catalog core
//! - Holding back individual `list_children` and `create_reference` responses
//!   to force overlapping calls
//! - Injecting transient failures
//! - Seeding families and sub-families

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::Notify;
use uuid::Uuid;

use catalog_test::core::config::Settings;
use catalog_test::core::types::ReferenceKind;
use catalog_test::service::model::{
    FamilyDraft, FamilyForm, FamilyRecord, FamilyRefs, NewReference, Page, PageQuery,
    ReferenceEntity, SavedRecord, SequenceTarget, SubFamilyDraft, SubFamilyForm, SubFamilyRecord,
    SubFamilyRefs,
};
use catalog_test::service::{
    CatalogService, FamilyStore, InMemoryCatalog, ReferenceStore, ServiceError, ServiceResult,
};

pub use catalog_test::service::{CommitOutcome, FetchOutcome};

/// One collaborator call as seen by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListReferences {
        kind: ReferenceKind,
        page: u32,
        limit: u32,
    },
    CreateReference {
        kind: ReferenceKind,
        title: String,
        code: String,
    },
    ListFamilies {
        page: u32,
        search: Option<String>,
    },
    ListChildren {
        parent_id: Uuid,
        page: u32,
        limit: u32,
        search: Option<String>,
    },
    UpdateSequence {
        target: SequenceTarget,
        sequence: u32,
    },
    SaveFamily {
        id: Option<Uuid>,
        name: String,
        refs: FamilyRefs,
    },
    SaveSubFamily {
        parent_id: Uuid,
        name: String,
    },
    DeleteFamily(Uuid),
    DeleteSubFamily(Uuid),
}

/// Locks a mutex and recovers from poisoning.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            mutex.clear_poison();
            poisoned.into_inner()
        }
    }
}

/// [`InMemoryCatalog`] wrapper that records calls and can delay or fail them.
#[derive(Default)]
pub struct RecordingStore {
    inner: InMemoryCatalog,
    calls: Mutex<Vec<Call>>,
    child_gates: Mutex<HashMap<u32, Arc<Notify>>>,
    create_gates: Mutex<HashMap<ReferenceKind, Arc<Notify>>>,
    failing_children: AtomicUsize,
    failing_families: AtomicUsize,
    failing_creates: Mutex<Vec<ReferenceKind>>,
    failing_sequences: AtomicUsize,
}

impl RecordingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn inner(&self) -> &InMemoryCatalog {
        &self.inner
    }

    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        lock(&self.calls).iter().filter(|call| predicate(call)).count()
    }

    pub fn child_fetches(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::ListChildren { .. }))
            .collect()
    }

    /// Holds the next `list_children` response for `page` until the returned
    /// gate is notified.
    pub fn gate_children_page(&self, page: u32) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        lock(&self.child_gates).insert(page, gate.clone());
        gate
    }

    /// Holds the next `create_reference` response for `kind` until the
    /// returned gate is notified.
    pub fn gate_creates(&self, kind: ReferenceKind) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        lock(&self.create_gates).insert(kind, gate.clone());
        gate
    }

    /// Makes the next `n` `list_children` calls fail with a transient error.
    pub fn fail_children(&self, n: usize) {
        self.failing_children.store(n, Ordering::SeqCst);
    }

    /// Makes the next `n` `list_families` calls fail with a transient error.
    pub fn fail_families(&self, n: usize) {
        self.failing_families.store(n, Ordering::SeqCst);
    }

    /// Makes every `create_reference` call for `kind` fail with a transient error.
    pub fn fail_creates(&self, kind: ReferenceKind) {
        lock(&self.failing_creates).push(kind);
    }

    pub fn fail_sequences(&self, n: usize) {
        self.failing_sequences.store(n, Ordering::SeqCst);
    }

    fn record(&self, call: Call) {
        tracing::trace!(?call, "Store call");
        lock(&self.calls).push(call);
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl ReferenceStore for RecordingStore {
    async fn list_references(
        &self,
        kind: ReferenceKind,
        page: u32,
        limit: u32,
    ) -> ServiceResult<Page<ReferenceEntity>> {
        self.record(Call::ListReferences { kind, page, limit });
        self.inner.list_references(kind, page, limit).await
    }

    async fn create_reference(
        &self,
        kind: ReferenceKind,
        new: &NewReference,
    ) -> ServiceResult<ReferenceEntity> {
        self.record(Call::CreateReference {
            kind,
            title: new.title.clone(),
            code: new.code.clone(),
        });

        let gate = lock(&self.create_gates).remove(&kind);
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if lock(&self.failing_creates).contains(&kind) {
            return Err(ServiceError::Transient(format!("create {kind} timed out")));
        }
        self.inner.create_reference(kind, new).await
    }
}

#[async_trait]
impl FamilyStore for RecordingStore {
    async fn list_families(&self, query: &PageQuery) -> ServiceResult<Page<FamilyRecord>> {
        self.record(Call::ListFamilies {
            page: query.page,
            search: query.search.clone(),
        });
        if Self::take_failure(&self.failing_families) {
            return Err(ServiceError::Transient("list families timed out".into()));
        }
        self.inner.list_families(query).await
    }

    async fn list_children(
        &self,
        parent_id: Uuid,
        query: &PageQuery,
    ) -> ServiceResult<Page<SubFamilyRecord>> {
        self.record(Call::ListChildren {
            parent_id,
            page: query.page,
            limit: query.limit,
            search: query.search.clone(),
        });

        // Read the data before waiting so a held response carries what the
        // store returned at request time.
        let result = self.inner.list_children(parent_id, query).await;

        let gate = lock(&self.child_gates).remove(&query.page);
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if Self::take_failure(&self.failing_children) {
            return Err(ServiceError::Transient("list children timed out".into()));
        }
        result
    }

    async fn update_sequence(&self, target: SequenceTarget, sequence: u32) -> ServiceResult<()> {
        self.record(Call::UpdateSequence { target, sequence });
        if Self::take_failure(&self.failing_sequences) {
            return Err(ServiceError::Transient("update sequence timed out".into()));
        }
        self.inner.update_sequence(target, sequence).await
    }

    async fn save_family(
        &self,
        record: &FamilyDraft,
        refs: &FamilyRefs,
    ) -> ServiceResult<SavedRecord> {
        self.record(Call::SaveFamily {
            id: record.id,
            name: record.name.clone(),
            refs: *refs,
        });
        self.inner.save_family(record, refs).await
    }

    async fn save_sub_family(
        &self,
        parent_id: Uuid,
        record: &SubFamilyDraft,
        refs: &SubFamilyRefs,
    ) -> ServiceResult<SavedRecord> {
        self.record(Call::SaveSubFamily {
            parent_id,
            name: record.name.clone(),
        });
        self.inner.save_sub_family(parent_id, record, refs).await
    }

    async fn delete_family(&self, id: Uuid) -> ServiceResult<()> {
        self.record(Call::DeleteFamily(id));
        self.inner.delete_family(id).await
    }

    async fn delete_sub_family(&self, id: Uuid) -> ServiceResult<()> {
        self.record(Call::DeleteSubFamily(id));
        self.inner.delete_sub_family(id).await
    }
}

/// A catalog service over a [`RecordingStore`].
pub struct Harness {
    pub store: Arc<RecordingStore>,
    pub catalog: CatalogService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(&Settings::default())
    }

    pub fn with_settings(settings: &Settings) -> Self {
        let store = Arc::new(RecordingStore::new());
        let catalog = CatalogService::new(store.clone(), settings);
        Self { store, catalog }
    }

    /// Saves a family with brand "Apple" and returns its stored record.
    pub async fn seed_family(&self, name: &str, sequence: u32) -> FamilyRecord {
        let mut form = FamilyForm::new(name, "Apple");
        form.sequence = sequence;
        let saved = self
            .catalog
            .save_family(&form)
            .await
            .expect("Failed to seed family");
        self.store
            .inner()
            .family(saved.id)
            .expect("Seeded family not stored")
    }

    /// Saves `count` sub-families named `"{prefix} {n}"` with sequence `n`.
    pub async fn seed_children(&self, parent: &FamilyRecord, prefix: &str, count: u32) -> Vec<Uuid> {
        let mut ids = Vec::new();
        for n in 1..=count {
            let form = SubFamilyForm {
                name: format!("{prefix} {n}"),
                sequence: n,
                ..SubFamilyForm::default()
            };
            let saved = self
                .catalog
                .save_sub_family(parent.id, &parent.name, &form)
                .await
                .expect("Failed to seed sub-family");
            ids.push(saved.id);
        }
        ids
    }

    pub fn child_names(&self, parent_id: Uuid) -> Vec<String> {
        self.catalog
            .children()
            .view(parent_id)
            .map(|view| view.items.into_iter().map(|s| s.name).collect())
            .unwrap_or_default()
    }

    /// Yields until the store has seen at least `n` `list_children` calls.
    pub async fn wait_for_child_fetches(&self, n: usize) {
        while self.store.child_fetches().len() < n {
            tokio::task::yield_now().await;
        }
    }
}
