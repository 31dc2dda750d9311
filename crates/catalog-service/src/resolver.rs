//! Get-or-create resolution of reference entities from free-text labels.
//!
//! The resolver keeps one snapshot of known entities per [`ReferenceKind`].
//! Snapshots are loaded lazily on first use and only grow afterwards: a
//! successful create is merged in, so resolving the same label again in the
//! same session never issues a second create. Loading, matching, allocating
//! and creating are serialised per kind, so overlapping resolves of one new
//! label create it once.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use catalog_core::code::allocate_code;
use catalog_core::types::ReferenceKind;
use catalog_core::util::label::{labels_match, normalize_label};
use uuid::Uuid;

use crate::error::ServiceResult;
use crate::model::{NewReference, ReferenceEntity};
use crate::store::ReferenceStore;
use crate::sync::lock;

pub struct ReferenceResolver {
    store: Arc<dyn ReferenceStore>,
    page_size: u32,
    snapshots: Mutex<HashMap<ReferenceKind, Vec<ReferenceEntity>>>,
    /// Held across the store calls of one refresh or resolve of a kind.
    kind_locks: Mutex<HashMap<ReferenceKind, Arc<tokio::sync::Mutex<()>>>>,
}

impl ReferenceResolver {
    #[must_use]
    pub fn new(store: Arc<dyn ReferenceStore>, page_size: u32) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
            snapshots: Mutex::new(HashMap::new()),
            kind_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the locally known entities of `kind`, or `None` if the
    /// snapshot has not been loaded yet.
    #[must_use]
    pub fn known(&self, kind: ReferenceKind) -> Option<Vec<ReferenceEntity>> {
        lock(&self.snapshots).get(&kind).cloned()
    }

    /// ## Summary
    /// Replaces the snapshot of `kind` with every entity the store lists,
    /// fetching page after page until `totalDocs` entities have been seen.
    ///
    /// ## Errors
    /// Propagates the first failing list call; the previous snapshot is kept.
    #[tracing::instrument(skip(self), fields(page_size = self.page_size))]
    pub async fn refresh(&self, kind: ReferenceKind) -> ServiceResult<usize> {
        let kind_lock = self.kind_lock(kind);
        let _guard = kind_lock.lock().await;
        self.load_snapshot(kind).await
    }

    fn kind_lock(&self, kind: ReferenceKind) -> Arc<tokio::sync::Mutex<()>> {
        lock(&self.kind_locks).entry(kind).or_default().clone()
    }

    /// Caller holds the lock of `kind`.
    async fn load_snapshot(&self, kind: ReferenceKind) -> ServiceResult<usize> {
        let mut entities = Vec::new();
        let mut page = 1;

        loop {
            let batch = self
                .store
                .list_references(kind, page, self.page_size)
                .await?;
            let received = batch.docs.len();
            entities.extend(batch.docs);

            if received == 0 || entities.len() as u64 >= batch.total_docs {
                break;
            }
            page += 1;
        }

        let count = entities.len();
        lock(&self.snapshots).insert(kind, entities);
        tracing::debug!(count, "Reference snapshot loaded");
        Ok(count)
    }

    /// ## Summary
    /// Resolves a free-text label to a reference entity id, creating the
    /// entity if no entity of `kind` has a case-insensitively equal title.
    ///
    /// Blank labels resolve to `None` (the field is unset). Labels are
    /// title-cased before comparison; the normalized form is the title of a
    /// newly created entity. New codes come from the code allocator seeded
    /// with the codes in the local snapshot.
    ///
    /// ## Side Effects
    /// - Waits for any other refresh or resolve of `kind` to finish
    /// - Loads the snapshot of `kind` on first use
    /// - May create one reference entity and merge it into the snapshot
    ///
    /// ## Errors
    /// Returns an error if loading the snapshot, allocating a code or the
    /// create call fails. Nothing is merged into the snapshot on failure.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, kind: ReferenceKind, label: &str) -> ServiceResult<Option<Uuid>> {
        let Some(title) = normalize_label(label) else {
            tracing::trace!("Blank label, leaving reference unset");
            return Ok(None);
        };

        let kind_lock = self.kind_lock(kind);
        let _guard = kind_lock.lock().await;

        if self.known(kind).is_none() {
            self.load_snapshot(kind).await?;
        }

        let code = {
            let snapshots = lock(&self.snapshots);
            let known = snapshots.get(&kind).map(Vec::as_slice).unwrap_or_default();

            if let Some(existing) = known.iter().find(|e| labels_match(&e.title, &title)) {
                tracing::debug!(id = %existing.id, code = %existing.code, "Reference resolved from snapshot");
                return Ok(Some(existing.id));
            }

            allocate_code(kind.code_prefix(), known.iter().map(|e| e.code.as_str()))?
        };

        let created = self
            .store
            .create_reference(kind, &NewReference { title, code })
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Failed to create reference"))?;

        tracing::info!(id = %created.id, code = %created.code, title = %created.title, "Reference created");

        let id = created.id;
        let mut snapshots = lock(&self.snapshots);
        let known = snapshots.entry(kind).or_default();
        if !known.iter().any(|e| e.id == id) {
            known.push(created);
        }
        Ok(Some(id))
    }
}
