//! Resolve-then-save and delete flows for families and sub-families.

use std::sync::Arc;

use catalog_core::config::Settings;
use catalog_core::types::ReferenceKind;
use catalog_core::util::label::normalize_label;
use uuid::Uuid;

use crate::cache::{ChildCache, FamilyTable};
use crate::error::{ServiceError, ServiceResult};
use crate::model::{
    FamilyDraft, FamilyForm, FamilyRefs, SavedRecord, SubFamilyDraft, SubFamilyForm,
    SubFamilyRefs, validate_media, validate_sequence,
};
use crate::resolver::ReferenceResolver;
use crate::sequence::SequenceEditor;
use crate::store::{FamilyStore, ReferenceStore};

/// Entry point tying the resolver, caches and sequence editor to one backing store.
///
/// ## Usage
///
/// ```ignore
/// let catalog = CatalogService::new(Arc::new(InMemoryCatalog::new()), &Settings::default());
/// let saved = catalog.save_family(&FamilyForm::new("iPhone", "apple")).await?;
/// catalog.children().expand(saved.id).await?;
/// ```
pub struct CatalogService {
    store: Arc<dyn FamilyStore>,
    resolver: ReferenceResolver,
    families: Arc<FamilyTable>,
    children: Arc<ChildCache>,
    sequences: SequenceEditor,
}

impl CatalogService {
    /// Builds the service over a store implementing both collaborator traits.
    #[must_use]
    pub fn new<S>(store: Arc<S>, settings: &Settings) -> Self
    where
        S: ReferenceStore + FamilyStore + 'static,
    {
        Self::from_parts(store.clone(), store, settings)
    }

    #[must_use]
    pub fn from_parts(
        references: Arc<dyn ReferenceStore>,
        store: Arc<dyn FamilyStore>,
        settings: &Settings,
    ) -> Self {
        let debounce = settings.search.debounce();
        let families = Arc::new(FamilyTable::new(
            store.clone(),
            settings.catalog.family_page_size,
            debounce,
        ));
        let children = Arc::new(ChildCache::new(
            store.clone(),
            settings.catalog.child_page_size,
            debounce,
        ));

        Self {
            resolver: ReferenceResolver::new(references, settings.catalog.reference_page_size),
            sequences: SequenceEditor::new(store.clone(), families.clone(), children.clone()),
            store,
            families,
            children,
        }
    }

    #[must_use]
    pub const fn resolver(&self) -> &ReferenceResolver {
        &self.resolver
    }

    #[must_use]
    pub fn families(&self) -> &FamilyTable {
        &self.families
    }

    #[must_use]
    pub fn children(&self) -> &ChildCache {
        &self.children
    }

    #[must_use]
    pub const fn sequences(&self) -> &SequenceEditor {
        &self.sequences
    }

    /// ## Summary
    /// Resolves the brand, product category and condition category labels of
    /// `form`, then creates or updates the family.
    ///
    /// All references must resolve before the family is saved; if any
    /// resolution fails nothing is saved (references created earlier in the
    /// same call stay, they are valid shared entities).
    ///
    /// ## Side Effects
    /// - May create reference entities
    /// - Saves the family record
    /// - Refetches the family table
    ///
    /// ## Errors
    /// Returns an error if:
    /// - The name or brand is blank, or the sequence is 0 (no call is made)
    /// - Any reference resolution fails
    /// - The save call fails
    #[tracing::instrument(skip(self, form), fields(name = %form.name, edit = form.id.is_some()))]
    pub async fn save_family(&self, form: &FamilyForm) -> ServiceResult<SavedRecord> {
        let name = required_text(&form.name, "family name")?;
        validate_sequence(form.sequence)?;
        if normalize_label(&form.brand).is_none() {
            return Err(ServiceError::ValidationError("brand is required".into()));
        }

        let brand_id = self
            .resolver
            .resolve(ReferenceKind::Brand, &form.brand)
            .await?
            .ok_or(ServiceError::InvariantViolation("non-blank brand resolved to nothing"))?;
        let product_category_id = self
            .resolver
            .resolve(ReferenceKind::ProductCategory, &form.product_category)
            .await?;
        let condition_category_id = self
            .resolver
            .resolve(ReferenceKind::ConditionCategory, &form.condition_category)
            .await?;

        let saved = self
            .store
            .save_family(
                &FamilyDraft {
                    id: form.id,
                    name,
                    sequence: form.sequence,
                },
                &FamilyRefs {
                    brand_id,
                    product_category_id,
                    condition_category_id,
                },
            )
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Family save failed"))?;

        tracing::info!(id = %saved.id, code = %saved.code, "Family saved");
        self.refresh_families().await;
        Ok(saved)
    }

    /// ## Summary
    /// Resolves the storage, RAM and color labels of `form`, then creates or
    /// updates a sub-family of the family `parent_id`.
    ///
    /// A blank name is replaced by `parent_name`.
    ///
    /// ## Side Effects
    /// - May create reference entities
    /// - Saves the sub-family record
    /// - Refetches (or marks stale) the parent's child view
    ///
    /// ## Errors
    /// Returns an error if:
    /// - Media limits are exceeded or the sequence is 0 (no call is made)
    /// - Any reference resolution fails
    /// - The save call fails
    #[tracing::instrument(skip(self, parent_name, form), fields(edit = form.id.is_some()))]
    pub async fn save_sub_family(
        &self,
        parent_id: Uuid,
        parent_name: &str,
        form: &SubFamilyForm,
    ) -> ServiceResult<SavedRecord> {
        validate_sequence(form.sequence)?;
        validate_media(&form.images, &form.videos)?;
        let name = match form.name.trim() {
            "" => required_text(parent_name, "family name")?,
            name => name.to_owned(),
        };

        let storage_id = self
            .resolver
            .resolve(ReferenceKind::Storage, &form.storage)
            .await?;
        let ram_id = self.resolver.resolve(ReferenceKind::Ram, &form.ram).await?;
        let color_id = self
            .resolver
            .resolve(ReferenceKind::Color, &form.color)
            .await?;

        let saved = self
            .store
            .save_sub_family(
                parent_id,
                &SubFamilyDraft {
                    id: form.id,
                    name,
                    sequence: form.sequence,
                    images: form.images.clone(),
                    videos: form.videos.clone(),
                },
                &SubFamilyRefs {
                    storage_id,
                    ram_id,
                    color_id,
                },
            )
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Sub-family save failed"))?;

        tracing::info!(id = %saved.id, code = %saved.code, "Sub-family saved");
        self.refresh_children(parent_id).await;
        Ok(saved)
    }

    /// ## Summary
    /// Deletes a family and drops its cached child view.
    ///
    /// ## Errors
    /// Returns the store's error, e.g. `Conflict` while sub-families remain.
    #[tracing::instrument(skip(self))]
    pub async fn delete_family(&self, id: Uuid) -> ServiceResult<()> {
        self.store.delete_family(id).await?;
        self.children.evict(id);
        tracing::info!("Family deleted");
        self.refresh_families().await;
        Ok(())
    }

    /// ## Summary
    /// Deletes one sub-family. Siblings are untouched; the parent's view is
    /// refetched at its current page.
    ///
    /// ## Errors
    /// Returns the store's error.
    #[tracing::instrument(skip(self))]
    pub async fn delete_sub_family(&self, parent_id: Uuid, id: Uuid) -> ServiceResult<()> {
        self.store.delete_sub_family(id).await?;
        tracing::info!("Sub-family deleted");
        self.refresh_children(parent_id).await;
        Ok(())
    }

    async fn refresh_families(&self) {
        if let Err(e) = self.families.invalidate().await {
            tracing::warn!(error = %e, "Family table refresh failed");
        }
    }

    async fn refresh_children(&self, parent_id: Uuid) {
        if let Err(e) = self.children.invalidate(parent_id).await {
            tracing::warn!(error = %e, %parent_id, "Child view refresh failed");
        }
    }
}

fn required_text(value: &str, what: &str) -> ServiceResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::ValidationError(format!("{what} is required")));
    }
    Ok(value.to_owned())
}
