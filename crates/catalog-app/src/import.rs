//! Resolve-and-save of a JSON batch of families and their sub-families.

use catalog_service::model::{FamilyForm, SubFamilyForm};
use catalog_service::{CatalogService, ServiceResult};
use serde::Deserialize;

/// Top-level import document.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportBatch {
    pub families: Vec<FamilyEntry>,
}

/// A family form plus the sub-families to create under it.
#[derive(Debug, Clone, Deserialize)]
pub struct FamilyEntry {
    #[serde(flatten)]
    pub family: FamilyForm,
    #[serde(default)]
    pub sub_families: Vec<SubFamilyForm>,
}

/// Outcome of an import run. Failures are reported per record; a failed
/// family skips its sub-families.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub families: usize,
    pub sub_families: usize,
    pub failures: Vec<String>,
}

/// ## Summary
/// Saves every family of `batch`, then its sub-families, in document order.
#[tracing::instrument(skip_all, fields(families = batch.families.len()))]
pub async fn run_import(catalog: &CatalogService, batch: &ImportBatch) -> ImportReport {
    let mut report = ImportReport::default();

    for entry in &batch.families {
        let saved = match catalog.save_family(&entry.family).await {
            Ok(saved) => saved,
            Err(e) => {
                report
                    .failures
                    .push(format!("family '{}': {e}", entry.family.name.trim()));
                continue;
            }
        };
        report.families += 1;

        for sub_family in &entry.sub_families {
            match catalog
                .save_sub_family(saved.id, &entry.family.name, sub_family)
                .await
            {
                Ok(_) => report.sub_families += 1,
                Err(e) => report.failures.push(format!(
                    "sub-family '{}' of '{}': {e}",
                    sub_family.name.trim(),
                    entry.family.name.trim()
                )),
            }
        }
    }

    tracing::info!(
        families = report.families,
        sub_families = report.sub_families,
        failures = report.failures.len(),
        "Import finished"
    );
    report
}

/// ## Summary
/// Renders the catalog as an indented tree, walking every page of the
/// family table and of each family's child view.
///
/// ## Errors
/// Returns the first failing page fetch.
pub async fn render_tree(catalog: &CatalogService) -> ServiceResult<String> {
    let mut out = String::new();
    let families = catalog.families();
    let children = catalog.children();

    let mut page = 1;
    families.set_page(page).await?;
    while let Some(view) = families.view() {
        for family in &view.items {
            out.push_str(&format!(
                "{}  {} (#{})\n",
                family.code, family.name, family.sequence
            ));

            let mut child_page = 1;
            children.set_page(family.id, child_page).await?;
            while let Some(child_view) = children.view(family.id) {
                for child in &child_view.items {
                    out.push_str(&format!(
                        "    {}  {} (#{}, {} images, {} videos)\n",
                        child.code,
                        child.name,
                        child.sequence,
                        child.images.len(),
                        child.videos.len()
                    ));
                }
                if child_page >= child_view.total_pages {
                    break;
                }
                child_page += 1;
                children.set_page(family.id, child_page).await?;
            }
        }

        if page >= view.total_pages {
            break;
        }
        page += 1;
        families.set_page(page).await?;
    }

    Ok(out)
}
