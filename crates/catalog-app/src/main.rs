use std::sync::Arc;

use anyhow::Context;
use catalog_app::import::{ImportBatch, render_tree, run_import};
use catalog_core::config::load_config;
use catalog_core::logging::init_tracing;
use catalog_service::{CatalogService, InMemoryCatalog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_tracing(&config.logging)?;

    tracing::info!(config = ?config, "Configuration loaded");

    let path = std::env::args()
        .nth(1)
        .context("usage: catalog-import <batch.json>")?;
    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {path}"))?;
    let batch: ImportBatch =
        serde_json::from_str(&raw).with_context(|| format!("invalid import batch in {path}"))?;

    let catalog = CatalogService::new(Arc::new(InMemoryCatalog::new()), &config);
    let report = run_import(&catalog, &batch).await;

    for failure in &report.failures {
        tracing::warn!(%failure, "Record skipped");
    }

    print!("{}", render_tree(&catalog).await?);
    println!(
        "imported {} families, {} sub-families, {} failures",
        report.families,
        report.sub_families,
        report.failures.len()
    );

    Ok(())
}
