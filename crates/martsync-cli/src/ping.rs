use martsync_core::AppConfig;
use martsync_store::{DocumentStore, PRODUCTS_COLLECTION};

use crate::util;

/// Connectivity check: list the root collections, count products, and
/// show one sample document.
pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let store = util::build_store(config)?;

    let collections = store.list_collection_ids().await?;
    println!("Available collections:");
    for id in &collections {
        println!("  - {id}");
    }

    let products = store.list_docs(PRODUCTS_COLLECTION).await?;
    println!("Products collection: {} documents", products.len());

    if let Some(sample) = products.first() {
        println!();
        println!("Sample product {}:", sample.id);
        for (name, value) in &sample.fields {
            println!("  {name}: {}", util::render_value(value));
        }
    }

    Ok(())
}
