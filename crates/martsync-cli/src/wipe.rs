use martsync_core::AppConfig;
use martsync_store::{DocumentStore, WriteOp, CATEGORIES_COLLECTION, PRODUCTS_COLLECTION};

use crate::util;

#[derive(Debug, clap::Args)]
pub struct WipeArgs {
    /// Delete the products collection.
    #[arg(long)]
    pub products: bool,

    /// Delete the categories collection.
    #[arg(long)]
    pub categories: bool,

    /// Delete both collections.
    #[arg(long)]
    pub all: bool,

    /// Required confirmation; there is no undo.
    #[arg(long)]
    pub yes: bool,
}

/// Batched collection wipe. Deletes run in fixed-size atomic batches so a
/// large collection never exceeds the per-request write limit; a failed
/// batch is counted and the remaining batches still run.
pub async fn run(config: &AppConfig, args: WipeArgs) -> anyhow::Result<()> {
    let mut collections: Vec<&str> = Vec::new();
    if args.products || args.all {
        collections.push(PRODUCTS_COLLECTION);
    }
    if args.categories || args.all {
        collections.push(CATEGORIES_COLLECTION);
    }
    if collections.is_empty() {
        anyhow::bail!("nothing selected; pass --products, --categories or --all");
    }
    if !args.yes {
        anyhow::bail!("refusing to delete without --yes");
    }

    let store = util::build_store(config)?;
    let mut total_failed = 0usize;

    for collection in collections {
        let ids = store.list_doc_ids(collection).await?;
        if ids.is_empty() {
            println!("{collection}: already empty");
            continue;
        }

        let mut deleted = 0usize;
        let mut failed = 0usize;
        for chunk in ids.chunks(config.wipe_chunk_size.max(1)) {
            let writes: Vec<WriteOp> = chunk
                .iter()
                .map(|id| WriteOp::Delete {
                    collection: collection.to_string(),
                    doc_id: id.clone(),
                })
                .collect();
            match store.commit(writes).await {
                Ok(()) => deleted += chunk.len(),
                Err(e) => {
                    failed += chunk.len();
                    tracing::error!(collection, records = chunk.len(), error = %e, "delete batch failed");
                }
            }
        }

        println!("{collection}: deleted {deleted} of {}, failed {failed}", ids.len());
        total_failed += failed;
    }

    if total_failed > 0 {
        anyhow::bail!("{total_failed} deletes failed");
    }
    Ok(())
}
