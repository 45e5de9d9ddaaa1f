use martsync_core::AppConfig;
use martsync_store::{DocumentStore, PRODUCTS_COLLECTION};

use crate::util;

#[derive(Debug, clap::Args)]
pub struct InspectArgs {
    /// Fetch one document by canonical id.
    #[arg(long)]
    pub id: Option<String>,

    /// Collection to read.
    #[arg(long, default_value = PRODUCTS_COLLECTION)]
    pub collection: String,

    /// Sample size when no id is given.
    #[arg(long, default_value_t = 5)]
    pub limit: usize,
}

pub async fn run(config: &AppConfig, args: InspectArgs) -> anyhow::Result<()> {
    let store = util::build_store(config)?;

    if let Some(id) = &args.id {
        match store.get_doc(&args.collection, id).await? {
            None => println!("Document {}/{id} not found", args.collection),
            Some(fields) => {
                println!("{}/{id}:", args.collection);
                for (name, value) in &fields {
                    println!("  {name}: {}", util::render_value(value));
                }
            }
        }
        return Ok(());
    }

    let docs = store.list_docs(&args.collection).await?;
    if docs.is_empty() {
        println!("No documents in {}.", args.collection);
        return Ok(());
    }

    for doc in docs.iter().take(args.limit) {
        println!("ID: {}", doc.id);
        for field in ["name", "category", "buyingPrice", "sellingPrice"] {
            if let Some(value) = doc.fields.get(field) {
                println!("  {field}: {}", util::render_value(value));
            }
        }
        println!("---");
    }
    println!("{} documents total", docs.len());
    Ok(())
}
