//! Price maintenance over the stored collection: recompute selling
//! prices from buying prices, and audit the markup invariant.

use martsync_core::{round_price, AppConfig};
use martsync_store::{
    DocFields, DocValue, DocumentStore, StoredDoc, WriteOp, PRODUCTS_COLLECTION,
};

use crate::util;

#[derive(Debug, clap::Args)]
pub struct UpdatePricesArgs {
    /// Updates per atomic batch commit.
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Report what would change without writing.
    #[arg(long)]
    pub dry_run: bool,
}

fn buying_price(doc: &StoredDoc) -> f64 {
    doc.fields
        .get("buyingPrice")
        .and_then(DocValue::as_f64)
        .unwrap_or(0.0)
}

fn selling_price(doc: &StoredDoc) -> f64 {
    doc.fields
        .get("sellingPrice")
        .and_then(DocValue::as_f64)
        .unwrap_or(0.0)
}

/// Recompute `sellingPrice = round(buyingPrice × markup, 2)` for every
/// document with a known buying price. The import applies the same rule,
/// so this exists to repair collections written before the rule changed
/// or by failed partial runs.
pub async fn run_update(config: &AppConfig, args: UpdatePricesArgs) -> anyhow::Result<()> {
    let rules = util::load_rules(config)?;
    let store = util::build_store(config)?;
    let chunk_size = args.chunk_size.unwrap_or(config.update_chunk_size).max(1);

    let docs = store.list_docs(PRODUCTS_COLLECTION).await?;
    if docs.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    let mut updates: Vec<WriteOp> = Vec::new();
    let mut skipped = 0usize;

    for doc in &docs {
        let buying = buying_price(doc);
        if buying <= 0.0 {
            skipped += 1;
            continue;
        }
        let new_selling = round_price(buying * rules.markup);

        let mut fields = DocFields::new();
        fields.insert("sellingPrice".to_string(), DocValue::Double(new_selling));
        fields.insert("updatedAt".to_string(), DocValue::ServerTimestamp);
        updates.push(WriteOp::MergeSet {
            collection: PRODUCTS_COLLECTION.to_string(),
            doc_id: doc.id.clone(),
            fields,
        });
    }

    if args.dry_run {
        println!(
            "Dry run: {} documents would be updated, {} skipped (no buying price)",
            updates.len(),
            skipped
        );
        return Ok(());
    }

    let mut updated = 0usize;
    let mut failed = 0usize;
    let total = updates.len();
    for chunk in updates.chunks(chunk_size) {
        match store.commit(chunk.to_vec()).await {
            Ok(()) => updated += chunk.len(),
            Err(e) => {
                failed += chunk.len();
                tracing::error!(records = chunk.len(), error = %e, "price update chunk failed");
            }
        }
    }

    println!("-----------------------------------");
    println!("Update Complete.");
    println!("Updated: {updated} of {total}");
    println!("Skipped: {skipped}");
    println!("Failed:  {failed}");
    println!("-----------------------------------");

    if failed > 0 {
        anyhow::bail!("{failed} price updates failed");
    }
    Ok(())
}

/// Report documents with an unknown buying price and documents whose
/// stored selling price violates the markup invariant.
pub async fn run_audit(config: &AppConfig) -> anyhow::Result<()> {
    let rules = util::load_rules(config)?;
    let store = util::build_store(config)?;

    let docs = store.list_docs(PRODUCTS_COLLECTION).await?;
    if docs.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    let zero_priced: Vec<&StoredDoc> = docs.iter().filter(|d| buying_price(d) <= 0.0).collect();
    let violations: Vec<&StoredDoc> = docs
        .iter()
        .filter(|d| {
            let buying = buying_price(d);
            buying > 0.0 && (selling_price(d) - round_price(buying * rules.markup)).abs() > 0.005
        })
        .collect();

    println!(
        "Found {} products with no buying price",
        zero_priced.len()
    );
    for doc in zero_priced.iter().take(5) {
        let name = doc
            .fields
            .get("name")
            .and_then(DocValue::as_str)
            .unwrap_or("?");
        println!(
            "  {}: {} (selling {})",
            doc.id,
            name,
            selling_price(doc)
        );
    }

    println!("Found {} markup violations", violations.len());
    for doc in violations.iter().take(5) {
        let buying = buying_price(doc);
        println!(
            "  {}: buying {}, selling {}, expected {}",
            doc.id,
            buying,
            selling_price(doc),
            round_price(buying * rules.markup)
        );
    }

    if violations.is_empty() {
        println!("All priced products match the markup rule.");
    }
    Ok(())
}
