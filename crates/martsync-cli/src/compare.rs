use std::path::PathBuf;

use martsync_core::AppConfig;
use martsync_import::parse_rows;
use martsync_sheet::read_sheet;
use martsync_store::{DocumentStore, DocValue, PRODUCTS_COLLECTION};

use crate::util;

#[derive(Debug, clap::Args)]
pub struct CompareArgs {
    /// Path to the order-format xlsx export.
    pub file: PathBuf,

    /// Sheet name (default: the first sheet).
    #[arg(long)]
    pub sheet: Option<String>,

    /// How many products to compare.
    #[arg(long, default_value_t = 5)]
    pub limit: usize,
}

/// Diff sheet prices against stored documents, matched by item code.
pub async fn run(config: &AppConfig, args: CompareArgs) -> anyhow::Result<()> {
    let rules = util::load_rules(config)?;
    let rows = read_sheet(&args.file, args.sheet.as_deref())?;
    let parsed = parse_rows(&rows, rules)?;
    let store = util::build_store(config)?;

    println!("Comparing first {} products...", args.limit);
    println!("Format: [Item Code] Sheet buying/selling  VS  DB buying/selling");

    for record in parsed.records.iter().take(args.limit) {
        if record.item_code.is_empty() {
            println!("[{}] no item code, skipped", record.product_id);
            continue;
        }

        let matches = store
            .query_eq(
                PRODUCTS_COLLECTION,
                "itemCode",
                DocValue::Text(record.item_code.clone()),
            )
            .await?;

        match matches.first() {
            None => println!("[{}] not found in DB", record.item_code),
            Some(doc) => {
                let db_buying = doc
                    .fields
                    .get("buyingPrice")
                    .and_then(DocValue::as_f64)
                    .unwrap_or(0.0);
                let db_selling = doc
                    .fields
                    .get("sellingPrice")
                    .and_then(DocValue::as_f64)
                    .unwrap_or(0.0);
                println!(
                    "[{}] {} / {}  VS  {} / {}",
                    record.item_code,
                    record.buying_price,
                    record.selling_price,
                    db_buying,
                    db_selling
                );
            }
        }
    }

    Ok(())
}
