use std::path::PathBuf;

use martsync_core::AppConfig;
use martsync_import::{run_import, ImportOptions, RunSummary};
use martsync_sheet::read_sheet;
use martsync_store::{DocumentStore, MemoryStore};

use crate::util;

#[derive(Debug, clap::Args)]
pub struct ImportArgs {
    /// Path to the order-format xlsx export.
    pub file: PathBuf,

    /// Sheet name (default: the first sheet).
    #[arg(long)]
    pub sheet: Option<String>,

    /// Records per atomic batch commit.
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Parse and report without writing to the store.
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(config: &AppConfig, args: ImportArgs) -> anyhow::Result<()> {
    let rules = util::load_rules(config)?;
    let rows = read_sheet(&args.file, args.sheet.as_deref())?;

    let options = ImportOptions {
        chunk_size: args.chunk_size.unwrap_or(config.import_chunk_size),
        dry_run: args.dry_run,
    };

    // Dry runs never touch the store, so they need neither project id
    // nor token.
    let store: Box<dyn DocumentStore> = if args.dry_run {
        Box::new(MemoryStore::new())
    } else {
        Box::new(util::build_store(config)?)
    };

    let summary = run_import(&rows, rules, store.as_ref(), options).await?;
    print_summary(&summary, args.dry_run);

    if summary.has_failures() {
        anyhow::bail!(
            "import finished with failures: {} categories, {} products",
            summary.categories.failed,
            summary.products.failed
        );
    }
    Ok(())
}

fn print_summary(summary: &RunSummary, dry_run: bool) {
    println!("=== Import {} ===", if dry_run { "Dry Run" } else { "Complete" });
    println!("Header row:        {}", summary.header_row + 1);
    println!(
        "Products parsed:   {} (skipped {}, collisions {})",
        summary.parsed, summary.skipped, summary.collisions
    );
    println!("Categories found:  {}", summary.category_count);
    if !dry_run {
        println!(
            "Category writes:   {} ok, {} failed",
            summary.categories.succeeded, summary.categories.failed
        );
        println!(
            "Product writes:    {} ok, {} failed (of {})",
            summary.products.succeeded, summary.products.failed, summary.products.attempted
        );
    }
}
