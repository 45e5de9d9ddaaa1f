use std::path::PathBuf;

use martsync_core::AppConfig;
use martsync_sheet::{locate_header, read_sheet, resolve_columns, sheet_names, Cell};

use crate::util;

#[derive(Debug, clap::Args)]
pub struct AnalyzeArgs {
    /// Path to the workbook to inspect.
    pub file: PathBuf,

    /// Sheet name (default: the first sheet).
    #[arg(long)]
    pub sheet: Option<String>,

    /// How many leading rows to print.
    #[arg(long, default_value_t = 20)]
    pub rows: usize,
}

/// Dump workbook structure so an operator can check the column mapping
/// before an import: sheet names, row count, the leading rows, and how
/// the current rules resolve the header.
pub fn run(config: &AppConfig, args: &AnalyzeArgs) -> anyhow::Result<()> {
    let names = sheet_names(&args.file)?;
    println!("Sheets: {}", names.join(", "));

    let rows = read_sheet(&args.file, args.sheet.as_deref())?;
    println!("Total rows: {}", rows.len());
    println!();

    for (idx, row) in rows.iter().take(args.rows).enumerate() {
        let cells: Vec<String> = row
            .iter()
            .map(Cell::text)
            .filter(|t| !t.trim().is_empty())
            .collect();
        if !cells.is_empty() {
            println!("Row {:>3}: {}", idx + 1, cells.join(" | "));
        }
    }
    println!();

    let rules = util::load_rules(config)?;
    match locate_header(&rows, &rules.header_marker) {
        Ok(header_row) => {
            println!("Header row: {}", header_row + 1);
            let map = resolve_columns(&rows[header_row], &rules.columns)?;
            let col = |idx: Option<usize>| {
                idx.map_or_else(|| "-".to_string(), |i| (i + 1).to_string())
            };
            println!("  item code:     col {}", col(map.item_code));
            println!("  product name:  col {}", map.product_name + 1);
            println!("  gst rate:      col {}", col(map.gst_rate));
            println!("  hsn code:      col {}", col(map.hsn_code));
            println!("  order qty:     col {}", col(map.order_qty));
            println!("  buying price:  col {}", col(map.buying_price));
            println!("  selling price: col {}", col(map.selling_price));
        }
        Err(e) => println!("Header not located: {e}"),
    }

    Ok(())
}
