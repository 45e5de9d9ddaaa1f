mod analyze;
mod compare;
mod import;
mod inspect;
mod ping;
mod prices;
mod util;
mod wipe;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "martsync")]
#[command(about = "Catalog import and store maintenance for the ordering app")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Import an order-format export into the products collection.
    Import(import::ImportArgs),
    /// Dump a workbook's structure for column-mapping work.
    Analyze(analyze::AnalyzeArgs),
    /// Compare sheet prices against stored documents.
    Compare(compare::CompareArgs),
    /// Recompute stored selling prices from buying prices.
    UpdatePrices(prices::UpdatePricesArgs),
    /// Report zero-price documents and markup violations.
    AuditPrices,
    /// Show one document by id, or a sample of the collection.
    Inspect(inspect::InspectArgs),
    /// Delete documents from the store, in batches.
    Wipe(wipe::WipeArgs),
    /// Check store connectivity and show what is there.
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = martsync_core::load_app_config_from_env()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Import(args) => import::run(&config, args).await,
        Commands::Analyze(args) => analyze::run(&config, &args),
        Commands::Compare(args) => compare::run(&config, args).await,
        Commands::UpdatePrices(args) => prices::run_update(&config, args).await,
        Commands::AuditPrices => prices::run_audit(&config).await,
        Commands::Inspect(args) => inspect::run(&config, args).await,
        Commands::Wipe(args) => wipe::run(&config, args).await,
        Commands::Ping => ping::run(&config).await,
    }
}
