use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storefront::application::engine::Storefront;
use storefront::config::EngineConfig;
use storefront::domain::money::Currency;
use storefront::domain::ports::StoreRef;
use storefront::infrastructure::in_memory::InMemoryStore;
use storefront::interfaces::csv::catalog_reader::CatalogReader;
use storefront::interfaces::csv::report_writer::ReportWriter;
use storefront::interfaces::script::command::CommandReader;
use storefront::interfaces::script::runner::ScriptRunner;
use storefront::telemetry::{self, LogFormat};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReportKind {
    /// Every order with status and total
    Orders,
    /// Every product with its remaining stock
    Stock,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum LogFormatArg {
    #[default]
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON-lines command script
    input: PathBuf,

    /// Products CSV loaded before the script runs
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Customers CSV loaded before the script runs
    #[arg(long)]
    customers: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "STOREFRONT_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Currency for carts created without one
    #[arg(long, env = "STOREFRONT_DEFAULT_CURRENCY", default_value = "EUR")]
    default_currency: Currency,

    /// Print a CSV report instead of one JSON line per command
    #[arg(long, value_enum)]
    report: Option<ReportKind>,

    #[arg(long, value_enum, default_value_t = LogFormatArg::Text)]
    log_format: LogFormatArg,
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<&Path>) -> Result<StoreRef> {
    use storefront::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(path) => Ok(Arc::new(RocksDBStore::open(path).into_diagnostic()?)),
        None => Ok(Arc::new(InMemoryStore::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<&Path>) -> Result<StoreRef> {
    use tracing::warn;

    if let Some(path) = db_path {
        warn!(
            path = %path.display(),
            "WARNING: built without storage-rocksdb, falling back to in-memory storage"
        );
    }
    Ok(Arc::new(InMemoryStore::new()))
}

async fn load_reference_data(shop: &Storefront, cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.catalog {
        let reader = CatalogReader::new(File::open(path).into_diagnostic()?);
        let mut products = Vec::new();
        for product in reader.products() {
            match product {
                Ok(product) => products.push(product),
                Err(e) => eprintln!("Error reading product: {}", e),
            }
        }
        shop.catalog()
            .import_products(products)
            .await
            .into_diagnostic()?;
    }
    if let Some(path) = &cli.customers {
        let reader = CatalogReader::new(File::open(path).into_diagnostic()?);
        let mut customers = Vec::new();
        for customer in reader.customers() {
            match customer {
                Ok(customer) => customers.push(customer),
                Err(e) => eprintln!("Error reading customer: {}", e),
            }
        }
        shop.catalog()
            .import_customers(customers)
            .await
            .into_diagnostic()?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_format.into());

    let store = open_store(cli.db_path.as_deref())?;
    let config = EngineConfig::default().with_default_currency(cli.default_currency);
    let shop = Storefront::new(store, config);

    load_reference_data(&shop, &cli).await?;

    // Process commands
    let file = File::open(&cli.input).into_diagnostic()?;
    let mut runner = ScriptRunner::new(shop.clone());
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for command in CommandReader::new(BufReader::new(file)).commands() {
        match command {
            Ok(command) => match runner.execute(command).await {
                Ok(outcome) => {
                    if cli.report.is_none() {
                        serde_json::to_writer(&mut out, &outcome).into_diagnostic()?;
                        writeln!(out).into_diagnostic()?;
                    }
                }
                Err(e) => eprintln!("Error processing command: {}", e),
            },
            Err(e) => eprintln!("Error reading command: {}", e),
        }
    }

    // Output final state
    if let Some(kind) = cli.report {
        let mut writer = ReportWriter::new(out);
        match kind {
            ReportKind::Orders => {
                let orders = shop.orders().list_orders().await.into_diagnostic()?;
                writer.write_orders(&orders).into_diagnostic()?;
            }
            ReportKind::Stock => {
                let products = shop.catalog().all_products().await.into_diagnostic()?;
                writer.write_stock(&products).into_diagnostic()?;
            }
        }
    }

    Ok(())
}
