use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sheet_metrics::config::{parse_symbols, Config};
use sheet_metrics::fetcher::SheetFetcher;
use sheet_metrics::report::SymbolReport;
use sheet_metrics::table::rows_from_json;
use sheet_metrics::workbook::read_sheet_table;

#[derive(Parser)]
#[command(name = "sheet-metrics")]
#[command(about = "Derive revenue, net income and gross margin from financial sheets", long_about = None)]
struct Cli {
    /// Symbols to report on (comma separated); defaults to SYMBOLS or the built-in list
    #[arg(long, value_delimiter = ',')]
    symbol: Vec<String>,

    /// Local JSON table (array of row objects) instead of the remote provider
    #[arg(long, conflicts_with = "workbook")]
    file: Option<PathBuf>,

    /// Local workbook (xlsx/xls/ods) instead of the remote provider
    #[arg(long)]
    workbook: Option<PathBuf>,

    /// Sheet to read from the workbook (default: first sheet)
    #[arg(long, requires = "workbook")]
    sheet: Option<String>,

    /// Sheet provider base URL
    #[arg(long, env = "SHEET_API_URL")]
    sheet_api_url: Option<String>,

    /// Divisor applied to TTM sums (sheets usually report in thousands)
    #[arg(long)]
    ttm_divisor: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with environment filter support; stdout is reserved for reports
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sheet_metrics=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(url) = cli.sheet_api_url {
        config.sheet_api_url = Some(url);
    }
    if let Some(divisor) = cli.ttm_divisor {
        config.ttm_divisor = divisor;
    }
    if !cli.symbol.is_empty() {
        config.symbols = parse_symbols(&cli.symbol.join(","));
    }
    info!("Starting sheet-metrics with config: {:?}", config);

    let options = config.report_options();
    let mut reports = Vec::new();

    // A local table covers exactly one symbol: the first one given
    let local_symbol = || {
        config
            .symbols
            .first()
            .cloned()
            .ok_or("no symbol given for local table")
    };

    match (cli.file, cli.workbook) {
        (Some(path), _) => {
            let symbol = local_symbol()?;
            info!("Loading table for {} from {}", symbol, path.display());
            let rows = rows_from_json(&std::fs::read_to_string(&path)?)?;
            reports.push(SymbolReport::build(&symbol, &rows, &options));
        }
        (None, Some(path)) => {
            let symbol = local_symbol()?;
            let sheet = cli.sheet;
            let rows =
                tokio::task::spawn_blocking(move || read_sheet_table(path, sheet.as_deref()))
                    .await??;
            reports.push(SymbolReport::build(&symbol, &rows, &options));
        }
        (None, None) => {
            let fetcher = SheetFetcher::new(config.require_sheet_api_url()?);
            for (symbol, result) in fetcher
                .fetch_all(&config.symbols, config.fetch_concurrency)
                .await
            {
                match result {
                    Ok(rows) => reports.push(SymbolReport::build(&symbol, &rows, &options)),
                    Err(e) => error!("Failed to fetch sheet for {}: {}", symbol, e),
                }
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
