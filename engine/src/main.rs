// rsi-fetcher: fetch daily closes for a ticker, print its RSI and save it as CSV
use anyhow::{Context, Result};
use clap::Parser;
use rsi_engine::config::{AppSettings, SourceKind};
use rsi_engine::data::{CsvPriceProvider, PriceHistoryProvider, YahooChartProvider};
use rsi_engine::indicators::window_from_signed;
use rsi_engine::logging::init_logging;
use rsi_engine::report::{export, render};
use rsi_engine::services::RsiService;
use rsi_engine::EngineError;
use rsi_shared::{HistoryRange, HistoryRequest, Interval};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "rsi-fetcher", version, about = "Fetch daily prices for a ticker and compute its RSI")]
struct Args {
    /// Ticker symbol. Append .NS for NSE listings (RELIANCE.NS) or .BO for BSE (500325.BO)
    symbol: Option<String>,

    /// RSI window in periods
    #[arg(short, long, allow_negative_numbers = true)]
    window: Option<i64>,

    /// History to request: 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y or max
    #[arg(short, long)]
    range: Option<HistoryRange>,

    /// Bar interval: 1d, 1wk or 1mo
    #[arg(short, long)]
    interval: Option<Interval>,

    /// Price source: yahoo or csv
    #[arg(short, long)]
    source: Option<SourceKind>,

    /// Directory holding <SYMBOL>.csv files for the csv source (upper-case name, or the symbol as typed)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory the <SYMBOL>_RSI.csv export is written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Do not write the CSV export
    #[arg(long)]
    no_export: bool,

    /// Rows to show in the table, 0 for all
    #[arg(long, default_value_t = 20)]
    tail: usize,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging("info");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            if let Some(EngineError::NotFound(_)) = err.downcast_ref::<EngineError>() {
                eprintln!("hint: check the symbol; NSE tickers end in .NS and BSE tickers in .BO");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut settings = AppSettings::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(source) = args.source {
        settings.source = source;
    }
    if let Some(range) = args.range {
        settings.range = range;
    }
    if let Some(interval) = args.interval {
        settings.interval = interval;
    }
    if let Some(dir) = args.data_dir {
        settings.csv.data_dir = dir;
    }
    if let Some(dir) = args.output_dir {
        settings.export.output_dir = dir;
    }
    if args.no_export {
        settings.export.enabled = false;
    }

    let window = match args.window {
        Some(window) => window_from_signed(window)?,
        None => settings.rsi.window,
    };
    let symbol = args.symbol.unwrap_or_else(|| settings.default_symbol.clone());
    let request = HistoryRequest::new(symbol, settings.range, settings.interval);

    let provider: Box<dyn PriceHistoryProvider> = match settings.source {
        SourceKind::Yahoo => Box::new(YahooChartProvider::new(settings.yahoo.base_url.clone(), settings.yahoo_timeout())?),
        SourceKind::Csv => Box::new(CsvPriceProvider::new(settings.csv.data_dir.clone(), settings.csv_format()?)),
    };
    info!(source = provider.name(), "Using price source");

    let service = RsiService::new(provider, settings.thresholds());
    let report = service.run(&request, window).await?;

    if args.json {
        println!("{}", render::json(&report)?);
    } else {
        let tail = if args.tail == 0 { None } else { Some(args.tail) };
        print!("{}", render::table(&report, tail));
    }

    if settings.export.enabled {
        let path = export::write_report(&report, &settings.export.output_dir)
            .with_context(|| format!("saving RSI data for {}", report.symbol))?;
        eprintln!("Saved RSI data for {} to {}", report.symbol, path.display());
    }
    Ok(())
}
