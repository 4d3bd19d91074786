use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use grainflow_backtest::{join_signals, BacktestSummary, PriceSeries};
use grainflow_core::{Commodity, ConfigLoader, DailySignal, RawExtraction};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "grainflow")]
#[command(about = "Grain news signal scoring and backtest engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one day's extraction batch and emit the daily outputs
    Score {
        /// JSON file with an array of raw extraction records
        #[arg(short, long)]
        extractions: PathBuf,
        /// Run date (YYYY-MM-DD); defaults to today (UTC)
        #[arg(short, long)]
        date: Option<String>,
        /// Config profile overlay (config/Config.<profile>.toml)
        #[arg(short, long)]
        profile: Option<String>,
    },
    /// Backtest a signal history against futures closes
    Backtest {
        /// JSON file with an array of daily signals
        #[arg(short, long)]
        signals: PathBuf,
        /// Directory with per-commodity close CSVs (wheat.csv, corn.csv, soy.csv)
        #[arg(short, long)]
        prices: PathBuf,
        /// Emit the flat key/value persistence form instead of the full summary
        #[arg(long)]
        flat: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Score {
            extractions,
            date,
            profile,
        } => score(&extractions, date.as_deref(), profile.as_deref()).await,
        Commands::Backtest {
            signals,
            prices,
            flat,
        } => backtest(&signals, &prices, flat),
    }
}

async fn score(extractions: &Path, date: Option<&str>, profile: Option<&str>) -> Result<()> {
    let config = match profile {
        Some(profile) => ConfigLoader::load_with_profile(profile)?,
        None => ConfigLoader::load()?,
    };

    let date = match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))?,
        None => Utc::now().date_naive(),
    };

    let raw = std::fs::read_to_string(extractions)
        .with_context(|| format!("reading {}", extractions.display()))?;
    let raws: Vec<RawExtraction> =
        serde_json::from_str(&raw).context("parsing extraction records")?;

    tracing::info!(count = raws.len(), %date, "scoring extraction batch");

    let outputs = grainflow_signals::run_daily(raws, date, &config).await?;
    println!("{}", serde_json::to_string_pretty(&outputs)?);
    Ok(())
}

fn backtest(signals: &Path, prices_dir: &Path, flat: bool) -> Result<()> {
    let raw = std::fs::read_to_string(signals)
        .with_context(|| format!("reading {}", signals.display()))?;
    let history: Vec<DailySignal> = serde_json::from_str(&raw).context("parsing signal history")?;

    let mut prices: BTreeMap<Commodity, PriceSeries> = BTreeMap::new();
    for commodity in Commodity::grains() {
        let path = prices_dir.join(format!("{commodity}.csv"));
        if !path.exists() {
            tracing::warn!(%commodity, path = %path.display(), "no close series, skipping");
            continue;
        }
        prices.insert(commodity, PriceSeries::from_csv_path(commodity, &path)?);
    }

    tracing::info!(
        signals = history.len(),
        series = prices.len(),
        "joining signal history with price series"
    );

    let outcome = join_signals(&history, &prices);
    let summary = BacktestSummary::from_outcome(&outcome);

    if flat {
        println!("{}", serde_json::to_string_pretty(&summary.to_flat())?);
    } else {
        println!("{}", summary.to_json()?);
    }
    Ok(())
}
