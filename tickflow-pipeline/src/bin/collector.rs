//! Historical collection binary: one fetch cycle, one dataset file.
//!
//! Fetches the configured lookback of candles page by page, gathers the side
//! channels, assembles the tagged dataset and writes it as a timestamped CSV
//! into the data directory. Run it on a schedule; each run adds one file and
//! never mutates earlier ones.

use chrono::Utc;
use tickflow_data::{
    error::DataError,
    exchange::binance::BinanceClient,
    fetch::PaginatedFetcher,
    record::TimeRange,
};
use tickflow_pipeline::{init_logging, PipelineConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    init_logging();

    let config = PipelineConfig::from_env();
    info!(
        symbol = config.symbol,
        lookback_minutes = config.lookback_minutes,
        page_span_minutes = config.page_span_minutes,
        data_dir = %config.data_dir.display(),
        "starting historical collection run"
    );

    if let Err(error) = run(&config).await {
        error!(%error, "collection run failed");
        std::process::exit(1);
    }
}

async fn run(config: &PipelineConfig) -> Result<(), DataError> {
    std::fs::create_dir_all(&config.data_dir)?;

    let client = BinanceClient::new(config.binance_config())?;
    let fetcher = PaginatedFetcher::with_config(client, config.fetch_config());

    let range = TimeRange::lookback_from(
        Utc::now(),
        chrono::Duration::minutes(config.lookback_minutes),
    )?;

    let dataset = fetcher.fetch_cycle(&config.symbol, range).await?;

    let path = config.data_dir.join(config.dataset_file_name(Utc::now()));
    dataset.write_csv(&path)?;

    info!(
        records = dataset.len(),
        path = %path.display(),
        "dataset written"
    );
    Ok(())
}
