//! Downloads intraday share-prices from Alpha Vantage and loads them back.
//!
//! Run with: `cargo run --example download_intraday -- 5min MSFT IBM`
//! The API key is read from `~/alphavantage_api_key.txt`.

use findata::config::DEFAULT_API_KEY_PATH;
use findata::{
    load_shareprices_intraday, AlphaVantageConfig, AlphaVantageDownloader, DataConfig, DataKey,
    Interval,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let mut args = std::env::args().skip(1);
    let interval: Interval = args.next().unwrap_or_else(|| "5min".to_string()).parse()?;
    let mut tickers: Vec<String> = args.collect();
    if tickers.is_empty() {
        tickers = vec!["MSFT".to_string(), "IBM".to_string()];
    }

    let data_config = DataConfig::from_env();
    let config = AlphaVantageConfig::from_key_file(DEFAULT_API_KEY_PATH)?;
    let downloader = AlphaVantageDownloader::new(config)?;

    println!("📥 Downloading {} share-prices for {}", interval, tickers.join(", "));
    let result = downloader
        .download_shareprices_intraday(&tickers, interval, &data_config.intraday_dir)
        .await;

    println!("  ✓ Successful: {}", result.successful.len());
    println!("  ✗ Failed: {}", result.failed.len());
    for (ticker, error) in &result.failed {
        println!("  ✗ {}: {}", ticker, error);
    }
    println!();

    let batch = load_shareprices_intraday(&data_config.intraday_dir, &tickers, interval);
    for (ticker, series) in batch.loaded() {
        let last_close = series
            .column(DataKey::Close)
            .and_then(|closes| closes.last().copied());
        match last_close {
            Some((timestamp, close)) => {
                println!("  • {}: {} bars, last close {:.2} at {}", ticker, series.bars.len(), close, timestamp)
            }
            None => println!("  • {}: no bars", ticker),
        }
    }
    for (ticker, error) in batch.failures() {
        println!("  ✗ {}: {}", ticker, error);
    }

    Ok(())
}
