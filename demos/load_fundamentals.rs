//! Loads a stock and an index from the data directory and prints a summary.
//!
//! Run with: `FINDATA_DATA_DIR=data cargo run --example load_fundamentals -- WMT "S&P 500"`

use findata::{
    common_period, load_index_data, load_stock_data, DataConfig, DataDirectory, DataKey, DateRange, Dated,
    IndexOptions, StockOptions,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let mut args = std::env::args().skip(1);
    let stock = args.next().unwrap_or_else(|| "WMT".to_string());
    let index = args.next().unwrap_or_else(|| "S&P 500".to_string());

    let source = DataDirectory::new(DataConfig::from_env());
    println!("📂 Data directory: {}", source.data_dir().display());
    println!();

    let stock_table = load_stock_data(&source, &stock, &StockOptions::default())?;
    let index_table = load_index_data(&source, &index, &IndexOptions::default())?;

    for (name, table) in [(&stock, &stock_table), (&index, &index_table)] {
        let columns: Vec<String> = table.keys().map(|k| k.to_string()).collect();
        println!("{}: {} rows", name, table.len());
        if let Some(range) = table.date_range() {
            println!("  Period: {} to {}", range.start, range.end);
        }
        println!("  Columns: {}", columns.join(", "));
        println!();
    }

    let Some(period) = common_period(&[&stock_table, &index_table]) else {
        println!("No common period.");
        return Ok(());
    };
    println!("Common period: {} to {}", period.start, period.end);

    let last = stock_table.restrict(&DateRange::new(period.end, period.end));
    println!("{} on {}:", stock, period.end);
    println!("{}", serde_json::to_string_pretty(&last)?);

    if let Some(pe) = stock_table.get(DataKey::Pe, period.end) {
        println!("P/E: {:.2}", pe);
    }

    Ok(())
}
