use crate::config::DataConfig;
use crate::error::DataError;
use crate::loaders::{self, PriceHistory};
use crate::time_series::{DailySeries, TimeSeries};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// File name of the U.S. Consumer Price Index data.
pub const USA_CPI_FILE: &str = "USA CPI.csv";

/// File name of the 1-year U.S. Government Bond yields.
pub const USA_BOND_YIELD_1Y_FILE: &str = "USA Gov Bond Yield 1-Year.txt";

/// Per-share fundamentals stored in separate files for each ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fundamental {
    EarningsPerShare,
    SalesPerShare,
    BookValuePerShare,
    /// Dividend per share as paid (used for index Total Return)
    DividendPerShare,
    /// Dividend per share over the trailing twelve months
    DividendPerShareTtm,
}

impl Fundamental {
    /// Name used in the data-file name after the ticker.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Fundamental::EarningsPerShare => "Earnings Per Share",
            Fundamental::SalesPerShare => "Sales Per Share",
            Fundamental::BookValuePerShare => "Book-Value Per Share",
            Fundamental::DividendPerShare => "Dividend Per Share",
            Fundamental::DividendPerShareTtm => "Dividend Per Share TTM",
        }
    }
}

impl fmt::Display for Fundamental {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// Source of raw data for a ticker.
///
/// This trait keeps the assemblers independent of where the data lives.
/// Implementations:
/// - [`DataDirectory`] reads the data files from disk
/// - [`InMemoryDataSource`] serves series held in memory (for testing)
pub trait DataSource {
    /// Returns the daily share-price and total return.
    ///
    /// # Errors
    /// Returns an error if the price data is missing or malformed.
    fn share_price(&self, ticker: &str) -> Result<PriceHistory, DataError>;

    /// Returns the raw (not resampled) series for a fundamental.
    ///
    /// # Errors
    /// Returns an error if the data is missing or malformed.
    fn fundamental(&self, ticker: &str, metric: Fundamental) -> Result<TimeSeries, DataError>;
}

/// Data files in a directory, named by ticker and metric, e.g.
/// `"WMT Share-Price (Yahoo).csv"` and `"WMT Sales Per Share.txt"`.
#[derive(Debug, Clone)]
pub struct DataDirectory {
    config: DataConfig,
}

impl DataDirectory {
    pub fn new(config: DataConfig) -> Self {
        DataDirectory { config }
    }

    /// Uses `data_dir` and its `intraday` subdirectory.
    pub fn at(data_dir: impl Into<PathBuf>) -> Self {
        DataDirectory::new(DataConfig::new(data_dir))
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    pub fn intraday_dir(&self) -> &Path {
        &self.config.intraday_dir
    }

    pub fn share_price_path(&self, ticker: &str) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{} Share-Price (Yahoo).csv", ticker))
    }

    pub fn fundamental_path(&self, ticker: &str, metric: Fundamental) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{} {}.txt", ticker, metric.file_stem()))
    }

    /// Loads the U.S. Consumer Price Index, interpolated to daily values.
    pub fn load_usa_cpi(&self) -> Result<DailySeries, DataError> {
        loaders::load_cpi(self.config.data_dir.join(USA_CPI_FILE))
    }

    /// Loads the yields on 1-year U.S. Government Bonds as fractions,
    /// interpolated to daily values.
    pub fn load_usa_gov_bond_1year(&self) -> Result<DailySeries, DataError> {
        loaders::load_bond_yield(self.config.data_dir.join(USA_BOND_YIELD_1Y_FILE))
    }
}

impl DataSource for DataDirectory {
    fn share_price(&self, ticker: &str) -> Result<PriceHistory, DataError> {
        loaders::load_share_price(self.share_price_path(ticker))
    }

    fn fundamental(&self, ticker: &str, metric: Fundamental) -> Result<TimeSeries, DataError> {
        loaders::load_fundamental(self.fundamental_path(ticker, metric))
    }
}

/// In-memory data source for testing.
///
/// Stores series in HashMaps keyed by ticker (and metric) so assemblers can
/// be exercised without data files.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataSource {
    prices: HashMap<String, PriceHistory>,
    fundamentals: HashMap<(String, Fundamental), TimeSeries>,
}

impl InMemoryDataSource {
    /// Creates a new empty in-memory data source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds raw close and adjusted-close prices for a ticker. Both are
    /// interpolated to daily values, as when loading from file.
    pub fn add_share_price(&mut self, ticker: &str, close: &TimeSeries, adj_close: &TimeSeries) {
        self.prices.insert(
            ticker.to_string(),
            PriceHistory {
                share_price: close.resample_daily(),
                total_return: adj_close.resample_daily(),
            },
        );
    }

    /// Adds a raw fundamental series for a ticker.
    pub fn add_fundamental(&mut self, ticker: &str, metric: Fundamental, series: TimeSeries) {
        self.fundamentals.insert((ticker.to_string(), metric), series);
    }

    /// Clears all data from the source.
    pub fn clear(&mut self) {
        self.prices.clear();
        self.fundamentals.clear();
    }
}

impl DataSource for InMemoryDataSource {
    fn share_price(&self, ticker: &str) -> Result<PriceHistory, DataError> {
        self.prices
            .get(ticker)
            .cloned()
            .ok_or_else(|| DataError::NotFound(format!("{} share-price", ticker)))
    }

    fn fundamental(&self, ticker: &str, metric: Fundamental) -> Result<TimeSeries, DataError> {
        self.fundamentals
            .get(&(ticker.to_string(), metric))
            .cloned()
            .ok_or_else(|| DataError::NotFound(format!("{} {}", ticker, metric)))
    }
}
