pub mod data_key;
pub mod error;
pub mod config;
pub mod time_series;
pub mod loaders;
pub mod table;
pub mod total_return;
pub mod enrichers;
pub mod data_source;
pub mod assembler;
pub mod intraday;
pub mod alpha_vantage;


pub use data_key::{DataKey, UnknownDataKey, DATE, DATE_TIME};
pub use error::DataError;
pub use config::{AlphaVantageConfig, ConfigError, DataConfig};
pub use time_series::{DailySeries, DateRange, Dated, TimeSeries, TimeSeriesPoint};
pub use loaders::{DateFormat, DelimitedFile, DelimitedFormat, PriceHistory};
pub use table::CombinedTable;
pub use total_return::{total_return, DividendReinvestment};
pub use enrichers::ProfitMargin;
pub use data_source::{DataDirectory, DataSource, Fundamental, InMemoryDataSource};
pub use assembler::{common_period, load_index_data, load_stock_data, IndexOptions, StockOptions};
pub use intraday::{
    load_shareprices_intraday, IntradayBar, IntradayBatch, IntradaySeries, Interval,
    UnknownInterval,
};
pub use alpha_vantage::{AlphaVantageDownloader, DownloadError, DownloadResult};
