//! Intraday share-prices saved as CSV files by the Alpha Vantage downloader.
//!
//! Each ticker is loaded independently and its outcome recorded, so a batch
//! still yields the tickers that loaded while reporting why the others did
//! not (no file vs. malformed file).

use crate::data_key::DataKey;
use crate::error::DataError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Timestamp layout in Alpha Vantage CSV files.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Columns every intraday file must have.
const REQUIRED_COLUMNS: [&str; 6] = ["timestamp", "open", "high", "low", "close", "volume"];

/// Bar interval supported by the intraday API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1min")]
    Min1,
    #[serde(rename = "5min")]
    Min5,
    #[serde(rename = "15min")]
    Min15,
    #[serde(rename = "30min")]
    Min30,
    #[serde(rename = "60min")]
    Min60,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Min1 => "1min",
            Interval::Min5 => "5min",
            Interval::Min15 => "15min",
            Interval::Min30 => "30min",
            Interval::Min60 => "60min",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unsupported interval.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported interval: {0}")]
pub struct UnknownInterval(pub String);

impl FromStr for Interval {
    type Err = UnknownInterval;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1min" => Ok(Interval::Min1),
            "5min" => Ok(Interval::Min5),
            "15min" => Ok(Interval::Min15),
            "30min" => Ok(Interval::Min30),
            "60min" => Ok(Interval::Min60),
            other => Err(UnknownInterval(other.to_string())),
        }
    }
}

/// Path of the intraday file for `ticker` and `interval` inside `dir`.
pub fn intraday_path(dir: &Path, ticker: &str, interval: Interval) -> PathBuf {
    dir.join(format!(
        "{} Share-Price Intraday {} (AlphaVantage).csv",
        ticker, interval
    ))
}

/// One intraday bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntradayBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Deserialize)]
struct IntradayRecord {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Intraday bars for one ticker, sorted by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntradaySeries {
    pub ticker: String,
    pub interval: Interval,
    pub bars: Vec<IntradayBar>,
}

impl IntradaySeries {
    /// Returns one field of every bar as `(timestamp, value)` pairs.
    ///
    /// Only `Open`, `High`, `Low`, `Close` and `Volume` are intraday columns.
    pub fn column(&self, key: DataKey) -> Option<Vec<(NaiveDateTime, f64)>> {
        let field: fn(&IntradayBar) -> f64 = match key {
            DataKey::Open => |bar| bar.open,
            DataKey::High => |bar| bar.high,
            DataKey::Low => |bar| bar.low,
            DataKey::Close => |bar| bar.close,
            DataKey::Volume => |bar| bar.volume,
            _ => return None,
        };
        Some(self.bars.iter().map(|bar| (bar.timestamp, field(bar))).collect())
    }
}

/// Reads one intraday CSV file.
///
/// # Errors
/// `MissingFile` if the file does not exist, `MissingColumn` if the header
/// lacks a required column (e.g. the API stored an error message instead of
/// data), `Parse` for malformed rows.
pub fn load_intraday_file(
    path: &Path,
    ticker: &str,
    interval: Interval,
) -> Result<IntradaySeries, DataError> {
    let file = File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => DataError::MissingFile {
            path: path.to_path_buf(),
        },
        _ => DataError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let headers = reader
        .headers()
        .map_err(|source| DataError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(DataError::MissingColumn {
            path: path.to_path_buf(),
            column: missing.to_string(),
        });
    }

    let mut bars = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|source| DataError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let parse_error = |message: String| DataError::Parse {
            path: path.to_path_buf(),
            line,
            message,
        };

        let record: IntradayRecord = row
            .deserialize(Some(&headers))
            .map_err(|err| parse_error(err.to_string()))?;
        let timestamp = NaiveDateTime::parse_from_str(&record.timestamp, TIMESTAMP_FORMAT)
            .map_err(|err| {
                parse_error(format!("cannot parse timestamp '{}': {}", record.timestamp, err))
            })?;
        bars.push(IntradayBar {
            timestamp,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
        });
    }

    // Alpha Vantage writes the newest bar first.
    bars.sort_by_key(|bar| bar.timestamp);

    debug!(ticker, %interval, bars = bars.len(), "loaded intraday prices");

    Ok(IntradaySeries {
        ticker: ticker.to_string(),
        interval,
        bars,
    })
}

/// Outcome of loading intraday prices for several tickers.
#[derive(Debug)]
pub struct IntradayBatch {
    pub interval: Interval,
    pub results: BTreeMap<String, Result<IntradaySeries, DataError>>,
}

impl IntradayBatch {
    /// Tickers that loaded successfully.
    pub fn loaded(&self) -> impl Iterator<Item = (&str, &IntradaySeries)> {
        self.results
            .iter()
            .filter_map(|(ticker, result)| result.as_ref().ok().map(|s| (ticker.as_str(), s)))
    }

    /// Tickers that failed, with the reason.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &DataError)> {
        self.results
            .iter()
            .filter_map(|(ticker, result)| result.as_ref().err().map(|e| (ticker.as_str(), e)))
    }

    pub fn get(&self, ticker: &str) -> Option<&IntradaySeries> {
        self.results.get(ticker)?.as_ref().ok()
    }
}

/// Loads the intraday files for all `tickers` from `dir`.
///
/// Never fails as a whole; each ticker's outcome is kept in the batch.
pub fn load_shareprices_intraday<T>(dir: &Path, tickers: &[T], interval: Interval) -> IntradayBatch
where
    T: AsRef<str>,
{
    let results = tickers
        .iter()
        .map(|ticker| {
            let ticker = ticker.as_ref();
            let path = intraday_path(dir, ticker, interval);
            (ticker.to_string(), load_intraday_file(&path, ticker, interval))
        })
        .collect();

    IntradayBatch { interval, results }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::tempdir;

    const SAMPLE: &str = "timestamp,open,high,low,close,volume\n\
        2024-01-05 16:00:00,101.0,102.0,100.5,101.5,2000\n\
        2024-01-05 15:55:00,100.0,101.2,99.8,101.0,1500\n";

    #[test]
    fn test_intraday_path() {
        let path = intraday_path(Path::new("data/intraday"), "MSFT", Interval::Min5);
        assert_eq!(
            path,
            PathBuf::from("data/intraday/MSFT Share-Price Intraday 5min (AlphaVantage).csv")
        );
    }

    #[test]
    fn test_interval_parse_and_display() {
        assert_eq!("15min".parse::<Interval>().unwrap(), Interval::Min15);
        assert_eq!(Interval::Min60.to_string(), "60min");
        let err = "2min".parse::<Interval>().unwrap_err();
        assert_eq!(err, UnknownInterval("2min".to_string()));
        assert_eq!(err.to_string(), "unsupported interval: 2min");
    }

    #[test]
    fn test_load_sorts_bars_ascending() {
        let dir = tempdir().unwrap();
        let path = intraday_path(dir.path(), "MSFT", Interval::Min5);
        fs::write(&path, SAMPLE).unwrap();

        let series = load_intraday_file(&path, "MSFT", Interval::Min5).unwrap();
        assert_eq!(series.bars.len(), 2);
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(15, 55, 0)
            .unwrap();
        assert_eq!(series.bars[0].timestamp, expected);

        let close = series.column(DataKey::Close).unwrap();
        assert_eq!(close[1].1, 101.5);
        assert!(series.column(DataKey::Pe).is_none());
    }

    #[test]
    fn test_batch_keeps_per_ticker_outcome() {
        let dir = tempdir().unwrap();
        fs::write(intraday_path(dir.path(), "MSFT", Interval::Min1), SAMPLE).unwrap();
        fs::write(
            intraday_path(dir.path(), "BAD", Interval::Min1),
            "{\"Error Message\": \"Invalid API call.\"}\n",
        )
        .unwrap();

        let batch = load_shareprices_intraday(dir.path(), &["MSFT", "BAD", "NONE"], Interval::Min1);

        assert_eq!(batch.loaded().count(), 1);
        assert!(batch.get("MSFT").is_some());

        let failures: BTreeMap<&str, &DataError> = batch.failures().collect();
        assert_eq!(failures.len(), 2);
        assert!(failures["NONE"].is_missing());
        assert!(matches!(failures["BAD"], DataError::MissingColumn { .. }));
    }

    #[test]
    fn test_malformed_row_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.csv");
        fs::write(
            &path,
            "timestamp,open,high,low,close,volume\n2024-01-05 16:00:00,abc,1,1,1,1\n",
        )
        .unwrap();

        let err = load_intraday_file(&path, "X", Interval::Min1).unwrap_err();
        assert!(matches!(err, DataError::Parse { .. }));
    }
}
