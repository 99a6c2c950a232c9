//! Readers for delimited data files.
//!
//! Two layouts are in use:
//! - comma-separated files with a header row and the date in a given column
//!   (share-prices from Yahoo, U.S. CPI)
//! - tab-separated files with the date in the first column formatted
//!   MM/DD/YYYY (per-share fundamentals, bond yields)

use crate::error::DataError;
use crate::time_series::{DailySeries, TimeSeries, TimeSeriesPoint};
use chrono::{NaiveDate, NaiveDateTime};
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Column with the split-adjusted close in Yahoo price files.
pub const YAHOO_CLOSE: &str = "Close";

/// Column with the split- and dividend-adjusted close in Yahoo price files.
pub const YAHOO_ADJ_CLOSE: &str = "Adj Close";

/// Value column in the CPI file.
pub const CPI_VALUE: &str = "Value";

/// Date column position in the CPI file.
pub const CPI_DATE_COLUMN: usize = 3;

/// Cell contents read as a missing value.
const MISSING_MARKERS: [&str; 6] = ["null", "NaN", "nan", "NA", "N/A", "."];

/// Date layout tried first when parsing a date cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `YYYY-MM-DD`, optionally followed by a time of day
    Iso,
    /// `MM/DD/YYYY`
    MonthDayYear,
}

impl DateFormat {
    /// Parses `text`, falling back to the other layout when the preferred
    /// one does not match.
    pub fn parse(&self, text: &str) -> Option<NaiveDate> {
        let text = text.trim();
        match self {
            DateFormat::Iso => parse_iso(text).or_else(|| parse_month_day_year(text)),
            DateFormat::MonthDayYear => parse_month_day_year(text).or_else(|| parse_iso(text)),
        }
    }
}

fn parse_iso(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

fn parse_month_day_year(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%m/%d/%Y").ok()
}

/// Parses a numeric cell. Empty cells and missing markers become NaN.
pub(crate) fn parse_value(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() || MISSING_MARKERS.contains(&cell) {
        return Some(f64::NAN);
    }
    cell.parse::<f64>().ok()
}

/// Layout of a delimited data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimitedFormat {
    pub delimiter: u8,
    /// Zero-based position of the date column
    pub date_column: usize,
    pub date_format: DateFormat,
}

impl DelimitedFormat {
    /// Comma-separated with a header row and ISO dates in `date_column`.
    pub fn comma(date_column: usize) -> Self {
        DelimitedFormat {
            delimiter: b',',
            date_column,
            date_format: DateFormat::Iso,
        }
    }

    /// Tab-separated with MM/DD/YYYY dates in the first column.
    pub fn tab_separated() -> Self {
        DelimitedFormat {
            delimiter: b'\t',
            date_column: 0,
            date_format: DateFormat::MonthDayYear,
        }
    }
}

/// A delimited file whose rows have been date-parsed but whose value
/// columns are parsed on demand.
///
/// Deferring value parsing lets a file carry text columns that are never
/// selected (series ids, footnotes) without failing the load.
#[derive(Debug, Clone)]
pub struct DelimitedFile {
    path: PathBuf,
    headers: Vec<String>,
    date_column: usize,
    dates: Vec<NaiveDate>,
    rows: Vec<(u64, csv::StringRecord)>,
}

impl DelimitedFile {
    /// Reads and date-parses every row of the file.
    ///
    /// # Errors
    /// - `MissingFile` if the path does not exist
    /// - `Parse` if a row has no parseable date
    /// - `Csv`/`Io` for lower level read failures
    pub fn read(path: impl AsRef<Path>, format: &DelimitedFormat) -> Result<Self, DataError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => DataError::MissingFile { path: path.clone() },
            _ => DataError::Io {
                path: path.clone(),
                source,
            },
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(format.delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|source| DataError::Csv {
                path: path.clone(),
                source,
            })?
            .iter()
            .map(str::to_string)
            .collect();

        let mut dates = Vec::new();
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|source| DataError::Csv {
                path: path.clone(),
                source,
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            let cell = record.get(format.date_column).unwrap_or_default();
            let date = format.date_format.parse(cell).ok_or_else(|| DataError::Parse {
                path: path.clone(),
                line,
                message: format!("cannot parse date '{}'", cell),
            })?;

            dates.push(date);
            rows.push((line, record));
        }

        debug!(path = %path.display(), rows = rows.len(), "read data file");

        Ok(DelimitedFile {
            path,
            headers,
            date_column: format.date_column,
            dates,
            rows,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Parses the column with the given header name.
    ///
    /// # Errors
    /// `MissingColumn` if no header matches, `Parse` if a cell is not numeric.
    pub fn column(&self, name: &str) -> Result<TimeSeries, DataError> {
        let index = self
            .headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })?;
        self.column_at(index)
    }

    /// Parses the first column after the date column, for files that carry
    /// a single value per row under an arbitrary header.
    pub fn value_column(&self) -> Result<TimeSeries, DataError> {
        let index = (0..self.headers.len())
            .find(|&i| i != self.date_column)
            .ok_or_else(|| DataError::MissingColumn {
                path: self.path.clone(),
                column: "<value>".to_string(),
            })?;
        self.column_at(index)
    }

    fn column_at(&self, index: usize) -> Result<TimeSeries, DataError> {
        let mut points = Vec::with_capacity(self.rows.len());
        for (date, (line, record)) in self.dates.iter().zip(&self.rows) {
            let cell = record.get(index).unwrap_or_default();
            let value = parse_value(cell).ok_or_else(|| DataError::Parse {
                path: self.path.clone(),
                line: *line,
                message: format!(
                    "cannot parse '{}' in column '{}' as a number",
                    cell, self.headers[index]
                ),
            })?;
            points.push(TimeSeriesPoint::new(*date, value));
        }
        Ok(TimeSeries::from_points(points))
    }
}

/// Daily share-price and total return from a Yahoo price file.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    /// Close price adjusted for stock-splits
    pub share_price: DailySeries,
    /// Close price adjusted for stock-splits and dividends
    pub total_return: DailySeries,
}

/// Loads a Yahoo share-price CSV file.
///
/// Only the `Close` and `Adj Close` columns are kept; both are interpolated
/// to daily values.
pub fn load_share_price(path: impl AsRef<Path>) -> Result<PriceHistory, DataError> {
    let file = DelimitedFile::read(path, &DelimitedFormat::comma(0))?;
    let share_price = file.column(YAHOO_CLOSE)?;
    let total_return = file.column(YAHOO_ADJ_CLOSE)?;

    Ok(PriceHistory {
        share_price: share_price.resample_daily(),
        total_return: total_return.resample_daily(),
    })
}

/// Loads a tab-separated per-share fundamental (earnings, sales, book-value,
/// dividend) without resampling.
pub fn load_fundamental(path: impl AsRef<Path>) -> Result<TimeSeries, DataError> {
    DelimitedFile::read(path, &DelimitedFormat::tab_separated())?.value_column()
}

/// Loads the U.S. Consumer Price Index file, interpolated to daily values.
pub fn load_cpi(path: impl AsRef<Path>) -> Result<DailySeries, DataError> {
    let file = DelimitedFile::read(path, &DelimitedFormat::comma(CPI_DATE_COLUMN))?;
    Ok(file.column(CPI_VALUE)?.resample_daily())
}

/// Loads a bond-yield file, interpolated to daily values.
///
/// Rows with missing values are dropped and yields are scaled from percent
/// to fractions, so 3.5 in the file becomes 0.035.
pub fn load_bond_yield(path: impl AsRef<Path>) -> Result<DailySeries, DataError> {
    let yields = load_fundamental(path)?
        .drop_missing()
        .map_values(|percent| percent / 100.0);
    Ok(yields.resample_daily())
}
