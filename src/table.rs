use crate::data_key::DataKey;
use crate::time_series::{DailySeries, DateRange, Dated, TimeSeries, TimeSeriesPoint};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Columns of daily values sharing one date index.
///
/// Undefined values are NaN. Every column has one entry per index date.
/// Tables are built by the assemblers and handed out read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CombinedTable {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<DataKey, Vec<f64>>,
}

impl CombinedTable {
    /// Creates a table over the daily calendar spanned by all given series,
    /// with each series stored under its key.
    pub(crate) fn from_daily(series: &[(DataKey, &DailySeries)]) -> Self {
        let start = series.iter().filter_map(|(_, s)| s.start()).min();
        let end = series.iter().filter_map(|(_, s)| s.end()).max();

        let dates = match (start, end) {
            (Some(start), Some(end)) => start.iter_days().take_while(|d| *d <= end).collect(),
            _ => Vec::new(),
        };

        let mut table = CombinedTable {
            dates,
            columns: BTreeMap::new(),
        };
        for (key, daily) in series {
            table.insert_daily(*key, daily);
        }
        table
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn contains(&self, key: DataKey) -> bool {
        self.columns.contains_key(&key)
    }

    /// Column keys in registry order.
    pub fn keys(&self) -> impl Iterator<Item = DataKey> + '_ {
        self.columns.keys().copied()
    }

    pub fn column(&self, key: DataKey) -> Option<&[f64]> {
        self.columns.get(&key).map(Vec::as_slice)
    }

    /// Returns the value of `key` on `date`, or `None` if either is absent.
    pub fn get(&self, key: DataKey, date: NaiveDate) -> Option<f64> {
        let row = self.row_of(date)?;
        self.columns.get(&key).map(|values| values[row])
    }

    /// Returns the column as a date-indexed series.
    pub fn series(&self, key: DataKey) -> Option<TimeSeries> {
        let values = self.columns.get(&key)?;
        Some(TimeSeries::from_points(
            self.dates
                .iter()
                .zip(values)
                .map(|(&date, &value)| TimeSeriesPoint::new(date, value))
                .collect(),
        ))
    }

    /// Returns a new table holding only the rows within `range`.
    pub fn restrict(&self, range: &DateRange) -> CombinedTable {
        let rows: Vec<usize> = (0..self.dates.len())
            .filter(|&row| range.contains(self.dates[row]))
            .collect();
        self.select_rows(&rows)
    }

    /// Stores a daily series aligned to the table's dates; dates the series
    /// does not cover become NaN.
    pub(crate) fn insert_daily(&mut self, key: DataKey, daily: &DailySeries) {
        let values = self
            .dates
            .iter()
            .map(|&date| daily.value_at(date).unwrap_or(f64::NAN))
            .collect();
        self.columns.insert(key, values);
    }

    /// Stores an irregular series on exactly matching dates only.
    pub(crate) fn insert_sparse(&mut self, key: DataKey, series: &TimeSeries) {
        let values = self
            .dates
            .iter()
            .map(|&date| series.value_at(date).unwrap_or(f64::NAN))
            .collect();
        self.columns.insert(key, values);
    }

    /// Stores precomputed values. `values` must have one entry per row.
    pub(crate) fn insert_values(&mut self, key: DataKey, values: Vec<f64>) {
        debug_assert_eq!(values.len(), self.dates.len());
        self.columns.insert(key, values);
    }

    /// Elementwise `numerator / denominator`, or `None` if either column is
    /// absent.
    pub(crate) fn ratio(&self, numerator: DataKey, denominator: DataKey) -> Option<Vec<f64>> {
        let num = self.columns.get(&numerator)?;
        let den = self.columns.get(&denominator)?;
        Some(num.iter().zip(den).map(|(n, d)| n / d).collect())
    }

    /// Fractional change over `periods` rows: `x[t] / x[t - periods] - 1`.
    ///
    /// Undefined values are first filled with the last defined value, so the
    /// change stays defined after the column's last known point. The first
    /// `periods` rows and rows before the first defined value are NaN.
    pub(crate) fn pct_change(&self, key: DataKey, periods: usize) -> Option<Vec<f64>> {
        let values = self.columns.get(&key)?;

        let mut last = f64::NAN;
        let filled: Vec<f64> = values
            .iter()
            .map(|&value| {
                if !value.is_nan() {
                    last = value;
                }
                last
            })
            .collect();

        Some(
            (0..filled.len())
                .map(|row| {
                    if row < periods {
                        f64::NAN
                    } else {
                        filled[row] / filled[row - periods] - 1.0
                    }
                })
                .collect(),
        )
    }

    /// Keeps only the rows where `key` is defined.
    pub(crate) fn retain_defined(&mut self, key: DataKey) {
        let rows: Vec<usize> = match self.columns.get(&key) {
            Some(values) => (0..values.len()).filter(|&row| !values[row].is_nan()).collect(),
            None => Vec::new(),
        };
        *self = self.select_rows(&rows);
    }

    fn select_rows(&self, rows: &[usize]) -> CombinedTable {
        CombinedTable {
            dates: rows.iter().map(|&row| self.dates[row]).collect(),
            columns: self
                .columns
                .iter()
                .map(|(key, values)| (*key, rows.iter().map(|&row| values[row]).collect()))
                .collect(),
        }
    }

    fn row_of(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }
}

impl Dated for CombinedTable {
    fn date_range(&self) -> Option<DateRange> {
        Some(DateRange::new(*self.dates.first()?, *self.dates.last()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn price_table() -> CombinedTable {
        let price = DailySeries::new(date(2024, 1, 1), vec![10.0, 11.0, 12.0, 13.0]);
        CombinedTable::from_daily(&[(DataKey::SharePrice, &price)])
    }

    #[test]
    fn test_from_daily_spans_union_of_series() {
        let a = DailySeries::new(date(2024, 1, 2), vec![1.0, 2.0]);
        let b = DailySeries::new(date(2024, 1, 1), vec![5.0]);
        let table = CombinedTable::from_daily(&[(DataKey::SharePrice, &a), (DataKey::TotalReturn, &b)]);

        assert_eq!(table.dates(), &[date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]);
        assert!(table.column(DataKey::SharePrice).unwrap()[0].is_nan());
        assert!(table.column(DataKey::TotalReturn).unwrap()[2].is_nan());
    }

    #[test]
    fn test_insert_daily_aligns_to_index() {
        let mut table = price_table();
        let sales = DailySeries::new(date(2024, 1, 3), vec![2.0, 2.5, 3.0]);
        table.insert_daily(DataKey::SalesPerShare, &sales);

        let column = table.column(DataKey::SalesPerShare).unwrap();
        assert_eq!(column.len(), 4);
        assert!(column[1].is_nan());
        assert_eq!(column[2], 2.0);
        assert_eq!(column[3], 2.5);
    }

    #[test]
    fn test_insert_sparse_matches_exact_dates() {
        let mut table = price_table();
        let dividend = TimeSeries::from_points(vec![
            TimeSeriesPoint::new(date(2024, 1, 2), 0.5),
            TimeSeriesPoint::new(date(2024, 2, 1), 0.5),
        ]);
        table.insert_sparse(DataKey::Dividend, &dividend);

        assert_eq!(table.get(DataKey::Dividend, date(2024, 1, 2)), Some(0.5));
        assert!(table.get(DataKey::Dividend, date(2024, 1, 3)).unwrap().is_nan());
    }

    #[test]
    fn test_ratio_and_pct_change() {
        let mut table = price_table();
        table.insert_values(DataKey::SalesPerShare, vec![5.0, 0.0, 6.0, 6.5]);

        let ratio = table.ratio(DataKey::SharePrice, DataKey::SalesPerShare).unwrap();
        assert_eq!(ratio[0], 2.0);
        assert!(ratio[1].is_infinite());

        let change = table.pct_change(DataKey::SharePrice, 2).unwrap();
        assert!(change[0].is_nan() && change[1].is_nan());
        assert!((change[2] - 0.2).abs() < 1e-12);
        assert!(table.ratio(DataKey::SharePrice, DataKey::PBook).is_none());
    }

    #[test]
    fn test_pct_change_carries_last_value_forward() {
        let mut table = price_table();
        table.insert_values(DataKey::SalesPerShare, vec![f64::NAN, 4.0, 5.0, f64::NAN]);

        let change = table.pct_change(DataKey::SalesPerShare, 1).unwrap();
        assert!(change[0].is_nan());
        assert!(change[1].is_nan());
        assert!((change[2] - 0.25).abs() < 1e-12);
        assert_eq!(change[3], 0.0);

        let change = table.pct_change(DataKey::SalesPerShare, 2).unwrap();
        assert!(change[2].is_nan());
        assert!((change[3] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_retain_defined_drops_rows_in_every_column() {
        let mut table = price_table();
        table.insert_values(DataKey::SharePrice, vec![f64::NAN, 11.0, f64::NAN, 13.0]);
        table.insert_values(DataKey::Dividend, vec![0.1, 0.2, 0.3, 0.4]);
        table.retain_defined(DataKey::SharePrice);

        assert_eq!(table.dates(), &[date(2024, 1, 2), date(2024, 1, 4)]);
        assert_eq!(table.column(DataKey::Dividend).unwrap(), &[0.2, 0.4]);
    }

    #[test]
    fn test_restrict_and_date_range() {
        let table = price_table();
        let range = DateRange::new(date(2024, 1, 2), date(2024, 1, 3));
        let restricted = table.restrict(&range);

        assert_eq!(restricted.len(), 2);
        assert_eq!(restricted.date_range(), Some(range));
        assert_eq!(restricted.get(DataKey::SharePrice, date(2024, 1, 3)), Some(12.0));
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_series_round_trips_column() {
        let table = price_table();
        let series = table.series(DataKey::SharePrice).unwrap();
        assert_eq!(series.len(), 4);
        assert_eq!(series.value_at(date(2024, 1, 4)), Some(13.0));
        assert!(table.series(DataKey::Cpi).is_none());
    }
}
