//! Enrichers that add a per-share fundamental to a [`CombinedTable`] and
//! derive valuation ratios from it.
//!
//! Every enricher expects the table to already hold `SharePrice`. The
//! fundamental is aligned to the table's daily index, so values outside the
//! fundamental's span are NaN and so are the ratios derived from them.
//!
//! Enrichers only run inside the assemblers. A returned table cannot be
//! enriched again:
//!
//! ```compile_fail
//! use findata::{enrichers, CombinedTable, DailySeries};
//!
//! let mut table = CombinedTable::default();
//! enrichers::add_dividend_ttm(&mut table, &DailySeries::default());
//! ```

use crate::data_key::DataKey;
use crate::table::CombinedTable;
use crate::time_series::DailySeries;

/// Lag in rows (days) for one-year growth.
pub const ANNUAL_GROWTH_PERIODS: usize = 365;

/// Outcome of the profit-margin part of [`add_earnings_per_share`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfitMargin {
    Added,
    NotRequested,
    /// Requested, but the table has no `SalesPerShare` column.
    SalesUnavailable,
}

/// Adds `SalesPerShare`, `PSales` and the one-year `SalesGrowth`.
pub(crate) fn add_sales_per_share(table: &mut CombinedTable, sales_per_share: &DailySeries) {
    table.insert_daily(DataKey::SalesPerShare, sales_per_share);
    add_ratio(table, DataKey::PSales, DataKey::SharePrice, DataKey::SalesPerShare);

    if let Some(growth) = table.pct_change(DataKey::SalesPerShare, ANNUAL_GROWTH_PERIODS) {
        table.insert_values(DataKey::SalesGrowth, growth);
    }
}

/// Adds `EarningsPerShare` and `Pe`, and when requested `ProfitMargin`
/// (earnings / sales).
///
/// The profit margin needs `SalesPerShare` in the table; when it is absent
/// no margin is added and [`ProfitMargin::SalesUnavailable`] is returned.
pub(crate) fn add_earnings_per_share(
    table: &mut CombinedTable,
    earnings_per_share: &DailySeries,
    profit_margin: bool,
) -> ProfitMargin {
    table.insert_daily(DataKey::EarningsPerShare, earnings_per_share);
    add_ratio(table, DataKey::Pe, DataKey::SharePrice, DataKey::EarningsPerShare);

    if !profit_margin {
        return ProfitMargin::NotRequested;
    }
    if add_ratio(
        table,
        DataKey::ProfitMargin,
        DataKey::EarningsPerShare,
        DataKey::SalesPerShare,
    ) {
        ProfitMargin::Added
    } else {
        ProfitMargin::SalesUnavailable
    }
}

/// Adds `BookValuePerShare` and `PBook`.
pub(crate) fn add_book_value_per_share(
    table: &mut CombinedTable,
    book_value_per_share: &DailySeries,
) {
    table.insert_daily(DataKey::BookValuePerShare, book_value_per_share);
    add_ratio(table, DataKey::PBook, DataKey::SharePrice, DataKey::BookValuePerShare);
}

/// Adds `DividendTtm`, `PDividend` and `DividendYield`.
pub(crate) fn add_dividend_ttm(table: &mut CombinedTable, dividend_ttm: &DailySeries) {
    table.insert_daily(DataKey::DividendTtm, dividend_ttm);
    add_ratio(table, DataKey::PDividend, DataKey::SharePrice, DataKey::DividendTtm);
    add_ratio(table, DataKey::DividendYield, DataKey::DividendTtm, DataKey::SharePrice);
}

/// Stores `numerator / denominator` under `key`. Returns false if either
/// input column is missing.
fn add_ratio(
    table: &mut CombinedTable,
    key: DataKey,
    numerator: DataKey,
    denominator: DataKey,
) -> bool {
    match table.ratio(numerator, denominator) {
        Some(values) => {
            table.insert_values(key, values);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
    }

    fn table_with_price(price: Vec<f64>) -> CombinedTable {
        let daily = DailySeries::new(start(), price);
        CombinedTable::from_daily(&[(DataKey::SharePrice, &daily)])
    }

    #[test]
    fn test_sales_adds_ratio_and_growth() {
        let days = ANNUAL_GROWTH_PERIODS + 3;
        let mut table = table_with_price(vec![20.0; days]);
        let sales: Vec<f64> = (0..days).map(|i| 10.0 + i as f64 / 365.0).collect();
        add_sales_per_share(&mut table, &DailySeries::new(start(), sales));

        assert_relative_eq!(table.column(DataKey::PSales).unwrap()[0], 2.0);
        let growth = table.column(DataKey::SalesGrowth).unwrap();
        assert!(growth[ANNUAL_GROWTH_PERIODS - 1].is_nan());
        assert_relative_eq!(growth[ANNUAL_GROWTH_PERIODS], 11.0 / 10.0 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sales_growth_defined_after_last_report() {
        let mut table = table_with_price(vec![20.0; 400]);
        let sales: Vec<f64> = (0..380).map(|i| 100.0 + i as f64).collect();
        add_sales_per_share(&mut table, &DailySeries::new(start(), sales));

        let growth = table.column(DataKey::SalesGrowth).unwrap();
        let sps = table.column(DataKey::SalesPerShare).unwrap();
        assert!(sps[399].is_nan());
        assert_relative_eq!(growth[379], 479.0 / 114.0 - 1.0, epsilon = 1e-12);
        // 479 is the last report, carried forward.
        assert_relative_eq!(growth[399], 479.0 / 134.0 - 1.0, epsilon = 1e-12);
        assert!(growth[ANNUAL_GROWTH_PERIODS - 1].is_nan());
    }

    #[test]
    fn test_earnings_with_sales_adds_profit_margin() {
        let mut table = table_with_price(vec![30.0, 31.0, 32.0]);
        add_sales_per_share(&mut table, &DailySeries::new(start(), vec![10.0, 12.0, 16.0]));
        let outcome =
            add_earnings_per_share(&mut table, &DailySeries::new(start(), vec![1.0, 1.5, 2.0]), true);

        assert_eq!(outcome, ProfitMargin::Added);
        let margin = table.column(DataKey::ProfitMargin).unwrap();
        let eps = table.column(DataKey::EarningsPerShare).unwrap();
        let sps = table.column(DataKey::SalesPerShare).unwrap();
        for row in 0..table.len() {
            assert_relative_eq!(margin[row], eps[row] / sps[row]);
        }
        assert_relative_eq!(table.column(DataKey::Pe).unwrap()[1], 31.0 / 1.5);
    }

    #[test]
    fn test_earnings_without_sales_reports_unavailable_margin() {
        let mut table = table_with_price(vec![30.0, 31.0]);
        let eps = DailySeries::new(start(), vec![1.0, 1.0]);

        assert_eq!(
            add_earnings_per_share(&mut table, &eps, true),
            ProfitMargin::SalesUnavailable
        );
        assert!(!table.contains(DataKey::ProfitMargin));
        assert!(table.contains(DataKey::Pe));

        assert_eq!(
            add_earnings_per_share(&mut table, &eps, false),
            ProfitMargin::NotRequested
        );
    }

    #[test]
    fn test_book_value_ratio_is_nan_outside_span() {
        let mut table = table_with_price(vec![40.0, 40.0, 40.0]);
        let book = DailySeries::new(start() + Duration::days(1), vec![20.0]);
        add_book_value_per_share(&mut table, &book);

        let pbook = table.column(DataKey::PBook).unwrap();
        assert!(pbook[0].is_nan());
        assert_relative_eq!(pbook[1], 2.0);
        assert!(pbook[2].is_nan());
    }

    #[test]
    fn test_dividend_ttm_ratio_and_yield() {
        let mut table = table_with_price(vec![50.0, 40.0]);
        add_dividend_ttm(&mut table, &DailySeries::new(start(), vec![2.0, 2.0]));

        assert_relative_eq!(table.column(DataKey::PDividend).unwrap()[0], 25.0);
        assert_relative_eq!(table.column(DataKey::DividendYield).unwrap()[1], 0.05);
    }
}
