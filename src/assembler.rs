//! Assembly of per-metric data into one [`CombinedTable`] per stock or index.
//!
//! Prices come from a Yahoo file, each fundamental from its own file. All
//! series are interpolated to daily values and the valuation ratios are
//! calculated daily.

use crate::data_key::DataKey;
use crate::data_source::{DataSource, Fundamental};
use crate::enrichers::{self, ProfitMargin};
use crate::error::DataError;
use crate::table::CombinedTable;
use crate::time_series::{DateRange, Dated};
use crate::total_return::{total_return, DividendReinvestment};
use tracing::{debug, info, warn};

/// Which data to load for a stock-index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOptions {
    /// Load Sales Per Share (default: true)
    pub sales: bool,
    /// Load Book-Value Per Share (default: true)
    pub book_value: bool,
    /// Load Dividend Per Share TTM (default: true)
    pub dividend_ttm: bool,
    /// How dividends are reinvested for the Total Return
    pub reinvestment: DividendReinvestment,
}

impl Default for IndexOptions {
    fn default() -> Self {
        IndexOptions {
            sales: true,
            book_value: true,
            dividend_ttm: true,
            reinvestment: DividendReinvestment::OnPaymentDate,
        }
    }
}

/// Which data to load for a single stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockOptions {
    /// Load Earnings Per Share (default: true)
    pub earnings: bool,
    /// Load Sales Per Share (default: true)
    pub sales: bool,
    /// Load Book-Value Per Share (default: true)
    pub book_value: bool,
    /// Load Dividend Per Share TTM (default: false)
    pub dividend_ttm: bool,
    /// Add the profit margin when both earnings and sales are loaded (default: true)
    pub profit_margin: bool,
}

impl Default for StockOptions {
    fn default() -> Self {
        StockOptions {
            earnings: true,
            sales: true,
            book_value: true,
            dividend_ttm: false,
            profit_margin: true,
        }
    }
}

/// Loads and combines the data for a stock-index.
///
/// The price data for an index does not reinvest dividends, so the
/// `TotalReturn` column is calculated from `SharePrice` and the raw
/// `Dividend` series (see [`DividendReinvestment`]). Only rows with a
/// defined share-price are kept.
///
/// # Errors
/// Any missing or malformed data for the requested columns is fatal.
pub fn load_index_data<S>(
    source: &S,
    ticker: &str,
    options: &IndexOptions,
) -> Result<CombinedTable, DataError>
where
    S: DataSource + ?Sized,
{
    info!(ticker, ?options, "assembling index data");

    let price = source.share_price(ticker)?;
    let dividend = source.fundamental(ticker, Fundamental::DividendPerShare)?;

    let mut table = CombinedTable::from_daily(&[
        (DataKey::SharePrice, &price.share_price),
        (DataKey::TotalReturn, &price.total_return),
    ]);
    table.insert_sparse(DataKey::Dividend, &dividend);
    table.retain_defined(DataKey::SharePrice);

    // Replaces the adjusted close, which for indices excludes dividends.
    let tot_ret = match (table.column(DataKey::SharePrice), table.column(DataKey::Dividend)) {
        (Some(share_price), Some(dividend)) => {
            Some(total_return(share_price, dividend, options.reinvestment))
        }
        _ => None,
    };
    if let Some(tot_ret) = tot_ret {
        table.insert_values(DataKey::TotalReturn, tot_ret);
    }

    if options.sales {
        let sales = source.fundamental(ticker, Fundamental::SalesPerShare)?;
        enrichers::add_sales_per_share(&mut table, &sales.resample_daily());
    }

    if options.book_value {
        let book_value = source.fundamental(ticker, Fundamental::BookValuePerShare)?;
        enrichers::add_book_value_per_share(&mut table, &book_value.resample_daily());
    }

    if options.dividend_ttm {
        let dividend_ttm = source.fundamental(ticker, Fundamental::DividendPerShareTtm)?;
        enrichers::add_dividend_ttm(&mut table, &dividend_ttm.resample_daily());
    }

    debug!(ticker, rows = table.len(), columns = table.keys().count(), "index data ready");
    Ok(table)
}

/// Loads and combines the data for a single stock.
///
/// The Total Return is taken from the adjusted close in the price data.
/// Sales are loaded before earnings so the profit margin can be derived.
///
/// # Errors
/// Any missing or malformed data for the requested columns is fatal.
pub fn load_stock_data<S>(
    source: &S,
    ticker: &str,
    options: &StockOptions,
) -> Result<CombinedTable, DataError>
where
    S: DataSource + ?Sized,
{
    info!(ticker, ?options, "assembling stock data");

    let price = source.share_price(ticker)?;
    let mut table = CombinedTable::from_daily(&[
        (DataKey::SharePrice, &price.share_price),
        (DataKey::TotalReturn, &price.total_return),
    ]);
    table.retain_defined(DataKey::SharePrice);

    if options.sales {
        let sales = source.fundamental(ticker, Fundamental::SalesPerShare)?;
        enrichers::add_sales_per_share(&mut table, &sales.resample_daily());
    }

    if options.earnings {
        let earnings = source.fundamental(ticker, Fundamental::EarningsPerShare)?;
        let margin = enrichers::add_earnings_per_share(
            &mut table,
            &earnings.resample_daily(),
            options.profit_margin,
        );
        if margin == ProfitMargin::SalesUnavailable {
            warn!(ticker, "profit margin requested without sales data; skipped");
        }
    }

    if options.book_value {
        let book_value = source.fundamental(ticker, Fundamental::BookValuePerShare)?;
        enrichers::add_book_value_per_share(&mut table, &book_value.resample_daily());
    }

    if options.dividend_ttm {
        let dividend_ttm = source.fundamental(ticker, Fundamental::DividendPerShareTtm)?;
        enrichers::add_dividend_ttm(&mut table, &dividend_ttm.resample_daily());
    }

    debug!(ticker, rows = table.len(), columns = table.keys().count(), "stock data ready");
    Ok(table)
}

/// Returns the period covered by all of `items`: the latest start date to
/// the earliest end date.
///
/// Returns `None` if `items` is empty, any item has no dates, or the items
/// do not overlap.
pub fn common_period(items: &[&dyn Dated]) -> Option<DateRange> {
    let mut ranges = items.iter().map(|item| item.date_range());
    let mut common = ranges.next()??;
    for range in ranges {
        let range = range?;
        common.start = common.start.max(range.start);
        common.end = common.end.min(range.end);
    }
    (common.start <= common.end).then_some(common)
}
