use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the date index in loaded and combined data.
pub const DATE: &str = "Date";

/// Name of the timestamp index in intraday data.
pub const DATE_TIME: &str = "Date and Time";

/// Column keys for every loaded or derived data series.
///
/// Each key has a human-readable name (e.g. `"P/E"`) which is used for
/// display, serialization and parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DataKey {
    /// Share-price adjusted for stock-splits.
    #[serde(rename = "Share-Price")]
    SharePrice,
    /// Share-price adjusted for stock-splits and reinvested dividends.
    #[serde(rename = "Total Return")]
    TotalReturn,
    /// Dividend per share as paid out.
    #[serde(rename = "Dividend")]
    Dividend,
    /// Dividend per share over the trailing twelve months.
    #[serde(rename = "Dividend TTM")]
    DividendTtm,
    /// Dividend TTM divided by share-price.
    #[serde(rename = "Dividend Yield")]
    DividendYield,
    #[serde(rename = "Sales Per Share")]
    SalesPerShare,
    /// One-year growth in sales per share.
    #[serde(rename = "Sales Growth")]
    SalesGrowth,
    #[serde(rename = "Earnings Per Share")]
    EarningsPerShare,
    #[serde(rename = "Book-Value Per Share")]
    BookValuePerShare,
    #[serde(rename = "P/E")]
    Pe,
    #[serde(rename = "P/Sales")]
    PSales,
    #[serde(rename = "P/Book")]
    PBook,
    #[serde(rename = "P/Dividend")]
    PDividend,
    /// Earnings per share divided by sales per share.
    #[serde(rename = "Profit Margin")]
    ProfitMargin,
    /// U.S. Consumer Price Index.
    #[serde(rename = "CPI")]
    Cpi,
    /// Government bond yield as a fraction (0.035 means 3.5%).
    #[serde(rename = "Bond Yield")]
    BondYield,
    #[serde(rename = "Open")]
    Open,
    #[serde(rename = "High")]
    High,
    #[serde(rename = "Low")]
    Low,
    #[serde(rename = "Close")]
    Close,
    #[serde(rename = "Volume")]
    Volume,
}

impl DataKey {
    /// All keys in declaration order.
    pub const ALL: [DataKey; 21] = [
        DataKey::SharePrice,
        DataKey::TotalReturn,
        DataKey::Dividend,
        DataKey::DividendTtm,
        DataKey::DividendYield,
        DataKey::SalesPerShare,
        DataKey::SalesGrowth,
        DataKey::EarningsPerShare,
        DataKey::BookValuePerShare,
        DataKey::Pe,
        DataKey::PSales,
        DataKey::PBook,
        DataKey::PDividend,
        DataKey::ProfitMargin,
        DataKey::Cpi,
        DataKey::BondYield,
        DataKey::Open,
        DataKey::High,
        DataKey::Low,
        DataKey::Close,
        DataKey::Volume,
    ];

    /// Returns the human-readable column name.
    pub fn name(&self) -> &'static str {
        match self {
            DataKey::SharePrice => "Share-Price",
            DataKey::TotalReturn => "Total Return",
            DataKey::Dividend => "Dividend",
            DataKey::DividendTtm => "Dividend TTM",
            DataKey::DividendYield => "Dividend Yield",
            DataKey::SalesPerShare => "Sales Per Share",
            DataKey::SalesGrowth => "Sales Growth",
            DataKey::EarningsPerShare => "Earnings Per Share",
            DataKey::BookValuePerShare => "Book-Value Per Share",
            DataKey::Pe => "P/E",
            DataKey::PSales => "P/Sales",
            DataKey::PBook => "P/Book",
            DataKey::PDividend => "P/Dividend",
            DataKey::ProfitMargin => "Profit Margin",
            DataKey::Cpi => "CPI",
            DataKey::BondYield => "Bond Yield",
            DataKey::Open => "Open",
            DataKey::High => "High",
            DataKey::Low => "Low",
            DataKey::Close => "Close",
            DataKey::Volume => "Volume",
        }
    }
}

impl fmt::Display for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown column name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown data key: {0}")]
pub struct UnknownDataKey(pub String);

impl FromStr for DataKey {
    type Err = UnknownDataKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataKey::ALL
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| UnknownDataKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_from_str() {
        for key in DataKey::ALL {
            assert_eq!(key.name().parse::<DataKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<&str> = DataKey::ALL.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), DataKey::ALL.len());
    }

    #[test]
    fn test_display_uses_name() {
        assert_eq!(DataKey::Pe.to_string(), "P/E");
        assert_eq!(DataKey::BookValuePerShare.to_string(), "Book-Value Per Share");
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let err = "Price/Whatever".parse::<DataKey>().unwrap_err();
        assert_eq!(err, UnknownDataKey("Price/Whatever".to_string()));
        assert!(err.to_string().contains("Price/Whatever"));
    }

    #[test]
    fn test_serde_uses_name() {
        let json = serde_json::to_string(&DataKey::DividendTtm).unwrap();
        assert_eq!(json, "\"Dividend TTM\"");
        let key: DataKey = serde_json::from_str("\"P/Book\"").unwrap();
        assert_eq!(key, DataKey::PBook);
    }
}
