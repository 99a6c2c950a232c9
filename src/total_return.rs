//! Total Return from share-price and dividends.
//!
//! Index price data does not include reinvested dividends, so the Total
//! Return is built by compounding the daily price change plus any dividend
//! reinvested on that day.

/// Number of rows, up to and including its payment row, over which the first
/// dividend payment is spread by [`DividendReinvestment::SpreadDaily`] (one
/// quarter). The spread never reaches row 0, which is the base of the Total
/// Return.
pub const FIRST_PAYMENT_SPREAD_DAYS: usize = 91;

/// How dividends are reinvested when compounding the Total Return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DividendReinvestment {
    /// Each dividend is reinvested in full on its payment date. For index
    /// data this means quarterly, even though the member companies pay on
    /// different days within the quarter.
    #[default]
    OnPaymentDate,
    /// Each dividend is spread evenly over the days since the previous
    /// payment and reinvested daily.
    SpreadDaily,
}

/// Computes the cumulative Total Return, starting at 1.0.
///
/// `share_price` and `dividend` are aligned daily columns; missing dividends
/// (NaN) count as zero. Row `t` grows by `(P[t] + D[t]) / P[t-1]`.
pub fn total_return(
    share_price: &[f64],
    dividend: &[f64],
    reinvestment: DividendReinvestment,
) -> Vec<f64> {
    if share_price.is_empty() {
        return Vec::new();
    }

    let dividend: Vec<f64> = match reinvestment {
        DividendReinvestment::OnPaymentDate => dividend
            .iter()
            .map(|&d| if d.is_nan() { 0.0 } else { d })
            .collect(),
        DividendReinvestment::SpreadDaily => spread_dividends(dividend),
    };

    let mut result = Vec::with_capacity(share_price.len());
    result.push(1.0);
    for row in 1..share_price.len() {
        let paid = dividend.get(row).copied().unwrap_or(0.0);
        let growth = (share_price[row] + paid) / share_price[row - 1];
        result.push(result[row - 1] * growth);
    }
    result
}

/// Spreads each payment evenly over the rows since the previous payment,
/// ending on the payment row. Row 0 gets nothing unless paid on directly.
fn spread_dividends(dividend: &[f64]) -> Vec<f64> {
    let mut spread = vec![0.0; dividend.len()];
    let mut previous_payment: Option<usize> = None;

    for (row, &amount) in dividend.iter().enumerate() {
        if amount.is_nan() || amount == 0.0 {
            continue;
        }

        let first = match previous_payment {
            Some(previous) => previous + 1,
            None => (row + 1).saturating_sub(FIRST_PAYMENT_SPREAD_DAYS).max(1).min(row),
        };
        let share = amount / (row - first + 1) as f64;
        for slot in &mut spread[first..=row] {
            *slot += share;
        }
        previous_payment = Some(row);
    }

    spread
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_dividend_jumps_by_yield() {
        let price = vec![50.0; 8];
        let mut dividend = vec![f64::NAN; 8];
        dividend[4] = 2.0;

        let tr = total_return(&price, &dividend, DividendReinvestment::OnPaymentDate);

        for value in &tr[..4] {
            assert_relative_eq!(*value, 1.0);
        }
        for value in &tr[4..] {
            assert_relative_eq!(*value, 1.0 + 2.0 / 50.0);
        }
    }

    #[test]
    fn test_without_dividends_tracks_price() {
        let price = vec![100.0, 110.0, 99.0, 121.0];
        let dividend = vec![f64::NAN; 4];

        let tr = total_return(&price, &dividend, DividendReinvestment::OnPaymentDate);
        for (value, p) in tr.iter().zip(&price) {
            assert_relative_eq!(*value, p / 100.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_spread_daily_distributes_payment() {
        let spread = spread_dividends(&[f64::NAN, 0.0, 3.0, f64::NAN, f64::NAN, 1.5]);
        assert_eq!(spread, vec![0.0, 1.5, 1.5, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_first_payment_spread_is_limited_to_a_quarter() {
        let mut dividend = vec![f64::NAN; 200];
        dividend[150] = 91.0;
        let spread = spread_dividends(&dividend);

        let first = 150 + 1 - FIRST_PAYMENT_SPREAD_DAYS;
        assert_eq!(spread[first - 1], 0.0);
        assert_relative_eq!(spread[first], 1.0);
        assert_relative_eq!(spread[150], 1.0);
        assert_relative_eq!(spread.iter().sum::<f64>(), 91.0, epsilon = 1e-9);
    }

    #[test]
    fn test_spread_daily_compounds_smoothly() {
        let price = vec![100.0; 6];
        let mut dividend = vec![f64::NAN; 6];
        dividend[5] = 0.6;

        let tr = total_return(&price, &dividend, DividendReinvestment::SpreadDaily);

        // Spread over rows 1..=5, after the base row.
        assert_relative_eq!(tr[5], 1.0012_f64.powi(5), epsilon = 1e-12);
        assert!(tr.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_first_payment_near_start_is_fully_reinvested() {
        let mut dividend = vec![f64::NAN; 5];
        dividend[3] = 3.0;
        let spread = spread_dividends(&dividend);
        assert_eq!(spread, vec![0.0, 1.0, 1.0, 1.0, 0.0]);

        let tr = total_return(&[100.0; 5], &dividend, DividendReinvestment::SpreadDaily);
        assert_relative_eq!(tr[4], 1.01_f64.powi(3), epsilon = 1e-12);
    }

    #[test]
    fn test_empty_input() {
        assert!(total_return(&[], &[], DividendReinvestment::default()).is_empty());
    }
}
