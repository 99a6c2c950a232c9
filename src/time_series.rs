use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single dated observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    /// Observed value, NaN when missing in the source
    pub value: f64,
}

impl TimeSeriesPoint {
    /// Creates a new TimeSeriesPoint.
    pub fn new(date: NaiveDate, value: f64) -> Self {
        TimeSeriesPoint { date, value }
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// Start date (inclusive)
    pub start: NaiveDate,
    /// End date (inclusive)
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new DateRange.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Returns true if `date` lies within the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of calendar days covered, counting both ends.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Anything that spans a range of dates.
pub trait Dated {
    /// Returns the first and last date, or `None` when there are no dates.
    fn date_range(&self) -> Option<DateRange>;
}

/// Irregular, date-sorted series as read from a data file.
///
/// Dates are strictly increasing. Gaps between dates are allowed since the
/// source cadence varies (daily prices, quarterly fundamentals, etc.).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    points: Vec<TimeSeriesPoint>,
}

impl TimeSeries {
    /// Builds a series from points in any order.
    ///
    /// Points are sorted by date; when a date occurs more than once the
    /// last occurrence is kept.
    pub fn from_points(mut points: Vec<TimeSeriesPoint>) -> Self {
        // Stable sort keeps input order among equal dates.
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<TimeSeriesPoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }
        TimeSeries { points: deduped }
    }

    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the value observed on exactly `date`.
    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|index| self.points[index].value)
    }

    /// Applies `f` to every value, keeping the dates.
    pub fn map_values<F>(&self, mut f: F) -> TimeSeries
    where
        F: FnMut(f64) -> f64,
    {
        TimeSeries {
            points: self
                .points
                .iter()
                .map(|p| TimeSeriesPoint::new(p.date, f(p.value)))
                .collect(),
        }
    }

    /// Removes points whose value is missing.
    pub fn drop_missing(&self) -> TimeSeries {
        TimeSeries {
            points: self
                .points
                .iter()
                .filter(|p| !p.value.is_nan())
                .copied()
                .collect(),
        }
    }

    /// Resamples the series to one value per calendar day.
    ///
    /// The result spans the first to the last known (non-NaN) point. Days in
    /// between are filled by linear interpolation; nothing is extrapolated.
    pub fn resample_daily(&self) -> DailySeries {
        let known: Vec<&TimeSeriesPoint> =
            self.points.iter().filter(|p| !p.value.is_nan()).collect();

        let Some(first) = known.first() else {
            return DailySeries::default();
        };

        let mut values = vec![first.value];
        for pair in known.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let span = (to.date - from.date).num_days();
            for step in 1..span {
                let fraction = step as f64 / span as f64;
                values.push(from.value + (to.value - from.value) * fraction);
            }
            values.push(to.value);
        }

        DailySeries::new(first.date, values)
    }
}

impl Dated for TimeSeries {
    fn date_range(&self) -> Option<DateRange> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => Some(DateRange::new(first.date, last.date)),
            _ => None,
        }
    }
}

/// Series with exactly one value per calendar day from its start date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    start: NaiveDate,
    values: Vec<f64>,
}

impl DailySeries {
    /// Creates a daily series whose first value falls on `start`.
    pub fn new(start: NaiveDate, values: Vec<f64>) -> Self {
        DailySeries { start, values }
    }

    /// First date, or `None` for an empty series.
    pub fn start(&self) -> Option<NaiveDate> {
        (!self.values.is_empty()).then_some(self.start)
    }

    /// Last date, or `None` for an empty series.
    pub fn end(&self) -> Option<NaiveDate> {
        (!self.values.is_empty()).then(|| self.date_of(self.values.len() - 1))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns the value on `date`, or `None` outside the span.
    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        let offset = (date - self.start).num_days();
        if offset < 0 {
            return None;
        }
        self.values.get(offset as usize).copied()
    }

    /// Iterates over `(date, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(index, &value)| (self.date_of(index), value))
    }

    /// Applies `f` to every value, keeping the dates.
    pub fn map_values<F>(&self, f: F) -> DailySeries
    where
        F: FnMut(&f64) -> f64,
    {
        DailySeries::new(self.start, self.values.iter().map(f).collect())
    }

    pub fn to_time_series(&self) -> TimeSeries {
        TimeSeries {
            points: self
                .iter()
                .map(|(date, value)| TimeSeriesPoint::new(date, value))
                .collect(),
        }
    }

    fn date_of(&self, index: usize) -> NaiveDate {
        self.start + Duration::days(index as i64)
    }
}

impl Default for DailySeries {
    fn default() -> Self {
        DailySeries::new(NaiveDate::default(), Vec::new())
    }
}

impl Dated for DailySeries {
    fn date_range(&self) -> Option<DateRange> {
        Some(DateRange::new(self.start()?, self.end()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(points: &[(NaiveDate, f64)]) -> TimeSeries {
        TimeSeries::from_points(
            points
                .iter()
                .map(|&(d, v)| TimeSeriesPoint::new(d, v))
                .collect(),
        )
    }

    #[test]
    fn test_from_points_sorts_and_keeps_last_duplicate() {
        let ts = series(&[
            (date(2024, 1, 3), 3.0),
            (date(2024, 1, 1), 1.0),
            (date(2024, 1, 3), 30.0),
        ]);
        assert_eq!(ts.len(), 2);
        assert_eq!(ts.points()[0].date, date(2024, 1, 1));
        assert_eq!(ts.value_at(date(2024, 1, 3)), Some(30.0));
    }

    #[test]
    fn test_resample_midpoint_is_linear() {
        let ts = series(&[(date(2024, 1, 1), 10.0), (date(2024, 1, 3), 20.0)]);
        let daily = ts.resample_daily();
        assert_eq!(daily.len(), 3);
        assert_relative_eq!(daily.value_at(date(2024, 1, 2)).unwrap(), (10.0 + 20.0) / 2.0);
    }

    #[test]
    fn test_resample_quarterly_points() {
        // Ten day gap, value rises by 1 per day
        let ts = series(&[(date(2024, 3, 1), 0.0), (date(2024, 3, 11), 10.0)]);
        let daily = ts.resample_daily();
        assert_eq!(daily.len(), 11);
        for (offset, (day, value)) in daily.iter().enumerate() {
            assert_eq!(day, date(2024, 3, 1) + Duration::days(offset as i64));
            assert_relative_eq!(value, offset as f64, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_resample_is_idempotent() {
        let ts = series(&[
            (date(2023, 12, 30), 1.5),
            (date(2024, 1, 4), 7.25),
            (date(2024, 2, 1), -3.0),
        ]);
        let once = ts.resample_daily();
        let twice = once.to_time_series().resample_daily();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_resample_does_not_extrapolate() {
        let ts = series(&[(date(2024, 1, 5), 1.0), (date(2024, 1, 7), 2.0)]);
        let daily = ts.resample_daily();
        assert_eq!(daily.value_at(date(2024, 1, 4)), None);
        assert_eq!(daily.value_at(date(2024, 1, 8)), None);
        assert_eq!(
            daily.date_range(),
            Some(DateRange::new(date(2024, 1, 5), date(2024, 1, 7)))
        );
    }

    #[test]
    fn test_resample_interpolates_over_missing_values() {
        let ts = series(&[
            (date(2024, 1, 1), f64::NAN),
            (date(2024, 1, 2), 2.0),
            (date(2024, 1, 3), f64::NAN),
            (date(2024, 1, 4), 4.0),
            (date(2024, 1, 5), f64::NAN),
        ]);
        let daily = ts.resample_daily();
        assert_eq!(daily.start(), Some(date(2024, 1, 2)));
        assert_eq!(daily.end(), Some(date(2024, 1, 4)));
        assert_relative_eq!(daily.value_at(date(2024, 1, 3)).unwrap(), 3.0);
    }

    #[test]
    fn test_resample_empty_series() {
        let daily = TimeSeries::default().resample_daily();
        assert!(daily.is_empty());
        assert_eq!(daily.date_range(), None);

        let all_missing = series(&[(date(2024, 1, 1), f64::NAN)]).resample_daily();
        assert!(all_missing.is_empty());
    }

    #[test]
    fn test_map_and_drop_missing() {
        let ts = series(&[(date(2024, 1, 1), 350.0), (date(2024, 1, 2), f64::NAN)]);
        let scaled = ts.drop_missing().map_values(|v| v / 100.0);
        assert_eq!(scaled.len(), 1);
        assert_relative_eq!(scaled.points()[0].value, 3.5);
    }

    #[test]
    fn test_date_range_helpers() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(range.num_days(), 31);
        assert!(range.contains(date(2024, 1, 31)));
        assert!(!range.contains(date(2024, 2, 1)));
    }
}
