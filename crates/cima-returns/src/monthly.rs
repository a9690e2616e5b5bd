//! Month-end resampling of daily price series.

use chrono::{Datelike, Days};
use cima_traits::{AssetId, Date, PriceSeries};
use serde::Serialize;

/// Returns the last calendar day of `date`'s month.
#[must_use]
pub fn month_end(date: Date) -> Date {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    Date::from_ymd_opt(year, month, 1)
        .and_then(|first| first.checked_sub_days(Days::new(1)))
        .unwrap_or(Date::MAX)
}

/// Months since year zero, so adjacent calendar months differ by exactly one.
fn month_index(date: Date) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// A single month-over-month return.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyReturn {
    /// Month-end date of the later month
    pub month: Date,
    /// `p_m / p_{m-1}`, kept in ratio space
    pub growth: f64,
}

impl MonthlyReturn {
    /// The simple return `p_m / p_{m-1} - 1`.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.growth - 1.0
    }
}

/// One price per calendar month, keyed by month-end date.
///
/// Each point is the last observation on or before the month boundary.
/// Months without observations are absent; nothing is filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySeries {
    asset: AssetId,
    points: Vec<(Date, f64)>,
    observations: usize,
}

impl MonthlySeries {
    /// Resample a price series to month-end prices.
    #[must_use]
    pub fn from_prices(series: &PriceSeries) -> Self {
        let mut points: Vec<(Date, f64)> = Vec::new();
        for &(date, price) in series.points() {
            let key = month_end(date);
            match points.last_mut() {
                Some(last) if last.0 == key => last.1 = price,
                _ => points.push((key, price)),
            }
        }

        Self {
            asset: series.asset().to_string(),
            points,
            observations: series.len(),
        }
    }

    /// The asset this series belongs to.
    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// Month-end (date, price) points in increasing month order.
    pub fn points(&self) -> &[(Date, f64)] {
        &self.points
    }

    /// Number of months with a price.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no month has a price.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of raw observations the series was built from.
    pub const fn observations(&self) -> usize {
        self.observations
    }

    /// Month-end date of the latest month.
    pub fn last_month(&self) -> Option<Date> {
        self.points.last().map(|(d, _)| *d)
    }

    /// Position of the month ending on `month_end`, if it has a price.
    pub(crate) fn position(&self, month_end: Date) -> Option<usize> {
        self.points.binary_search_by_key(&month_end, |(d, _)| *d).ok()
    }

    /// Growth factor from the month before `index` to `index`, if both months
    /// are present and adjacent.
    pub(crate) fn growth_at(&self, index: usize) -> Option<f64> {
        if index == 0 {
            return None;
        }
        let (prev_month, prev_price) = *self.points.get(index - 1)?;
        let (month, price) = *self.points.get(index)?;
        (month_index(month) - month_index(prev_month) == 1).then(|| price / prev_price)
    }

    /// All defined month-over-month returns in chronological order.
    #[must_use]
    pub fn returns(&self) -> Vec<MonthlyReturn> {
        (1..self.points.len())
            .filter_map(|i| {
                self.growth_at(i).map(|growth| MonthlyReturn {
                    month: self.points[i].0,
                    growth,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_month_end() {
        assert_eq!(month_end(d(2024, 2, 10)), d(2024, 2, 29));
        assert_eq!(month_end(d(2023, 12, 1)), d(2023, 12, 31));
        assert_eq!(month_end(d(2024, 4, 30)), d(2024, 4, 30));
    }

    #[test]
    fn test_resample_takes_last_price_of_month() {
        let series = PriceSeries::new(
            "AAPL",
            vec![
                (d(2024, 1, 2), 100.0),
                (d(2024, 1, 31), 110.0),
                (d(2024, 2, 1), 111.0),
                (d(2024, 2, 15), 120.0),
            ],
        )
        .unwrap();

        let monthly = MonthlySeries::from_prices(&series);
        assert_eq!(monthly.points(), &[(d(2024, 1, 31), 110.0), (d(2024, 2, 29), 120.0)]);
        assert_eq!(monthly.observations(), 4);
        assert_eq!(monthly.last_month(), Some(d(2024, 2, 29)));
    }

    #[test]
    fn test_gap_months_are_not_filled() {
        let series = PriceSeries::new(
            "AAPL",
            vec![(d(2024, 1, 10), 100.0), (d(2024, 3, 10), 120.0), (d(2024, 4, 10), 132.0)],
        )
        .unwrap();

        let monthly = MonthlySeries::from_prices(&series);
        assert_eq!(monthly.len(), 3);

        // Jan -> Mar is not a monthly return; only Mar -> Apr is.
        let returns = monthly.returns();
        assert_eq!(returns.len(), 1);
        assert_eq!(returns[0].month, d(2024, 4, 30));
        assert_relative_eq!(returns[0].value(), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_year_boundary_is_adjacent() {
        let series =
            PriceSeries::new("AAPL", vec![(d(2023, 12, 29), 100.0), (d(2024, 1, 2), 105.0)])
                .unwrap();
        let returns = MonthlySeries::from_prices(&series).returns();
        assert_eq!(returns.len(), 1);
        assert_relative_eq!(returns[0].growth, 1.05, epsilon = 1e-12);
    }
}
