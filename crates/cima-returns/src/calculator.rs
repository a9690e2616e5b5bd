//! Compounded multi-horizon returns.

use crate::{Horizon, MonthlySeries, month_end};
use cima_traits::{AssetId, Date, PriceSeries};
use serde::{Deserialize, Serialize};

/// Configuration for the return calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnConfig {
    /// Horizons to compute, in months (default: 12, 6, 3, 1)
    pub horizons: Vec<Horizon>,
}

impl Default for ReturnConfig {
    fn default() -> Self {
        Self {
            horizons: Horizon::DEFAULTS.to_vec(),
        }
    }
}

/// The compounded return of one asset over one horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReturn {
    /// Asset the return belongs to
    pub asset: AssetId,
    /// Window length
    pub horizon: Horizon,
    /// Compounded return, `None` when the window is not fully covered
    pub value: Option<f64>,
}

/// All configured horizon returns of one asset, ending at a common as-of month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetReturns {
    /// Asset identifier
    pub asset: AssetId,
    /// (horizon, return) pairs in configured order
    pub returns: Vec<(Horizon, Option<f64>)>,
}

impl AssetReturns {
    /// Build from explicit horizon values.
    pub fn new(asset: impl Into<AssetId>, returns: Vec<(Horizon, Option<f64>)>) -> Self {
        Self {
            asset: asset.into(),
            returns,
        }
    }

    /// The return over `horizon`, if it was computed and is defined.
    #[must_use]
    pub fn get(&self, horizon: Horizon) -> Option<f64> {
        self.returns
            .iter()
            .find(|(h, _)| *h == horizon)
            .and_then(|(_, value)| *value)
    }

    /// Whether the return over `horizon` is defined.
    #[must_use]
    pub fn is_defined(&self, horizon: Horizon) -> bool {
        self.get(horizon).is_some()
    }
}

/// Computes monthly series and compounded horizon returns.
///
/// The h-month return ending at month m is `prod(1 + r_{m-i}, i = 0..h) - 1`.
/// Growth factors are multiplied directly and 1 is subtracted once at the
/// end. A return is only defined when the as-of month and the h months before
/// it are all present and consecutive.
#[derive(Debug, Clone, Default)]
pub struct ReturnCalculator {
    config: ReturnConfig,
}

impl ReturnCalculator {
    /// Create a calculator with the given configuration.
    #[must_use]
    pub const fn new(config: ReturnConfig) -> Self {
        Self { config }
    }

    /// The configured horizons.
    #[must_use]
    pub fn horizons(&self) -> &[Horizon] {
        &self.config.horizons
    }

    /// The longest configured horizon.
    #[must_use]
    pub fn longest_horizon(&self) -> Option<Horizon> {
        self.config.horizons.iter().copied().max()
    }

    /// Resample a price series to month-end prices.
    #[must_use]
    pub fn monthly(&self, series: &PriceSeries) -> MonthlySeries {
        MonthlySeries::from_prices(series)
    }

    /// Compounded return over `horizon` ending at the month containing `as_of`.
    #[must_use]
    pub fn period_return(
        &self,
        monthly: &MonthlySeries,
        horizon: Horizon,
        as_of: Date,
    ) -> PeriodReturn {
        PeriodReturn {
            asset: monthly.asset().to_string(),
            horizon,
            value: compound(monthly, horizon, as_of),
        }
    }

    /// Every configured horizon return ending at the month containing `as_of`.
    #[must_use]
    pub fn returns(&self, monthly: &MonthlySeries, as_of: Date) -> AssetReturns {
        AssetReturns {
            asset: monthly.asset().to_string(),
            returns: self
                .config
                .horizons
                .iter()
                .map(|&h| (h, compound(monthly, h, as_of)))
                .collect(),
        }
    }
}

fn compound(monthly: &MonthlySeries, horizon: Horizon, as_of: Date) -> Option<f64> {
    let end = monthly.position(month_end(as_of))?;
    let months = horizon.months() as usize;
    if end < months {
        return None;
    }

    let mut growth = 1.0;
    for index in (end + 1 - months..=end).rev() {
        growth *= monthly.growth_at(index)?;
    }
    Some(growth - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Months;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    /// Month-end prices starting at `start` with the given growth per month.
    fn monthly_series(asset: &str, start: Date, months: usize, growth: f64) -> MonthlySeries {
        let points = (0..months)
            .map(|i| {
                let date = month_end(start + Months::new(i as u32));
                (date, 100.0 * growth.powi(i as i32))
            })
            .collect();
        MonthlySeries::from_prices(&PriceSeries::new(asset, points).unwrap())
    }

    #[test]
    fn test_default_config() {
        let config = ReturnConfig::default();
        assert_eq!(config.horizons, Horizon::DEFAULTS.to_vec());
        assert_eq!(ReturnCalculator::default().longest_horizon(), Some(Horizon::LONG));
    }

    #[test]
    fn test_constant_one_percent_compounds() {
        let calculator = ReturnCalculator::default();
        let monthly = monthly_series("AAPL", d(2023, 1, 31), 13, 1.01);
        let as_of = monthly.last_month().unwrap();

        let twelve = calculator.period_return(&monthly, Horizon::LONG, as_of);
        assert_relative_eq!(twelve.value.unwrap(), 1.01f64.powi(12) - 1.0, epsilon = 1e-12);

        let one = calculator.period_return(&monthly, Horizon::MICRO, as_of);
        assert_relative_eq!(one.value.unwrap(), 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_compounding_is_not_linear() {
        let calculator = ReturnCalculator::default();
        let monthly = monthly_series("AAPL", d(2023, 1, 31), 4, 1.10);
        let as_of = monthly.last_month().unwrap();

        let three = calculator.period_return(&monthly, Horizon::SHORT, as_of);
        assert_relative_eq!(three.value.unwrap(), 0.331, epsilon = 1e-12);
    }

    #[test]
    fn test_short_window_is_undefined() {
        let calculator = ReturnCalculator::default();
        // 8 months of prices give 7 monthly returns.
        let monthly = monthly_series("AAPL", d(2024, 1, 31), 8, 1.02);
        let returns = calculator.returns(&monthly, monthly.last_month().unwrap());

        assert_eq!(returns.get(Horizon::LONG), None);
        assert!(returns.get(Horizon::MEDIUM).is_some());
        assert!(returns.is_defined(Horizon::SHORT));
        assert!(returns.is_defined(Horizon::MICRO));
    }

    #[test]
    fn test_exact_window_is_defined() {
        let calculator = ReturnCalculator::default();
        let monthly = monthly_series("AAPL", d(2024, 1, 31), 7, 1.02);
        let as_of = monthly.last_month().unwrap();
        assert!(calculator.returns(&monthly, as_of).is_defined(Horizon::MEDIUM));

        let monthly = monthly_series("AAPL", d(2024, 1, 31), 6, 1.02);
        let as_of = monthly.last_month().unwrap();
        assert!(!calculator.returns(&monthly, as_of).is_defined(Horizon::MEDIUM));
    }

    #[test]
    fn test_gap_inside_window_is_undefined() {
        let calculator = ReturnCalculator::default();
        let series = PriceSeries::new(
            "AAPL",
            vec![
                (d(2024, 1, 31), 100.0),
                (d(2024, 2, 29), 101.0),
                (d(2024, 4, 30), 103.0),
                (d(2024, 5, 31), 104.0),
            ],
        )
        .unwrap();
        let monthly = calculator.monthly(&series);
        let returns = calculator.returns(&monthly, d(2024, 5, 31));

        assert!(returns.is_defined(Horizon::MICRO));
        assert!(!returns.is_defined(Horizon::SHORT));
    }

    #[test]
    fn test_returns_end_at_as_of_month() {
        let calculator = ReturnCalculator::default();
        let monthly = monthly_series("AAPL", d(2024, 1, 31), 6, 1.05);

        // As-of mid-March uses the March month-end point, ignoring later months.
        let one = calculator.period_return(&monthly, Horizon::MICRO, d(2024, 3, 12));
        assert_relative_eq!(one.value.unwrap(), 0.05, epsilon = 1e-12);

        // No price in the as-of month means nothing is defined.
        let missing = calculator.period_return(&monthly, Horizon::MICRO, d(2025, 1, 31));
        assert_eq!(missing.value, None);
    }
}
