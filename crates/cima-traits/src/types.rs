//! Common types used throughout the cima workspace.
//!
//! This module defines the validated price series that every ranking starts
//! from, and the `MarketData` container that adapts long-format tabular input
//! into such series.

use crate::{CimaError, Result};
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// An asset identifier, typically a ticker symbol like "AAPL".
pub type AssetId = String;

/// Days between 0001-01-01 (CE) and the Unix epoch, used to decode polars dates.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// A chronologically ordered price history for one asset.
///
/// Dates are unique and strictly increasing and every price is strictly
/// positive and finite. These properties are checked once in [`PriceSeries::new`];
/// the rest of the workspace relies on them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    asset: AssetId,
    points: Vec<(Date, f64)>,
}

impl PriceSeries {
    /// Creates a validated price series.
    ///
    /// # Errors
    ///
    /// Returns [`CimaError::InvalidData`] if dates are not strictly increasing
    /// or a price is not strictly positive.
    pub fn new(asset: impl Into<AssetId>, points: Vec<(Date, f64)>) -> Result<Self> {
        let asset = asset.into();

        for window in points.windows(2) {
            if window[1].0 <= window[0].0 {
                return Err(CimaError::InvalidData(format!(
                    "{asset}: dates not strictly increasing at {}",
                    window[1].0
                )));
            }
        }

        if let Some((date, price)) = points.iter().find(|(_, p)| !(p.is_finite() && *p > 0.0)) {
            return Err(CimaError::InvalidData(format!(
                "{asset}: non-positive price {price} on {date}"
            )));
        }

        Ok(Self { asset, points })
    }

    /// Returns the asset identifier.
    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// Returns the (date, price) observations in chronological order.
    pub fn points(&self) -> &[(Date, f64)] {
        &self.points
    }

    /// Returns the number of observations.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns whether the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the date of the latest observation.
    pub fn last_date(&self) -> Option<Date> {
        self.points.last().map(|(d, _)| *d)
    }
}

/// Container for long-format market data.
///
/// `MarketData` wraps a Polars DataFrame with one row per (symbol, date)
/// observation, as delivered by tabular price collaborators.
///
/// # Expected Schema
///
/// - `symbol`: Security identifier (string)
/// - `date`: Trading date (`Date` dtype or `YYYY-MM-DD` string)
/// - `close`: Closing price (numeric)
///
/// Rows with a null close are skipped, the way an upstream `dropna` would.
#[derive(Debug, Clone)]
pub struct MarketData {
    /// The underlying DataFrame containing market data.
    data: DataFrame,
}

impl MarketData {
    /// Columns that must be present for [`MarketData::price_series`].
    pub const REQUIRED_COLUMNS: [&'static str; 3] = ["symbol", "date", "close"];

    /// Creates a new `MarketData` instance from a DataFrame.
    pub const fn new(data: DataFrame) -> Self {
        Self { data }
    }

    /// Returns a reference to the underlying DataFrame.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Returns the number of rows in the market data.
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// Returns whether the market data is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Checks if a column exists in the market data.
    pub fn has_column(&self, name: &str) -> bool {
        self.data
            .get_column_names()
            .iter()
            .any(|s| s.as_str() == name)
    }

    /// Splits the frame into one validated [`PriceSeries`] per symbol.
    ///
    /// Symbols keep the order of their first appearance in the frame and each
    /// symbol's rows are sorted by date before validation, so duplicate dates
    /// still surface as [`CimaError::InvalidData`].
    ///
    /// # Errors
    ///
    /// Returns an error if a required column is missing, has an unsupported
    /// dtype, or a series fails validation.
    pub fn price_series(&self) -> Result<Vec<PriceSeries>> {
        for col in Self::REQUIRED_COLUMNS {
            if !self.has_column(col) {
                return Err(CimaError::MissingColumn(col.to_string()));
            }
        }

        let symbols: Vec<Option<String>> = self
            .data
            .column("symbol")?
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|s: Option<&str>| s.map(str::to_string))
            .collect();

        let dates = self.dates()?;

        let close = self
            .data
            .column("close")?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let closes: Vec<Option<f64>> = close.f64()?.into_iter().collect();

        let mut order: Vec<String> = Vec::new();
        let mut grouped: HashMap<String, Vec<(Date, f64)>> = HashMap::new();

        for ((symbol, date), price) in symbols.into_iter().zip(dates).zip(closes) {
            let (Some(symbol), Some(date), Some(price)) = (symbol, date, price) else {
                continue;
            };
            let rows = grouped.entry(symbol.clone()).or_insert_with(|| {
                order.push(symbol);
                Vec::new()
            });
            rows.push((date, price));
        }

        order
            .into_iter()
            .map(|symbol| {
                let mut rows = grouped.remove(&symbol).unwrap_or_default();
                rows.sort_by_key(|(d, _)| *d);
                PriceSeries::new(symbol, rows)
            })
            .collect()
    }

    fn dates(&self) -> Result<Vec<Option<Date>>> {
        let series = self.data.column("date")?.as_materialized_series();

        match series.dtype() {
            DataType::Date => Ok(series
                .date()?
                .into_iter()
                .map(|d: Option<i32>| {
                    d.and_then(|d| Date::from_num_days_from_ce_opt(d + UNIX_EPOCH_DAYS_FROM_CE))
                })
                .collect()),
            DataType::String => series
                .str()?
                .into_iter()
                .map(|s: Option<&str>| {
                    s.map(|s| {
                        Date::parse_from_str(s.trim(), "%Y-%m-%d")
                            .map_err(|e| CimaError::InvalidDate(format!("{s}: {e}")))
                    })
                    .transpose()
                })
                .collect(),
            other => Err(CimaError::InvalidData(format!(
                "unsupported dtype for date column: {other}"
            ))),
        }
    }
}

impl From<DataFrame> for MarketData {
    fn from(data: DataFrame) -> Self {
        Self::new(data)
    }
}
