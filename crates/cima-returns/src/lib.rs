//! Return calculation for the cima ranking engine.
//!
//! This crate turns a raw [`PriceSeries`](cima_traits::PriceSeries) into:
//! - a [`MonthlySeries`]: the last observed price of every calendar month
//! - compounded [`PeriodReturn`]s over the configured horizons (12, 6, 3 and
//!   1 months by default), ending at a given as-of month
//!
//! Returns are compounded in ratio space and are undefined, never zero,
//! when the horizon window is not fully covered by consecutive months.
//!
//! # Example
//!
//! ```ignore
//! use cima_returns::{Horizon, ReturnCalculator};
//!
//! let calculator = ReturnCalculator::default();
//! let monthly = calculator.monthly(&series);
//! let returns = calculator.returns(&monthly, as_of);
//! let twelve_month = returns.get(Horizon::LONG);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod calculator;
mod horizon;
mod monthly;

pub use calculator::{AssetReturns, PeriodReturn, ReturnCalculator, ReturnConfig};
pub use horizon::Horizon;
pub use monthly::{MonthlyReturn, MonthlySeries, month_end};
