#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/cima/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core definitions for the cima momentum ranking engine.
//!
//! This crate provides the foundational data types consumed by the return
//! calculator, the cascade selector and the ranking engine, together with
//! the interface through which price data enters the system.

/// The version of the cima-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod source;
pub mod types;
pub mod universe;

// Re-exports
pub use error::{CimaError, Result};
pub use source::{MemorySource, PriceSource, RetryConfig, RetryingSource, fetch_universe};
pub use types::{AssetId, Date, MarketData, PriceSeries};
pub use universe::Universe;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }
}
