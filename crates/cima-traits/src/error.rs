//! Error types for the cima workspace.
//!
//! Most data-quality problems (thin series, undefined horizon returns, empty
//! cascade stages) are not errors at all; they degrade the ranking instead.
//! The variants here cover boundary violations and collaborator failures.

use thiserror::Error;

/// The main error type for cima operations.
#[derive(Debug, Error)]
pub enum CimaError {
    /// Structurally invalid input rejected at the boundary.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when a required column is missing from tabular input.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// The price source has no series for this asset. Never retried.
    #[error("Price series unavailable: {0}")]
    Unavailable(String),

    /// Transient failure while fetching data from an external source.
    #[error("Data fetch error: {0}")]
    DataFetch(String),

    /// Error when a date is out of range or cannot be parsed.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Inconsistent or out-of-range configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CimaError {
    /// Whether a retry of the failed operation could succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::DataFetch(_))
    }
}

/// A specialized Result type for cima operations.
///
/// This is a convenience type that uses [`CimaError`] as the error type.
pub type Result<T> = std::result::Result<T, CimaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CimaError::InvalidData("bad series".to_string());
        assert_eq!(err.to_string(), "Invalid data: bad series");

        let err = CimaError::Unavailable("AAPL".to_string());
        assert_eq!(err.to_string(), "Price series unavailable: AAPL");
    }

    #[test]
    fn test_config_error_display() {
        let err = CimaError::Config("horizon 24 not configured".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: horizon 24 not configured"
        );
        assert!(!err.is_transient());
    }

    #[test]
    fn test_transient_classification() {
        assert!(CimaError::DataFetch("timeout".to_string()).is_transient());
        assert!(!CimaError::Unavailable("MSFT".to_string()).is_transient());
        assert!(!CimaError::InvalidData("x".to_string()).is_transient());
    }
}
