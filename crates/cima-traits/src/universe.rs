//! Universe definitions.

use crate::AssetId;
use serde::{Deserialize, Serialize};

/// A named set of asset identifiers, e.g. an index's constituents.
///
/// Membership discovery happens outside the engine; a universe is just the
/// resolved symbol list plus the adjustments applied before ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Universe {
    /// Stable identifier used as the report key (e.g. `nasdaq100`)
    pub id: String,

    /// Human-readable name (e.g. `NASDAQ-100`)
    pub name: String,

    /// Member symbols in declared order
    pub symbols: Vec<AssetId>,

    /// Symbols never ranked even when listed
    #[serde(default)]
    pub excluded: Vec<AssetId>,

    /// Keep only the first N members after exclusion
    #[serde(default)]
    pub max_symbols: Option<usize>,
}

impl Universe {
    /// Create a universe with no exclusions and no cap.
    pub fn new(id: impl Into<String>, name: impl Into<String>, symbols: Vec<AssetId>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            symbols,
            excluded: Vec::new(),
            max_symbols: None,
        }
    }

    /// The symbols to rank, in declared order, with exclusions and the cap applied.
    ///
    /// Duplicates are dropped, keeping the first occurrence.
    #[must_use]
    pub fn members(&self) -> Vec<AssetId> {
        let mut members: Vec<AssetId> = Vec::with_capacity(self.symbols.len());
        for symbol in &self.symbols {
            if self.excluded.contains(symbol) || members.contains(symbol) {
                continue;
            }
            members.push(symbol.clone());
        }
        if let Some(limit) = self.max_symbols {
            members.truncate(limit);
        }
        members
    }

    /// NASDAQ-100 with the large-cap fallback list used when constituents cannot be discovered.
    #[must_use]
    pub fn nasdaq100() -> Self {
        Self::new(
            "nasdaq100",
            "NASDAQ-100",
            ["AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "META", "TSLA", "NFLX", "ADBE", "CRM"]
                .map(String::from)
                .to_vec(),
        )
    }

    /// S&P 500 with its fallback list. Dual-class tickers are excluded.
    #[must_use]
    pub fn sp500() -> Self {
        Self {
            excluded: vec!["BRK.B".to_string(), "BF.B".to_string()],
            ..Self::new(
                "sp500",
                "S&P 500",
                ["AAPL", "MSFT", "GOOGL", "AMZN", "UNH", "JNJ", "V", "XOM", "PG", "JPM"]
                    .map(String::from)
                    .to_vec(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_members_applies_exclusions_and_cap() {
        let universe = Universe {
            excluded: vec!["BRK.B".to_string()],
            max_symbols: Some(2),
            ..Universe::new(
                "test",
                "Test",
                vec!["AAPL".into(), "BRK.B".into(), "MSFT".into(), "NVDA".into()],
            )
        };
        assert_eq!(universe.members(), vec!["AAPL".to_string(), "MSFT".to_string()]);
    }

    #[test]
    fn test_members_drops_duplicates() {
        let universe = Universe::new("t", "T", vec!["A".into(), "B".into(), "A".into()]);
        assert_eq!(universe.members(), vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_default_universes() {
        let nasdaq = Universe::nasdaq100();
        assert_eq!(nasdaq.id, "nasdaq100");
        assert_eq!(nasdaq.members().len(), 10);

        let sp500 = Universe::sp500();
        assert_eq!(sp500.name, "S&P 500");
        assert!(sp500.excluded.contains(&"BRK.B".to_string()));
    }
}
