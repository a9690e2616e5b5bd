//! Ranking history for cima.
//!
//! [`HistoryStore`] keeps a bounded, date-keyed log of the tiers each
//! universe published and persists it atomically as JSON, newest date first:
//!
//! ```json
//! {
//!   "2024-06-04": { "NASDAQ-100": { "top10": ["NVDA", ...], "ultraTop5": [...] } },
//!   "2024-06-03": { ... }
//! }
//! ```
//!
//! [`ChangeAnalyzer`] compares the two latest entries of a universe
//! position by position.

pub mod changes;
pub mod error;
pub mod store;

pub use changes::{Change, ChangeAnalyzer, ChangeReport, PositionChange, Tier};
pub use error::{HistoryError, Result};
pub use store::{HistoryConfig, HistoryEntry, HistoryLoad, HistoryStore, TierPair};
