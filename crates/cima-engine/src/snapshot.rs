//! Ranking results.

use cima_traits::{AssetId, Date};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One as-of-date ranking result for a universe.
///
/// Serialized in camelCase, e.g. `asOfDate`, `ultraTop5`,
/// `processingDurationSeconds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingSnapshot {
    /// Universe display name
    pub universe_name: String,
    /// Latest month-end shared by every ranked asset
    pub as_of_date: Date,
    /// Top tier in rank order
    pub top10: Vec<AssetId>,
    /// Ultra tier in rank order, drawn from `top10`
    pub ultra_top5: Vec<AssetId>,
    /// Assets that passed the minimum-data gate
    pub processed_asset_count: usize,
    /// Wall-clock ranking time in seconds, two decimals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_duration_seconds: Option<f64>,
}

/// Why a universe produced no snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum NoResult {
    /// No asset passed the minimum-data gate
    NoSurvivors,
    /// Too few assets passed the gate to rank meaningfully
    TooFewSurvivors {
        /// Assets that passed
        survivors: usize,
        /// Configured minimum
        minimum: usize,
    },
    /// The selector's first stage had nothing to rank
    EmptyCandidatePool,
}

impl fmt::Display for NoResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSurvivors => write!(f, "no asset has enough price history"),
            Self::TooFewSurvivors { survivors, minimum } => {
                write!(f, "only {survivors} assets with enough history (minimum {minimum})")
            }
            Self::EmptyCandidatePool => write!(f, "no asset has a defined long-horizon score"),
        }
    }
}

/// Result of ranking one universe.
#[derive(Debug, Clone, PartialEq)]
pub enum RankingOutcome {
    /// A snapshot was produced (its tiers may still be empty)
    Ranked(RankingSnapshot),
    /// The universe could not be ranked
    NoResult(NoResult),
}

impl RankingOutcome {
    /// The snapshot, if one was produced.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&RankingSnapshot> {
        match self {
            Self::Ranked(snapshot) => Some(snapshot),
            Self::NoResult(_) => None,
        }
    }

    /// Consume the outcome, keeping the snapshot.
    #[must_use]
    pub fn into_snapshot(self) -> Option<RankingSnapshot> {
        match self {
            Self::Ranked(snapshot) => Some(snapshot),
            Self::NoResult(_) => None,
        }
    }
}
