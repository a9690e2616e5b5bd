//! Position-by-position comparison of the two latest rankings.

use cima_traits::{AssetId, Date};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::store::{HistoryStore, TierPair};

/// Which published tier to compare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// The ultra tier (default)
    #[default]
    UltraTop5,
    /// The top tier
    Top10,
}

impl Tier {
    /// Number of positions the tier publishes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::UltraTop5 => 5,
            Self::Top10 => 10,
        }
    }

    fn pick(self, tiers: &TierPair) -> &[AssetId] {
        match self {
            Self::UltraTop5 => &tiers.ultra_top5,
            Self::Top10 => &tiers.top10,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UltraTop5 => write!(f, "ultraTop5"),
            Self::Top10 => write!(f, "top10"),
        }
    }
}

/// What happened at one rank position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    /// Same asset as the previous run
    Unchanged {
        /// The asset at this position
        asset: AssetId,
    },
    /// A different asset (or none) holds the position
    Moved {
        /// Previous occupant
        from: Option<AssetId>,
        /// Current occupant
        to: Option<AssetId>,
    },
}

/// Change at a 1-based rank position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionChange {
    /// 1-based rank
    pub rank: usize,
    /// What changed
    pub change: Change,
}

impl fmt::Display for PositionChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.change {
            Change::Unchanged { asset } => write!(f, "#{} {asset} (unchanged)", self.rank),
            Change::Moved { from, to } => write!(
                f,
                "#{} {} -> {}",
                self.rank,
                from.as_deref().unwrap_or("-"),
                to.as_deref().unwrap_or("-")
            ),
        }
    }
}

/// Diff between a universe's two most recent history entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeReport {
    /// Universe name
    pub universe: String,
    /// Tier compared
    pub tier: Tier,
    /// Newer entry's date
    pub current: Date,
    /// Older entry's date
    pub previous: Date,
    /// One change per compared position
    pub changes: Vec<PositionChange>,
}

impl ChangeReport {
    /// Positions whose occupant differs from the previous run.
    pub fn moved(&self) -> impl Iterator<Item = &PositionChange> {
        self.changes
            .iter()
            .filter(|c| matches!(c.change, Change::Moved { .. }))
    }
}

/// Compares the latest two rankings of a universe position by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeAnalyzer {
    tier: Tier,
    depth: usize,
}

impl Default for ChangeAnalyzer {
    fn default() -> Self {
        Self::for_tier(Tier::UltraTop5)
    }
}

impl ChangeAnalyzer {
    /// Compare the first `depth` positions of `tier`.
    #[must_use]
    pub const fn new(tier: Tier, depth: usize) -> Self {
        Self { tier, depth }
    }

    /// Compare every published position of `tier`.
    #[must_use]
    pub const fn for_tier(tier: Tier) -> Self {
        Self::new(tier, tier.size())
    }

    /// Tier being compared.
    #[must_use]
    pub const fn tier(&self) -> Tier {
        self.tier
    }

    /// Report for `universe`, or `None` when it has fewer than two entries.
    #[must_use]
    pub fn report(&self, store: &HistoryStore, universe: &str) -> Option<ChangeReport> {
        let mut recent = store.universe_history(universe);
        let (current, today) = recent.next()?;
        let (previous, yesterday) = recent.next()?;

        Some(ChangeReport {
            universe: universe.to_string(),
            tier: self.tier,
            current,
            previous,
            changes: self.compare(self.tier.pick(yesterday), self.tier.pick(today)),
        })
    }

    /// Position changes for `universe`; empty when it has fewer than two entries.
    #[must_use]
    pub fn diff(&self, store: &HistoryStore, universe: &str) -> Vec<PositionChange> {
        self.report(store, universe)
            .map(|report| report.changes)
            .unwrap_or_default()
    }

    fn compare(&self, before: &[AssetId], after: &[AssetId]) -> Vec<PositionChange> {
        (0..self.depth)
            .filter_map(|i| {
                let change = match (before.get(i), after.get(i)) {
                    (None, None) => return None,
                    (Some(old), Some(new)) if old == new => Change::Unchanged { asset: new.clone() },
                    (old, new) => Change::Moved {
                        from: old.cloned(),
                        to: new.cloned(),
                    },
                };
                Some(PositionChange { rank: i + 1, change })
            })
            .collect()
    }
}
