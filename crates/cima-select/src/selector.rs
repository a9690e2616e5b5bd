//! Core trait definition for candidate selectors.

use cima_returns::AssetReturns;
use cima_traits::AssetId;
use serde::Serialize;

/// What one selection stage saw and kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageOutcome {
    /// Stage label, e.g. `12m` or `blended`
    pub label: String,
    /// Assets eligible for the stage (those with a defined score)
    pub eligible: usize,
    /// Survivors in rank order
    pub survivors: Vec<AssetId>,
}

/// Result of running a selector over a scored asset set.
///
/// `ultra` is always an order-consistent subset of `top`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    /// Every stage in the order it ran
    pub stages: Vec<StageOutcome>,
    /// Published top tier
    pub top: Vec<AssetId>,
    /// Published ultra tier
    pub ultra: Vec<AssetId>,
}

impl Selection {
    /// Size of the first stage's eligible pool. Zero means nothing could be ranked.
    #[must_use]
    pub fn candidates(&self) -> usize {
        self.stages.first().map_or(0, |stage| stage.eligible)
    }

    /// Survivors of the stage at `index`, empty if no such stage ran.
    #[must_use]
    pub fn survivors(&self, index: usize) -> &[AssetId] {
        self.stages
            .get(index)
            .map(|stage| stage.survivors.as_slice())
            .unwrap_or_default()
    }
}

/// Narrows scored assets to the published tiers.
///
/// Implementations must be deterministic: identical input yields identical
/// output, with ties kept in input order. They are thread-safe (Send + Sync)
/// so universes can be ranked on separate workers.
///
/// # Examples
///
/// ```rust,no_run
/// use cima_returns::AssetReturns;
/// use cima_select::{Selection, Selector};
///
/// struct FirstFive;
///
/// impl Selector for FirstFive {
///     fn select(&self, assets: &[AssetReturns]) -> Selection {
///         let ids: Vec<String> = assets.iter().take(5).map(|a| a.asset.clone()).collect();
///         Selection { stages: Vec::new(), top: ids.clone(), ultra: ids }
///     }
///
///     fn name(&self) -> &str {
///         "first_five"
///     }
/// }
/// ```
pub trait Selector: Send + Sync {
    /// Rank `assets` and return the published tiers.
    ///
    /// Never fails: an empty eligible pool produces empty tiers.
    fn select(&self, assets: &[AssetReturns]) -> Selection;

    /// Name of this selection policy, used in logs.
    fn name(&self) -> &str;
}

/// Stable descending sort of scored items, truncated to `keep`.
pub(crate) fn rank_descending<'a>(
    mut scored: Vec<(&'a AssetReturns, f64)>,
    keep: usize,
) -> Vec<&'a AssetReturns> {
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(keep);
    scored.into_iter().map(|(asset, _)| asset).collect()
}

pub(crate) fn ids(assets: &[&AssetReturns]) -> Vec<AssetId> {
    assets.iter().map(|a| a.asset.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cima_returns::Horizon;

    #[test]
    fn test_empty_selection() {
        let selection = Selection::default();
        assert_eq!(selection.candidates(), 0);
        assert!(selection.survivors(0).is_empty());
    }

    #[test]
    fn test_rank_descending_keeps_ties_in_input_order() {
        let a = AssetReturns::new("A", vec![(Horizon::LONG, Some(0.1))]);
        let b = AssetReturns::new("B", vec![(Horizon::LONG, Some(0.2))]);
        let c = AssetReturns::new("C", vec![(Horizon::LONG, Some(0.1))]);

        let ranked = rank_descending(vec![(&a, 0.1), (&b, 0.2), (&c, 0.1)], 10);
        assert_eq!(ids(&ranked), vec!["B", "A", "C"]);

        let ranked = rank_descending(vec![(&a, 0.1), (&b, 0.2), (&c, 0.1)], 2);
        assert_eq!(ids(&ranked), vec!["B", "A"]);
    }
}
