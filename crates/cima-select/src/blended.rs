//! Blended-score selection.

use cima_returns::{AssetReturns, Horizon};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::selector::{Selection, Selector, StageOutcome, ids, rank_descending};

/// Weight of one horizon in a blended score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weighting {
    /// Horizon whose return is weighted
    pub horizon: Horizon,
    /// Non-negative weight
    pub weight: f64,
}

impl Weighting {
    /// Create a weighting.
    #[must_use]
    pub const fn new(horizon: Horizon, weight: f64) -> Self {
        Self { horizon, weight }
    }
}

/// What to do when an asset lacks a weighted horizon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingHorizon {
    /// Drop the asset from that score
    #[default]
    Exclude,
    /// Rescale the weights of the available horizons to sum to 1
    Renormalize,
}

/// Configuration for blended-score selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendedConfig {
    /// Weights of the top-tier score (default: 0.4×12m + 0.3×6m + 0.3×3m)
    pub top_weights: Vec<Weighting>,
    /// Weights of the ultra-tier score (default: 0.6×3m + 0.4×1m)
    pub ultra_weights: Vec<Weighting>,
    /// Top-tier size (default: 10)
    pub top_size: usize,
    /// Ultra-tier size (default: 5)
    pub ultra_size: usize,
    /// Missing-horizon rule (default: exclude)
    pub missing: MissingHorizon,
}

impl Default for BlendedConfig {
    fn default() -> Self {
        Self {
            top_weights: vec![
                Weighting::new(Horizon::LONG, 0.4),
                Weighting::new(Horizon::MEDIUM, 0.3),
                Weighting::new(Horizon::SHORT, 0.3),
            ],
            ultra_weights: vec![
                Weighting::new(Horizon::SHORT, 0.6),
                Weighting::new(Horizon::MICRO, 0.4),
            ],
            top_size: 10,
            ultra_size: 5,
            missing: MissingHorizon::Exclude,
        }
    }
}

/// Single-sort selection on weighted horizon scores.
///
/// The top tier is the best `top_size` assets by the top-weighted score. The
/// ultra tier re-scores only those survivors with the ultra weights and keeps
/// the best `ultra_size`. How undefined returns are handled is set by
/// [`MissingHorizon`].
#[derive(Debug, Clone, Default)]
pub struct BlendedSelector {
    config: BlendedConfig,
}

impl BlendedSelector {
    /// Create a new blended selector with the given configuration.
    #[must_use]
    pub const fn new(config: BlendedConfig) -> Self {
        Self { config }
    }

    /// The selector configuration.
    #[must_use]
    pub const fn config(&self) -> &BlendedConfig {
        &self.config
    }

    /// Weighted score of each asset, `None` where the missing-horizon rule rejects it.
    #[must_use]
    pub fn scores(&self, assets: &[&AssetReturns], weights: &[Weighting]) -> Vec<Option<f64>> {
        if weights.is_empty() {
            return vec![None; assets.len()];
        }

        let w: Array1<f64> = weights.iter().map(|w| w.weight).collect();
        let returns = Array2::from_shape_fn((assets.len(), weights.len()), |(i, j)| {
            assets[i].get(weights[j].horizon).unwrap_or(f64::NAN)
        });

        returns
            .outer_iter()
            .map(|row| {
                let defined = row.mapv(|r| if r.is_nan() { 0.0 } else { 1.0 });
                match self.config.missing {
                    MissingHorizon::Exclude => {
                        defined.iter().all(|&d| d > 0.0).then(|| row.dot(&w))
                    }
                    MissingHorizon::Renormalize => {
                        let weight_sum = defined.dot(&w);
                        if weight_sum <= f64::EPSILON {
                            return None;
                        }
                        let filled = row.mapv(|r| if r.is_nan() { 0.0 } else { r });
                        Some(filled.dot(&w) / weight_sum)
                    }
                }
            })
            .collect()
    }

    fn stage<'a>(
        &self,
        label: &str,
        pool: &[&'a AssetReturns],
        weights: &[Weighting],
        keep: usize,
    ) -> (StageOutcome, Vec<&'a AssetReturns>) {
        let scored: Vec<(&AssetReturns, f64)> = pool
            .iter()
            .zip(self.scores(pool, weights))
            .filter_map(|(asset, score)| score.map(|s| (*asset, s)))
            .collect();
        let eligible = scored.len();
        let survivors = rank_descending(scored, keep);

        let outcome = StageOutcome {
            label: label.to_string(),
            eligible,
            survivors: ids(&survivors),
        };
        (outcome, survivors)
    }
}

impl Selector for BlendedSelector {
    fn select(&self, assets: &[AssetReturns]) -> Selection {
        let pool: Vec<&AssetReturns> = assets.iter().collect();
        let (top_stage, top) =
            self.stage("blended", &pool, &self.config.top_weights, self.config.top_size);
        let (ultra_stage, _) =
            self.stage("ultra", &top, &self.config.ultra_weights, self.config.ultra_size);

        Selection {
            top: top_stage.survivors.clone(),
            ultra: ultra_stage.survivors.clone(),
            stages: vec![top_stage, ultra_stage],
        }
    }

    fn name(&self) -> &str {
        "blended"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn asset(id: &str, returns: [Option<f64>; 4]) -> AssetReturns {
        AssetReturns::new(id, Horizon::DEFAULTS.into_iter().zip(returns).collect())
    }

    fn renormalizing() -> BlendedSelector {
        BlendedSelector::new(BlendedConfig {
            missing: MissingHorizon::Renormalize,
            ..Default::default()
        })
    }

    #[test]
    fn test_default_config() {
        let config = BlendedConfig::default();
        let total: f64 = config.top_weights.iter().map(|w| w.weight).sum();
        assert_relative_eq!(total, 1.0);
        assert_eq!(config.top_size, 10);
        assert_eq!(config.ultra_size, 5);
        assert_eq!(config.missing, MissingHorizon::Exclude);
    }

    #[test]
    fn test_weighted_score() {
        let selector = BlendedSelector::default();
        let a = asset("A", [Some(0.5), Some(0.2), Some(0.1), Some(0.0)]);
        let scores = selector.scores(&[&a], &selector.config().top_weights);
        assert_relative_eq!(scores[0].unwrap(), 0.4 * 0.5 + 0.3 * 0.2 + 0.3 * 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_exclude_drops_asset_missing_a_horizon() {
        // Eight months of history: no 12-month return.
        let young = asset("YOUNG", [None, Some(0.8), Some(0.5), Some(0.2)]);
        let old = asset("OLD", [Some(0.1), Some(0.1), Some(0.1), Some(0.1)]);

        let selection = BlendedSelector::default().select(&[young, old]);
        assert_eq!(selection.top, vec!["OLD"]);
        assert_eq!(selection.ultra, vec!["OLD"]);
        assert_eq!(selection.candidates(), 1);
    }

    #[test]
    fn test_renormalize_keeps_asset_missing_a_horizon() {
        let young = asset("YOUNG", [None, Some(0.8), Some(0.5), Some(0.2)]);
        let old = asset("OLD", [Some(0.1), Some(0.1), Some(0.1), Some(0.1)]);
        let selector = renormalizing();

        let scores = selector.scores(&[&young], &selector.config().top_weights);
        // 0.3 and 0.3 rescaled to 0.5 and 0.5.
        assert_relative_eq!(scores[0].unwrap(), 0.65, epsilon = 1e-12);

        let selection = selector.select(&[young, old]);
        assert_eq!(selection.top, vec!["YOUNG", "OLD"]);
        assert_eq!(selection.ultra, vec!["YOUNG", "OLD"]);
    }

    #[test]
    fn test_renormalize_rejects_asset_with_no_weighted_horizon() {
        let bare = asset("BARE", [None, None, None, Some(0.3)]);
        let selector = renormalizing();
        let scores = selector.scores(&[&bare], &selector.config().top_weights);
        assert_eq!(scores, vec![None]);
        assert_eq!(selector.select(&[bare]).candidates(), 0);
    }

    #[test]
    fn test_ultra_drawn_from_top() {
        // L has the best short-term score but too weak a blended score for the top 2.
        let assets = vec![
            asset("A", [Some(0.9), Some(0.5), Some(0.1), Some(0.01)]),
            asset("B", [Some(0.8), Some(0.4), Some(0.2), Some(0.05)]),
            asset("L", [Some(-0.5), Some(-0.2), Some(0.9), Some(0.50)]),
        ];
        let selector = BlendedSelector::new(BlendedConfig {
            top_size: 2,
            ultra_size: 1,
            ..Default::default()
        });

        let selection = selector.select(&assets);
        assert_eq!(selection.top, vec!["A", "B"]);
        assert_eq!(selection.ultra, vec!["B"]);
    }

    #[test]
    fn test_empty_input() {
        let selection = BlendedSelector::default().select(&[]);
        assert!(selection.top.is_empty());
        assert!(selection.ultra.is_empty());
        assert_eq!(selection.candidates(), 0);
    }
}
