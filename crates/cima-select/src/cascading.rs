//! Cascading-elimination selection.

use cima_returns::{AssetReturns, Horizon};
use serde::{Deserialize, Serialize};

use crate::selector::{Selection, Selector, StageOutcome, ids, rank_descending};

/// One cascade stage: rank by `horizon`, keep the best `keep`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeStage {
    /// Horizon whose return ranks this stage
    pub horizon: Horizon,
    /// Maximum survivors
    pub keep: usize,
}

impl CascadeStage {
    /// Create a stage.
    #[must_use]
    pub const fn new(horizon: Horizon, keep: usize) -> Self {
        Self { horizon, keep }
    }
}

/// Configuration for cascading elimination.
///
/// The `short` stage publishes the top tier and the `micro` stage the ultra tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// Stage A (default: 12 months, keep 50)
    pub long: CascadeStage,
    /// Stage B (default: 6 months, keep 30)
    pub medium: CascadeStage,
    /// Stage C (default: 3 months, keep 10)
    pub short: CascadeStage,
    /// Stage D (default: 1 month, keep 5)
    pub micro: CascadeStage,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            long: CascadeStage::new(Horizon::LONG, 50),
            medium: CascadeStage::new(Horizon::MEDIUM, 30),
            short: CascadeStage::new(Horizon::SHORT, 10),
            micro: CascadeStage::new(Horizon::MICRO, 5),
        }
    }
}

impl CascadeConfig {
    /// Stages in the order they run.
    #[must_use]
    pub const fn stages(&self) -> [CascadeStage; 4] {
        [self.long, self.medium, self.short, self.micro]
    }
}

/// Narrows assets through successive horizon-ranked stages.
///
/// Each stage only sees the previous stage's survivors. Within a stage,
/// assets without a defined return for the stage horizon are left out
/// (they are not ranked last), the rest are sorted descending with ties in
/// input order, and the best `keep` survive. Once a stage's pool is empty
/// every later stage is empty too.
///
/// # Examples
///
/// ```rust,no_run
/// use cima_select::{CascadeConfig, CascadingSelector, Selector};
///
/// let selector = CascadingSelector::new(CascadeConfig::default());
/// let selection = selector.select(&[]);
/// assert!(selection.top.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CascadingSelector {
    config: CascadeConfig,
}

impl CascadingSelector {
    /// Create a new cascading selector with the given configuration.
    #[must_use]
    pub const fn new(config: CascadeConfig) -> Self {
        Self { config }
    }

    /// The stage configuration.
    #[must_use]
    pub const fn config(&self) -> &CascadeConfig {
        &self.config
    }

    fn run_stage<'a>(
        pool: &[&'a AssetReturns],
        stage: CascadeStage,
    ) -> (StageOutcome, Vec<&'a AssetReturns>) {
        let scored: Vec<(&AssetReturns, f64)> = pool
            .iter()
            .filter_map(|asset| asset.get(stage.horizon).map(|r| (*asset, r)))
            .collect();
        let eligible = scored.len();
        let survivors = rank_descending(scored, stage.keep);

        let outcome = StageOutcome {
            label: stage.horizon.to_string(),
            eligible,
            survivors: ids(&survivors),
        };
        (outcome, survivors)
    }
}

impl Selector for CascadingSelector {
    fn select(&self, assets: &[AssetReturns]) -> Selection {
        let mut pool: Vec<&AssetReturns> = assets.iter().collect();
        let mut stages = Vec::with_capacity(4);

        for stage in self.config.stages() {
            let (outcome, survivors) = Self::run_stage(&pool, stage);
            stages.push(outcome);
            pool = survivors;
        }

        let top = stages[2].survivors.clone();
        let ultra = stages[3].survivors.clone();
        Selection { stages, top, ultra }
    }

    fn name(&self) -> &str {
        "cascading"
    }
}
