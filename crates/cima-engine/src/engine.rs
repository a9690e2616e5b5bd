//! The per-universe ranking pipeline.

use cima_returns::{AssetReturns, Horizon, MonthlySeries, ReturnCalculator, ReturnConfig};
use cima_select::{SelectionPolicy, Selector};
use cima_traits::{CimaError, PriceSeries, PriceSource, Result, Universe, fetch_universe};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

use crate::snapshot::{NoResult, RankingOutcome, RankingSnapshot};

/// Configuration for the ranking engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Horizons to compute (default: 12, 6, 3, 1 months)
    pub horizons: Vec<Horizon>,
    /// Minimum raw observations per asset (default: 100)
    pub min_observations: usize,
    /// Minimum month-end points per asset; `None` means longest horizon + 1
    pub min_monthly_points: Option<usize>,
    /// Minimum assets passing the data gate for a snapshot (default: 5)
    pub min_viable_assets: usize,
    /// Active selection policy (default: cascading)
    pub policy: SelectionPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizons: Horizon::DEFAULTS.to_vec(),
            min_observations: 100,
            min_monthly_points: None,
            min_viable_assets: 5,
            policy: SelectionPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Effective monthly floor.
    #[must_use]
    pub fn monthly_floor(&self) -> usize {
        self.min_monthly_points.unwrap_or_else(|| {
            self.horizons
                .iter()
                .map(|h| h.months() as usize + 1)
                .max()
                .unwrap_or(1)
        })
    }

    /// Check that the policy only reads horizons the engine computes.
    ///
    /// # Errors
    ///
    /// Returns [`CimaError::Config`] if the horizon set is empty or the policy
    /// references a horizon outside it.
    pub fn validate(&self) -> Result<()> {
        if self.horizons.is_empty() {
            return Err(CimaError::Config("horizon set is empty".to_string()));
        }
        if let Some(missing) = self
            .policy
            .horizons()
            .into_iter()
            .find(|h| !self.horizons.contains(h))
        {
            return Err(CimaError::Config(format!(
                "selection policy uses horizon {missing} which is not in the horizon set"
            )));
        }
        Ok(())
    }
}

/// Ranks universes by multi-horizon momentum.
///
/// Ranking is a pure, synchronous computation over in-memory series. The
/// engine holds no mutable state, so one instance can rank several
/// universes concurrently.
pub struct RankingEngine {
    config: EngineConfig,
    calculator: ReturnCalculator,
    selector: Box<dyn Selector>,
}

impl fmt::Debug for RankingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RankingEngine")
            .field("config", &self.config)
            .field("selector", &self.selector.name())
            .finish()
    }
}

impl RankingEngine {
    /// Create an engine from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CimaError::Config`] if the configuration is inconsistent.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let calculator = ReturnCalculator::new(ReturnConfig {
            horizons: config.horizons.clone(),
        });
        let selector = config.policy.selector();
        Ok(Self {
            config,
            calculator,
            selector,
        })
    }

    /// The engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Name of the active selection policy.
    #[must_use]
    pub fn policy_name(&self) -> &str {
        self.selector.name()
    }

    /// Fetch every member of `universe` from `source` and rank them.
    pub fn rank_universe(&self, universe: &Universe, source: &dyn PriceSource) -> RankingOutcome {
        let series = fetch_universe(source, &universe.members());
        debug!(
            universe = %universe.id,
            fetched = series.len(),
            "price series fetched"
        );
        self.rank(&universe.name, &series)
    }

    /// Rank already-fetched series for one universe.
    ///
    /// The order of `series` is the tie-break order.
    pub fn rank(&self, universe_name: &str, series: &[PriceSeries]) -> RankingOutcome {
        let started = Instant::now();

        let survivors = self.survivors(universe_name, series);
        if survivors.is_empty() {
            info!(universe = universe_name, "no asset passed the data gate");
            return RankingOutcome::NoResult(NoResult::NoSurvivors);
        }
        if survivors.len() < self.config.min_viable_assets {
            let reason = NoResult::TooFewSurvivors {
                survivors: survivors.len(),
                minimum: self.config.min_viable_assets,
            };
            info!(universe = universe_name, %reason, "universe not ranked");
            return RankingOutcome::NoResult(reason);
        }

        // Every survivor has at least one month-end point, so the minimum exists.
        let Some(as_of) = survivors.iter().filter_map(MonthlySeries::last_month).min() else {
            return RankingOutcome::NoResult(NoResult::NoSurvivors);
        };

        let returns: Vec<AssetReturns> = survivors
            .iter()
            .map(|monthly| self.calculator.returns(monthly, as_of))
            .collect();

        let selection = self.selector.select(&returns);
        for stage in &selection.stages {
            debug!(
                universe = universe_name,
                stage = %stage.label,
                eligible = stage.eligible,
                kept = stage.survivors.len(),
                "selection stage"
            );
        }
        if selection.candidates() == 0 {
            let reason = NoResult::EmptyCandidatePool;
            info!(universe = universe_name, %reason, "universe not ranked");
            return RankingOutcome::NoResult(reason);
        }

        let seconds = (started.elapsed().as_secs_f64() * 100.0).round() / 100.0;
        let snapshot = RankingSnapshot {
            universe_name: universe_name.to_string(),
            as_of_date: as_of,
            top10: selection.top,
            ultra_top5: selection.ultra,
            processed_asset_count: survivors.len(),
            processing_duration_seconds: Some(seconds),
        };

        info!(
            universe = universe_name,
            policy = self.selector.name(),
            as_of = %snapshot.as_of_date,
            processed = snapshot.processed_asset_count,
            top = snapshot.top10.len(),
            ultra = snapshot.ultra_top5.len(),
            "snapshot produced"
        );
        RankingOutcome::Ranked(snapshot)
    }

    /// Monthly series of the assets that pass the minimum-data gate, in input order.
    fn survivors(&self, universe_name: &str, series: &[PriceSeries]) -> Vec<MonthlySeries> {
        let monthly_floor = self.config.monthly_floor().max(1);
        series
            .iter()
            .filter_map(|s| {
                let monthly = self.calculator.monthly(s);
                if s.len() < self.config.min_observations || monthly.len() < monthly_floor {
                    debug!(
                        universe = universe_name,
                        asset = s.asset(),
                        observations = s.len(),
                        months = monthly.len(),
                        "insufficient history, asset dropped"
                    );
                    return None;
                }
                Some(monthly)
            })
            .collect()
    }
}
