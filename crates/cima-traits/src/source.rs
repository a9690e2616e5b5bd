//! Price-source interface.
//!
//! Acquisition of price history is owned by a collaborator outside the
//! ranking core. The engine only sees the [`PriceSource`] trait; retry and
//! backoff policy lives in [`RetryingSource`], never in the engine.

use crate::{AssetId, CimaError, PriceSeries, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// A provider of per-asset price history.
///
/// Implementations should be thread-safe (`Send + Sync`) so independent
/// universes can be fetched from separate workers.
pub trait PriceSource: Send + Sync {
    /// Returns the name of this source, used in logs.
    fn name(&self) -> &str;

    /// Fetches the full price series for one asset.
    ///
    /// # Errors
    ///
    /// Returns [`CimaError::Unavailable`] when the source has no data for the
    /// asset, or [`CimaError::DataFetch`] for failures worth retrying.
    fn fetch(&self, asset: &str) -> Result<PriceSeries>;
}

/// A price source backed by already-materialized series.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    series: BTreeMap<AssetId, PriceSeries>,
}

impl MemorySource {
    /// Create a source from a set of series, keyed by their asset ids.
    pub fn new(series: impl IntoIterator<Item = PriceSeries>) -> Self {
        Self {
            series: series
                .into_iter()
                .map(|s| (s.asset().to_string(), s))
                .collect(),
        }
    }

    /// Number of assets held.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Whether the source holds no series.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl PriceSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch(&self, asset: &str) -> Result<PriceSeries> {
        self.series
            .get(asset)
            .cloned()
            .ok_or_else(|| CimaError::Unavailable(asset.to_string()))
    }
}

/// Bounded-retry policy for a price source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per asset, including the first (default: 3)
    pub max_attempts: usize,

    /// Base backoff in milliseconds; attempt `n` waits `n * backoff_ms` (default: 3000)
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 3_000,
        }
    }
}

/// Wraps a source with bounded retries on transient failures.
///
/// Permanent failures ([`CimaError::Unavailable`], invalid data) are returned
/// immediately.
#[derive(Debug, Clone)]
pub struct RetryingSource<S> {
    inner: S,
    config: RetryConfig,
}

impl<S: PriceSource> RetryingSource<S> {
    /// Wrap `inner` with the given retry policy.
    pub const fn new(inner: S, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// The wrapped source.
    pub const fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: PriceSource> PriceSource for RetryingSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch(&self, asset: &str) -> Result<PriceSeries> {
        let attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.inner.fetch(asset) {
                Err(e) if e.is_transient() && attempt < attempts => {
                    let wait = Duration::from_millis(self.config.backoff_ms * attempt as u64);
                    warn!(
                        source = self.inner.name(),
                        asset,
                        attempt,
                        max_attempts = attempts,
                        error = %e,
                        "fetch failed, retrying in {wait:?}"
                    );
                    thread::sleep(wait);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

/// Fetches every member of a universe, skipping assets the source cannot supply.
///
/// Missing assets are simply absent from the result, preserving member order
/// for the rest.
pub fn fetch_universe(source: &dyn PriceSource, members: &[AssetId]) -> Vec<PriceSeries> {
    let mut fetched = Vec::with_capacity(members.len());
    for asset in members {
        match source.fetch(asset) {
            Ok(series) => fetched.push(series),
            Err(CimaError::Unavailable(_)) => {
                debug!(source = source.name(), asset = %asset, "no price series");
            }
            Err(e) => {
                warn!(source = source.name(), asset = %asset, error = %e, "dropping asset");
            }
        }
    }
    fetched
}
