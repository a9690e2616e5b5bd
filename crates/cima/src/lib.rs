#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/cima/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! ## Quick Start
//!
//! ```ignore
//! use cima::prelude::*;
//!
//! let engine = RankingEngine::new(EngineConfig::default())?;
//! let universe = Universe::nasdaq100();
//!
//! if let RankingOutcome::Ranked(snapshot) = engine.rank_universe(&universe, &source) {
//!     let load = HistoryStore::update("data/history.json", HistoryConfig::default(), |store| {
//!         store.record(today, &snapshot.universe_name, TierPair::from(&snapshot));
//!     })?;
//!
//!     for change in ChangeAnalyzer::default().diff(&load.store, &snapshot.universe_name) {
//!         println!("{change}");
//!     }
//! }
//! ```

/// Version information for the cima crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Types
// ============================================================================

/// Price series, universes, price sources and errors.
pub mod traits {
    pub use cima_traits::*;
}

pub use cima_traits::{
    AssetId, CimaError, Date, MarketData, PriceSeries, PriceSource, Result, Universe,
};

// ============================================================================
// Returns
// ============================================================================

/// Month-end resampling and horizon returns.
///
/// A horizon return compounds the monthly growth factors ending at the
/// as-of month and is undefined unless every month in the window is present:
///
/// ```text
/// R_h = prod_{k=0}^{h-1} (P_{t-k} / P_{t-k-1}) - 1
/// ```
pub mod returns {
    pub use cima_returns::*;
}

pub use cima_returns::Horizon;

// ============================================================================
// Selection
// ============================================================================

/// Cascading and blended selection policies.
pub mod select {
    pub use cima_select::*;
}

pub use cima_select::{SelectionPolicy, Selector};

// ============================================================================
// Engine
// ============================================================================

/// Per-universe ranking pipeline.
pub mod engine {
    pub use cima_engine::*;
}

pub use cima_engine::{EngineConfig, RankingEngine, RankingOutcome, RankingSnapshot};

// ============================================================================
// History
// ============================================================================

/// Bounded history store and change analyzer.
pub mod history {
    pub use cima_history::*;
}

pub use cima_history::{ChangeAnalyzer, HistoryStore};

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use cima::prelude::*;
/// ```
pub mod prelude {
    pub use crate::engine::{EngineConfig, NoResult, RankingEngine, RankingOutcome, RankingSnapshot};
    pub use crate::history::{
        ChangeAnalyzer, ChangeReport, HistoryConfig, HistoryStore, PositionChange, Tier, TierPair,
    };
    pub use crate::returns::Horizon;
    pub use crate::select::{BlendedConfig, CascadeConfig, MissingHorizon, SelectionPolicy};
    pub use crate::traits::{
        AssetId, CimaError, Date, MemorySource, PriceSeries, PriceSource, Result, RetryConfig,
        RetryingSource, Universe,
    };
}
