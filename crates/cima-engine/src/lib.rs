//! Ranking engine for cima.
//!
//! This crate ties the return calculator and the active selection policy
//! together for one universe at a time:
//! - drops assets whose history is too thin to rank
//! - aligns every survivor on the latest month they all share
//! - runs the selector and publishes a [`RankingSnapshot`]
//!
//! Universes that cannot be ranked yield [`RankingOutcome::NoResult`] rather
//! than an error, so one bad universe never stops the others.
//!
//! # Example
//!
//! ```rust,ignore
//! use cima_engine::{EngineConfig, RankingEngine, RankingOutcome};
//!
//! let engine = RankingEngine::new(EngineConfig::default())?;
//! match engine.rank("NASDAQ-100", &series) {
//!     RankingOutcome::Ranked(snapshot) => println!("{:?}", snapshot.top10),
//!     RankingOutcome::NoResult(reason) => println!("skipped: {reason}"),
//! }
//! ```

pub mod engine;
pub mod snapshot;

// Re-export main types
pub use engine::{EngineConfig, RankingEngine};
pub use snapshot::{NoResult, RankingOutcome, RankingSnapshot};
