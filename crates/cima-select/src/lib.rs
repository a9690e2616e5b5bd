//! Candidate selection strategies for cima rankings.
//!
//! A selector narrows a set of assets carrying multi-horizon returns down to
//! two nested tiers: the top tier (up to 10 assets) and the ultra tier (up to
//! 5 assets drawn from the top tier). Two policies are provided:
//! - [`CascadingSelector`]: successive single-horizon rankings, each stage
//!   keeping the best survivors of the previous one (the default)
//! - [`BlendedSelector`]: one weighted-score sort for the top tier, then a
//!   short-horizon weighted sort over it for the ultra tier
//!
//! # Examples
//!
//! ```rust,no_run
//! use cima_returns::{AssetReturns, Horizon};
//! use cima_select::{CascadingSelector, Selector};
//!
//! let selector = CascadingSelector::default();
//! let assets = vec![AssetReturns::new(
//!     "AAPL",
//!     Horizon::DEFAULTS.iter().map(|&h| (h, Some(0.1))).collect(),
//! )];
//!
//! let selection = selector.select(&assets);
//! assert_eq!(selection.top, vec!["AAPL".to_string()]);
//! ```

mod blended;
mod cascading;
mod policy;
mod selector;

// Re-export main types
pub use blended::{BlendedConfig, BlendedSelector, MissingHorizon, Weighting};
pub use cascading::{CascadeConfig, CascadeStage, CascadingSelector};
pub use policy::SelectionPolicy;
pub use selector::{Selection, Selector, StageOutcome};
