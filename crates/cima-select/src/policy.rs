//! Declarative choice of the active selection policy.

use cima_returns::Horizon;
use serde::{Deserialize, Serialize};

use crate::{BlendedConfig, BlendedSelector, CascadeConfig, CascadingSelector, Selector};

/// Which selector a ranking engine runs, with its configuration.
///
/// Serialized with a `mode` tag, e.g. `{ "mode": "blended", "missing": "renormalize", .. }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Successive single-horizon rankings
    Cascading(CascadeConfig),
    /// One weighted-score sort per tier
    Blended(BlendedConfig),
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::Cascading(CascadeConfig::default())
    }
}

impl SelectionPolicy {
    /// Build the selector this policy describes.
    #[must_use]
    pub fn selector(&self) -> Box<dyn Selector> {
        match self {
            Self::Cascading(config) => Box::new(CascadingSelector::new(config.clone())),
            Self::Blended(config) => Box::new(BlendedSelector::new(config.clone())),
        }
    }

    /// Every horizon the policy reads, in first-use order without repeats.
    #[must_use]
    pub fn horizons(&self) -> Vec<Horizon> {
        let used: Vec<Horizon> = match self {
            Self::Cascading(config) => config.stages().iter().map(|s| s.horizon).collect(),
            Self::Blended(config) => config
                .top_weights
                .iter()
                .chain(&config.ultra_weights)
                .map(|w| w.horizon)
                .collect(),
        };
        let mut horizons = Vec::with_capacity(used.len());
        for horizon in used {
            if !horizons.contains(&horizon) {
                horizons.push(horizon);
            }
        }
        horizons
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_cascading() {
        let policy = SelectionPolicy::default();
        assert_eq!(policy.selector().name(), "cascading");
    }

    #[test]
    fn test_blended_policy() {
        let policy = SelectionPolicy::Blended(BlendedConfig::default());
        assert_eq!(policy.selector().name(), "blended");
        assert_eq!(
            policy.horizons(),
            vec![Horizon::LONG, Horizon::MEDIUM, Horizon::SHORT, Horizon::MICRO]
        );
    }

    #[test]
    fn test_selector_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Box<dyn Selector>>();
    }
}
