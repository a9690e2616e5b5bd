//! Run settings for the cima CLI.
//!
//! Settings come from an optional TOML file (`cima.toml` in the working
//! directory unless `--config` names another) overlaid with `CIMA__*`
//! environment variables, e.g. `CIMA__ENGINE__MIN_VIABLE_ASSETS=3` or
//! `CIMA__HISTORY__RETENTION_LIMIT=60`. Anything unset keeps its default.

use anyhow::{Context, Result, bail};
use cima_engine::EngineConfig;
use cima_history::HistoryConfig;
use cima_traits::{RetryConfig, Universe};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where ranking history is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct HistorySettings {
    /// History file
    pub(crate) path: PathBuf,
    /// Dated entries kept
    pub(crate) retention_limit: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/history.json"),
            retention_limit: HistoryConfig::default().retention_limit,
        }
    }
}

impl HistorySettings {
    pub(crate) const fn config(&self) -> HistoryConfig {
        HistoryConfig {
            retention_limit: self.retention_limit,
        }
    }
}

/// Everything a run needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    /// Universes ranked on every run, in order
    pub(crate) universes: Vec<Universe>,
    /// Gate, horizons and selection policy
    pub(crate) engine: EngineConfig,
    /// History file and retention
    pub(crate) history: HistorySettings,
    /// Retry policy for the price source
    pub(crate) retry: RetryConfig,
    /// Price file or directory used when `--prices` is not given
    pub(crate) prices: Option<PathBuf>,
    /// Run report destination
    pub(crate) output: PathBuf,
    /// Environment label for the run report; detected when unset
    pub(crate) environment: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            universes: vec![Universe::nasdaq100(), Universe::sp500()],
            engine: EngineConfig::default(),
            history: HistorySettings::default(),
            retry: RetryConfig::default(),
            prices: None,
            output: PathBuf::from("data/rankings.json"),
            environment: None,
        }
    }
}

impl Settings {
    /// Load settings from `path` (required) or `cima.toml` (optional), then the environment.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("cima").required(false),
        };

        let settings: Self = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("CIMA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to read settings")?
            .try_deserialize()
            .context("invalid settings")?;

        settings.engine.validate()?;
        Ok(settings)
    }

    /// Label written to the run report: the configured one, or `ci`/`local`.
    pub(crate) fn environment(&self) -> String {
        self.environment
            .clone()
            .unwrap_or_else(|| detect_environment().to_string())
    }

    /// The configured universes, or only those whose id is in `ids`.
    pub(crate) fn selected_universes(&self, ids: &[String]) -> Result<Vec<Universe>> {
        if ids.is_empty() {
            return Ok(self.universes.clone());
        }
        ids.iter()
            .map(|id| {
                self.universe(id)
                    .cloned()
                    .with_context(|| format!("unknown universe `{id}`"))
            })
            .collect()
    }

    /// Universe matching `key` by id or display name.
    pub(crate) fn universe(&self, key: &str) -> Option<&Universe> {
        self.universes
            .iter()
            .find(|u| u.id.eq_ignore_ascii_case(key) || u.name == key)
    }

    /// Price location from the command line or the settings file.
    pub(crate) fn prices(&self, overridden: Option<PathBuf>) -> Result<PathBuf> {
        match overridden.or_else(|| self.prices.clone()) {
            Some(path) => Ok(path),
            None => bail!("no price data: pass --prices or set `prices` in the settings file"),
        }
    }
}

fn detect_environment() -> &'static str {
    let flagged = |name: &str| {
        std::env::var(name).is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
    };
    if flagged("GITHUB_ACTIONS") || flagged("CI") {
        "ci"
    } else {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cima_select::SelectionPolicy;
    use std::fs;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        let ids: Vec<&str> = settings.universes.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["nasdaq100", "sp500"]);
        assert_eq!(settings.engine, EngineConfig::default());
        assert_eq!(settings.history.config().retention_limit, 30);
        assert_eq!(settings.retry.max_attempts, 3);
    }

    #[test]
    fn test_load_toml_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cima.toml");
        fs::write(
            &path,
            r#"
output = "out/report.json"

[engine]
min_viable_assets = 3

[engine.policy]
mode = "blended"
missing = "renormalize"

[history]
retention_limit = 10

[[universes]]
id = "tech"
name = "Tech"
symbols = ["AAPL", "MSFT", "NVDA"]
max_symbols = 2
"#,
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.engine.min_viable_assets, 3);
        assert_eq!(settings.engine.min_observations, 100);
        assert_eq!(settings.history.retention_limit, 10);
        assert_eq!(settings.history.path, PathBuf::from("data/history.json"));
        assert_eq!(settings.output, PathBuf::from("out/report.json"));
        assert_eq!(settings.universes.len(), 1);
        assert_eq!(settings.universes[0].members(), vec!["AAPL", "MSFT"]);
        assert!(matches!(settings.engine.policy, SelectionPolicy::Blended(_)));
    }

    #[test]
    fn test_missing_required_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_universe_selection() {
        let settings = Settings::default();
        assert_eq!(settings.selected_universes(&[]).unwrap().len(), 2);

        let picked = settings.selected_universes(&["sp500".to_string()]).unwrap();
        assert_eq!(picked[0].name, "S&P 500");

        assert!(settings.selected_universes(&["ftse".to_string()]).is_err());
        assert_eq!(settings.universe("NASDAQ-100").unwrap().id, "nasdaq100");
    }

    #[test]
    fn test_configured_environment_wins() {
        let settings = Settings {
            environment: Some("staging".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.environment(), "staging");
    }

    #[test]
    fn test_prices_override() {
        let settings = Settings {
            prices: Some(PathBuf::from("prices.csv")),
            ..Default::default()
        };
        assert_eq!(settings.prices(None).unwrap(), PathBuf::from("prices.csv"));
        assert_eq!(
            settings.prices(Some(PathBuf::from("other.json"))).unwrap(),
            PathBuf::from("other.json")
        );
        assert!(Settings::default().prices(None).is_err());
    }
}
