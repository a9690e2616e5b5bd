//! Date-keyed history of published tiers.

use cima_engine::RankingSnapshot;
use cima_traits::{AssetId, Date};
use fs4::fs_std::FileExt;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{HistoryError, Result};

/// The two published tiers of one universe on one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierPair {
    /// Top tier in rank order
    pub top10: Vec<AssetId>,
    /// Ultra tier in rank order
    pub ultra_top5: Vec<AssetId>,
}

impl From<&RankingSnapshot> for TierPair {
    fn from(snapshot: &RankingSnapshot) -> Self {
        Self {
            top10: snapshot.top10.clone(),
            ultra_top5: snapshot.ultra_top5.clone(),
        }
    }
}

/// Every universe's tiers for one date, keyed by universe name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryEntry(BTreeMap<String, TierPair>);

impl HistoryEntry {
    /// Create an empty entry.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Set a universe's tiers, replacing any previous value.
    pub fn insert(&mut self, universe: impl Into<String>, tiers: TierPair) {
        self.0.insert(universe.into(), tiers);
    }

    /// Tiers recorded for `universe`.
    #[must_use]
    pub fn get(&self, universe: &str) -> Option<&TierPair> {
        self.0.get(universe)
    }

    /// Universe names present in this entry.
    pub fn universes(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of universes recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no universe is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, TierPair)> for HistoryEntry {
    fn from_iter<I: IntoIterator<Item = (S, TierPair)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Configuration for a [`HistoryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of dated entries kept (default: 30)
    pub retention_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            retention_limit: 30,
        }
    }
}

/// Result of [`HistoryStore::load`].
///
/// Loading never fails outright: an unreadable file yields an empty store
/// and the reason in `warning`. The file itself is left as it was.
#[derive(Debug)]
pub struct HistoryLoad {
    /// The loaded (or fresh) store
    pub store: HistoryStore,
    /// Why the persisted history was ignored, if it was
    pub warning: Option<HistoryError>,
}

/// Bounded, date-keyed log of past rankings.
///
/// Holds at most `retention_limit` dates; inserting past the limit evicts
/// the oldest. Serializes newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryStore {
    config: HistoryConfig,
    entries: BTreeMap<Date, HistoryEntry>,
}

impl Serialize for HistoryStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().rev())
    }
}

impl HistoryStore {
    /// Create an empty store.
    #[must_use]
    pub const fn new(config: HistoryConfig) -> Self {
        Self {
            config,
            entries: BTreeMap::new(),
        }
    }

    /// Load the store persisted at `path`.
    ///
    /// A missing file gives an empty store with no warning. A file that cannot
    /// be read or parsed gives an empty store and a warning. Entries beyond
    /// the retention limit are pruned.
    pub fn load(path: impl AsRef<Path>, config: HistoryConfig) -> HistoryLoad {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no history file, starting empty");
                return HistoryLoad {
                    store: Self::new(config),
                    warning: None,
                };
            }
            Err(source) => {
                return Self::recover(
                    config,
                    HistoryError::Io {
                        path: path.to_path_buf(),
                        source,
                    },
                );
            }
        };

        match serde_json::from_str::<BTreeMap<Date, HistoryEntry>>(&text) {
            Ok(entries) => {
                let mut store = Self { config, entries };
                store.prune();
                debug!(path = %path.display(), entries = store.len(), "history loaded");
                HistoryLoad {
                    store,
                    warning: None,
                }
            }
            Err(source) => Self::recover(
                config,
                HistoryError::Corrupt {
                    path: path.to_path_buf(),
                    source,
                },
            ),
        }
    }

    fn recover(config: HistoryConfig, error: HistoryError) -> HistoryLoad {
        warn!(error = %error, "ignoring unreadable history, starting empty");
        HistoryLoad {
            store: Self::new(config),
            warning: Some(error),
        }
    }

    /// Store configuration.
    #[must_use]
    pub const fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Number of dated entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for `date`.
    #[must_use]
    pub fn get(&self, date: Date) -> Option<&HistoryEntry> {
        self.entries.get(&date)
    }

    /// Insert or replace the entry for `date`, then prune.
    pub fn upsert(&mut self, date: Date, entry: HistoryEntry) {
        self.entries.insert(date, entry);
        self.prune();
    }

    /// Merge one universe's tiers into the entry for `date`, then prune.
    pub fn record(&mut self, date: Date, universe: impl Into<String>, tiers: TierPair) {
        self.entries.entry(date).or_default().insert(universe, tiers);
        self.prune();
    }

    /// Drop the oldest entries until at most `retention_limit` remain.
    ///
    /// Returns the number of entries removed.
    pub fn prune(&mut self) -> usize {
        let mut removed = 0;
        while self.entries.len() > self.config.retention_limit {
            self.entries.pop_first();
            removed += 1;
        }
        removed
    }

    /// Entries newest first.
    pub fn entries_desc(&self) -> impl Iterator<Item = (Date, &HistoryEntry)> {
        self.entries.iter().rev().map(|(date, entry)| (*date, entry))
    }

    /// A universe's recorded tiers, newest first.
    pub fn universe_history<'a>(
        &'a self,
        universe: &'a str,
    ) -> impl Iterator<Item = (Date, &'a TierPair)> + 'a {
        self.entries_desc()
            .filter_map(move |(date, entry)| entry.get(universe).map(|tiers| (date, tiers)))
    }

    /// Atomically write the store to `path`, newest entry first.
    ///
    /// The document is written to a temporary file in the same directory and
    /// renamed over `path`, all while holding an exclusive lock on
    /// `<path>.lock`. A failed save leaves the previous file intact.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be taken or any write step fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let _lock = LockGuard::acquire(path)?;
        self.write_locked(path)
    }

    /// Load, modify and save the history at `path` as one locked step.
    ///
    /// The exclusive lock is taken before reading and released after the
    /// rename, so concurrent writers apply their changes one after another
    /// instead of overwriting each other. An unreadable file is treated as in
    /// [`HistoryStore::load`] and reported in the returned `warning`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be taken or the save fails; the
    /// previous file is then left intact.
    pub fn update<F>(
        path: impl AsRef<Path>,
        config: HistoryConfig,
        apply: F,
    ) -> Result<HistoryLoad>
    where
        F: FnOnce(&mut Self),
    {
        let path = path.as_ref();
        let _lock = LockGuard::acquire(path)?;
        let mut load = Self::load(path, config);
        apply(&mut load.store);
        load.store.write_locked(path)?;
        Ok(load)
    }

    fn write_locked(&self, path: &Path) -> Result<()> {
        let dir = parent_dir(path);
        let mut tmp = NamedTempFile::new_in(dir).map_err(|source| io_error(dir, source))?;
        serde_json::to_writer_pretty(&mut tmp, self)?;
        tmp.write_all(b"\n")
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|source| io_error(tmp.path(), source))?;
        tmp.persist(path)?;

        debug!(path = %path.display(), entries = self.len(), "history saved");
        Ok(())
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn io_error(path: &Path, source: io::Error) -> HistoryError {
    HistoryError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// `history.json` -> `history.json.lock`
fn lock_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

/// Exclusive advisory lock held until dropped.
#[derive(Debug)]
struct LockGuard {
    file: File,
}

impl LockGuard {
    /// Lock `<history>.lock`, creating the directory if needed.
    fn acquire(history: &Path) -> Result<Self> {
        let dir = parent_dir(history);
        fs::create_dir_all(dir).map_err(|source| io_error(dir, source))?;

        let path = lock_path(history);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| HistoryError::Lock {
                path: path.clone(),
                source,
            })?;
        FileExt::lock_exclusive(&file).map_err(|source| HistoryError::Lock { path, source })?;
        Ok(Self { file })
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(error = %e, "failed to release history lock");
        }
    }
}
