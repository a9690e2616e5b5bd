//! Run report written after every `cima rank`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use cima_engine::RankingSnapshot;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Every universe's snapshot from one run, keyed by universe id.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RunReport {
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) environment: String,
    /// `null` for universes that could not be ranked
    pub(crate) rankings: BTreeMap<String, Option<RankingSnapshot>>,
}

impl RunReport {
    pub(crate) fn new(environment: String) -> Self {
        Self {
            generated_at: Utc::now(),
            environment,
            rankings: BTreeMap::new(),
        }
    }

    /// Write the report as pretty JSON, replacing `path` atomically.
    pub(crate) fn write(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, self)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)
            .with_context(|| format!("replacing {}", path.display()))?;
        Ok(())
    }

    /// Append `key=value` step outputs for a CI runner.
    ///
    /// Writes `execution_time`, then `<id>_success` for every universe and
    /// `<id>_top5` (comma-joined ultra tier) for each ranked one.
    pub(crate) fn append_step_outputs(&self, path: &Path, elapsed_seconds: f64) -> Result<()> {
        let mut out = format!("execution_time={elapsed_seconds:.1}\n");
        for (id, snapshot) in &self.rankings {
            match snapshot {
                Some(snapshot) => {
                    out.push_str(&format!("{id}_success=true\n"));
                    out.push_str(&format!("{id}_top5={}\n", snapshot.ultra_top5.join(",")));
                }
                None => out.push_str(&format!("{id}_success=false\n")),
            }
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(out.as_bytes()))
            .with_context(|| format!("appending step outputs to {}", path.display()))
    }
}
