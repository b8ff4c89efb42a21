// src/output.rs
//! Snapshot serialization and gated file writes.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::freshness::FreshnessGate;
use crate::ingest::types::SourceKind;
use crate::snapshot::{Snapshot, SnapshotStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Written(PathBuf),
    /// The gate found nothing fresh; the stored file was left alone.
    SkippedStale(PathBuf),
    /// Example/error output would have replaced an existing file.
    KeptExisting(PathBuf),
}

/// Pretty-printed UTF-8 JSON; non-ASCII stays literal.
pub fn to_json_pretty(snapshot: &Snapshot) -> Result<String> {
    serde_json::to_string_pretty(snapshot).context("serializing snapshot")
}

/// Write `snapshot` to `path`, creating parent directories.
///
/// With a gate, snapshots that carry no scraped data (example, fallback or
/// error) never overwrite an existing file, and a scraped snapshot only has
/// to pass the freshness check when the stored file holds scraped data too.
/// Without a gate every snapshot is written.
pub fn persist_snapshot(snapshot: &Snapshot, path: &Path, gate: Option<&FreshnessGate>) -> Result<PersistOutcome> {
    if let Some(gate) = gate {
        let scraped = snapshot.status == SnapshotStatus::Success;
        if !scraped && path.exists() {
            tracing::info!(target: "output", path = %path.display(), status = snapshot.status.as_str(), "keeping existing file");
            return Ok(PersistOutcome::KeptExisting(path.to_path_buf()));
        }
        // real data always replaces example or error output
        let stored_scraped = stored_status(path).is_some_and(|s| !s.is_synthetic() && s != SnapshotStatus::Error);
        if scraped && stored_scraped && !gate.should_persist(snapshot) {
            return Ok(PersistOutcome::SkippedStale(path.to_path_buf()));
        }
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = to_json_pretty(snapshot)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;

    tracing::info!(
        target: "output",
        path = %path.display(),
        status = snapshot.status.as_str(),
        trends = snapshot.total_count,
        "snapshot written"
    );
    Ok(PersistOutcome::Written(path.to_path_buf()))
}

/// Status of the snapshot stored at `path`; `None` when there is no
/// readable snapshot there.
pub fn stored_status(path: &Path) -> Option<SnapshotStatus> {
    #[derive(serde::Deserialize)]
    struct Stored {
        status: SnapshotStatus,
    }

    let text = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<Stored>(&text) {
        Ok(s) => Some(s.status),
        Err(e) => {
            tracing::debug!(target: "output", path = %path.display(), error = %e, "stored file is not a snapshot");
            None
        }
    }
}

/// Where a run's snapshots go.
#[derive(Debug, Clone)]
pub struct OutputPlan {
    pub dir: PathBuf,
    pub gate: Option<FreshnessGate>,
    /// Print to stdout instead of writing files.
    pub stdout: bool,
}

impl OutputPlan {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            dir: cfg.output_dir.clone(),
            gate: cfg.gate(),
            stdout: false,
        }
    }

    pub fn path_for(&self, kind: SourceKind) -> PathBuf {
        self.dir.join(kind.default_file_name())
    }

    /// Returns `None` when the snapshot went to stdout.
    pub fn emit(&self, kind: SourceKind, snapshot: &Snapshot) -> Result<Option<PersistOutcome>> {
        if self.stdout {
            println!("{}", to_json_pretty(snapshot)?);
            return Ok(None);
        }
        // sources without per-trend ages can never pass the freshness gate
        let gate = self.gate.as_ref().filter(|_| kind.publishes_ages());
        persist_snapshot(snapshot, &self.path_for(kind), gate).map(Some)
    }
}
