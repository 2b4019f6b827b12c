//! JSON run artifacts implementing ReportPort.
//!
//! Each run is written to `<dir>/<strategy>_<YYYYmmdd_HHMMSS>.json` as a
//! pretty-printed `RunRecord`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::domain::error::Result;
use crate::ports::report_port::{ReportPort, RunRecord};

pub struct JsonReportAdapter {
    dir: PathBuf,
}

impl JsonReportAdapter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// First free file name for `record`; same-second runs get a numeric suffix.
    fn artifact_path(&self, record: &RunRecord) -> PathBuf {
        let stem = format!(
            "{}_{}",
            record.strategy,
            record.timestamp.format("%Y%m%d_%H%M%S")
        );
        let mut path = self.dir.join(format!("{stem}.json"));
        let mut n = 1;
        while path.exists() {
            path = self.dir.join(format!("{stem}_{n}.json"));
            n += 1;
        }
        path
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, record: &RunRecord) -> Result<Option<PathBuf>> {
        fs::create_dir_all(&self.dir)?;
        let path = self.artifact_path(record);
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json)?;
        info!(path = %path.display(), "results saved");
        Ok(Some(path))
    }
}

/// Saved runs in `dir`, newest first. A missing directory holds no runs.
///
/// `strategy` keeps only runs of that strategy (case-insensitive). Files
/// that do not parse as a run record are skipped with a warning.
pub fn load_results(dir: &Path, strategy: Option<&str>) -> Result<Vec<RunRecord>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let wanted = strategy.map(str::to_lowercase);
    let mut records = Vec::new();
    for path in paths {
        let content = fs::read_to_string(&path)?;
        let record: RunRecord = match serde_json::from_str(&content) {
            Ok(record) => record,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable result");
                continue;
            }
        };
        if wanted
            .as_deref()
            .is_some_and(|w| record.strategy.to_lowercase() != w)
        {
            continue;
        }
        records.push(record);
    }

    // Stable: same-timestamp runs keep reverse file-name order.
    records.reverse();
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(records)
}
