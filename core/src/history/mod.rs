pub mod storage;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::outcome::RunSummary;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub timestamp: DateTime<Local>,
    pub manifest: String,
    pub duration: f64,
    pub skip: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    #[serde(default)]
    pub resume_from: Option<usize>,
}

impl RunRecord {
    pub fn new(manifest: String, skip: usize, elapsed: Duration, summary: &RunSummary) -> Self {
        Self {
            timestamp: Local::now(),
            manifest,
            duration: elapsed.as_secs_f64(),
            skip,
            succeeded: summary.succeeded,
            failed: summary.failed,
            skipped: summary.skipped,
            resume_from: summary.resume_from,
        }
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

pub struct RunHistory {
    entries: Vec<RunRecord>,
    storage_path: PathBuf,
    max_runs: usize,
}

impl RunHistory {
    pub fn new(storage_path: PathBuf, max_runs: usize) -> anyhow::Result<Self> {
        let entries = storage::load_history(&storage_path)?;
        Ok(Self {
            entries,
            storage_path,
            max_runs,
        })
    }

    pub fn add_entry(&mut self, entry: RunRecord) -> anyhow::Result<()> {
        self.entries.push(entry);

        if self.entries.len() > self.max_runs {
            let excess = self.entries.len() - self.max_runs;
            self.entries.drain(..excess);
        }

        storage::save_history(&self.storage_path, &self.entries)
    }

    pub fn entries(&self) -> &[RunRecord] {
        &self.entries
    }

    /// Most recent run of `manifest` that left failures behind.
    pub fn last_failure_for(&self, manifest: &str) -> Option<&RunRecord> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.manifest == manifest)
            .filter(|entry| !entry.success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(manifest: &str, failed: usize) -> RunRecord {
        let summary = RunSummary {
            succeeded: 2,
            failed,
            skipped: 0,
            resume_from: if failed > 0 { Some(1) } else { None },
        };
        RunRecord::new(manifest.to_string(), 0, Duration::from_millis(1200), &summary)
    }

    #[test]
    fn test_add_and_reload() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("history.json");

        let mut history = RunHistory::new(path.clone(), 10).unwrap();
        assert!(history.entries().is_empty());
        history.add_entry(record("build.loaf", 0)).unwrap();

        let reloaded = RunHistory::new(path, 10).unwrap();
        assert_eq!(reloaded.entries().len(), 1);
        let last = reloaded.entries().last().unwrap();
        assert_eq!(last.manifest, "build.loaf");
        assert!((last.duration - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_trims_to_max_runs() {
        let tmp = TempDir::new().unwrap();
        let mut history = RunHistory::new(tmp.path().join("h.json"), 2).unwrap();

        for name in ["one", "two", "three"] {
            history.add_entry(record(name, 0)).unwrap();
        }

        let names: Vec<&str> = history.entries().iter().map(|e| e.manifest.as_str()).collect();
        assert_eq!(names, vec!["two", "three"]);
    }

    #[test]
    fn test_last_failure_for() {
        let tmp = TempDir::new().unwrap();
        let mut history = RunHistory::new(tmp.path().join("h.json"), 10).unwrap();

        history.add_entry(record("a.loaf", 1)).unwrap();
        history.add_entry(record("b.loaf", 0)).unwrap();
        assert_eq!(history.last_failure_for("a.loaf").unwrap().resume_from, Some(1));
        assert!(history.last_failure_for("b.loaf").is_none());

        history.add_entry(record("a.loaf", 0)).unwrap();
        assert!(history.last_failure_for("a.loaf").is_none());
    }
}
