use super::RunRecord;
use anyhow::Context;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

static SAVE_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn load_history(path: &Path) -> anyhow::Result<Vec<RunRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file: {}", path.display()))?;

    let entries: Vec<RunRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse history file: {}", path.display()))?;

    Ok(entries)
}

pub fn save_history(path: &Path, entries: &[RunRecord]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create history directory: {}", parent.display())
        })?;
    }

    let content =
        serde_json::to_string_pretty(entries).context("Failed to serialize history entries")?;

    // Written beside the target and renamed over it, so concurrent runs and
    // readers only ever see a complete file.
    let tmp_path = path.with_extension(format!(
        "json.{}.{}.tmp",
        std::process::id(),
        SAVE_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    fs::write(&tmp_path, content)
        .with_context(|| format!("Failed to write history file: {}", tmp_path.display()))?;

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err)
            .with_context(|| format!("Failed to replace history file: {}", path.display()));
    }

    Ok(())
}
