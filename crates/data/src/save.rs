use crate::load::load_json;
use anyhow::{bail, Context};
use gemfire_core::{SaveSnapshot, SAVE_SCHEMA_VERSION};
use std::fs;
use std::path::{Path, PathBuf};

/// `GEMFIRE_SAVE` if set, otherwise a file in the home directory.
pub fn default_save_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("GEMFIRE_SAVE") {
        return Some(PathBuf::from(path));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".gemfire_save.json"))
}

pub fn save_snapshot(path: &Path, snapshot: &SaveSnapshot) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(snapshot).context("serialize snapshot")?;
    fs::write(path, body).with_context(|| format!("write {}", path.display()))
}

pub fn load_snapshot(path: &Path) -> anyhow::Result<SaveSnapshot> {
    let snapshot: SaveSnapshot = load_json(path)?;
    if snapshot.version != SAVE_SCHEMA_VERSION {
        bail!(
            "unsupported save version {} (expected {})",
            snapshot.version,
            SAVE_SCHEMA_VERSION
        );
    }
    Ok(snapshot)
}
