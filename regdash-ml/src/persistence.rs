//! Writing and reading evaluation artifacts as JSON.
//!
//! Writes go to a `<file>.tmp` sibling first and are renamed into place, so a
//! reader never sees a half-written report.

use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

fn staging_path(path: &Path) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("artifact"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Atomically write `bytes` to `path`, creating parent directories.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let staging = staging_path(path);
    std::fs::write(&staging, bytes)?;
    if let Err(e) = std::fs::rename(&staging, path) {
        let _ = std::fs::remove_file(&staging);
        return Err(e.into());
    }
    Ok(())
}

/// Pretty-print `value` as JSON and write it atomically.
pub fn atomic_write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    atomic_write(path, json.as_bytes())?;
    tracing::debug!(path = %path.display(), bytes = json.len(), "wrote artifact");
    Ok(())
}

/// Read a JSON artifact. A missing file is `Ok(None)`.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}
