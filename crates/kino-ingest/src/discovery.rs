//! Locating source exports and canonical snapshots on disk.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::error::{IngestError, Result};

/// Lists all CSV files in a directory, sorted by filename.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::Io {
        operation: "list",
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::Io {
            operation: "list",
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        if is_csv {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

/// Matches a file name against a pattern where `*` stands for any run of
/// characters.
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == name;
    }
    let first = parts[0];
    let last = parts[parts.len() - 1];
    if !name.starts_with(first) || name.len() < first.len() + last.len() {
        return false;
    }
    if !name.ends_with(last) {
        return false;
    }
    let mut rest = &name[first.len()..name.len() - last.len()];
    for part in &parts[1..parts.len() - 1] {
        match rest.find(part) {
            Some(pos) => rest = &rest[pos + part.len()..],
            None => return false,
        }
    }
    true
}

/// Files in `dir` whose name matches `pattern`, sorted by filename.
///
/// A missing directory yields no matches.
pub fn matching_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let files = list_csv_files(dir)?;
    Ok(files
        .into_iter()
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| wildcard_match(pattern, name))
        })
        .collect())
}

fn modified_time(path: &Path) -> Result<SystemTime> {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|e| IngestError::Io {
            operation: "stat",
            path: path.to_path_buf(),
            source: e,
        })
}

/// The most recently modified file in `dir` matching `pattern`.
pub fn latest_matching(dir: &Path, pattern: &str) -> Result<Option<PathBuf>> {
    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for path in matching_files(dir, pattern)? {
        let modified = modified_time(&path)?;
        let newer = latest
            .as_ref()
            .is_none_or(|(current, _)| modified >= *current);
        if newer {
            latest = Some((modified, path));
        }
    }
    Ok(latest.map(|(_, path)| path))
}

/// Resolve the export file for an optional secondary source.
///
/// An explicit path wins; when its file name contains `*`, the newest match
/// in its parent directory is used. Without an explicit path the newest
/// `<prefix>*.csv` in `dir` is used.
pub fn resolve_source_path(
    explicit: Option<&Path>,
    dir: &Path,
    prefix: &str,
) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        if name.contains('*') {
            let parent = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            return latest_matching(parent, name);
        }
        return Ok(path.is_file().then(|| path.to_path_buf()));
    }
    let pattern = format!("{prefix}*.csv");
    let found = latest_matching(dir, &pattern)?;
    if let Some(path) = &found {
        debug!(path = %path.display(), prefix, "auto-detected source export");
    }
    Ok(found)
}

/// Locate the canonical snapshot for a date.
///
/// Candidates are tried in order: `cinema_<date>.csv` then
/// `cinema_schedules_<date>*.csv` in `data_dir`, then the same two in
/// `source_dir`. The first existing file wins.
pub fn find_existing_snapshot(
    data_dir: &Path,
    source_dir: &Path,
    date: &str,
) -> Result<Option<PathBuf>> {
    for dir in [data_dir, source_dir] {
        let exact = dir.join(snapshot_file_name(date));
        if exact.is_file() {
            return Ok(Some(exact));
        }
        let pattern = format!("cinema_schedules_{date}*.csv");
        if let Some(first) = matching_files(dir, &pattern)?.into_iter().next() {
            return Ok(Some(first));
        }
    }
    Ok(None)
}

/// File name of the canonical snapshot for a date.
pub fn snapshot_file_name(date: &str) -> String {
    format!("cinema_{date}.csv")
}

/// First candidate path that exists as a file.
pub fn first_existing(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|path| path.is_file()).cloned()
}
