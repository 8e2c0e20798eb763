//! Trim a category down to its first N annotated items

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::info;

use super::{METADATA_FILE, read_metadata};
use crate::error::CatalogError;

/// Media extension removed when no kept entry references the file
const PRUNED_EXTENSION: &str = "png";

/// What a prune pass kept and removed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PruneReport {
    pub kept: Vec<String>,
    pub dropped_entries: Vec<String>,
    pub removed_files: Vec<PathBuf>,
}

/// Keep the first `keep` metadata entries of the category in `dir`.
///
/// Entries are taken in file order. The metadata file is rewritten with only
/// the kept entries and unreferenced `.png` files are deleted. With `dry_run`
/// nothing is written; the report shows what would change.
pub fn prune_category(dir: &Path, keep: usize, dry_run: bool) -> Result<PruneReport, CatalogError> {
    let metadata_path = dir.join(METADATA_FILE);
    let metadata = read_metadata(&metadata_path)?;

    let mut report = PruneReport::default();
    let mut kept = Map::new();
    for (index, (item_id, info)) in metadata.into_iter().enumerate() {
        if index < keep {
            report.kept.push(item_id.clone());
            kept.insert(item_id, info);
        } else {
            report.dropped_entries.push(item_id);
        }
    }

    let keep_set: HashSet<&str> = report.kept.iter().map(String::as_str).collect();
    let entries = std::fs::read_dir(dir).map_err(|source| CatalogError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let path = entry
            .map_err(|source| CatalogError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        let is_media = path.extension().and_then(|e| e.to_str()) == Some(PRUNED_EXTENSION);
        let referenced = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| keep_set.contains(n));
        if is_media && !referenced {
            report.removed_files.push(path);
        }
    }
    report.removed_files.sort();

    if dry_run {
        return Ok(report);
    }

    let content = serde_json::to_string_pretty(&Value::Object(kept)).map_err(|e| {
        CatalogError::InvalidMetadata {
            path: metadata_path.clone(),
            message: e.to_string(),
        }
    })?;
    std::fs::write(&metadata_path, content).map_err(|source| CatalogError::Io {
        path: metadata_path.clone(),
        source,
    })?;

    for path in &report.removed_files {
        std::fs::remove_file(path).map_err(|source| CatalogError::Io {
            path: path.clone(),
            source,
        })?;
    }

    info!(
        "Pruned {}: kept {}, dropped {} entries, removed {} files",
        dir.display(),
        report.kept.len(),
        report.dropped_entries.len(),
        report.removed_files.len()
    );
    Ok(report)
}
