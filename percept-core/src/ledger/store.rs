//! Whole-file persistence for the exposure ledger

use std::path::{Path, PathBuf};

use tokio::fs;

use super::ExposureLedger;
use crate::error::LedgerError;

impl ExposureLedger {
    /// Load the ledger from `path`, or an empty ledger if the file is absent
    pub async fn load(path: &Path) -> Result<Self, LedgerError> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|source| LedgerError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        serde_json::from_str(&content).map_err(|source| LedgerError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Replace the file at `path` with the full ledger.
    ///
    /// Writes a sibling temporary file first and renames it into place, so a
    /// reader never sees a half-written ledger.
    pub async fn save(&self, path: &Path) -> Result<(), LedgerError> {
        let content = serde_json::to_string_pretty(self).map_err(LedgerError::Serialize)?;
        let write_err = |source| LedgerError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let tmp = temp_path(path);
        fs::write(&tmp, content).await.map_err(write_err)?;
        fs::rename(&tmp, path).await.map_err(write_err)?;
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let temp_dir = tempdir().unwrap();
        let ledger = ExposureLedger::load(&temp_dir.path().join("tracking.json"))
            .await
            .unwrap();
        assert_eq!(ledger, ExposureLedger::new());
    }

    #[tokio::test]
    async fn test_save_then_load_persists_records() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("tracking.json");

        let mut ledger = ExposureLedger::new();
        ledger.record("p1", "abstract", "a1.png");
        ledger.save(&path).await.unwrap();

        let loaded = ExposureLedger::load(&path).await.unwrap();
        assert_eq!(loaded.shown_count("abstract", "a1.png"), 1);
        assert!(!temp_path(&path).exists(), "temporary file should be renamed away");
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_parse_error() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("tracking.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = ExposureLedger::load(&path).await;
        assert!(matches!(result, Err(LedgerError::Parse { .. })));
    }

    #[test]
    fn test_temp_path_is_sibling() {
        assert_eq!(
            temp_path(Path::new("/data/tracking.json")),
            PathBuf::from("/data/tracking.json.tmp")
        );
    }
}
