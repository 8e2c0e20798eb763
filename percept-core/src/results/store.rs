//! File-backed results store

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tracing::info;

use super::ResultSchema;
use super::csv::{encode_record, parse_records};
use crate::error::ResultsError;
use crate::session::QuizSession;

/// Aggregate view of everyone who completed the quiz
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticipationSummary {
    pub participants: usize,
    /// Mean of the parseable ages, if any
    pub average_age: Option<f64>,
    pub genders: BTreeMap<String, usize>,
}

/// Append-only CSV of completed sessions.
///
/// Appends are serialized through an in-process mutex and each row is
/// written with a single append-mode write.
pub struct ResultsStore {
    path: PathBuf,
    schema: ResultSchema,
    write_lock: Mutex<()>,
}

impl ResultsStore {
    pub fn new(path: impl Into<PathBuf>, schema: ResultSchema) -> Self {
        Self {
            path: path.into(),
            schema,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> &ResultSchema {
        &self.schema
    }

    /// Append the row for a finished session
    pub async fn append(&self, session: &QuizSession) -> Result<(), ResultsError> {
        self.append_row(&self.schema.row_for(session)).await?;
        info!(
            "Saved results for {} to {}",
            session.profile().participant_id(),
            self.path.display()
        );
        Ok(())
    }

    /// Append one full-width row, writing the header first if the file is new
    pub async fn append_row(&self, row: &[String]) -> Result<(), ResultsError> {
        if row.len() != self.schema.len() {
            return Err(ResultsError::SchemaMismatch {
                path: self.path.clone(),
                expected: self.schema.len(),
                found: row.len(),
            });
        }

        let _guard = self.write_lock.lock().await;

        let mut payload = String::new();
        match self.read_header().await? {
            Some(header) => self.check_header(&header)?,
            None => payload.push_str(&encode_record(self.schema.columns())),
        }
        payload.push_str(&encode_record(row));

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await.map_err(|e| self.io_error(e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        file.write_all(payload.as_bytes())
            .await
            .map_err(|e| self.io_error(e))?;
        file.flush().await.map_err(|e| self.io_error(e))?;
        Ok(())
    }

    /// Count participants, average age and gender split
    pub async fn summary(&self) -> Result<ParticipationSummary, ResultsError> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(ParticipationSummary::default());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        let mut records = parse_records(&content).into_iter();
        let Some(header) = records.next() else {
            return Ok(ParticipationSummary::default());
        };

        let column = |name: &str| header.iter().position(|c| c == name);
        let age_col = column("age");
        let gender_col = column("gender");

        let mut summary = ParticipationSummary::default();
        let mut ages = Vec::new();
        for record in records {
            summary.participants += 1;
            if let Some(age) = age_col
                .and_then(|i| record.get(i))
                .and_then(|a| a.trim().parse::<f64>().ok())
            {
                ages.push(age);
            }
            if let Some(gender) = gender_col.and_then(|i| record.get(i))
                && !gender.is_empty()
            {
                *summary.genders.entry(gender.clone()).or_default() += 1;
            }
        }
        if !ages.is_empty() {
            summary.average_age = Some(ages.iter().sum::<f64>() / ages.len() as f64);
        }
        Ok(summary)
    }

    /// First record of the file, or None if the file is absent or empty
    async fn read_header(&self) -> Result<Option<Vec<String>>, ResultsError> {
        let file = match fs::File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        // a quoted column name may span lines; read until the quotes balance
        let mut reader = BufReader::new(file);
        let mut header = String::new();
        loop {
            let read = reader
                .read_line(&mut header)
                .await
                .map_err(|e| self.io_error(e))?;
            if read == 0 || header.matches('"').count() % 2 == 0 {
                break;
            }
        }
        Ok(parse_records(&header).into_iter().next())
    }

    fn check_header(&self, header: &[String]) -> Result<(), ResultsError> {
        if header.len() != self.schema.len() {
            return Err(ResultsError::SchemaMismatch {
                path: self.path.clone(),
                expected: self.schema.len(),
                found: header.len(),
            });
        }
        if header != self.schema.columns() {
            return Err(ResultsError::HeaderMismatch {
                path: self.path.clone(),
            });
        }
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> ResultsError {
        ResultsError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::item;
    use crate::catalog::{Catalog, Category};
    use crate::results::tests::{catalog, finished_session};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> ResultsStore {
        ResultsStore::new(
            dir.join("detailed_results.csv"),
            ResultSchema::from_catalog(&catalog()),
        )
    }

    #[tokio::test]
    async fn test_header_written_once() {
        let temp_dir = tempdir().unwrap();
        let store = store_in(temp_dir.path());
        let catalog = catalog();

        store
            .append(&finished_session(&catalog, &[("abstract", "a1.jpeg")]))
            .await
            .unwrap();
        store
            .append(&finished_session(&catalog, &[("slippage", "s1.png")]))
            .await
            .unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        let records = parse_records(&content);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], store.schema().columns());
        assert!(records.iter().all(|r| r.len() == store.schema().len()));
        assert_eq!(content.matches("name,age,gender").count(), 1);
    }

    #[tokio::test]
    async fn test_column_count_stable_across_store_instances() {
        let temp_dir = tempdir().unwrap();
        let catalog = catalog();

        for seen in [&[("abstract", "a1.jpeg")][..], &[][..]] {
            let store = store_in(temp_dir.path());
            store.append(&finished_session(&catalog, seen)).await.unwrap();
        }

        let content = std::fs::read_to_string(temp_dir.path().join("detailed_results.csv")).unwrap();
        let widths: Vec<usize> = parse_records(&content).iter().map(Vec::len).collect();
        assert_eq!(widths, vec![9, 9, 9]);
    }

    #[tokio::test]
    async fn test_mismatched_header_is_refused() {
        let temp_dir = tempdir().unwrap();
        let store = store_in(temp_dir.path());
        std::fs::write(store.path(), "name,age,gender,old_column\n").unwrap();

        let result = store
            .append(&finished_session(&catalog(), &[("abstract", "a1.jpeg")]))
            .await;

        assert!(matches!(result, Err(ResultsError::SchemaMismatch { .. })));
        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.lines().count(), 1, "nothing appended");
    }

    #[tokio::test]
    async fn test_renamed_columns_are_refused() {
        let temp_dir = tempdir().unwrap();
        let store = store_in(temp_dir.path());
        let mut header: Vec<String> = store.schema().columns().to_vec();
        header[3] = "renamed".to_string();
        std::fs::write(store.path(), encode_record(&header)).unwrap();

        let result = store.append_row(&vec![String::new(); store.schema().len()]).await;

        assert!(matches!(result, Err(ResultsError::HeaderMismatch { .. })));
    }

    #[tokio::test]
    async fn test_header_with_line_break_is_recognized() {
        let temp_dir = tempdir().unwrap();
        let catalog = Catalog::from_categories([Category::new(
            "abstract",
            [item("abstract", "two\nlines.png", "A")],
        )]);
        let store = ResultsStore::new(
            temp_dir.path().join("detailed_results.csv"),
            ResultSchema::from_catalog(&catalog),
        );
        let width = store.schema().len();

        for name in ["a", "b"] {
            let mut row = vec![String::new(); width];
            row[0] = name.to_string();
            store.append_row(&row).await.unwrap();
        }

        let content = std::fs::read_to_string(store.path()).unwrap();
        let records = parse_records(&content);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], store.schema().columns());
    }

    #[tokio::test]
    async fn test_concurrent_appends_do_not_interleave() {
        let temp_dir = tempdir().unwrap();
        let store = Arc::new(store_in(temp_dir.path()));
        let width = store.schema().len();

        let mut handles = Vec::new();
        for n in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let mut row = vec![String::new(); width];
                row[0] = format!("p{}", n);
                store.append_row(&row).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let content = std::fs::read_to_string(store.path()).unwrap();
        let records = parse_records(&content);
        assert_eq!(records.len(), 17);
        assert!(records.iter().all(|r| r.len() == width));
    }

    #[tokio::test]
    async fn test_summary_counts_participants() {
        let temp_dir = tempdir().unwrap();
        let store = store_in(temp_dir.path());
        let width = store.schema().len();

        for (name, age, gender) in [("a", "20", "Male"), ("b", "31", "Female"), ("c", "x", "Male")] {
            let mut row = vec![String::new(); width];
            row[0] = name.to_string();
            row[1] = age.to_string();
            row[2] = gender.to_string();
            store.append_row(&row).await.unwrap();
        }

        let summary = store.summary().await.unwrap();
        assert_eq!(summary.participants, 3);
        assert_eq!(summary.average_age, Some(25.5));
        assert_eq!(summary.genders["Male"], 2);
        assert_eq!(summary.genders["Female"], 1);
    }

    #[tokio::test]
    async fn test_summary_of_missing_file_is_empty() {
        let temp_dir = tempdir().unwrap();
        let store = store_in(temp_dir.path());
        assert_eq!(store.summary().await.unwrap(), ParticipationSummary::default());
    }
}
