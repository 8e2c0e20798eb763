//! Shared application state for the percept server

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use percept_core::{
    Assigner, Catalog, QuizConfig, QuizSession, QuizSummary, ResultSchema, ResultsStore,
};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::ServerError;

/// Abandoned sessions and stale summaries are dropped after this long
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 60;

/// Whether a finished session's row reached the results file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A request is currently writing the row
    Pending,
    Saved,
    Failed(String),
}

/// A participant's quiz that has not been flushed yet
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub quiz: QuizSession,
    /// Last time the participant loaded or answered a question
    pub last_active: DateTime<Utc>,
}

impl ActiveSession {
    pub fn new(quiz: QuizSession, now: DateTime<Utc>) -> Self {
        Self {
            quiz,
            last_active: now,
        }
    }
}

/// What remains of a session once its row has been handed to the results store
#[derive(Debug, Clone)]
pub struct CompletedSession {
    pub summary: QuizSummary,
    pub outcome: SaveOutcome,
    pub finished_at: DateTime<Utc>,
}

/// Shared application state accessible by all handlers
pub struct AppState {
    /// Quiz settings the server was started with
    pub config: QuizConfig,
    /// Immutable dataset view
    pub catalog: Arc<Catalog>,
    /// Owner of the exposure ledger
    pub assigner: Arc<Assigner>,
    /// Results CSV
    pub results: Arc<ResultsStore>,
    /// In-flight quiz sessions keyed by the id carried in page URLs
    pub sessions: RwLock<HashMap<Uuid, ActiveSession>>,
    /// Summaries of flushed sessions, kept so the summary page survives a refresh
    pub completed: RwLock<HashMap<Uuid, CompletedSession>>,
    /// Idle time after which a session (or a completed summary) is dropped
    pub session_ttl: Duration,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Load the catalog and ledger described by `config`
    pub async fn load(config: QuizConfig) -> Result<Self, ServerError> {
        let catalog = Catalog::load(&config)?;
        Self::with_catalog(config, catalog).await
    }

    /// Build state around an already-loaded catalog (for testing)
    pub async fn with_catalog(config: QuizConfig, catalog: Catalog) -> Result<Self, ServerError> {
        let catalog = Arc::new(catalog);
        let assigner = Assigner::open(
            Arc::clone(&catalog),
            &config.tracking_file,
            config.items_per_category,
        )
        .await?;
        let results = ResultsStore::new(&config.results_file, ResultSchema::from_catalog(&catalog));

        Ok(Self {
            config,
            catalog,
            assigner: Arc::new(assigner),
            results: Arc::new(results),
            sessions: RwLock::new(HashMap::new()),
            completed: RwLock::new(HashMap::new()),
            session_ttl: Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
            started_at: Utc::now(),
        })
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    /// Number of unflushed sessions currently held in memory
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle for longer than `session_ttl` and summaries older than it.
    ///
    /// Returns how many entries were removed.
    pub async fn expire_sessions(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.session_ttl;

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, active| active.last_active > cutoff);
        let mut removed = before - sessions.len();
        drop(sessions);

        let mut completed = self.completed.write().await;
        let before = completed.len();
        completed.retain(|_, done| done.finished_at > cutoff);
        removed += before - completed.len();

        if removed > 0 {
            info!("Expired {} idle sessions", removed);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_app_state_with_empty_catalog() {
        let temp = TempDir::new().unwrap();
        let config = QuizConfig {
            dataset_root: temp.path().to_path_buf(),
            tracking_file: temp.path().join("tracking.json"),
            results_file: temp.path().join("results.csv"),
            ..Default::default()
        };

        let state = AppState::load(config).await.unwrap();

        assert!(state.catalog.is_empty());
        assert!(state.uptime_seconds() >= 0);
        assert_eq!(state.session_count().await, 0);
        assert_eq!(state.results.schema().len(), 3);
    }

    #[tokio::test]
    async fn test_app_state_missing_dataset_fails() {
        let temp = TempDir::new().unwrap();
        let config = QuizConfig {
            dataset_root: temp.path().join("missing"),
            ..Default::default()
        };

        let result = AppState::load(config).await;
        assert!(matches!(result, Err(ServerError::Catalog(_))));
    }

    #[tokio::test]
    async fn test_expire_sessions_drops_idle_entries() {
        let temp = TempDir::new().unwrap();
        let config = QuizConfig {
            dataset_root: temp.path().to_path_buf(),
            tracking_file: temp.path().join("tracking.json"),
            results_file: temp.path().join("results.csv"),
            ..Default::default()
        };
        let state = AppState::load(config).await.unwrap();
        let t0 = Utc::now();

        let profile = percept_core::ParticipantProfile::new(
            "Ada",
            30,
            percept_core::Gender::Female,
            t0,
        )
        .unwrap();
        let mut quiz = QuizSession::new(profile);
        quiz.start(Vec::new(), t0).unwrap();
        let summary = quiz.summary().unwrap();

        state
            .sessions
            .write()
            .await
            .insert(Uuid::new_v4(), ActiveSession::new(quiz.clone(), t0));
        let fresh = Uuid::new_v4();
        state
            .sessions
            .write()
            .await
            .insert(fresh, ActiveSession::new(quiz, t0 + Duration::minutes(90)));
        state.completed.write().await.insert(
            Uuid::new_v4(),
            CompletedSession {
                summary,
                outcome: SaveOutcome::Saved,
                finished_at: t0,
            },
        );

        let removed = state.expire_sessions(t0 + Duration::minutes(100)).await;

        assert_eq!(removed, 2);
        assert_eq!(state.session_count().await, 1);
        assert!(state.sessions.read().await.contains_key(&fresh));
        assert!(state.completed.read().await.is_empty());
    }
}
