//! percept-core: Core library for the percept perception survey
//!
//! This crate provides everything the survey needs besides the web pages:
//!
//! - **Catalog** - [`Catalog`] scans the dataset tree into categories of items
//! - **Exposure ledger** - [`ExposureLedger`] tracks how often and to whom each item was shown
//! - **Assignment** - [`Assigner`] picks a balanced set of items for each new participant
//! - **Sessions** - [`QuizSession`] runs the forward-only question flow and scores it
//! - **Results** - [`ResultsStore`] appends one fixed-width CSV row per participant
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use percept_core::{Assigner, Catalog, QuizConfig};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = QuizConfig::default();
//!     let catalog = Arc::new(Catalog::load(&config)?);
//!     let assigner = Assigner::open(
//!         catalog,
//!         &config.tracking_file,
//!         config.items_per_category,
//!     )
//!     .await?;
//!
//!     let assignment = assigner.assign("Ada_1700000000000").await;
//!     println!("assigned {} items", assignment.len());
//!     Ok(())
//! }
//! ```
//!
//! # Flow
//!
//! ```text
//! dataset/ ──► Catalog ──► Assigner ──► plan_questions ──► QuizSession
//!                            │  ▲                              │
//!                            ▼  │                              ▼
//!                      tracking ledger                   ResultsStore
//! ```

pub mod assignment;
pub mod catalog;
pub mod config;
pub mod error;
pub mod ledger;
pub mod results;
pub mod session;

// Re-export key types for convenience
pub use assignment::{Assigner, Assignment, select};
pub use catalog::{Catalog, CatalogItem, Category, METADATA_FILE, PruneReport, prune_category};
pub use config::QuizConfig;
pub use error::{CatalogError, LedgerError, PerceptError, ResultsError, SessionError};
pub use ledger::{ExposureLedger, ExposureRecord};
pub use results::{ParticipationSummary, ResultSchema, ResultsStore, item_stem};
pub use session::{
    CategoryScore, Gender, ParticipantProfile, Question, QuizSession, QuizState, QuizSummary,
    normalize_answer, plan_questions, score,
};
