//! Error types for percept-core

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for percept-core
#[derive(Error, Debug)]
pub enum PerceptError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Results error: {0}")]
    Results(#[from] ResultsError),
}

/// Errors raised while scanning or pruning the dataset tree
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Dataset root not found: {0}")]
    RootNotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid metadata in {path}: {message}")]
    InvalidMetadata { path: PathBuf, message: String },
}

/// Errors from the exposure ledger
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Failed to read ledger {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write ledger {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Ledger {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize ledger: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Errors from the quiz session state machine
#[derive(Error, Debug, PartialEq)]
pub enum SessionError {
    #[error("Invalid state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    #[error("Option {choice:?} is not offered for this question")]
    UnknownOption { choice: String },

    #[error("Invalid participant: {0}")]
    InvalidProfile(String),
}

/// Errors from the results store
#[derive(Error, Debug)]
pub enum ResultsError {
    #[error("Failed to access results file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Results file {path} has {found} columns but the catalog needs {expected}")]
    SchemaMismatch {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("Results file {path} has a different header than the catalog produces")]
    HeaderMismatch { path: PathBuf },
}
