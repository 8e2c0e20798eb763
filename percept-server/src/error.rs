//! Server error types

use percept_core::{CatalogError, LedgerError};
use thiserror::Error;

/// Errors that can occur while starting or running the percept server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The dataset could not be loaded
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The exposure ledger could not be loaded
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_bind_error_mentions_address() {
        let error = ServerError::Bind {
            addr: "127.0.0.1:7480".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"),
        };
        assert!(error.to_string().contains("127.0.0.1:7480"));
    }

    #[test]
    fn test_catalog_error_converts() {
        let error: ServerError = CatalogError::RootNotFound(PathBuf::from("/nope")).into();
        assert!(matches!(error, ServerError::Catalog(_)));
    }
}
