use std::collections::BTreeMap;
use std::path::PathBuf;

use percept_core::QuizConfig;
use serde::{Deserialize, Serialize};

pub use percept_server::{DEFAULT_HOST, DEFAULT_PORT};

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawPerceptConfig {
    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub quiz: RawQuizConfig,
}

/// Server config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    /// Host to bind the survey server to
    pub host: Option<String>,

    /// Port for the survey server
    pub port: Option<u16>,
}

/// Quiz config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawQuizConfig {
    pub dataset_root: Option<PathBuf>,
    pub items_per_category: Option<usize>,
    pub tracking_file: Option<PathBuf>,
    pub results_file: Option<PathBuf>,
    pub wide_option_categories: Option<Vec<String>>,

    /// Overrides merged per category on top of the built-in mapping
    #[serde(default)]
    pub answer_fields: BTreeMap<String, String>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PerceptConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub quiz: QuizConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSection {
    /// Host to bind the survey server to
    pub host: String,

    /// Port for the survey server
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}
