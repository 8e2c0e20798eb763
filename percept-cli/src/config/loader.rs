use super::types::{
    DEFAULT_HOST, DEFAULT_PORT, PerceptConfig, RawPerceptConfig, RawQuizConfig, RawServerConfig,
    ServerSection,
};
use anyhow::{Context, Result};
use percept_core::QuizConfig;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<PerceptConfig> {
        Self::load_from_paths(&Self::user_config_path(), &Self::project_config_path())
    }

    /// Load and merge the two layers from explicit locations
    pub fn load_from_paths(user_path: &Path, project_path: &Path) -> Result<PerceptConfig> {
        let mut raw = RawPerceptConfig::default();

        // Layer 1: User config
        if let Some(user_config) = Self::read_raw(user_path)? {
            raw = Self::merge_raw(raw, user_config);
        }

        // Layer 2: Project config
        if let Some(project_config) = Self::read_raw(project_path)? {
            raw = Self::merge_raw(raw, project_config);
        }

        // Convert to final config with defaults applied
        Ok(Self::finalize(raw))
    }

    /// Get user config path (`$XDG_CONFIG_HOME/percept/config.toml`)
    pub fn user_config_path() -> PathBuf {
        percept_paths::user_config_file()
    }

    /// Get project config path
    /// Can be overridden with PERCEPT_PROJECT_CONFIG_DIR env var (useful for isolated tests)
    pub fn project_config_path() -> PathBuf {
        percept_paths::project_config_file()
    }

    fn read_raw(path: &Path) -> Result<Option<RawPerceptConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let raw = toml::from_str(&contents)
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(Some(raw))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawPerceptConfig, overlay: RawPerceptConfig) -> RawPerceptConfig {
        let mut answer_fields = base.quiz.answer_fields;
        answer_fields.extend(overlay.quiz.answer_fields);

        RawPerceptConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
            },
            quiz: RawQuizConfig {
                dataset_root: overlay.quiz.dataset_root.or(base.quiz.dataset_root),
                items_per_category: overlay
                    .quiz
                    .items_per_category
                    .or(base.quiz.items_per_category),
                tracking_file: overlay.quiz.tracking_file.or(base.quiz.tracking_file),
                results_file: overlay.quiz.results_file.or(base.quiz.results_file),
                wide_option_categories: overlay
                    .quiz
                    .wide_option_categories
                    .or(base.quiz.wide_option_categories),
                answer_fields,
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawPerceptConfig) -> PerceptConfig {
        let defaults = QuizConfig::default();
        let mut answer_fields = defaults.answer_fields;
        answer_fields.extend(raw.quiz.answer_fields);

        PerceptConfig {
            server: ServerSection {
                host: raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: raw.server.port.unwrap_or(DEFAULT_PORT),
            },
            quiz: QuizConfig {
                dataset_root: raw.quiz.dataset_root.unwrap_or(defaults.dataset_root),
                items_per_category: raw
                    .quiz
                    .items_per_category
                    .unwrap_or(defaults.items_per_category),
                tracking_file: raw.quiz.tracking_file.unwrap_or(defaults.tracking_file),
                results_file: raw.quiz.results_file.unwrap_or(defaults.results_file),
                wide_option_categories: raw
                    .quiz
                    .wide_option_categories
                    .unwrap_or(defaults.wide_option_categories),
                answer_fields,
            },
        }
    }
}
