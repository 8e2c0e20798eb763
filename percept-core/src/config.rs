//! Configuration for quiz assignment and persistence

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Answer options offered for most categories
pub const STANDARD_OPTIONS: &[&str] = &["A", "B", "C", "D"];

/// Answer options offered for categories listed in `wide_option_categories`
pub const WIDE_OPTIONS: &[&str] = &["A", "B", "C", "D", "E", "F"];

/// Metadata field holding the correct answer when a category has no override
pub const DEFAULT_ANSWER_FIELD: &str = "answer";

/// Configuration for how a quiz is assembled from the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Directory holding one subdirectory per category
    #[serde(default = "default_dataset_root")]
    pub dataset_root: PathBuf,

    /// Items each participant sees per category
    #[serde(default = "default_items_per_category")]
    pub items_per_category: usize,

    /// Exposure ledger location
    #[serde(default = "default_tracking_file")]
    pub tracking_file: PathBuf,

    /// Results CSV location
    #[serde(default = "default_results_file")]
    pub results_file: PathBuf,

    /// Categories that offer options A-F instead of A-D
    #[serde(default = "default_wide_option_categories")]
    pub wide_option_categories: Vec<String>,

    /// Per-category name of the metadata field holding the correct answer
    #[serde(default = "default_answer_fields")]
    pub answer_fields: BTreeMap<String, String>,
}

fn default_dataset_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_items_per_category() -> usize {
    1
}

fn default_tracking_file() -> PathBuf {
    PathBuf::from("user_image_tracking.json")
}

fn default_results_file() -> PathBuf {
    PathBuf::from("detailed_results.csv")
}

fn default_wide_option_categories() -> Vec<String> {
    vec!["abstract".to_string(), "slippage".to_string()]
}

fn default_answer_fields() -> BTreeMap<String, String> {
    [
        ("abstract", "answer"),
        ("dynamic_isomorph", "fifth_label"),
        ("hierarchial_isomorph", "answer"),
        ("mental_composition", "answer"),
        ("mental_rotation", "answer"),
        ("paper_folding", "correct_option"),
        ("slippage", "violation"),
        ("symmetric_isomorph", "asymmetric_label"),
    ]
    .into_iter()
    .map(|(category, field)| (category.to_string(), field.to_string()))
    .collect()
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            dataset_root: default_dataset_root(),
            items_per_category: default_items_per_category(),
            tracking_file: default_tracking_file(),
            results_file: default_results_file(),
            wide_option_categories: default_wide_option_categories(),
            answer_fields: default_answer_fields(),
        }
    }
}

impl QuizConfig {
    /// Metadata field holding the correct answer for `category`
    pub fn answer_field(&self, category: &str) -> &str {
        self.answer_fields
            .get(category)
            .map(String::as_str)
            .unwrap_or(DEFAULT_ANSWER_FIELD)
    }

    /// Answer options offered for questions in `category`
    pub fn options_for(&self, category: &str) -> &'static [&'static str] {
        if self.wide_option_categories.iter().any(|c| c == category) {
            WIDE_OPTIONS
        } else {
            STANDARD_OPTIONS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QuizConfig::default();
        assert_eq!(config.items_per_category, 1);
        assert_eq!(config.tracking_file, PathBuf::from("user_image_tracking.json"));
        assert_eq!(config.results_file, PathBuf::from("detailed_results.csv"));
    }

    #[test]
    fn test_answer_field_override_and_fallback() {
        let config = QuizConfig::default();
        assert_eq!(config.answer_field("paper_folding"), "correct_option");
        assert_eq!(config.answer_field("slippage"), "violation");
        assert_eq!(config.answer_field("brand_new_task"), "answer");
    }

    #[test]
    fn test_options_for_wide_categories() {
        let config = QuizConfig::default();
        assert_eq!(config.options_for("abstract").len(), 6);
        assert_eq!(config.options_for("mental_rotation"), STANDARD_OPTIONS);
    }

    #[test]
    fn test_deserialize_toml_partial() {
        let toml = r#"
            dataset_root = "/srv/dataset"
            items_per_category = 5

            [answer_fields]
            custom = "label"
        "#;
        let config: QuizConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.dataset_root, PathBuf::from("/srv/dataset"));
        assert_eq!(config.items_per_category, 5);
        assert_eq!(config.answer_field("custom"), "label");
        // an explicit table replaces the built-in map
        assert_eq!(config.answer_field("paper_folding"), "answer");
        assert_eq!(config.results_file, PathBuf::from("detailed_results.csv"));
    }

    #[test]
    fn test_deserialize_toml_empty_uses_defaults() {
        let config: QuizConfig = toml::from_str("").unwrap();
        assert_eq!(config, QuizConfig::default());
    }
}
