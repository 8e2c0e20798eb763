//! Item catalog built from the dataset directory tree
//!
//! Each immediate subdirectory of the dataset root is a category. A category
//! directory holds an `annotations.json` metadata file mapping media file
//! names to question/answer fields, plus the media files themselves.

mod prune;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::QuizConfig;
use crate::error::CatalogError;

pub use prune::{PruneReport, prune_category};

/// Metadata file expected in every category directory
pub const METADATA_FILE: &str = "annotations.json";

/// One media + question + answer triple within a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    pub category: String,
    /// Media file name as listed in the metadata file
    pub item_id: String,
    pub media_path: PathBuf,
    pub prompt: String,
    pub correct_answer: String,
}

/// A named pool of items loaded from one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    items: BTreeMap<String, CatalogItem>,
}

impl Category {
    pub fn new(name: impl Into<String>, items: impl IntoIterator<Item = CatalogItem>) -> Self {
        Self {
            name: name.into(),
            items: items
                .into_iter()
                .map(|item| (item.item_id.clone(), item))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Items sorted by item id
    pub fn items(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.values()
    }

    pub fn item_ids(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn item(&self, item_id: &str) -> Option<&CatalogItem> {
        self.items.get(item_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Immutable in-memory view of the whole dataset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    /// Build a catalog from already-loaded categories, sorted by name
    pub fn from_categories(categories: impl IntoIterator<Item = Category>) -> Self {
        let mut categories: Vec<Category> = categories.into_iter().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Self { categories }
    }

    /// Scan `config.dataset_root` and load every category that has metadata
    pub fn load(config: &QuizConfig) -> Result<Self, CatalogError> {
        let root = &config.dataset_root;
        if !root.is_dir() {
            return Err(CatalogError::RootNotFound(root.clone()));
        }

        let entries = std::fs::read_dir(root).map_err(|source| CatalogError::Io {
            path: root.clone(),
            source,
        })?;

        let mut categories = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| CatalogError::Io {
                path: root.clone(),
                source,
            })?;
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            let Some(name) = dir.file_name().and_then(|n| n.to_str()).map(str::to_string)
            else {
                continue;
            };

            let metadata_path = dir.join(METADATA_FILE);
            if !metadata_path.exists() {
                debug!("Skipping {}: no {}", dir.display(), METADATA_FILE);
                continue;
            }

            match load_category(&name, &dir, config.answer_field(&name)) {
                Ok(category) => categories.push(category),
                Err(e) => warn!("Skipping category {}: {}", name, e),
            }
        }

        let catalog = Self::from_categories(categories);
        info!(
            "Loaded {} items across {} categories from {}",
            catalog.len(),
            catalog.categories.len(),
            root.display()
        );
        Ok(catalog)
    }

    /// Categories sorted by name
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(Category::name)
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn item(&self, category: &str, item_id: &str) -> Option<&CatalogItem> {
        self.category(category)?.item(item_id)
    }

    /// Every item, in category order then item id order
    pub fn items(&self) -> impl Iterator<Item = &CatalogItem> {
        self.categories.iter().flat_map(Category::items)
    }

    /// Total number of items
    pub fn len(&self) -> usize {
        self.categories.iter().map(Category::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parse the metadata file of one category directory
fn load_category(name: &str, dir: &Path, answer_field: &str) -> Result<Category, CatalogError> {
    let metadata = read_metadata(&dir.join(METADATA_FILE))?;

    let mut items = Vec::new();
    for (item_id, info) in metadata {
        let media_path = dir.join(&item_id);
        if !media_path.exists() {
            debug!("Skipping {}/{}: media file missing", name, item_id);
            continue;
        }

        items.push(CatalogItem {
            category: name.to_string(),
            prompt: prompt_text(info.get("question")),
            correct_answer: field_text(info.get(answer_field)),
            item_id,
            media_path,
        });
    }

    Ok(Category::new(name, items))
}

/// Read a metadata file as an ordered map of item name to fields
pub(crate) fn read_metadata(path: &Path) -> Result<Map<String, Value>, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value =
        serde_json::from_str(&content).map_err(|e| CatalogError::InvalidMetadata {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(CatalogError::InvalidMetadata {
            path: path.to_path_buf(),
            message: "expected a JSON object keyed by item name".to_string(),
        }),
    }
}

/// Questions may be stored as a single string or a list; the first entry wins
fn prompt_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(list)) => field_text(list.first()),
        other => field_text(other),
    }
}

fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
