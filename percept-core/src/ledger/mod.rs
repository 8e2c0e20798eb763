//! Exposure ledger: how often, and to whom, each catalog item was shown

mod store;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::Catalog;

/// Exposure of one item across all participants.
///
/// `shown_count` always equals the number of distinct participants in
/// `shown_to_users`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureRecord {
    shown_count: u64,
    shown_to_users: Vec<String>,
}

impl ExposureRecord {
    pub fn shown_count(&self) -> u64 {
        self.shown_count
    }

    /// Participants in the order they were first shown the item
    pub fn shown_to(&self) -> &[String] {
        &self.shown_to_users
    }

    pub fn has_seen(&self, participant_id: &str) -> bool {
        self.shown_to_users.iter().any(|p| p == participant_id)
    }

    /// Add `participant_id` once; returns false if it was already present
    fn record(&mut self, participant_id: &str) -> bool {
        if self.has_seen(participant_id) {
            return false;
        }
        self.shown_to_users.push(participant_id.to_string());
        self.shown_count = self.shown_to_users.len() as u64;
        true
    }

    /// Drop duplicate participants and realign the count; true if anything changed
    fn repair(&mut self) -> bool {
        let before = (self.shown_count, self.shown_to_users.len());
        let mut seen = std::collections::HashSet::new();
        self.shown_to_users.retain(|p| seen.insert(p.clone()));
        self.shown_count = self.shown_to_users.len() as u64;
        before != (self.shown_count, self.shown_to_users.len())
    }
}

/// Full ledger keyed by category, then item id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExposureLedger {
    categories: BTreeMap<String, BTreeMap<String, ExposureRecord>>,
}

impl ExposureLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure every catalog item has a record and every record is consistent.
    ///
    /// Records for items that left the catalog are kept as-is. Returns the
    /// number of records whose count had to be repaired.
    pub fn reconcile(&mut self, catalog: &Catalog) -> usize {
        for item in catalog.items() {
            self.categories
                .entry(item.category.clone())
                .or_default()
                .entry(item.item_id.clone())
                .or_default();
        }

        let mut repaired = 0;
        for (category, records) in &mut self.categories {
            for (item_id, record) in records.iter_mut() {
                if record.repair() {
                    warn!(
                        "Repaired exposure count for {}/{} to {}",
                        category, item_id, record.shown_count
                    );
                    repaired += 1;
                }
            }
        }
        repaired
    }

    /// Record that `participant_id` was shown an item.
    ///
    /// Idempotent per (participant, item): returns false and changes nothing
    /// when the participant was already counted.
    pub fn record(&mut self, participant_id: &str, category: &str, item_id: &str) -> bool {
        self.categories
            .entry(category.to_string())
            .or_default()
            .entry(item_id.to_string())
            .or_default()
            .record(participant_id)
    }

    pub fn record_for(&self, category: &str, item_id: &str) -> Option<&ExposureRecord> {
        self.categories.get(category)?.get(item_id)
    }

    /// Times an item was shown; unknown items count as never shown
    pub fn shown_count(&self, category: &str, item_id: &str) -> u64 {
        self.record_for(category, item_id)
            .map(ExposureRecord::shown_count)
            .unwrap_or(0)
    }

    pub fn has_seen(&self, participant_id: &str, category: &str, item_id: &str) -> bool {
        self.record_for(category, item_id)
            .is_some_and(|r| r.has_seen(participant_id))
    }

    /// Records of one category, sorted by item id
    pub fn category(&self, category: &str) -> Option<&BTreeMap<String, ExposureRecord>> {
        self.categories.get(category)
    }

    /// All records as (category, item id, record)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &ExposureRecord)> {
        self.categories.iter().flat_map(|(category, records)| {
            records
                .iter()
                .map(move |(item_id, record)| (category.as_str(), item_id.as_str(), record))
        })
    }

    /// Sum of shown counts across every item
    pub fn total_exposures(&self) -> u64 {
        self.iter().map(|(_, _, r)| r.shown_count).sum()
    }
}
