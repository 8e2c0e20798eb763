//! Fair-distribution assignment of catalog items to participants
//!
//! Selection is a probabilistic balancing policy rather than a strict
//! round-robin: items the participant has never seen are preferred, and when
//! there are not enough of those the pool is topped up with the globally
//! least-shown items. The final pick is uniform over that pool.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::catalog::{Catalog, Category};
use crate::error::LedgerError;
use crate::ledger::ExposureLedger;

/// Pick `k` items of `category` for `participant_id` and record the exposure.
///
/// Returns fewer than `k` ids only when the category itself has fewer items.
pub fn select<R: Rng + ?Sized>(
    ledger: &mut ExposureLedger,
    participant_id: &str,
    category: &Category,
    k: usize,
    rng: &mut R,
) -> Vec<String> {
    let name = category.name();
    let mut pool: Vec<&str> = category
        .item_ids()
        .filter(|id| !ledger.has_seen(participant_id, name, id))
        .collect();

    if pool.len() < k {
        let mut by_exposure: Vec<&str> = category.item_ids().collect();
        // item_ids is already sorted, so the stable sort breaks ties by id
        by_exposure.sort_by_key(|id| ledger.shown_count(name, id));

        let mut in_pool: HashSet<&str> = pool.iter().copied().collect();
        for id in by_exposure {
            if pool.len() >= k {
                break;
            }
            if in_pool.insert(id) {
                pool.push(id);
            }
        }
    }

    let chosen: Vec<String> = pool
        .choose_multiple(rng, k)
        .map(|id| id.to_string())
        .collect();

    for id in &chosen {
        ledger.record(participant_id, name, id);
    }
    chosen
}

/// Items chosen for one participant, keyed by category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    pub participant_id: String,
    pub items: BTreeMap<String, Vec<String>>,
    /// Whether the updated ledger reached disk
    pub persisted: bool,
}

impl Assignment {
    /// Total number of assigned items
    pub fn len(&self) -> usize {
        self.items.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Owns the exposure ledger and hands out per-participant assignments.
///
/// The ledger mutex is held from the first read through the save, so two
/// participants starting at once never interleave a read-modify-write.
pub struct Assigner {
    catalog: Arc<Catalog>,
    ledger: Mutex<ExposureLedger>,
    ledger_path: PathBuf,
    items_per_category: usize,
}

impl Assigner {
    /// Load the ledger at `ledger_path` and reconcile it with `catalog`
    pub async fn open(
        catalog: Arc<Catalog>,
        ledger_path: impl Into<PathBuf>,
        items_per_category: usize,
    ) -> Result<Self, LedgerError> {
        let ledger_path = ledger_path.into();
        let mut ledger = ExposureLedger::load(&ledger_path).await?;
        ledger.reconcile(&catalog);

        info!(
            "Exposure ledger {} tracks {} items ({} exposures)",
            ledger_path.display(),
            ledger.iter().count(),
            ledger.total_exposures()
        );

        Ok(Self::with_ledger(catalog, ledger, ledger_path, items_per_category))
    }

    /// Create an assigner around an already-loaded ledger
    pub fn with_ledger(
        catalog: Arc<Catalog>,
        ledger: ExposureLedger,
        ledger_path: impl Into<PathBuf>,
        items_per_category: usize,
    ) -> Self {
        Self {
            catalog,
            ledger: Mutex::new(ledger),
            ledger_path: ledger_path.into(),
            items_per_category,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn items_per_category(&self) -> usize {
        self.items_per_category
    }

    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    /// Copy of the current ledger
    pub async fn snapshot(&self) -> ExposureLedger {
        self.ledger.lock().await.clone()
    }

    /// Assign items from every category to `participant_id` and flush the ledger
    pub async fn assign(&self, participant_id: &str) -> Assignment {
        let mut rng = StdRng::from_entropy();
        self.assign_with_rng(participant_id, &mut rng).await
    }

    /// Same as [`Assigner::assign`] with caller-supplied randomness
    pub async fn assign_with_rng<R: Rng + Send>(
        &self,
        participant_id: &str,
        rng: &mut R,
    ) -> Assignment {
        let mut ledger = self.ledger.lock().await;

        let items: BTreeMap<String, Vec<String>> = self
            .catalog
            .categories()
            .iter()
            .map(|category| {
                let chosen = select(
                    &mut ledger,
                    participant_id,
                    category,
                    self.items_per_category,
                    &mut *rng,
                );
                (category.name().to_string(), chosen)
            })
            .collect();

        let persisted = match ledger.save(&self.ledger_path).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save exposure ledger: {}", e);
                false
            }
        };

        let assignment = Assignment {
            participant_id: participant_id.to_string(),
            items,
            persisted,
        };
        info!(
            "Assigned {} items to {}",
            assignment.len(),
            assignment.participant_id
        );
        assignment
    }
}
