use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::DailySnapshot;
use crate::utils::time_utils::day_from_timestamp;

/// Two-level lookup `vault_id -> day -> snapshot` plus the sorted set of days
/// seen across all vaults.
///
/// Days are UTC calendar days. A later snapshot for the same vault and day
/// replaces an earlier one. Nothing is interpolated or carried forward.
#[derive(Debug, Clone, Default)]
pub struct SnapshotIndex {
    by_vault: HashMap<String, BTreeMap<NaiveDate, DailySnapshot>>,
    days: BTreeSet<NaiveDate>,
}

impl SnapshotIndex {
    pub fn build(snapshots: &[DailySnapshot]) -> Self {
        let mut index = SnapshotIndex::default();
        let mut replaced = 0usize;

        for snapshot in snapshots {
            let Some(day) = day_from_timestamp(snapshot.timestamp) else {
                warn!(
                    "Snapshot for vault {} has out-of-range timestamp {}. Skipped.",
                    snapshot.vault_id, snapshot.timestamp
                );
                continue;
            };
            let previous = index
                .by_vault
                .entry(snapshot.vault_id.clone())
                .or_default()
                .insert(day, snapshot.clone());
            if previous.is_some() {
                replaced += 1;
            }
            index.days.insert(day);
        }

        if replaced > 0 {
            debug!("{} duplicate vault/day snapshots replaced by later entries", replaced);
        }
        index
    }

    pub fn get(&self, vault_id: &str, day: NaiveDate) -> Option<&DailySnapshot> {
        self.by_vault.get(vault_id)?.get(&day)
    }

    /// Usable share price of `vault_id` on `day`.
    pub fn price(&self, vault_id: &str, day: NaiveDate) -> Option<Decimal> {
        self.get(vault_id, day)?.usable_price()
    }

    /// Ascending distinct days across all vaults.
    pub fn days(&self) -> Vec<NaiveDate> {
        self.days.iter().copied().collect()
    }

    /// Ascending days on which `vault_id` has a snapshot.
    pub fn vault_days(&self, vault_id: &str) -> Vec<NaiveDate> {
        self.by_vault
            .get(vault_id)
            .map(|days| days.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Most recent snapshot of `vault_id` that carries a usable price.
    pub fn latest_priced(&self, vault_id: &str) -> Option<(NaiveDate, &DailySnapshot)> {
        self.by_vault
            .get(vault_id)?
            .iter()
            .rev()
            .find(|(_, snapshot)| snapshot.usable_price().is_some())
            .map(|(day, snapshot)| (*day, snapshot))
    }

    pub fn vault_count(&self) -> usize {
        self.by_vault.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
