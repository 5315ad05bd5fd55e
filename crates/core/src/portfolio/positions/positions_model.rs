use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::transactions::TransactionKind;

/// Running position state of one vault right after one transaction.
///
/// Entries are sparse (one per transaction, not per day) and are looked up with
/// step-function semantics: a day without a transaction inherits the state of
/// the latest earlier entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPosition {
    pub timestamp: i64,
    pub vault_id: String,
    pub kind: TransactionKind,
    pub shares_balance: Decimal,
    /// Reported USD value of the share balance at transaction time.
    pub shares_balance_usd: Decimal,
    /// Remaining cost basis in USD.
    pub total_invested: Decimal,
    /// Cumulative realized P&L in USD.
    pub realized_pnl_usd: Decimal,
    /// Cumulative USD brought in by deposits and incoming transfers.
    pub total_deposited_usd: Decimal,
    /// Cumulative USD taken out by withdrawals and outgoing transfers.
    pub total_withdrawn_usd: Decimal,
}

/// Ascending position entries of a single vault.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultPositionHistory {
    pub vault_id: String,
    pub positions: Vec<DailyPosition>,
}

impl VaultPositionHistory {
    pub fn new(vault_id: String) -> Self {
        Self {
            vault_id,
            positions: Vec::new(),
        }
    }

    /// Latest entry with `timestamp <= cutoff`, if any.
    pub fn as_of(&self, cutoff: i64) -> Option<&DailyPosition> {
        let idx = self
            .positions
            .partition_point(|position| position.timestamp <= cutoff);
        idx.checked_sub(1).map(|i| &self.positions[i])
    }

    pub fn latest(&self) -> Option<&DailyPosition> {
        self.positions.last()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Position histories keyed by vault id. Ordered so every derived series walks
/// vaults in the same sequence.
pub type PositionHistories = BTreeMap<String, VaultPositionHistory>;

/// A transaction that was folded but looked inconsistent with the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconstructionWarning {
    pub vault_id: String,
    pub timestamp: i64,
    pub date: Option<NaiveDate>,
    pub hash: Option<String>,
    pub kind: ReconstructionWarningKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReconstructionWarningKind {
    /// Outflow with no prior shares; cost basis could not be attributed.
    WithdrawalWithoutPosition,
    /// Summed share deltas went below zero.
    NegativeShareLedger,
    /// Outflow of more shares than were held; whole cost basis removed.
    WithdrawalExceedsPosition,
}

impl std::fmt::Display for ReconstructionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Vault {} at {} (tx {}): {}",
            self.vault_id,
            self.timestamp,
            self.hash.as_deref().unwrap_or("<none>"),
            self.message
        )
    }
}

/// Result of position reconstruction. Histories are always returned; warnings
/// list the transactions that were folded with a fallback rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconstructionResult {
    pub histories: PositionHistories,
    pub warnings: Vec<ReconstructionWarning>,
}

impl ReconstructionResult {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
