use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::portfolio::positions::{
    DailyPosition, ReconstructionResult, ReconstructionWarning, ReconstructionWarningKind,
    VaultPositionHistory,
};
use crate::settings::EngineSettings;
use crate::transactions::Transaction;
use crate::utils::time_utils::day_from_timestamp;

/// Folds a user's transactions into per-vault position histories.
///
/// Cost basis follows the proportional method: an outflow of `k` shares out of
/// `n` held removes `k / n` of the remaining cost basis, and the difference
/// between the outflow's USD amount and the removed basis is realized.
#[derive(Debug, Clone)]
pub struct PositionReconstructor {
    dust_threshold: Decimal,
}

impl Default for PositionReconstructor {
    fn default() -> Self {
        Self::new(&EngineSettings::default())
    }
}

impl PositionReconstructor {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            dust_threshold: settings.dust_threshold,
        }
    }

    /// Builds the position history of every vault in `transactions`.
    ///
    /// Input order does not matter except between transactions with the same
    /// timestamp, which keep their relative order.
    pub fn reconstruct(&self, transactions: &[Transaction]) -> ReconstructionResult {
        let mut sorted: Vec<&Transaction> = transactions.iter().collect();
        sorted.sort_by_key(|tx| tx.timestamp);

        let mut result = ReconstructionResult::default();
        // Share balance implied by summing deltas, tracked apart from the
        // reported post-balance.
        let mut ledgers: HashMap<&str, Decimal> = HashMap::new();

        for tx in sorted {
            let history = result
                .histories
                .entry(tx.vault_id.clone())
                .or_insert_with(|| VaultPositionHistory::new(tx.vault_id.clone()));
            let ledger = ledgers.entry(tx.vault_id.as_str()).or_insert(Decimal::ZERO);

            let next = self.apply_transaction(history.latest(), tx, ledger, &mut result.warnings);
            history.positions.push(next);
        }

        debug!(
            "Reconstructed {} vault histories from {} transactions ({} warnings)",
            result.histories.len(),
            transactions.len(),
            result.warnings.len()
        );
        result
    }

    /// Computes the position after `tx` given the position before it.
    fn apply_transaction(
        &self,
        previous: Option<&DailyPosition>,
        tx: &Transaction,
        ledger: &mut Decimal,
        warnings: &mut Vec<ReconstructionWarning>,
    ) -> DailyPosition {
        let previous_shares = previous.map_or(Decimal::ZERO, |p| p.shares_balance);
        let mut total_invested = previous.map_or(Decimal::ZERO, |p| p.total_invested);
        let mut realized_pnl = previous.map_or(Decimal::ZERO, |p| p.realized_pnl_usd);
        let mut total_deposited = previous.map_or(Decimal::ZERO, |p| p.total_deposited_usd);
        let mut total_withdrawn = previous.map_or(Decimal::ZERO, |p| p.total_withdrawn_usd);

        let shares_moved = tx.shares_amount.abs();

        if tx.kind.is_inflow() {
            total_invested = total_invested.saturating_add(tx.asset_amount_usd);
            total_deposited = total_deposited.saturating_add(tx.asset_amount_usd);
            *ledger = ledger.saturating_add(shares_moved);
        } else {
            total_withdrawn = total_withdrawn.saturating_add(tx.asset_amount_usd);
            *ledger = ledger.saturating_sub(shares_moved);

            if previous_shares > Decimal::ZERO && previous_shares.abs() >= self.dust_threshold {
                // Only divide when the quotient is below one so it cannot overflow.
                let proportion = if shares_moved < previous_shares {
                    shares_moved / previous_shares
                } else {
                    if shares_moved > previous_shares {
                        self.record(
                            warnings,
                            tx,
                            ReconstructionWarningKind::WithdrawalExceedsPosition,
                            format!(
                                "{} of {} shares moved out; removing the whole cost basis",
                                shares_moved, previous_shares
                            ),
                        );
                    }
                    Decimal::ONE
                };
                let cost_basis_removed = total_invested * proportion;
                total_invested -= cost_basis_removed;
                realized_pnl =
                    realized_pnl.saturating_add(tx.asset_amount_usd.saturating_sub(cost_basis_removed));
            } else {
                self.record(
                    warnings,
                    tx,
                    ReconstructionWarningKind::WithdrawalWithoutPosition,
                    format!(
                        "{} with no prior shares; cost basis and realized P&L left unchanged. \
                         An earlier inflow may be missing from the history.",
                        tx.kind
                    ),
                );
            }
        }

        if *ledger < Decimal::ZERO {
            self.record(
                warnings,
                tx,
                ReconstructionWarningKind::NegativeShareLedger,
                format!("summed share deltas fell to {}; clamped to zero", ledger),
            );
            *ledger = Decimal::ZERO;
        }

        let shares_balance = match tx.shares_balance_after {
            Some(reported) if reported.is_sign_negative() => Decimal::ZERO,
            Some(reported) => reported,
            None => *ledger,
        };

        DailyPosition {
            timestamp: tx.timestamp,
            vault_id: tx.vault_id.clone(),
            kind: tx.kind,
            shares_balance,
            shares_balance_usd: tx.shares_balance_after_usd,
            total_invested,
            realized_pnl_usd: realized_pnl,
            total_deposited_usd: total_deposited,
            total_withdrawn_usd: total_withdrawn,
        }
    }

    fn record(
        &self,
        warnings: &mut Vec<ReconstructionWarning>,
        tx: &Transaction,
        kind: ReconstructionWarningKind,
        message: String,
    ) {
        let warning = ReconstructionWarning {
            vault_id: tx.vault_id.clone(),
            timestamp: tx.timestamp,
            date: day_from_timestamp(tx.timestamp),
            hash: tx.hash.clone(),
            kind,
            message,
        };
        warn!("{}", warning);
        warnings.push(warning);
    }
}

/// Convenience wrapper using default settings.
pub fn reconstruct_positions(transactions: &[Transaction]) -> ReconstructionResult {
    PositionReconstructor::default().reconstruct(transactions)
}
