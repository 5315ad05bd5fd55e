use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::portfolio::metrics::{
    PortfolioMetrics, VaultBalance, VaultMetrics, YieldProportion, YieldSource,
};
use crate::portfolio::positions::PositionHistories;
use crate::portfolio::snapshot::SnapshotIndex;
use crate::portfolio::valuation::position_value;
use crate::settings::EngineSettings;
use crate::utils::time_utils::day_from_timestamp;

/// Reduces current per-vault balances into portfolio KPIs.
///
/// `apys` maps vault id to advertised APY. Held vaults are weighted by their USD
/// balance; vaults with no balance or no advertised APY carry no weight.
pub fn summarize_metrics(
    balances: &[VaultBalance],
    apys: &HashMap<String, Decimal>,
) -> PortfolioMetrics {
    let mut metrics = PortfolioMetrics::default();
    let mut apy_weighted_sum = Decimal::ZERO;
    let mut apy_weight = Decimal::ZERO;

    for balance in balances {
        metrics.total_realized_pnl_usd = metrics
            .total_realized_pnl_usd
            .saturating_add(balance.realized_pnl_usd);
        metrics.total_unrealized_pnl_usd = metrics
            .total_unrealized_pnl_usd
            .saturating_add(balance.unrealized_pnl_usd);
        metrics.total_balance_usd = metrics.total_balance_usd.saturating_add(balance.balance_usd);
        metrics.last_updated_timestamp = metrics
            .last_updated_timestamp
            .max(balance.last_updated_timestamp);
        metrics.per_vault_metrics.push(VaultMetrics::from(balance));

        if balance.balance_usd > Decimal::ZERO {
            if let Some(apy) = apys.get(&balance.vault_id) {
                let next = balance
                    .balance_usd
                    .checked_mul(*apy)
                    .and_then(|weighted| apy_weighted_sum.checked_add(weighted))
                    .zip(apy_weight.checked_add(balance.balance_usd));
                match next {
                    Some((sum, weight)) => {
                        apy_weighted_sum = sum;
                        apy_weight = weight;
                    }
                    None => warn!(
                        "Vault {}: APY weighting of {} USD at {} overflows; vault left out",
                        balance.vault_id, balance.balance_usd, apy
                    ),
                }
            }
        }
    }

    metrics
        .per_vault_metrics
        .sort_by(|a, b| a.vault_id.cmp(&b.vault_id));
    metrics.positions_apy = if apy_weight.is_zero() {
        Decimal::ZERO
    } else {
        apy_weighted_sum
            .checked_div(apy_weight)
            .unwrap_or(Decimal::ZERO)
    };

    debug!(
        "Summarized {} vault balances: balance {} USD, apy {}",
        balances.len(),
        metrics.total_balance_usd,
        metrics.positions_apy
    );
    metrics
}

/// Derives current balances from reconstructed histories.
///
/// The balance is valued at the latest priced snapshot when that snapshot is
/// not older than the last transaction; otherwise the transaction's reported
/// USD post-balance is used, as it is when the priced value overflows.
pub fn current_balances(
    histories: &PositionHistories,
    index: &SnapshotIndex,
    settings: &EngineSettings,
) -> Vec<VaultBalance> {
    histories
        .values()
        .filter_map(|history| {
            let latest = history.latest()?;
            let holds_shares =
                latest.shares_balance > Decimal::ZERO && !settings.is_dust(latest.shares_balance);
            let mut last_updated = latest.timestamp;

            let balance_usd = if !holds_shares {
                Decimal::ZERO
            } else {
                match index.latest_priced(&history.vault_id) {
                    Some((day, snapshot))
                        if Some(day) >= day_from_timestamp(latest.timestamp) =>
                    {
                        last_updated = last_updated.max(snapshot.timestamp);
                        snapshot
                            .usable_price()
                            .and_then(|price| position_value(latest, price))
                            .unwrap_or(latest.shares_balance_usd)
                    }
                    _ => latest.shares_balance_usd,
                }
            };

            let unrealized_pnl_usd = if holds_shares {
                balance_usd.saturating_sub(latest.total_invested)
            } else {
                Decimal::ZERO
            };

            Some(VaultBalance {
                vault_id: history.vault_id.clone(),
                balance_usd,
                realized_pnl_usd: latest.realized_pnl_usd,
                unrealized_pnl_usd,
                total_deposited_usd: latest.total_deposited_usd,
                total_withdrawn_usd: latest.total_withdrawn_usd,
                last_updated_timestamp: last_updated,
            })
        })
        .collect()
}

/// Share of a vault's total liquidity held by each yield source.
///
/// Negative liquidity counts as zero. When total liquidity is zero every
/// proportion is zero.
pub fn yield_proportions(sources: &[YieldSource]) -> Vec<YieldProportion> {
    let total_liquidity_usd: Decimal = sources
        .iter()
        .map(|s| s.liquidity_usd.max(Decimal::ZERO))
        .fold(Decimal::ZERO, Decimal::saturating_add);

    sources
        .iter()
        .map(|source| YieldProportion {
            id: source.id.clone(),
            proportion: if total_liquidity_usd.is_zero() {
                Decimal::ZERO
            } else {
                source.liquidity_usd.max(Decimal::ZERO) / total_liquidity_usd
            },
        })
        .collect()
}
