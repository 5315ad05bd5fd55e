use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;

use crate::portfolio::positions::{DailyPosition, PositionHistories, VaultPositionHistory};
use crate::portfolio::snapshot::SnapshotIndex;
use crate::portfolio::valuation::DailyPortfolioValue;
use crate::settings::{AsOfPolicy, EngineSettings};
use crate::utils::time_utils::{day_end_timestamp, day_start_timestamp};

/// Timestamp a position must not exceed to count for `day`.
pub fn as_of_cutoff(day: NaiveDate, policy: AsOfPolicy) -> i64 {
    match policy {
        AsOfPolicy::DayStart => day_start_timestamp(day),
        AsOfPolicy::DayEnd => day_end_timestamp(day),
    }
}

/// Position of `history` valued on `day`, together with that day's share price.
///
/// `None` when the vault has no position yet, holds no shares, or lacks a usable
/// snapshot price for the day. Such vaults are skipped for the day rather than
/// counted as zero.
pub fn priced_position<'a>(
    history: &'a VaultPositionHistory,
    index: &SnapshotIndex,
    day: NaiveDate,
    settings: &EngineSettings,
) -> Option<(&'a DailyPosition, Decimal)> {
    let position = history.as_of(as_of_cutoff(day, settings.as_of))?;
    if position.shares_balance <= Decimal::ZERO || settings.is_dust(position.shares_balance) {
        return None;
    }
    let price = index.price(&history.vault_id, day)?;
    Some((position, price))
}

/// USD value of `position` at `price`, or `None` if the product does not fit
/// in a `Decimal`.
pub fn position_value(position: &DailyPosition, price: Decimal) -> Option<Decimal> {
    let value = position.shares_balance.checked_mul(price);
    if value.is_none() {
        warn!(
            "Vault {}: {} shares at {} USD overflows; position skipped",
            position.vault_id, position.shares_balance, price
        );
    }
    value
}

/// Values the portfolio on every day known to the snapshot index.
///
/// Days on which no vault contributes value or invested capital are omitted.
/// The result is ascending by date.
pub fn calculate_daily_values(
    histories: &PositionHistories,
    index: &SnapshotIndex,
    settings: &EngineSettings,
) -> Vec<DailyPortfolioValue> {
    let days = index.days();
    let mut values = Vec::with_capacity(days.len());

    for day in days {
        let mut total_value = Decimal::ZERO;
        let mut total_invested = Decimal::ZERO;
        let mut realized_pnl = Decimal::ZERO;

        for history in histories.values() {
            let Some((position, price)) = priced_position(history, index, day, settings) else {
                continue;
            };
            let Some(value) = position_value(position, price) else {
                continue;
            };
            match (
                total_value.checked_add(value),
                total_invested.checked_add(position.total_invested),
                realized_pnl.checked_add(position.realized_pnl_usd),
            ) {
                (Some(next_value), Some(next_invested), Some(next_realized)) => {
                    total_value = next_value;
                    total_invested = next_invested;
                    realized_pnl = next_realized;
                }
                _ => warn!(
                    "Portfolio totals on {} overflow with vault {}; vault skipped",
                    day, history.vault_id
                ),
            }
        }

        if total_value > Decimal::ZERO || total_invested > Decimal::ZERO {
            values.push(DailyPortfolioValue::new(
                day,
                day_start_timestamp(day),
                total_value,
                total_invested,
                realized_pnl,
            ));
        }
    }

    debug!(
        "Valued {} portfolio days across {} vaults",
        values.len(),
        histories.len()
    );
    values
}
