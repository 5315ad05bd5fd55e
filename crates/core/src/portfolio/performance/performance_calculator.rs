use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;

use crate::constants::DECIMAL_PRECISION;
use crate::portfolio::performance::{PortfolioSeries, ReturnContribution, TimeSeriesPoint};
use crate::portfolio::positions::PositionHistories;
use crate::portfolio::snapshot::SnapshotIndex;
use crate::portfolio::valuation::{position_value, priced_position, DailyPortfolioValue};
use crate::settings::EngineSettings;
use crate::utils::time_utils::iso_day_start;

fn point(value: &DailyPortfolioValue, amount: Decimal) -> TimeSeriesPoint {
    TimeSeriesPoint::new(iso_day_start(value.date), amount)
}

/// Total (realized + unrealized) P&L per day.
pub fn cumulative_pnl_series(values: &[DailyPortfolioValue]) -> Vec<TimeSeriesPoint> {
    values.iter().map(|v| point(v, v.total_pnl_usd)).collect()
}

/// Day-over-day change in total P&L. The first day has no baseline and is 0.
pub fn daily_pnl_series(values: &[DailyPortfolioValue]) -> Vec<TimeSeriesPoint> {
    let mut series = Vec::with_capacity(values.len());
    let mut previous: Option<Decimal> = None;
    for value in values {
        let delta = previous.map_or(Decimal::ZERO, |prev| value.total_pnl_usd.saturating_sub(prev));
        series.push(point(value, delta));
        previous = Some(value.total_pnl_usd);
    }
    series
}

/// Portfolio market value in USD per day.
pub fn daily_amount_series(values: &[DailyPortfolioValue]) -> Vec<TimeSeriesPoint> {
    values.iter().map(|v| point(v, v.total_value_usd)).collect()
}

/// `Σ(previous_value × vault_return) / Σ(previous_value)`, or 0 when nothing
/// carries weight. Contributions that would overflow the sums are left out.
pub fn weighted_return(contributions: &[ReturnContribution]) -> Decimal {
    let mut weighted_sum = Decimal::ZERO;
    let mut weight = Decimal::ZERO;
    for c in contributions {
        let next = c
            .previous_value
            .checked_mul(c.vault_return)
            .and_then(|weighted| weighted_sum.checked_add(weighted))
            .zip(weight.checked_add(c.previous_value));
        match next {
            Some((sum, total)) => {
                weighted_sum = sum;
                weight = total;
            }
            None => warn!(
                "Return contribution {} x {} overflows; left out of the weighting",
                c.previous_value, c.vault_return
            ),
        }
    }
    if weight.is_zero() {
        Decimal::ZERO
    } else {
        weighted_sum.checked_div(weight).unwrap_or(Decimal::ZERO)
    }
}

/// Per-vault return contributions between `previous_day` and `day`.
///
/// A vault contributes only when it held shares as of `previous_day` and has a
/// usable price on both days. A zero previous price yields no return and is
/// skipped, as is a vault whose value or price ratio overflows.
pub fn vault_contributions(
    histories: &PositionHistories,
    index: &SnapshotIndex,
    previous_day: NaiveDate,
    day: NaiveDate,
    settings: &EngineSettings,
) -> Vec<ReturnContribution> {
    histories
        .values()
        .filter_map(|history| {
            let (position, previous_price) =
                priced_position(history, index, previous_day, settings)?;
            if previous_price.is_zero() {
                return None;
            }
            let current_price = index.price(&history.vault_id, day)?;
            let previous_value = position_value(position, previous_price)?;
            let Some(price_ratio) = current_price.checked_div(previous_price) else {
                warn!(
                    "Vault {}: price move {} -> {} overflows; left out of {} return",
                    history.vault_id, previous_price, current_price, day
                );
                return None;
            };
            Some(ReturnContribution {
                previous_value,
                vault_return: price_ratio - Decimal::ONE,
            })
        })
        .collect()
}

/// USD-weighted share price return per portfolio day, scaled by
/// `settings.percent_scale`. The first day is 0.
///
/// Returns come from share prices, not from the aggregate value, so deposits
/// and withdrawals do not show up as performance.
pub fn daily_return_series(
    values: &[DailyPortfolioValue],
    histories: &PositionHistories,
    index: &SnapshotIndex,
    settings: &EngineSettings,
) -> Vec<TimeSeriesPoint> {
    let mut series = Vec::with_capacity(values.len());
    let mut previous_day: Option<NaiveDate> = None;

    for value in values {
        let daily_return = match previous_day {
            None => Decimal::ZERO,
            Some(prev) => {
                let contributions = vault_contributions(histories, index, prev, value.date, settings);
                weighted_return(&contributions)
            }
        };
        let scaled = daily_return
            .checked_mul(settings.percent_scale)
            .unwrap_or_else(|| {
                warn!("Return on {} overflows once scaled; reported as 0", value.date);
                Decimal::ZERO
            });
        series.push(point(value, scaled.round_dp(DECIMAL_PRECISION)));
        previous_day = Some(value.date);
    }
    series
}

/// Running sum of a daily return series.
pub fn cumulative_return_series(daily_returns: &[TimeSeriesPoint]) -> Vec<TimeSeriesPoint> {
    let mut running = Decimal::ZERO;
    daily_returns
        .iter()
        .map(|p| {
            running = running.saturating_add(p.value);
            TimeSeriesPoint::new(p.time.clone(), running)
        })
        .collect()
}

/// Derives every named series from the daily values.
pub fn derive_series(
    values: &[DailyPortfolioValue],
    histories: &PositionHistories,
    index: &SnapshotIndex,
    settings: &EngineSettings,
) -> PortfolioSeries {
    let daily_return = daily_return_series(values, histories, index, settings);
    let cumulative_return = cumulative_return_series(&daily_return);
    debug!("Derived portfolio series over {} days", values.len());

    PortfolioSeries {
        cumulative_pnl: cumulative_pnl_series(values),
        daily_pnl: daily_pnl_series(values),
        daily_amount_usd: daily_amount_series(values),
        daily_return,
        cumulative_return,
    }
}
