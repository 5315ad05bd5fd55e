//! Portfolio valuation domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregate value of a user's vault positions on one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyPortfolioValue {
    /// UNIX seconds of UTC midnight starting `date`.
    pub timestamp: i64,
    pub date: NaiveDate,
    pub total_value_usd: Decimal,
    pub total_invested_usd: Decimal,
    pub unrealized_pnl_usd: Decimal,
    pub realized_pnl_usd: Decimal,
    pub total_pnl_usd: Decimal,
}

impl DailyPortfolioValue {
    pub fn new(
        date: NaiveDate,
        timestamp: i64,
        total_value_usd: Decimal,
        total_invested_usd: Decimal,
        realized_pnl_usd: Decimal,
    ) -> Self {
        let unrealized_pnl_usd = total_value_usd.saturating_sub(total_invested_usd);
        Self {
            timestamp,
            date,
            total_value_usd,
            total_invested_usd,
            unrealized_pnl_usd,
            realized_pnl_usd,
            total_pnl_usd: unrealized_pnl_usd.saturating_add(realized_pnl_usd),
        }
    }
}
