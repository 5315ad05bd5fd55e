use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One chart point: ISO-8601 instant and value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSeriesPoint {
    pub time: String,
    pub value: Decimal,
}

impl TimeSeriesPoint {
    pub fn new(time: String, value: Decimal) -> Self {
        Self { time, value }
    }
}

/// Named series derived from the daily portfolio values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSeries {
    /// Realized plus unrealized P&L in USD per day.
    pub cumulative_pnl: Vec<TimeSeriesPoint>,
    /// Day-over-day change of `cumulative_pnl`; first point is 0.
    pub daily_pnl: Vec<TimeSeriesPoint>,
    /// Portfolio market value in USD per day.
    pub daily_amount_usd: Vec<TimeSeriesPoint>,
    /// USD-weighted share price return per day; first point is 0.
    pub daily_return: Vec<TimeSeriesPoint>,
    /// Running sum of `daily_return`.
    pub cumulative_return: Vec<TimeSeriesPoint>,
}

impl PortfolioSeries {
    pub fn is_empty(&self) -> bool {
        self.cumulative_pnl.is_empty()
    }
}

/// One vault's contribution to a day's weighted return.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnContribution {
    /// USD value of the position at the previous day's price.
    pub previous_value: Decimal,
    /// `current_price / previous_price - 1`.
    pub vault_return: Decimal,
}
