use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::utils::raw_value::{optional_decimal, required_timestamp, RawNumber};

/// State of one vault at the start of one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySnapshot {
    pub vault_id: String,
    /// UNIX seconds, start of the day.
    pub timestamp: i64,
    /// USD value of one share. `None` when the indexer had no price that day.
    #[serde(default)]
    pub share_price_usd: Option<Decimal>,
    pub total_supply: Decimal,
    pub total_assets: Decimal,
}

impl DailySnapshot {
    /// Share price usable for valuation. Negative prices are treated as absent.
    pub fn usable_price(&self) -> Option<Decimal> {
        self.share_price_usd.filter(|price| !price.is_sign_negative())
    }
}

/// A snapshot record as delivered by an indexer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDailySnapshot {
    #[serde(default, alias = "vault", alias = "vaultAddress")]
    pub vault_id: Option<String>,
    #[serde(default, alias = "timestampSec", alias = "dayTimestamp")]
    pub timestamp: Option<RawNumber>,
    #[serde(default, alias = "sharePriceUSD", alias = "pricePerShareUsd")]
    pub share_price_usd: Option<RawNumber>,
    #[serde(default)]
    pub total_supply: Option<RawNumber>,
    #[serde(default)]
    pub total_assets: Option<RawNumber>,
}

impl TryFrom<RawDailySnapshot> for DailySnapshot {
    type Error = ValidationError;

    fn try_from(raw: RawDailySnapshot) -> Result<Self, Self::Error> {
        let vault_id = raw
            .vault_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ValidationError::MissingField("vaultId".to_string()))?;
        let timestamp = required_timestamp(raw.timestamp.as_ref())?;

        // An unparseable price is the same as a missing one: the day is skipped
        // during valuation, but supply figures stay useful.
        let share_price_usd = match optional_decimal(raw.share_price_usd.as_ref(), "sharePriceUsd")
        {
            Ok(price) => price,
            Err(e) => {
                warn!("Snapshot {} at {}: {}. Price treated as missing.", vault_id, timestamp, e);
                None
            }
        };

        Ok(DailySnapshot {
            vault_id: vault_id.to_lowercase(),
            timestamp,
            share_price_usd,
            total_supply: optional_decimal(raw.total_supply.as_ref(), "totalSupply")?
                .unwrap_or(Decimal::ZERO),
            total_assets: optional_decimal(raw.total_assets.as_ref(), "totalAssets")?
                .unwrap_or(Decimal::ZERO),
        })
    }
}

/// Converts raw snapshot records, dropping and logging invalid ones.
pub fn parse_snapshots(raw: Vec<RawDailySnapshot>) -> Vec<DailySnapshot> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, record)| match DailySnapshot::try_from(record) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("Dropping snapshot #{}: {}", index, e);
                None
            }
        })
        .collect()
}

/// Parses a JSON array of snapshot records. Wrong-shaped elements are dropped.
pub fn parse_snapshots_json(payload: &str) -> crate::Result<Vec<DailySnapshot>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(payload)?;
    let raw = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Dropping snapshot #{}: malformed record: {}", index, e);
                None
            }
        })
        .collect();
    Ok(parse_snapshots(raw))
}
