//! Transaction domain models.

use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;
use crate::transactions::transactions_constants::*;
use crate::utils::raw_value::{
    optional_decimal, required_decimal, required_timestamp, RawNumber,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
    TransferIn,
    TransferOut,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => TRANSACTION_KIND_DEPOSIT,
            TransactionKind::Withdraw => TRANSACTION_KIND_WITHDRAW,
            TransactionKind::TransferIn => TRANSACTION_KIND_TRANSFER_IN,
            TransactionKind::TransferOut => TRANSACTION_KIND_TRANSFER_OUT,
        }
    }

    /// Deposits and incoming transfers add to the position and its cost basis.
    /// Everything else is an outflow that realizes P&L on the removed portion.
    pub fn is_inflow(&self) -> bool {
        matches!(self, TransactionKind::Deposit | TransactionKind::TransferIn)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = ValidationError;

    /// Case-insensitive; `_`, `-` and spaces are ignored so `TransferIn`,
    /// `transfer_in` and `TRANSFER-IN` all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_uppercase();
        let canonical = TRANSACTION_KIND_ALIASES
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|(_, kind)| kind.replace('_', ""))
            .unwrap_or(normalized);

        match canonical.as_str() {
            "DEPOSIT" => Ok(TransactionKind::Deposit),
            "WITHDRAW" => Ok(TransactionKind::Withdraw),
            "TRANSFERIN" => Ok(TransactionKind::TransferIn),
            "TRANSFEROUT" => Ok(TransactionKind::TransferOut),
            _ => Err(ValidationError::UnknownTransactionKind(s.to_string())),
        }
    }
}

/// A single position-changing event for one vault, as consumed by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub vault_id: String,
    /// UNIX seconds of the block the event was recorded in.
    pub timestamp: i64,
    pub kind: TransactionKind,
    /// USD value of the underlying moved, at transaction time.
    pub asset_amount_usd: Decimal,
    /// Share delta. Only the magnitude is used; direction comes from `kind`.
    pub shares_amount: Decimal,
    /// USD value of the whole share balance right after the event.
    pub shares_balance_after_usd: Decimal,
    /// Share balance right after the event, when the indexer reports it.
    #[serde(default)]
    pub shares_balance_after: Option<Decimal>,
    #[serde(default)]
    pub hash: Option<String>,
}

/// A transaction record exactly as delivered by an indexer. Every field is
/// optional and numeric fields may be strings; `Transaction::try_from` is the
/// validating boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    #[serde(default, alias = "vault", alias = "vaultAddress")]
    pub vault_id: Option<String>,
    #[serde(default, alias = "timestampSec", alias = "blockTimestamp")]
    pub timestamp: Option<RawNumber>,
    #[serde(default, alias = "type", alias = "transactionType")]
    pub kind: Option<String>,
    #[serde(default, alias = "assetAmountUSD")]
    pub asset_amount_usd: Option<RawNumber>,
    #[serde(default)]
    pub shares_amount: Option<RawNumber>,
    #[serde(default, alias = "sharesBalanceAfterUSD")]
    pub shares_balance_after_usd: Option<RawNumber>,
    #[serde(default)]
    pub shares_balance_after: Option<RawNumber>,
    #[serde(default, alias = "transactionHash")]
    pub hash: Option<String>,
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = ValidationError;

    fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
        let vault_id = raw
            .vault_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ValidationError::MissingField("vaultId".to_string()))?;
        let timestamp = required_timestamp(raw.timestamp.as_ref())?;
        let kind = raw
            .kind
            .as_deref()
            .ok_or_else(|| ValidationError::MissingField("kind".to_string()))?
            .parse::<TransactionKind>()?;

        Ok(Transaction {
            vault_id: vault_id.to_lowercase(),
            timestamp,
            kind,
            asset_amount_usd: required_decimal(raw.asset_amount_usd.as_ref(), "assetAmountUsd")?,
            shares_amount: required_decimal(raw.shares_amount.as_ref(), "sharesAmount")?,
            shares_balance_after_usd: optional_decimal(
                raw.shares_balance_after_usd.as_ref(),
                "sharesBalanceAfterUsd",
            )?
            .unwrap_or(Decimal::ZERO),
            shares_balance_after: optional_decimal(
                raw.shares_balance_after.as_ref(),
                "sharesBalanceAfter",
            )?,
            hash: raw.hash,
        })
    }
}

/// Converts raw records into transactions, dropping the ones that fail
/// validation. Each dropped record is logged with its position in the batch.
pub fn parse_transactions(raw: Vec<RawTransaction>) -> Vec<Transaction> {
    let total = raw.len();
    let parsed: Vec<Transaction> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let hash = record.hash.clone();
            match Transaction::try_from(record) {
                Ok(tx) => Some(tx),
                Err(e) => {
                    warn!(
                        "Dropping transaction #{} (hash {}): {}",
                        index,
                        hash.as_deref().unwrap_or("<none>"),
                        e
                    );
                    None
                }
            }
        })
        .collect();

    if parsed.len() < total {
        warn!(
            "Dropped {} of {} transactions during validation",
            total - parsed.len(),
            total
        );
    }
    parsed
}

/// Parses a JSON array of transaction records. A record of the wrong shape is
/// dropped like any other invalid record; only a payload that is not an array
/// is an error.
pub fn parse_transactions_json(payload: &str) -> crate::Result<Vec<Transaction>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(payload)?;
    let raw = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Dropping transaction #{}: malformed record: {}", index, e);
                None
            }
        })
        .collect();
    Ok(parse_transactions(raw))
}
