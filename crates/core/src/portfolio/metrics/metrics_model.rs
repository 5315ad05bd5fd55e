use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current state of a user's position in one vault.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultBalance {
    pub vault_id: String,
    pub balance_usd: Decimal,
    pub realized_pnl_usd: Decimal,
    pub unrealized_pnl_usd: Decimal,
    pub total_deposited_usd: Decimal,
    pub total_withdrawn_usd: Decimal,
    /// UNIX seconds of the last change to this balance.
    pub last_updated_timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultMetrics {
    pub vault_id: String,
    pub realized_pnl_usd: Decimal,
    pub unrealized_pnl_usd: Decimal,
    pub balance_usd: Decimal,
    pub total_deposited_usd: Decimal,
    pub total_withdrawn_usd: Decimal,
}

impl From<&VaultBalance> for VaultMetrics {
    fn from(balance: &VaultBalance) -> Self {
        Self {
            vault_id: balance.vault_id.clone(),
            realized_pnl_usd: balance.realized_pnl_usd,
            unrealized_pnl_usd: balance.unrealized_pnl_usd,
            balance_usd: balance.balance_usd,
            total_deposited_usd: balance.total_deposited_usd,
            total_withdrawn_usd: balance.total_withdrawn_usd,
        }
    }
}

/// Portfolio-wide KPIs. `Default` is the all-zero summary of an empty portfolio.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMetrics {
    #[serde(rename = "totalRealizedPnLUSD")]
    pub total_realized_pnl_usd: Decimal,
    #[serde(rename = "totalUnrealizedPnLUSD")]
    pub total_unrealized_pnl_usd: Decimal,
    #[serde(rename = "totalBalanceUSD")]
    pub total_balance_usd: Decimal,
    pub per_vault_metrics: Vec<VaultMetrics>,
    pub last_updated_timestamp: i64,
    /// USD-weighted average of the advertised APY of held vaults.
    pub positions_apy: Decimal,
}

/// A strategy or market a vault allocates liquidity to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldSource {
    pub id: String,
    pub liquidity_usd: Decimal,
    #[serde(default)]
    pub apy: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldProportion {
    pub id: String,
    /// Share of the vault's total liquidity, in `[0, 1]`.
    pub proportion: Decimal,
}
