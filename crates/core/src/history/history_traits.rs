//! Source traits for vault history.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::errors::Result;
use crate::portfolio::metrics::VaultBalance;
use crate::portfolio::snapshot::RawDailySnapshot;
use crate::portfolio::PortfolioReport;
use crate::transactions::RawTransaction;

/// Upstream indexer holding users' vault transactions and daily vault snapshots.
///
/// Paged methods follow offset pagination: return at most `first` records
/// starting after `skip`, and an empty page once exhausted. Query construction
/// and transport are up to the implementor.
#[async_trait]
pub trait VaultHistorySourceTrait: Send + Sync {
    async fn fetch_transactions_page(
        &self,
        user_address: &str,
        first: usize,
        skip: usize,
    ) -> Result<Vec<RawTransaction>>;

    async fn fetch_snapshots_page(
        &self,
        vault_ids: &[String],
        first: usize,
        skip: usize,
    ) -> Result<Vec<RawDailySnapshot>>;

    /// Current balances if the source tracks them; `None` lets the engine
    /// derive balances from the history.
    async fn fetch_current_balances(&self, user_address: &str) -> Result<Option<Vec<VaultBalance>>>;

    /// Advertised APY per vault id. Vaults without one may be omitted.
    async fn fetch_vault_apys(&self, vault_ids: &[String]) -> Result<HashMap<String, Decimal>>;
}

#[async_trait]
pub trait PortfolioServiceTrait: Send + Sync {
    /// Fetches the full history of `user_address` and computes its report.
    async fn get_portfolio(&self, user_address: &str) -> Result<PortfolioReport>;

    /// Computes reports for several users, in input order. A bounded number of
    /// fetches run concurrently; the engine runs once all inputs are in.
    async fn get_portfolios(&self, user_addresses: &[String]) -> Result<Vec<PortfolioReport>>;
}
