use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use log::{debug, info};
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;

use super::{PortfolioServiceTrait, VaultHistorySourceTrait};
use crate::constants::MAX_CONCURRENT_USER_FETCHES;
use crate::errors::{Result, SourceError};
use crate::portfolio::snapshot::parse_snapshots;
use crate::portfolio::{PortfolioEngine, PortfolioInput, PortfolioReport};
use crate::settings::EngineSettings;
use crate::transactions::parse_transactions;

/// Pulls pages of `page_size` records, advancing the offset by each page's
/// length, until the source returns an empty page.
///
/// Fails with `SourceError::PageLimitExceeded` if `max_pages` non-empty pages
/// were fetched without reaching the end.
pub async fn fetch_all_pages<T, F, Fut>(
    entity: &str,
    page_size: usize,
    max_pages: usize,
    mut fetch_page: F,
) -> Result<Vec<T>>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let mut records = Vec::new();
    let mut skip = 0usize;

    for page_number in 0..max_pages {
        let page = fetch_page(page_size, skip).await?;
        if page.is_empty() {
            debug!(
                "Fetched {} {} in {} pages",
                records.len(),
                entity,
                page_number + 1
            );
            return Ok(records);
        }
        skip += page.len();
        records.extend(page);
    }

    Err(SourceError::PageLimitExceeded {
        entity: entity.to_string(),
        max_pages,
    }
    .into())
}

/// Fetches a user's vault history from a `VaultHistorySourceTrait` and runs the
/// portfolio engine over it.
pub struct PortfolioService {
    source: Arc<dyn VaultHistorySourceTrait>,
    engine: PortfolioEngine,
}

impl PortfolioService {
    pub fn new(source: Arc<dyn VaultHistorySourceTrait>, settings: EngineSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            source,
            engine: PortfolioEngine::new(settings),
        })
    }

    /// Collects every input of one user. Transactions and balances are fetched
    /// together; snapshots and APYs, which need the user's vault set, follow.
    async fn fetch_input(&self, user_address: &str) -> Result<PortfolioInput> {
        let settings = self.engine.settings();

        let (raw_transactions, balances) = futures::try_join!(
            fetch_all_pages(
                "transactions",
                settings.page_size,
                settings.max_pages,
                |first, skip| self.source.fetch_transactions_page(user_address, first, skip),
            ),
            self.source.fetch_current_balances(user_address),
        )?;

        let transactions = parse_transactions(raw_transactions);
        let balances = balances.map(|rows| {
            rows.into_iter()
                .map(|mut row| {
                    row.vault_id = row.vault_id.to_lowercase();
                    row
                })
                .collect::<Vec<_>>()
        });

        let vault_ids: Vec<String> = transactions
            .iter()
            .map(|tx| tx.vault_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if vault_ids.is_empty() {
            debug!("User {} has no vault transactions", user_address);
            return Ok(PortfolioInput {
                balances,
                ..PortfolioInput::default()
            });
        }

        let (raw_snapshots, vault_apys) = futures::try_join!(
            fetch_all_pages(
                "snapshots",
                settings.page_size,
                settings.max_pages,
                |first, skip| self.source.fetch_snapshots_page(&vault_ids, first, skip),
            ),
            self.source.fetch_vault_apys(&vault_ids),
        )?;

        info!(
            "Fetched history for {}: {} transactions, {} snapshots across {} vaults",
            user_address,
            transactions.len(),
            raw_snapshots.len(),
            vault_ids.len()
        );

        Ok(PortfolioInput {
            transactions,
            snapshots: parse_snapshots(raw_snapshots),
            balances,
            vault_apys: vault_apys
                .into_iter()
                .map(|(vault_id, apy)| (vault_id.to_lowercase(), apy))
                .collect(),
        })
    }
}

#[async_trait]
impl PortfolioServiceTrait for PortfolioService {
    async fn get_portfolio(&self, user_address: &str) -> Result<PortfolioReport> {
        let input = self.fetch_input(user_address).await?;
        Ok(self.engine.compute(&input))
    }

    async fn get_portfolios(&self, user_addresses: &[String]) -> Result<Vec<PortfolioReport>> {
        let fetches: Vec<_> = user_addresses
            .iter()
            .map(|user| self.fetch_input(user))
            .collect();
        let inputs: Vec<PortfolioInput> = futures::stream::iter(fetches)
            .buffered(MAX_CONCURRENT_USER_FETCHES)
            .try_collect()
            .await?;
        Ok(self.engine.compute_many(&inputs))
    }
}
