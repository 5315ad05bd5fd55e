use log::{debug, info};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::portfolio::metrics::{current_balances, summarize_metrics, PortfolioMetrics, VaultBalance};
use crate::portfolio::performance::{derive_series, PortfolioSeries};
use crate::portfolio::positions::{PositionHistories, PositionReconstructor, ReconstructionWarning};
use crate::portfolio::snapshot::{DailySnapshot, SnapshotIndex};
use crate::portfolio::valuation::{calculate_daily_values, DailyPortfolioValue};
use crate::settings::EngineSettings;
use crate::transactions::Transaction;

/// Everything the engine needs for one user, already fetched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioInput {
    pub transactions: Vec<Transaction>,
    pub snapshots: Vec<DailySnapshot>,
    /// Current balances reported by the indexer. Derived from the history
    /// when absent.
    #[serde(default)]
    pub balances: Option<Vec<VaultBalance>>,
    /// Advertised APY per vault id.
    #[serde(default)]
    pub vault_apys: HashMap<String, Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioReport {
    pub positions: PositionHistories,
    pub daily_values: Vec<DailyPortfolioValue>,
    pub series: PortfolioSeries,
    pub metrics: PortfolioMetrics,
    pub warnings: Vec<ReconstructionWarning>,
}

/// Runs the full pipeline: reconstruct positions, index snapshots, value each
/// day, derive series and summarize.
///
/// Holds no state besides its settings, so one engine can serve any number of
/// users concurrently.
#[derive(Debug, Clone, Default)]
pub struct PortfolioEngine {
    settings: EngineSettings,
}

impl PortfolioEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn compute(&self, input: &PortfolioInput) -> PortfolioReport {
        if input.transactions.is_empty() && input.snapshots.is_empty() {
            debug!("No transactions or snapshots; returning an empty report");
            let metrics = input
                .balances
                .as_deref()
                .map(|balances| summarize_metrics(balances, &input.vault_apys))
                .unwrap_or_default();
            return PortfolioReport {
                metrics,
                ..PortfolioReport::default()
            };
        }

        let reconstruction =
            PositionReconstructor::new(&self.settings).reconstruct(&input.transactions);
        let index = SnapshotIndex::build(&input.snapshots);

        let daily_values = calculate_daily_values(&reconstruction.histories, &index, &self.settings);
        let series = derive_series(&daily_values, &reconstruction.histories, &index, &self.settings);

        let metrics = match input.balances.as_deref() {
            Some(balances) => summarize_metrics(balances, &input.vault_apys),
            None => {
                let derived = current_balances(&reconstruction.histories, &index, &self.settings);
                summarize_metrics(&derived, &input.vault_apys)
            }
        };

        info!(
            "Portfolio computed: {} vaults, {} valued days, {} warnings",
            reconstruction.histories.len(),
            daily_values.len(),
            reconstruction.warnings.len()
        );

        PortfolioReport {
            positions: reconstruction.histories,
            daily_values,
            series,
            metrics,
            warnings: reconstruction.warnings,
        }
    }

    /// Computes independent portfolios in parallel. Output order matches input.
    pub fn compute_many(&self, inputs: &[PortfolioInput]) -> Vec<PortfolioReport> {
        inputs.par_iter().map(|input| self.compute(input)).collect()
    }
}
