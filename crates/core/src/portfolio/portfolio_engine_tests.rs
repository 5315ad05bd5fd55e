use crate::portfolio::{PortfolioEngine, PortfolioInput, PortfolioMetrics, VaultBalance};
use crate::portfolio::snapshot::{parse_snapshots_json, DailySnapshot};
use crate::settings::EngineSettings;
use crate::transactions::{parse_transactions_json, Transaction, TransactionKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

const DAY: i64 = 86_400;
const DAY0: i64 = 1_704_067_200;

fn scenario() -> PortfolioInput {
    PortfolioInput {
        transactions: vec![
            Transaction {
                vault_id: "v".to_string(),
                timestamp: DAY0 + 10 * DAY,
                kind: TransactionKind::Withdraw,
                asset_amount_usd: dec!(550),
                shares_amount: dec!(50),
                shares_balance_after_usd: dec!(550),
                shares_balance_after: None,
                hash: Some("0x2".to_string()),
            },
            Transaction {
                vault_id: "v".to_string(),
                timestamp: DAY0,
                kind: TransactionKind::Deposit,
                asset_amount_usd: dec!(1000),
                shares_amount: dec!(100),
                shares_balance_after_usd: dec!(1000),
                shares_balance_after: None,
                hash: Some("0x1".to_string()),
            },
        ],
        snapshots: vec![
            DailySnapshot {
                vault_id: "v".to_string(),
                timestamp: DAY0,
                share_price_usd: Some(dec!(10)),
                total_supply: dec!(1000),
                total_assets: dec!(10000),
            },
            DailySnapshot {
                vault_id: "v".to_string(),
                timestamp: DAY0 + 10 * DAY,
                share_price_usd: Some(dec!(11)),
                total_supply: dec!(1000),
                total_assets: dec!(11000),
            },
        ],
        balances: None,
        vault_apys: HashMap::from([("v".to_string(), dec!(0.07))]),
    }
}

#[test]
fn test_compute_end_to_end_scenario() {
    let report = PortfolioEngine::default().compute(&scenario());

    assert!(report.warnings.is_empty());
    assert_eq!(report.daily_values.len(), 2);
    let last = report.daily_values.last().unwrap();
    assert_eq!(last.total_value_usd, dec!(550));
    assert_eq!(last.total_invested_usd, dec!(500));
    assert_eq!(last.unrealized_pnl_usd, dec!(50));
    assert_eq!(last.realized_pnl_usd, dec!(50));
    assert_eq!(last.total_pnl_usd, dec!(100));

    assert_eq!(report.series.cumulative_pnl[1].value, dec!(100));
    assert_eq!(report.series.daily_pnl[0].value, dec!(0));
    assert_eq!(report.series.daily_pnl[1].value, dec!(100));
    assert_eq!(report.series.daily_amount_usd[0].value, dec!(1000));
    assert_eq!(report.series.daily_return[1].value, dec!(0.1));

    assert_eq!(report.metrics.total_balance_usd, dec!(550));
    assert_eq!(report.metrics.total_realized_pnl_usd, dec!(50));
    assert_eq!(report.metrics.total_unrealized_pnl_usd, dec!(50));
    assert_eq!(report.metrics.positions_apy, dec!(0.07));
    assert_eq!(report.metrics.last_updated_timestamp, DAY0 + 10 * DAY);
}

#[test]
fn test_compute_prefers_reported_balances() {
    let mut input = scenario();
    input.balances = Some(vec![VaultBalance {
        vault_id: "v".to_string(),
        balance_usd: dec!(560),
        realized_pnl_usd: dec!(50),
        unrealized_pnl_usd: dec!(60),
        total_deposited_usd: dec!(1000),
        total_withdrawn_usd: dec!(550),
        last_updated_timestamp: DAY0 + 11 * DAY,
    }]);

    let report = PortfolioEngine::default().compute(&input);
    assert_eq!(report.metrics.total_balance_usd, dec!(560));
    assert_eq!(report.metrics.last_updated_timestamp, DAY0 + 11 * DAY);
}

#[test]
fn test_compute_empty_input_is_empty_and_zeroed() {
    let report = PortfolioEngine::default().compute(&PortfolioInput::default());
    assert!(report.positions.is_empty());
    assert!(report.daily_values.is_empty());
    assert!(report.series.is_empty());
    assert_eq!(report.metrics, PortfolioMetrics::default());
    assert_eq!(report.metrics.total_balance_usd, Decimal::ZERO);
}

#[test]
fn test_compute_many_matches_sequential() {
    let engine = PortfolioEngine::new(EngineSettings::default());
    let inputs = vec![scenario(), PortfolioInput::default(), scenario()];

    let parallel = engine.compute_many(&inputs);
    let sequential: Vec<_> = inputs.iter().map(|i| engine.compute(i)).collect();
    assert_eq!(parallel, sequential);
    assert!(parallel[1].daily_values.is_empty());
}

#[test]
fn test_report_serializes_chart_series() {
    let report = PortfolioEngine::default().compute(&scenario());
    let json = serde_json::to_value(&report).unwrap();
    let points = json["series"]["cumulativePnl"].as_array().unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[1]["time"], "2024-01-11T00:00:00.000Z");
    assert_eq!(points[1]["value"], 100.0);
}

#[test]
fn test_extreme_but_valid_records_do_not_abort_the_batch() {
    let outsized_withdrawal = PortfolioInput {
        transactions: parse_transactions_json(
            r#"[
                {"vaultId": "0xa", "timestamp": 1704067200, "kind": "DEPOSIT",
                 "assetAmountUsd": "10", "sharesAmount": "0.00000000001"},
                {"vaultId": "0xa", "timestamp": 1704153600, "kind": "WITHDRAW",
                 "assetAmountUsd": "5", "sharesAmount": "1000000000000000000"}
            ]"#,
        )
        .unwrap(),
        snapshots: parse_snapshots_json(
            r#"[
                {"vaultId": "0xa", "timestamp": 1704067200, "sharePriceUsd": "1"},
                {"vaultId": "0xa", "timestamp": 1704153600, "sharePriceUsd": "1"}
            ]"#,
        )
        .unwrap(),
        ..PortfolioInput::default()
    };
    let outsized_value = PortfolioInput {
        transactions: parse_transactions_json(
            r#"[{"vaultId": "0xb", "timestamp": 1704067200, "kind": "DEPOSIT",
                 "assetAmountUsd": "100", "sharesAmount": "1000000000000000000000",
                 "sharesBalanceAfterUsd": "100"}]"#,
        )
        .unwrap(),
        snapshots: parse_snapshots_json(
            r#"[
                {"vaultId": "0xb", "timestamp": 1704067200, "sharePriceUsd": "100000000000"},
                {"vaultId": "0xb", "timestamp": 1704153600, "sharePriceUsd": "100000000000"}
            ]"#,
        )
        .unwrap(),
        ..PortfolioInput::default()
    };
    assert_eq!(outsized_withdrawal.transactions.len(), 2);
    assert_eq!(outsized_value.transactions.len(), 1);

    let engine = PortfolioEngine::default();
    let reports = engine.compute_many(&[outsized_withdrawal, scenario(), outsized_value]);

    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].metrics.total_realized_pnl_usd, dec!(-5));
    assert!(!reports[0].warnings.is_empty());
    assert_eq!(reports[1].daily_values.last().unwrap().total_pnl_usd, dec!(100));
    assert!(reports[2].daily_values.is_empty());
    assert_eq!(reports[2].metrics.total_balance_usd, dec!(100));
}
