use crate::portfolio::positions::{
    reconstruct_positions, PositionReconstructor, ReconstructionWarningKind,
};
use crate::settings::EngineSettings;
use crate::transactions::{Transaction, TransactionKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const DAY: i64 = 86_400;
const DAY0: i64 = 1_704_067_200; // 2024-01-01T00:00:00Z

fn tx(
    vault: &str,
    timestamp: i64,
    kind: TransactionKind,
    asset_amount_usd: Decimal,
    shares_amount: Decimal,
    balance_after_usd: Decimal,
) -> Transaction {
    Transaction {
        vault_id: vault.to_string(),
        timestamp,
        kind,
        asset_amount_usd,
        shares_amount,
        shares_balance_after_usd: balance_after_usd,
        shares_balance_after: None,
        hash: None,
    }
}

#[test]
fn test_deposit_only_conserves_cost_basis() {
    let transactions = vec![
        tx("v1", DAY0, TransactionKind::Deposit, dec!(100), dec!(10), dec!(100)),
        tx("v1", DAY0 + DAY, TransactionKind::TransferIn, dec!(250.5), dec!(20), dec!(360)),
        tx("v1", DAY0 + 2 * DAY, TransactionKind::Deposit, dec!(49.5), dec!(4), dec!(410)),
    ];

    let result = reconstruct_positions(&transactions);
    let history = &result.histories["v1"];

    assert_eq!(history.positions.len(), 3);
    assert!(history
        .positions
        .iter()
        .all(|p| p.realized_pnl_usd == Decimal::ZERO));
    let last = history.latest().unwrap();
    assert_eq!(last.total_invested, dec!(400));
    assert_eq!(last.total_deposited_usd, dec!(400));
    assert_eq!(last.shares_balance, dec!(34));
    assert!(!result.has_warnings());
}

#[test]
fn test_proportional_cost_basis_on_partial_withdrawal() {
    let transactions = vec![
        tx("v1", DAY0, TransactionKind::Deposit, dec!(1000), dec!(100), dec!(1000)),
        tx("v1", DAY0 + DAY, TransactionKind::Withdraw, dec!(500), dec!(40), dec!(750)),
    ];

    let result = reconstruct_positions(&transactions);
    let after = &result.histories["v1"].positions[1];

    // 1000 * 40/100 = 400 removed; 500 - 400 = 100 realized
    assert_eq!(after.total_invested, dec!(600));
    assert_eq!(after.realized_pnl_usd, dec!(100));
    assert_eq!(after.shares_balance, dec!(60));
    assert_eq!(after.total_withdrawn_usd, dec!(500));
}

#[test]
fn test_negative_share_delta_uses_magnitude() {
    let transactions = vec![
        tx("v1", DAY0, TransactionKind::Deposit, dec!(1000), dec!(100), dec!(1000)),
        tx("v1", DAY0 + DAY, TransactionKind::TransferOut, dec!(300), dec!(-25), dec!(900)),
    ];

    let result = reconstruct_positions(&transactions);
    let after = &result.histories["v1"].positions[1];
    assert_eq!(after.total_invested, dec!(750));
    assert_eq!(after.realized_pnl_usd, dec!(50));
    assert_eq!(after.shares_balance, dec!(75));
}

#[test]
fn test_reported_share_balance_takes_precedence_over_ledger() {
    let mut deposit = tx("v1", DAY0, TransactionKind::Deposit, dec!(1000), dec!(100), dec!(1000));
    deposit.shares_balance_after = Some(dec!(99.9));
    let mut withdraw = tx("v1", DAY0 + DAY, TransactionKind::Withdraw, dec!(500), dec!(49.95), dec!(500));
    withdraw.shares_balance_after = Some(dec!(49.95));

    let result = reconstruct_positions(&[deposit, withdraw]);
    let positions = &result.histories["v1"].positions;
    assert_eq!(positions[0].shares_balance, dec!(99.9));
    // Proportion is taken against the reported previous balance: 49.95 / 99.9 = 0.5
    assert_eq!(positions[1].total_invested, dec!(500));
    assert_eq!(positions[1].realized_pnl_usd, dec!(0));
    assert_eq!(positions[1].shares_balance, dec!(49.95));
}

#[test]
fn test_withdrawal_without_prior_position_is_skipped_and_flagged() {
    let transactions = vec![
        tx("v1", DAY0, TransactionKind::Withdraw, dec!(200), dec!(20), dec!(0)),
        tx("v1", DAY0 + DAY, TransactionKind::Deposit, dec!(1000), dec!(100), dec!(1000)),
    ];

    let result = reconstruct_positions(&transactions);
    let positions = &result.histories["v1"].positions;

    assert_eq!(positions[0].total_invested, Decimal::ZERO);
    assert_eq!(positions[0].realized_pnl_usd, Decimal::ZERO);
    assert_eq!(positions[0].shares_balance, Decimal::ZERO);
    assert_eq!(positions[1].total_invested, dec!(1000));
    assert_eq!(positions[1].shares_balance, dec!(100));

    let kinds: Vec<_> = result.warnings.iter().map(|w| w.kind).collect();
    assert!(kinds.contains(&ReconstructionWarningKind::WithdrawalWithoutPosition));
    assert!(kinds.contains(&ReconstructionWarningKind::NegativeShareLedger));
}

#[test]
fn test_withdrawal_larger_than_position_removes_whole_basis() {
    let transactions = vec![
        tx("v1", DAY0, TransactionKind::Deposit, dec!(1000), dec!(100), dec!(1000)),
        tx("v1", DAY0 + DAY, TransactionKind::Withdraw, dec!(1300), dec!(120), dec!(0)),
    ];

    let result = reconstruct_positions(&transactions);
    let after = &result.histories["v1"].positions[1];
    assert_eq!(after.total_invested, Decimal::ZERO);
    assert_eq!(after.realized_pnl_usd, dec!(300));
    assert_eq!(after.shares_balance, Decimal::ZERO);
    assert!(result
        .warnings
        .iter()
        .any(|w| w.kind == ReconstructionWarningKind::WithdrawalExceedsPosition));
}

#[test]
fn test_sorts_and_groups_mixed_vaults() {
    let transactions = vec![
        tx("b", DAY0 + 2 * DAY, TransactionKind::Withdraw, dec!(60), dec!(5), dec!(60)),
        tx("a", DAY0 + DAY, TransactionKind::Deposit, dec!(10), dec!(1), dec!(10)),
        tx("b", DAY0, TransactionKind::Deposit, dec!(100), dec!(10), dec!(100)),
    ];

    let result = reconstruct_positions(&transactions);
    assert_eq!(result.histories.len(), 2);

    let b = &result.histories["b"].positions;
    assert_eq!(b[0].timestamp, DAY0);
    assert_eq!(b[1].timestamp, DAY0 + 2 * DAY);
    assert_eq!(b[1].total_invested, dec!(50));
    assert_eq!(b[1].realized_pnl_usd, dec!(10));
    assert_eq!(result.histories["a"].positions.len(), 1);
}

#[test]
fn test_equal_timestamps_keep_input_order() {
    let transactions = vec![
        tx("v1", DAY0, TransactionKind::Deposit, dec!(100), dec!(10), dec!(100)),
        tx("v1", DAY0, TransactionKind::Withdraw, dec!(50), dec!(5), dec!(50)),
    ];

    let result = reconstruct_positions(&transactions);
    let positions = &result.histories["v1"].positions;
    assert_eq!(positions[0].kind, TransactionKind::Deposit);
    assert_eq!(positions[1].kind, TransactionKind::Withdraw);
    assert_eq!(positions[1].total_invested, dec!(50));
    assert!(!result.has_warnings());
}

#[test]
fn test_as_of_lookup_is_a_step_function() {
    let transactions = vec![
        tx("v1", DAY0, TransactionKind::Deposit, dec!(100), dec!(10), dec!(100)),
        tx("v1", DAY0 + 3 * DAY, TransactionKind::Deposit, dec!(100), dec!(10), dec!(200)),
    ];
    let result = reconstruct_positions(&transactions);
    let history = &result.histories["v1"];

    assert!(history.as_of(DAY0 - 1).is_none());
    assert_eq!(history.as_of(DAY0).unwrap().shares_balance, dec!(10));
    assert_eq!(history.as_of(DAY0 + 2 * DAY).unwrap().shares_balance, dec!(10));
    assert_eq!(history.as_of(DAY0 + 3 * DAY).unwrap().shares_balance, dec!(20));
    assert_eq!(history.as_of(i64::MAX).unwrap().shares_balance, dec!(20));
}

#[test]
fn test_dust_position_treated_as_empty_on_withdrawal() {
    let settings = EngineSettings {
        dust_threshold: dec!(0.001),
        ..EngineSettings::default()
    };
    let mut deposit = tx("v1", DAY0, TransactionKind::Deposit, dec!(1), dec!(0.0001), dec!(1));
    deposit.shares_balance_after = Some(dec!(0.0001));
    let withdraw = tx("v1", DAY0 + DAY, TransactionKind::Withdraw, dec!(1), dec!(0.0001), dec!(0));

    let result = PositionReconstructor::new(&settings).reconstruct(&[deposit, withdraw]);
    let after = &result.histories["v1"].positions[1];
    assert_eq!(after.total_invested, dec!(1));
    assert_eq!(after.realized_pnl_usd, Decimal::ZERO);
    assert!(result
        .warnings
        .iter()
        .any(|w| w.kind == ReconstructionWarningKind::WithdrawalWithoutPosition));
}

#[test]
fn test_empty_input() {
    let result = reconstruct_positions(&[]);
    assert!(result.histories.is_empty());
    assert!(!result.has_warnings());
}

#[test]
fn test_withdrawal_far_beyond_tiny_position_does_not_overflow() {
    let transactions = vec![
        tx("v", DAY0, TransactionKind::Deposit, dec!(10), dec!(0.00000000001), dec!(10)),
        tx(
            "v",
            DAY0 + DAY,
            TransactionKind::Withdraw,
            dec!(5),
            dec!(1_000_000_000_000_000_000),
            dec!(0),
        ),
    ];

    let result = reconstruct_positions(&transactions);
    let last = result.histories["v"].latest().unwrap();
    assert_eq!(last.total_invested, dec!(0));
    assert_eq!(last.realized_pnl_usd, dec!(-5));
    assert_eq!(last.shares_balance, dec!(0));
    let kinds: Vec<_> = result.warnings.iter().map(|w| w.kind).collect();
    assert!(kinds.contains(&ReconstructionWarningKind::WithdrawalExceedsPosition));
    assert!(kinds.contains(&ReconstructionWarningKind::NegativeShareLedger));
}

#[test]
fn test_withdrawal_of_exact_position_is_not_flagged() {
    let transactions = vec![
        tx("v", DAY0, TransactionKind::Deposit, dec!(1000), dec!(100), dec!(1000)),
        tx("v", DAY0 + DAY, TransactionKind::Withdraw, dec!(1200), dec!(100), dec!(0)),
    ];

    let result = reconstruct_positions(&transactions);
    let last = result.histories["v"].latest().unwrap();
    assert_eq!(last.total_invested, dec!(0));
    assert_eq!(last.realized_pnl_usd, dec!(200));
    assert!(!result.has_warnings());
}
