/// Transaction kinds
///
/// Canonical labels for the ledger events that change a user's vault position.

/// Assets supplied to the vault in exchange for newly minted shares. Adds cost basis.
pub const TRANSACTION_KIND_DEPOSIT: &str = "DEPOSIT";

/// Shares burned for underlying assets. Realizes P&L on the withdrawn portion.
pub const TRANSACTION_KIND_WITHDRAW: &str = "WITHDRAW";

/// Shares received from another address. Adds cost basis at the transfer's USD value.
pub const TRANSACTION_KIND_TRANSFER_IN: &str = "TRANSFER_IN";

/// Shares sent to another address. Realizes P&L like a withdrawal.
pub const TRANSACTION_KIND_TRANSFER_OUT: &str = "TRANSFER_OUT";

/// Accepted aliases seen across indexers, normalized (upper case, no separators).
pub const TRANSACTION_KIND_ALIASES: [(&str, &str); 4] = [
    ("WITHDRAWAL", TRANSACTION_KIND_WITHDRAW),
    ("REDEEM", TRANSACTION_KIND_WITHDRAW),
    ("MINT", TRANSACTION_KIND_DEPOSIT),
    ("SUPPLY", TRANSACTION_KIND_DEPOSIT),
];
