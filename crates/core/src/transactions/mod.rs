//! Vault transactions: the position-changing ledger events of a user.

pub mod transactions_constants;
mod transactions_model;

pub use transactions_model::*;
