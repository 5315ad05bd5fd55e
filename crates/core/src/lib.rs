//! Vaultfolio Core - portfolio P&L reconstruction for DeFi vault positions.
//!
//! Given a user's vault transactions and daily vault share-price snapshots, the
//! engine rebuilds each position over time, values the portfolio per day,
//! splits P&L into realized and unrealized parts and derives chart series and
//! KPIs. The engine is synchronous and pure; the `history` module wires it to
//! an asynchronous indexer source.

pub mod constants;
pub mod errors;
pub mod history;
pub mod portfolio;
pub mod settings;
pub mod transactions;
pub mod utils;

// Re-export the engine surface
pub use portfolio::*;
pub use settings::EngineSettings;
pub use transactions::{Transaction, TransactionKind};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
