//! Portfolio P&L reconstruction: positions, snapshots, daily valuation,
//! derived series and KPIs.

pub mod metrics;
pub mod performance;
mod portfolio_engine;
pub mod positions;
pub mod snapshot;
pub mod valuation;

pub use metrics::*;
pub use performance::*;
pub use portfolio_engine::*;
pub use positions::*;
pub use snapshot::*;
pub use valuation::*;

#[cfg(test)]
mod portfolio_engine_tests;
