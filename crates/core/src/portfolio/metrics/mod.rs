//! Scalar portfolio KPIs computed from current per-vault balances.

pub mod metrics_calculator;
mod metrics_model;

pub use metrics_calculator::*;
pub use metrics_model::*;
