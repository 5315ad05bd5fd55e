//! Daily vault snapshots and their per-day index.

pub mod snapshot_index;
mod snapshot_model;

pub use snapshot_index::*;
pub use snapshot_model::*;
