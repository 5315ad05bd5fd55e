//! Fetching a user's vault history from an indexer and feeding it to the engine.

mod history_service;
mod history_traits;

pub use history_service::*;
pub use history_traits::*;
