//! Position reconstruction - folds a user's transaction ledger into per-vault
//! running position state.

pub mod position_reconstructor;
mod positions_model;

pub use position_reconstructor::*;
pub use positions_model::*;

#[cfg(test)]
mod position_reconstructor_tests;
