//! Core domain types and logic.

pub mod cadence;
pub mod config_validation;
pub mod cost_model;
pub mod error;
pub mod ledger;
pub mod series;
pub mod simulator;
pub mod snapshot;
pub mod summary;
