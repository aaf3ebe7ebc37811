//! Core domain types and logic.

pub mod account;
pub mod allocation;
pub mod backtest;
pub mod config_validation;
pub mod error;
pub mod execution;
pub mod indicator;
pub mod metrics;
pub mod position;
pub mod price;
pub mod signal;
pub mod strategy;
