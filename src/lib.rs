//! quantlab: signal-driven single-asset backtester.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;

pub use domain::allocation::{AllocationResult, AllocationSlot, run_allocation};
pub use domain::backtest::{BacktestResult, EngineOptions, run_backtest, run_backtest_with};
pub use domain::error::QuantError;
