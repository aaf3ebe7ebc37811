//! Report output port trait.

use std::io::Write;

use crate::domain::allocation::AllocationResult;
use crate::domain::backtest::BacktestResult;
use crate::domain::error::QuantError;
use crate::domain::strategy::StrategyConfig;

/// Port for rendering backtest results.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        strategy: &StrategyConfig,
        out: &mut dyn Write,
    ) -> Result<(), QuantError>;

    fn write_allocation(
        &self,
        result: &AllocationResult,
        out: &mut dyn Write,
    ) -> Result<(), QuantError>;
}
