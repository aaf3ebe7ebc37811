//! JSON report adapter implementing ReportPort.

use std::io::Write;

use serde::Serialize;

use crate::domain::allocation::AllocationResult;
use crate::domain::backtest::BacktestResult;
use crate::domain::error::QuantError;
use crate::domain::strategy::StrategyConfig;
use crate::ports::report_port::ReportPort;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BacktestReport<'a> {
    strategy: &'a StrategyConfig,
    #[serde(flatten)]
    result: &'a BacktestResult,
}

/// Pretty-printed camelCase JSON.
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    fn emit<T: Serialize>(value: &T, out: &mut dyn Write) -> Result<(), QuantError> {
        serde_json::to_writer_pretty(&mut *out, value)?;
        writeln!(out)?;
        Ok(())
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        strategy: &StrategyConfig,
        out: &mut dyn Write,
    ) -> Result<(), QuantError> {
        Self::emit(&BacktestReport { strategy, result }, out)
    }

    fn write_allocation(
        &self,
        result: &AllocationResult,
        out: &mut dyn Write,
    ) -> Result<(), QuantError> {
        Self::emit(result, out)
    }
}
