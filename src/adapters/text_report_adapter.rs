//! Plain-text report adapter: metrics summary, monthly returns and trade log.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::Datelike;

use crate::domain::account::EquityPoint;
use crate::domain::allocation::AllocationResult;
use crate::domain::backtest::BacktestResult;
use crate::domain::error::QuantError;
use crate::domain::metrics::Metrics;
use crate::domain::position::TradeRecord;
use crate::domain::strategy::StrategyConfig;
use crate::ports::report_port::ReportPort;

pub struct TextReportAdapter;

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyReturn {
    pub year: i32,
    pub month: u32,
    pub return_pct: f64,
}

/// Month-end to month-end returns. The first month is measured from the
/// first point of the curve.
pub fn monthly_returns(equity_curve: &[EquityPoint]) -> Vec<MonthlyReturn> {
    let Some(first) = equity_curve.first() else {
        return Vec::new();
    };

    let mut month_end: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for point in equity_curve {
        month_end.insert((point.date.year(), point.date.month()), point.strategy_value);
    }

    let mut prev = first.strategy_value;
    month_end
        .into_iter()
        .map(|((year, month), end)| {
            let return_pct = if prev > 0.0 {
                (end - prev) / prev * 100.0
            } else {
                0.0
            };
            prev = end;
            MonthlyReturn {
                year,
                month,
                return_pct,
            }
        })
        .collect()
}

fn format_ratio(value: f64) -> String {
    if value.is_infinite() {
        "inf".to_string()
    } else {
        format!("{value:.2}")
    }
}

fn write_metrics(out: &mut dyn Write, m: &Metrics) -> std::io::Result<()> {
    writeln!(out, "Total Return:     {:.2}%", m.total_return_pct)?;
    writeln!(out, "Annual Return:    {:.2}%", m.annual_return_pct)?;
    writeln!(out, "Benchmark:        {:.2}%", m.benchmark_return_pct)?;
    writeln!(out, "Excess Return:    {:.2}%", m.excess_return_pct)?;
    writeln!(out, "Sharpe Ratio:     {:.2}", m.sharpe_ratio)?;
    writeln!(out, "Volatility:       {:.2}%", m.volatility_pct)?;
    writeln!(out, "Max Drawdown:     {:.2}%", m.max_drawdown_pct)?;
    writeln!(out, "Trades:           {}", m.trade_count)?;
    writeln!(
        out,
        "Win Rate:         {:.1}% ({} won, {} lost)",
        m.win_rate_pct, m.winning_trades, m.losing_trades
    )?;
    writeln!(out, "Profit Factor:    {}", format_ratio(m.profit_factor))?;
    writeln!(out, "Largest Win:      {:.2}", m.largest_win)?;
    writeln!(out, "Largest Loss:     {:.2}", m.largest_loss)
}

fn write_monthly(out: &mut dyn Write, equity_curve: &[EquityPoint]) -> std::io::Result<()> {
    let returns = monthly_returns(equity_curve);
    if returns.is_empty() {
        return Ok(());
    }
    writeln!(out, "\nMonthly Returns")?;
    for r in &returns {
        writeln!(out, "  {}-{:02}  {:>8.2}%", r.year, r.month, r.return_pct)?;
    }
    Ok(())
}

fn write_trades(out: &mut dyn Write, trades: &[TradeRecord]) -> std::io::Result<()> {
    writeln!(out, "\nTrades")?;
    if trades.is_empty() {
        return writeln!(out, "  (none)");
    }
    writeln!(
        out,
        "  {:<10}  {:<4}  {:>10}  {:>12}  {:>14}  {:>12}  Reason",
        "Date", "Side", "Price", "Quantity", "Amount", "Profit"
    )?;
    for t in trades {
        let side = if t.is_sell() { "SELL" } else { "BUY" };
        let profit = t
            .profit
            .map(|p| format!("{p:.2}"))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "  {:<10}  {:<4}  {:>10.2}  {:>12.2}  {:>14.2}  {:>12}  {}",
            t.date, side, t.price, t.quantity, t.amount, profit, t.reason
        )?;
    }
    Ok(())
}

fn write_period(out: &mut dyn Write, equity_curve: &[EquityPoint]) -> std::io::Result<()> {
    if let (Some(first), Some(last)) = (equity_curve.first(), equity_curve.last()) {
        writeln!(
            out,
            "Period:           {} to {} ({} bars)",
            first.date,
            last.date,
            equity_curve.len()
        )?;
        writeln!(out, "Final Value:      {:.2}", last.strategy_value)?;
    }
    Ok(())
}

impl ReportPort for TextReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        strategy: &StrategyConfig,
        out: &mut dyn Write,
    ) -> Result<(), QuantError> {
        writeln!(out, "=== {} [{}] ===", strategy.name, strategy.kind)?;
        write_period(out, &result.equity_curve)?;
        write_metrics(out, &result.metrics)?;
        write_monthly(out, &result.equity_curve)?;
        write_trades(out, &result.trades)?;
        Ok(())
    }

    fn write_allocation(
        &self,
        result: &AllocationResult,
        out: &mut dyn Write,
    ) -> Result<(), QuantError> {
        writeln!(out, "=== Combined ===")?;
        write_period(out, &result.combined.equity_curve)?;
        write_metrics(out, &result.combined.metrics)?;
        write_monthly(out, &result.combined.equity_curve)?;

        for sleeve in &result.sleeves {
            writeln!(
                out,
                "\n=== {} [{}] {:.1}% of capital ({:.2}) ===",
                sleeve.strategy.name, sleeve.strategy.kind, sleeve.weight_pct, sleeve.capital
            )?;
            write_metrics(out, &sleeve.result.metrics)?;
            write_trades(out, &sleeve.result.trades)?;
        }
        Ok(())
    }
}
