//! Several strategies sharing one capital pool, each in its own sleeve.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::account::{EquityPoint, drawdown_pct};
use super::backtest::{BacktestResult, EngineOptions, run_backtest_with};
use super::error::QuantError;
use super::metrics::Metrics;
use super::position::TradeRecord;
use super::price::PricePoint;
use super::strategy::StrategyConfig;

const WEIGHT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSlot {
    pub config: StrategyConfig,
    /// Share of total capital, in percent.
    pub weight_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleeveResult {
    pub strategy: StrategyConfig,
    pub weight_pct: f64,
    pub capital: f64,
    pub result: BacktestResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    pub sleeves: Vec<SleeveResult>,
    pub combined: BacktestResult,
}

pub fn validate_weights(slots: &[AllocationSlot]) -> Result<(), QuantError> {
    if slots.is_empty() {
        return Err(QuantError::invalid_config(
            "weight",
            "at least one strategy is required",
        ));
    }
    for slot in slots {
        if !(slot.weight_pct > 0.0) || !slot.weight_pct.is_finite() {
            return Err(QuantError::invalid_config(
                "weight",
                format!("weight for '{}' must be positive", slot.config.name),
            ));
        }
    }
    let total: f64 = slots.iter().map(|s| s.weight_pct).sum();
    if (total - 100.0).abs() > WEIGHT_TOLERANCE {
        return Err(QuantError::invalid_config(
            "weight",
            format!("weights must sum to 100, got {total}"),
        ));
    }
    Ok(())
}

pub fn run_allocation(
    prices: &[PricePoint],
    slots: &[AllocationSlot],
    initial_capital: f64,
    options: &EngineOptions,
) -> Result<AllocationResult, QuantError> {
    if !(initial_capital > 0.0) || !initial_capital.is_finite() {
        return Err(QuantError::invalid_config(
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    validate_weights(slots)?;

    info!(sleeves = slots.len(), capital = initial_capital, "Starting allocation run");

    let sleeves = slots
        .iter()
        .map(|slot| {
            let capital = initial_capital * slot.weight_pct / 100.0;
            run_backtest_with(prices, &slot.config, capital, options).map(|result| SleeveResult {
                strategy: slot.config.clone(),
                weight_pct: slot.weight_pct,
                capital,
                result,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let combined = combine(prices, &sleeves, initial_capital, options.risk_free_rate);

    info!(
        total_return_pct = combined.metrics.total_return_pct,
        trades = combined.metrics.trade_count,
        "Allocation run complete"
    );

    Ok(AllocationResult { sleeves, combined })
}

fn combine(
    prices: &[PricePoint],
    sleeves: &[SleeveResult],
    initial_capital: f64,
    risk_free_rate: f64,
) -> BacktestResult {
    let first_close = prices.first().map(|p| p.close).unwrap_or(1.0);
    let mut peak = f64::NEG_INFINITY;

    let equity_curve: Vec<EquityPoint> = prices
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let value: f64 = sleeves
                .iter()
                .filter_map(|s| s.result.equity_curve.get(i))
                .map(|p| p.strategy_value)
                .sum();
            peak = peak.max(value);
            EquityPoint {
                date: point.date,
                strategy_value: value,
                benchmark_value: initial_capital * (point.close / first_close),
                drawdown_pct: drawdown_pct(value, peak),
            }
        })
        .collect();

    let mut trades: Vec<TradeRecord> = sleeves
        .iter()
        .flat_map(|s| s.result.trades.iter().cloned())
        .collect();
    trades.sort_by_key(|t| t.date);

    let metrics = Metrics::compute(&equity_curve, &trades, initial_capital, risk_free_rate);

    BacktestResult {
        equity_curve,
        metrics,
        trades,
    }
}
