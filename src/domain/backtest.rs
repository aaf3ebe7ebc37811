//! Single-asset, bar-by-bar backtest engine.
//!
//! Each run owns its account state; nothing survives between calls.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::account::{Account, EquityPoint};
use super::error::QuantError;
use super::execution::{EntryResult, Sizing, enter_long, exit_long};
use super::indicator::WarmupPolicy;
use super::metrics::Metrics;
use super::position::{Position, TradeRecord};
use super::price::{PricePoint, validate_points};
use super::signal::{Signal, SignalEvent, SignalSource};
use super::strategy::StrategyConfig;

pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineOptions {
    pub sizing: Sizing,
    pub warmup: WarmupPolicy,
    /// Annual rate as a fraction (0.02 = 2%).
    pub risk_free_rate: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            sizing: Sizing::default(),
            warmup: WarmupPolicy::default(),
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
        }
    }
}

impl EngineOptions {
    pub fn validate(&self) -> Result<(), QuantError> {
        self.sizing.validate()?;
        if !self.risk_free_rate.is_finite() {
            return Err(QuantError::invalid_config(
                "risk_free_rate",
                "risk_free_rate must be a finite number",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub equity_curve: Vec<EquityPoint>,
    pub metrics: Metrics,
    pub trades: Vec<TradeRecord>,
}

impl BacktestResult {
    pub fn final_value(&self) -> Option<f64> {
        self.equity_curve.last().map(|p| p.strategy_value)
    }
}

/// Run with default [`EngineOptions`].
pub fn run_backtest(
    prices: &[PricePoint],
    config: &StrategyConfig,
    initial_capital: f64,
) -> Result<BacktestResult, QuantError> {
    run_backtest_with(prices, config, initial_capital, &EngineOptions::default())
}

pub fn run_backtest_with(
    prices: &[PricePoint],
    config: &StrategyConfig,
    initial_capital: f64,
    options: &EngineOptions,
) -> Result<BacktestResult, QuantError> {
    check_preconditions(prices, config, initial_capital, options)?;

    // Non-empty after the length check.
    let first_close = prices[0].close;

    info!(
        strategy = %config.name,
        rule = %config.kind,
        bars = prices.len(),
        capital = initial_capital,
        "Starting backtest"
    );

    let mut source = SignalSource::build(&config.kind, prices, options.warmup);
    let mut account = Account::new(initial_capital);

    for (i, point) in prices.iter().enumerate() {
        let close = point.close;
        let event = source.signal_at(i, close);

        if let Some(position) = account.position.as_ref() {
            if let Some(reason) = exit_reason(position, close, config, event) {
                exit_long(&mut account, point.date, close, reason);
                source.on_fill(close);
            }
        } else if event.signal == Signal::Buy {
            match enter_long(
                &mut account,
                point.date,
                close,
                config.position_size_pct,
                options.sizing,
                event.reason,
            ) {
                EntryResult::Entered { .. } => source.on_fill(close),
                EntryResult::InsufficientCapital => {
                    warn!(date = %point.date, price = close, cash = account.cash, "Buy skipped: insufficient capital");
                }
            }
        }

        let benchmark = initial_capital * (close / first_close);
        account.record_equity(point.date, close, benchmark);
    }

    let metrics = Metrics::compute(
        &account.equity_curve,
        &account.trades,
        initial_capital,
        options.risk_free_rate,
    );

    info!(
        trades = metrics.trade_count,
        total_return_pct = metrics.total_return_pct,
        max_drawdown_pct = metrics.max_drawdown_pct,
        open_position = account.position.is_some(),
        "Backtest complete"
    );

    Ok(BacktestResult {
        equity_curve: account.equity_curve,
        metrics,
        trades: account.trades,
    })
}

fn check_preconditions(
    prices: &[PricePoint],
    config: &StrategyConfig,
    initial_capital: f64,
    options: &EngineOptions,
) -> Result<(), QuantError> {
    if !(initial_capital > 0.0) || !initial_capital.is_finite() {
        return Err(QuantError::invalid_config(
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    config.validate()?;
    options.validate()?;

    let minimum = config.kind.minimum_bars();
    if prices.len() < minimum {
        return Err(QuantError::InsufficientData {
            bars: prices.len(),
            minimum,
        });
    }
    validate_points(prices)
}

/// Stop-loss first, then take-profit, then the rule's own sell.
fn exit_reason(
    position: &Position,
    close: f64,
    config: &StrategyConfig,
    event: SignalEvent,
) -> Option<&'static str> {
    if position.should_stop_loss(close, config.stop_loss_pct) {
        Some("stop loss")
    } else if position.should_take_profit(close, config.take_profit_pct) {
        Some("take profit")
    } else if event.signal == Signal::Sell {
        Some(event.reason)
    } else {
        None
    }
}
