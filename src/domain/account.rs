//! Cash, the open position, and the ledgers of a single backtest run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::position::{Position, TradeRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub strategy_value: f64,
    pub benchmark_value: f64,
    /// `(value - running_peak) / running_peak * 100`, never positive.
    pub drawdown_pct: f64,
}

/// Percent below `peak`; 0 at or above it.
pub fn drawdown_pct(value: f64, peak: f64) -> f64 {
    if peak > 0.0 && value < peak {
        (value - peak) / peak * 100.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub cash: f64,
    pub initial_capital: f64,
    pub position: Option<Position>,
    pub trades: Vec<TradeRecord>,
    pub equity_curve: Vec<EquityPoint>,
    peak_value: f64,
}

impl Account {
    pub fn new(initial_capital: f64) -> Self {
        Account {
            cash: initial_capital,
            initial_capital,
            position: None,
            trades: Vec::new(),
            equity_curve: Vec::new(),
            peak_value: initial_capital,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    pub fn total_value(&self, price: f64) -> f64 {
        self.cash
            + self
                .position
                .as_ref()
                .map(|p| p.market_value(price))
                .unwrap_or(0.0)
    }

    pub fn record_trade(&mut self, trade: TradeRecord) {
        self.trades.push(trade);
    }

    /// Mark to market at `price` and append an equity point.
    pub fn record_equity(&mut self, date: NaiveDate, price: f64, benchmark_value: f64) -> &EquityPoint {
        let value = self.total_value(price);
        if value > self.peak_value {
            self.peak_value = value;
        }
        self.equity_curve.push(EquityPoint {
            date,
            strategy_value: value,
            benchmark_value,
            drawdown_pct: drawdown_pct(value, self.peak_value),
        });
        &self.equity_curve[self.equity_curve.len() - 1]
    }
}
