//! Performance metrics over an equity curve and trade ledger.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::account::EquityPoint;
use super::position::TradeRecord;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// All percentages are in percent units (12.5 means 12.5%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_return_pct: f64,
    pub annual_return_pct: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown_pct: f64,
    pub win_rate_pct: f64,
    #[serde(serialize_with = "serialize_ratio", deserialize_with = "deserialize_ratio")]
    pub profit_factor: f64,
    pub volatility_pct: f64,
    pub trade_count: usize,
    pub benchmark_return_pct: f64,
    pub excess_return_pct: f64,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub largest_win: f64,
    pub largest_loss: f64,
}

impl Metrics {
    pub fn compute(
        equity_curve: &[EquityPoint],
        trades: &[TradeRecord],
        initial_capital: f64,
        risk_free_rate: f64,
    ) -> Self {
        let final_value = equity_curve
            .last()
            .map(|p| p.strategy_value)
            .unwrap_or(initial_capital);
        let final_benchmark = equity_curve
            .last()
            .map(|p| p.benchmark_value)
            .unwrap_or(initial_capital);

        let total_return_pct = percent_change(initial_capital, final_value);
        let benchmark_return_pct = percent_change(initial_capital, final_benchmark);

        let periods = equity_curve.len() as f64;
        let annual_return_pct = if periods > 0.0 && initial_capital > 0.0 && final_value > 0.0 {
            ((final_value / initial_capital).powf(TRADING_DAYS_PER_YEAR / periods) - 1.0) * 100.0
        } else {
            0.0
        };

        let volatility_pct = annualized_volatility(equity_curve) * 100.0;
        let sharpe_ratio = if volatility_pct > 0.0 {
            (annual_return_pct / 100.0 - risk_free_rate) / (volatility_pct / 100.0)
        } else {
            0.0
        };

        let max_drawdown_pct = equity_curve
            .iter()
            .map(|p| p.drawdown_pct)
            .fold(0.0_f64, f64::min);

        let mut winning_trades = 0usize;
        let mut losing_trades = 0usize;
        let mut gross_profit = 0.0_f64;
        let mut gross_loss = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;

        for profit in trades.iter().filter_map(|t| t.profit) {
            if profit > 0.0 {
                winning_trades += 1;
                gross_profit += profit;
                largest_win = largest_win.max(profit);
            } else if profit < 0.0 {
                losing_trades += 1;
                gross_loss += profit.abs();
                largest_loss = largest_loss.max(profit.abs());
            }
        }

        // Break-even sells count as neither wins nor losses.
        let decided = winning_trades + losing_trades;
        let win_rate_pct = if decided > 0 {
            winning_trades as f64 / decided as f64 * 100.0
        } else {
            0.0
        };

        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        Metrics {
            total_return_pct,
            annual_return_pct,
            sharpe_ratio,
            max_drawdown_pct,
            win_rate_pct,
            profit_factor,
            volatility_pct,
            trade_count: trades.len(),
            benchmark_return_pct,
            excess_return_pct: total_return_pct - benchmark_return_pct,
            winning_trades,
            losing_trades,
            largest_win,
            largest_loss,
        }
    }
}

fn percent_change(from: f64, to: f64) -> f64 {
    if from > 0.0 {
        (to - from) / from * 100.0
    } else {
        0.0
    }
}

/// Population stdev of bar-to-bar returns, scaled by sqrt(252). A fraction.
fn annualized_volatility(equity_curve: &[EquityPoint]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].strategy_value;
            let curr = w[1].strategy_value;
            if prev > 0.0 { (curr - prev) / prev } else { 0.0 }
        })
        .collect();

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt()
}

fn serialize_ratio<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_infinite() && value.is_sign_positive() {
        serializer.serialize_str("Infinity")
    } else {
        serializer.serialize_f64(*value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RatioRepr {
    Number(f64),
    Text(String),
}

fn deserialize_ratio<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match RatioRepr::deserialize(deserializer)? {
        RatioRepr::Number(v) => Ok(v),
        RatioRepr::Text(s) if s == "Infinity" => Ok(f64::INFINITY),
        RatioRepr::Text(s) => Err(serde::de::Error::custom(format!(
            "invalid profit factor: {s}"
        ))),
    }
}
