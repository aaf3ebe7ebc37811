//! Strategy configuration: the signal rule plus position sizing and risk exits.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::QuantError;

/// Minimum series length regardless of the strategy's own lookback.
pub const MIN_SERIES_LEN: usize = 30;

/// The signal rule and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum StrategyKind {
    DualMovingAverage { short_period: usize, long_period: usize },
    MomentumBreakout { lookback: usize, threshold_pct: f64 },
    MeanReversion { lookback: usize, threshold_pct: f64 },
    Grid { grid_pct: f64 },
    Rsi { period: usize, oversold: f64 },
    Macd { fast: usize, slow: usize, signal: usize },
}

impl StrategyKind {
    pub const NAMES: [&'static str; 6] = [
        "dual_moving_average",
        "momentum_breakout",
        "mean_reversion",
        "grid",
        "rsi",
        "macd",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::DualMovingAverage { .. } => "dual_moving_average",
            StrategyKind::MomentumBreakout { .. } => "momentum_breakout",
            StrategyKind::MeanReversion { .. } => "mean_reversion",
            StrategyKind::Grid { .. } => "grid",
            StrategyKind::Rsi { .. } => "rsi",
            StrategyKind::Macd { .. } => "macd",
        }
    }

    /// Number of prior bars the indicator needs before its value is meaningful.
    pub fn required_lookback(&self) -> usize {
        match *self {
            StrategyKind::DualMovingAverage { long_period, .. } => long_period,
            StrategyKind::MomentumBreakout { lookback, .. }
            | StrategyKind::MeanReversion { lookback, .. } => lookback,
            StrategyKind::Grid { .. } => 1,
            StrategyKind::Rsi { period, .. } => period,
            StrategyKind::Macd { slow, signal, .. } => slow.saturating_add(signal),
        }
    }

    /// Smallest price series this rule can be run against.
    pub fn minimum_bars(&self) -> usize {
        self.required_lookback().saturating_add(1).max(MIN_SERIES_LEN)
    }

    pub fn validate(&self) -> Result<(), QuantError> {
        match *self {
            StrategyKind::DualMovingAverage {
                short_period,
                long_period,
            } => {
                positive_period("short_period", short_period)?;
                positive_period("long_period", long_period)?;
                if short_period >= long_period {
                    return Err(QuantError::invalid_config(
                        "short_period",
                        "short_period must be less than long_period",
                    ));
                }
            }
            StrategyKind::MomentumBreakout {
                lookback,
                threshold_pct,
            }
            | StrategyKind::MeanReversion {
                lookback,
                threshold_pct,
            } => {
                positive_period("lookback", lookback)?;
                positive_value("threshold", threshold_pct)?;
            }
            StrategyKind::Grid { grid_pct } => positive_value("grid_pct", grid_pct)?,
            StrategyKind::Rsi { period, oversold } => {
                positive_period("period", period)?;
                if !(oversold > 0.0 && oversold < 50.0) {
                    return Err(QuantError::invalid_config(
                        "oversold",
                        "oversold must be between 0 and 50",
                    ));
                }
            }
            StrategyKind::Macd { fast, slow, signal } => {
                positive_period("fast", fast)?;
                positive_period("slow", slow)?;
                positive_period("signal", signal)?;
                if fast >= slow {
                    return Err(QuantError::invalid_config(
                        "fast",
                        "fast period must be less than slow period",
                    ));
                }
                if slow.checked_add(signal).is_none() {
                    return Err(QuantError::invalid_config(
                        "signal",
                        "slow + signal period is out of range",
                    ));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::DualMovingAverage {
                short_period,
                long_period,
            } => write!(f, "DMA({},{})", short_period, long_period),
            StrategyKind::MomentumBreakout {
                lookback,
                threshold_pct,
            } => write!(f, "MOMENTUM({},{}%)", lookback, threshold_pct),
            StrategyKind::MeanReversion {
                lookback,
                threshold_pct,
            } => write!(f, "MEANREV({},{}%)", lookback, threshold_pct),
            StrategyKind::Grid { grid_pct } => write!(f, "GRID({}%)", grid_pct),
            StrategyKind::Rsi { period, oversold } => write!(f, "RSI({},{})", period, oversold),
            StrategyKind::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyConfig {
    pub name: String,
    #[serde(flatten)]
    pub kind: StrategyKind,
    /// Percent of available cash committed on entry, in (0, 100].
    pub position_size_pct: f64,
    /// Close when unrealised return falls to `-stop_loss_pct`; 0 disables.
    pub stop_loss_pct: f64,
    /// Close when unrealised return reaches `take_profit_pct`; 0 disables.
    pub take_profit_pct: f64,
}

impl StrategyConfig {
    pub fn new(name: impl Into<String>, kind: StrategyKind) -> Self {
        StrategyConfig {
            name: name.into(),
            kind,
            position_size_pct: 100.0,
            stop_loss_pct: 0.0,
            take_profit_pct: 0.0,
        }
    }

    pub fn with_position_size(mut self, pct: f64) -> Self {
        self.position_size_pct = pct;
        self
    }

    pub fn with_stop_loss(mut self, pct: f64) -> Self {
        self.stop_loss_pct = pct;
        self
    }

    pub fn with_take_profit(mut self, pct: f64) -> Self {
        self.take_profit_pct = pct;
        self
    }

    pub fn required_lookback(&self) -> usize {
        self.kind.required_lookback()
    }

    pub fn validate(&self) -> Result<(), QuantError> {
        if !(self.position_size_pct > 0.0 && self.position_size_pct <= 100.0) {
            return Err(QuantError::invalid_config(
                "position_size",
                "position_size must be in (0, 100]",
            ));
        }
        if !(self.stop_loss_pct >= 0.0) || !self.stop_loss_pct.is_finite() {
            return Err(QuantError::invalid_config(
                "stop_loss",
                "stop_loss must be non-negative",
            ));
        }
        if !(self.take_profit_pct >= 0.0) || !self.take_profit_pct.is_finite() {
            return Err(QuantError::invalid_config(
                "take_profit",
                "take_profit must be non-negative",
            ));
        }
        self.kind.validate()
    }
}

fn positive_period(field: &str, value: usize) -> Result<(), QuantError> {
    if value == 0 {
        return Err(QuantError::invalid_config(field, format!("{field} must be a positive integer")));
    }
    Ok(())
}

fn positive_value(field: &str, value: f64) -> Result<(), QuantError> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(QuantError::invalid_config(field, format!("{field} must be positive")));
    }
    Ok(())
}
