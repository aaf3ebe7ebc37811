//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters
//! - `IndicatorSeries`: A time series of indicator values
//! - `WarmupPolicy`: How the first `period - 1` points are treated

pub mod ema;
pub mod macd;
pub mod momentum;
pub mod rsi;
pub mod sma;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Treatment of the leading points before an indicator window is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmupPolicy {
    /// Average over `min(i + 1, period)` points; every point is valid.
    #[default]
    Clamped,
    /// Points before the window is full are invalid.
    Deferred,
}

impl std::str::FromStr for WarmupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clamped" => Ok(WarmupPolicy::Clamped),
            "deferred" => Ok(WarmupPolicy::Deferred),
            other => Err(format!("unknown warmup policy '{other}' (expected clamped or deferred)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: IndicatorValue,
}

impl IndicatorPoint {
    pub fn simple(date: NaiveDate, valid: bool, value: f64) -> Self {
        IndicatorPoint {
            date,
            valid,
            value: IndicatorValue::Simple(value),
        }
    }

    pub fn invalid(date: NaiveDate) -> Self {
        Self::simple(date, false, 0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Momentum(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// The `Simple` value at each index, `None` where invalid.
    pub fn simple_values(&self) -> Vec<Option<f64>> {
        self.values
            .iter()
            .map(|p| match p.value {
                IndicatorValue::Simple(v) if p.valid => Some(v),
                _ => None,
            })
            .collect()
    }

    /// `(line, signal)` pairs for a MACD series, `None` where invalid.
    pub fn macd_values(&self) -> Vec<Option<(f64, f64)>> {
        self.values
            .iter()
            .map(|p| match p.value {
                IndicatorValue::Macd { line, signal, .. } if p.valid => Some((line, signal)),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Momentum(period) => write!(f, "MOMENTUM({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
        }
    }
}
