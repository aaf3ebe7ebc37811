//! Buy/sell signal generation per strategy kind.
//!
//! Indicator strategies are a pure function of the price series, so their
//! signals are computed up front. The grid strategy measures moves from the
//! last executed trade price and therefore keeps a reference that the engine
//! resets on every fill.

use serde::{Deserialize, Serialize};

use super::indicator::WarmupPolicy;
use super::indicator::macd::calculate_macd;
use super::indicator::momentum::calculate_momentum;
use super::indicator::rsi::calculate_rsi;
use super::indicator::sma::calculate_sma;
use super::price::PricePoint;
use super::strategy::StrategyKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

/// A signal together with the name of the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalEvent {
    pub signal: Signal,
    pub reason: &'static str,
}

impl SignalEvent {
    pub const HOLD: SignalEvent = SignalEvent {
        signal: Signal::Hold,
        reason: "",
    };

    fn buy(reason: &'static str) -> Self {
        SignalEvent {
            signal: Signal::Buy,
            reason,
        }
    }

    fn sell(reason: &'static str) -> Self {
        SignalEvent {
            signal: Signal::Sell,
            reason,
        }
    }
}

/// `prev <= level && curr > level`
fn crossed_above(prev: f64, curr: f64, prev_level: f64, curr_level: f64) -> bool {
    prev <= prev_level && curr > curr_level
}

/// `prev >= level && curr < level`
fn crossed_below(prev: f64, curr: f64, prev_level: f64, curr_level: f64) -> bool {
    prev >= prev_level && curr < curr_level
}

/// Signals from a fast line crossing a slow line. Needs both lines valid
/// today and yesterday.
pub fn line_cross_signals(
    fast: &[Option<f64>],
    slow: &[Option<f64>],
    buy_reason: &'static str,
    sell_reason: &'static str,
) -> Vec<SignalEvent> {
    let mut out = vec![SignalEvent::HOLD; fast.len().min(slow.len())];
    for i in 1..out.len() {
        let (Some(fp), Some(fc), Some(sp), Some(sc)) = (fast[i - 1], fast[i], slow[i - 1], slow[i])
        else {
            continue;
        };
        if crossed_above(fp, fc, sp, sc) {
            out[i] = SignalEvent::buy(buy_reason);
        } else if crossed_below(fp, fc, sp, sc) {
            out[i] = SignalEvent::sell(sell_reason);
        }
    }
    out
}

/// Signals from an oscillator crossing fixed levels: buy when it crosses
/// above `buy_level`, sell when it crosses below `sell_level`.
pub fn level_cross_signals(
    values: &[Option<f64>],
    buy_level: f64,
    sell_level: f64,
    buy_reason: &'static str,
    sell_reason: &'static str,
) -> Vec<SignalEvent> {
    let mut out = vec![SignalEvent::HOLD; values.len()];
    for i in 1..values.len() {
        let (Some(prev), Some(curr)) = (values[i - 1], values[i]) else {
            continue;
        };
        if crossed_above(prev, curr, buy_level, buy_level) {
            out[i] = SignalEvent::buy(buy_reason);
        } else if crossed_below(prev, curr, sell_level, sell_level) {
            out[i] = SignalEvent::sell(sell_reason);
        }
    }
    out
}

/// Grid rule: buy after a drop of `grid_pct` from the reference, sell after a
/// rise of `grid_pct`. The reference starts at the first close.
#[derive(Debug, Clone, PartialEq)]
pub struct GridTracker {
    pub reference: f64,
    pub grid_pct: f64,
}

impl GridTracker {
    pub fn new(reference: f64, grid_pct: f64) -> Self {
        GridTracker {
            reference,
            grid_pct,
        }
    }

    pub fn evaluate(&self, close: f64) -> SignalEvent {
        let change_pct = (close - self.reference) / self.reference * 100.0;
        if change_pct <= -self.grid_pct {
            SignalEvent::buy("grid buy")
        } else if change_pct >= self.grid_pct {
            SignalEvent::sell("grid sell")
        } else {
            SignalEvent::HOLD
        }
    }

    pub fn reset(&mut self, executed_price: f64) {
        self.reference = executed_price;
    }
}

/// Per-run signal state handed to the engine.
#[derive(Debug, Clone)]
pub enum SignalSource {
    Precomputed(Vec<SignalEvent>),
    Grid(GridTracker),
}

impl SignalSource {
    pub fn build(kind: &StrategyKind, prices: &[PricePoint], warmup: WarmupPolicy) -> Self {
        match *kind {
            StrategyKind::DualMovingAverage {
                short_period,
                long_period,
            } => {
                let short = calculate_sma(prices, short_period, warmup).simple_values();
                let long = calculate_sma(prices, long_period, warmup).simple_values();
                SignalSource::Precomputed(line_cross_signals(
                    &short,
                    &long,
                    "golden cross",
                    "death cross",
                ))
            }
            StrategyKind::MomentumBreakout {
                lookback,
                threshold_pct,
            } => {
                let momentum = calculate_momentum(prices, lookback, warmup).simple_values();
                SignalSource::Precomputed(level_cross_signals(
                    &momentum,
                    threshold_pct,
                    -threshold_pct,
                    "momentum breakout",
                    "momentum breakdown",
                ))
            }
            StrategyKind::MeanReversion {
                lookback,
                threshold_pct,
            } => {
                let sma = calculate_sma(prices, lookback, warmup).simple_values();
                let deviation: Vec<Option<f64>> = prices
                    .iter()
                    .zip(&sma)
                    .map(|(p, avg)| avg.map(|avg| (p.close - avg) / avg * 100.0))
                    .collect();
                SignalSource::Precomputed(level_cross_signals(
                    &deviation,
                    -threshold_pct,
                    threshold_pct,
                    "oversold recovery",
                    "overbought reversion",
                ))
            }
            StrategyKind::Rsi { period, oversold } => {
                let rsi = calculate_rsi(prices, period, warmup).simple_values();
                SignalSource::Precomputed(level_cross_signals(
                    &rsi,
                    oversold,
                    100.0 - oversold,
                    "rsi oversold exit",
                    "rsi overbought exit",
                ))
            }
            StrategyKind::Macd { fast, slow, signal } => {
                let macd = calculate_macd(prices, fast, slow, signal, warmup).macd_values();
                let line: Vec<Option<f64>> = macd.iter().map(|v| v.map(|(l, _)| l)).collect();
                let signal_line: Vec<Option<f64>> =
                    macd.iter().map(|v| v.map(|(_, s)| s)).collect();
                SignalSource::Precomputed(line_cross_signals(
                    &line,
                    &signal_line,
                    "macd golden cross",
                    "macd death cross",
                ))
            }
            StrategyKind::Grid { grid_pct } => {
                let reference = prices.first().map(|p| p.close).unwrap_or(0.0);
                SignalSource::Grid(GridTracker::new(reference, grid_pct))
            }
        }
    }

    pub fn signal_at(&self, index: usize, close: f64) -> SignalEvent {
        match self {
            SignalSource::Precomputed(events) => {
                events.get(index).copied().unwrap_or(SignalEvent::HOLD)
            }
            SignalSource::Grid(grid) => {
                if index == 0 {
                    SignalEvent::HOLD
                } else {
                    grid.evaluate(close)
                }
            }
        }
    }

    /// Notify the source that a trade executed at `price`.
    pub fn on_fill(&mut self, price: f64) {
        if let SignalSource::Grid(grid) = self {
            grid.reset(price);
        }
    }
}
