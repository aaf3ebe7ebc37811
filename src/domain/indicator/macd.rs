//! MACD (Moving Average Convergence Divergence).
//!
//! line = EMA(fast) - EMA(slow), signal = EMA(signal) of line,
//! histogram = line - signal. Validity follows the warm-up policy of the
//! underlying EMAs.

use super::ema::ema_of;
use super::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue, WarmupPolicy};
use crate::domain::price::PricePoint;

pub fn calculate_macd(
    prices: &[PricePoint],
    fast: usize,
    slow: usize,
    signal: usize,
    warmup: WarmupPolicy,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd { fast, slow, signal };
    if fast == 0 || slow == 0 || signal == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let closes: Vec<Option<f64>> = prices.iter().map(|p| Some(p.close)).collect();
    let fast_ema = ema_of(&closes, fast, warmup);
    let slow_ema = ema_of(&closes, slow, warmup);

    let line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();
    let signal_line = ema_of(&line, signal, warmup);

    let values = prices
        .iter()
        .zip(line.iter().zip(&signal_line))
        .map(|(p, (l, s))| match (l, s) {
            (Some(line), Some(signal)) => IndicatorPoint {
                date: p.date,
                valid: true,
                value: IndicatorValue::Macd {
                    line: *line,
                    signal: *signal,
                    histogram: line - signal,
                },
            },
            _ => IndicatorPoint {
                date: p.date,
                valid: false,
                value: IndicatorValue::Macd {
                    line: 0.0,
                    signal: 0.0,
                    histogram: 0.0,
                },
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
