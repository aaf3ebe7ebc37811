//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), EMA[i] = EMA[i-1] + k*(X[i] - EMA[i-1]).
//! Clamped warm-up seeds with the first value; deferred warm-up seeds with the
//! SMA of the first full window and leaves the first (n-1) inputs invalid.

use super::{IndicatorPoint, IndicatorSeries, IndicatorType, WarmupPolicy};
use crate::domain::price::PricePoint;

pub fn calculate_ema(prices: &[PricePoint], period: usize, warmup: WarmupPolicy) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Ema(period),
            values: Vec::new(),
        };
    }

    let inputs: Vec<Option<f64>> = prices.iter().map(|p| Some(p.close)).collect();
    let values = ema_of(&inputs, period, warmup)
        .into_iter()
        .zip(prices)
        .map(|(v, p)| match v {
            Some(v) => IndicatorPoint::simple(p.date, true, v),
            None => IndicatorPoint::invalid(p.date),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}

/// EMA over a sequence whose leading entries may be missing.
///
/// Smoothing starts at the first `Some`; a `None` after that point yields
/// `None` without disturbing the running average.
pub fn ema_of(inputs: &[Option<f64>], period: usize, warmup: WarmupPolicy) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(inputs.len());
    if period == 0 {
        out.resize(inputs.len(), None);
        return out;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema: Option<f64> = None;
    let mut seen = 0usize;
    let mut sum = 0.0;

    for input in inputs {
        let Some(x) = *input else {
            out.push(None);
            continue;
        };
        seen += 1;

        match warmup {
            WarmupPolicy::Clamped => {
                let next = match ema {
                    Some(prev) => prev + k * (x - prev),
                    None => x,
                };
                ema = Some(next);
                out.push(ema);
            }
            WarmupPolicy::Deferred => {
                if seen < period {
                    sum += x;
                    out.push(None);
                } else if seen == period {
                    sum += x;
                    ema = Some(sum / period as f64);
                    out.push(ema);
                } else {
                    ema = ema.map(|prev| prev + k * (x - prev));
                    out.push(ema);
                }
            }
        }
    }

    out
}
