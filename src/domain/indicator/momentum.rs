//! Momentum as percentage change over a lookback window.
//!
//! MOM[i] = (C[i] - C[i-n]) / C[i-n] * 100. Under `Clamped` warm-up the base is
//! the oldest close available, so MOM[0] is 0.

use super::{IndicatorPoint, IndicatorSeries, IndicatorType, WarmupPolicy};
use crate::domain::price::PricePoint;

pub fn calculate_momentum(
    prices: &[PricePoint],
    lookback: usize,
    warmup: WarmupPolicy,
) -> IndicatorSeries {
    if lookback == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Momentum(lookback),
            values: Vec::new(),
        };
    }

    let values = prices
        .iter()
        .enumerate()
        .map(|(i, point)| {
            if warmup == WarmupPolicy::Deferred && i < lookback {
                return IndicatorPoint::invalid(point.date);
            }
            let base = prices[i.saturating_sub(lookback)].close;
            IndicatorPoint::simple(point.date, true, (point.close - base) / base * 100.0)
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Momentum(lookback),
        values,
    }
}
