//! RSI (Relative Strength Index) over simple averages of gains and losses.
//!
//! avg_gain/avg_loss are arithmetic means of the trailing `n` close-to-close
//! changes (clamped to the changes available under `Clamped` warm-up).
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100, unless avg_gain is also 0, then RSI = 50.
//!
//! The first bar has no change and is always invalid.

use super::{IndicatorPoint, IndicatorSeries, IndicatorType, WarmupPolicy};
use crate::domain::price::PricePoint;

pub fn calculate_rsi(prices: &[PricePoint], period: usize, warmup: WarmupPolicy) -> IndicatorSeries {
    if period == 0 || prices.len() < 2 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Rsi(period),
            values: prices.iter().map(|p| IndicatorPoint::invalid(p.date)).collect(),
        };
    }

    let mut values = Vec::with_capacity(prices.len());
    values.push(IndicatorPoint::invalid(prices[0].date));

    let changes: Vec<f64> = prices.windows(2).map(|w| w[1].close - w[0].close).collect();

    for c in 0..changes.len() {
        let date = prices[c + 1].date;
        if warmup == WarmupPolicy::Deferred && c + 1 < period {
            values.push(IndicatorPoint::invalid(date));
            continue;
        }

        let window = &changes[(c + 1).saturating_sub(period)..=c];
        let count = window.len() as f64;
        let avg_gain = window.iter().map(|ch| ch.max(0.0)).sum::<f64>() / count;
        let avg_loss = window.iter().map(|ch| (-ch).max(0.0)).sum::<f64>() / count;
        values.push(IndicatorPoint::simple(date, true, rsi_from(avg_gain, avg_loss)));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

fn rsi_from(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { 50.0 } else { 100.0 }
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
