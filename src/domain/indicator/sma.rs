//! Simple Moving Average.
//!
//! SMA[i] = mean of the trailing `period` closes. Under `Clamped` warm-up the
//! first `period - 1` points average over the `i + 1` closes available.

use super::{IndicatorPoint, IndicatorSeries, IndicatorType, WarmupPolicy};
use crate::domain::price::PricePoint;

pub fn calculate_sma(prices: &[PricePoint], period: usize, warmup: WarmupPolicy) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Sma(period),
            values: Vec::new(),
        };
    }

    let mut values = Vec::with_capacity(prices.len());

    for (i, point) in prices.iter().enumerate() {
        if warmup == WarmupPolicy::Deferred && i + 1 < period {
            values.push(IndicatorPoint::invalid(point.date));
            continue;
        }
        let window = &prices[(i + 1).saturating_sub(period)..=i];
        let sum: f64 = window.iter().map(|p| p.close).sum();
        values.push(IndicatorPoint::simple(point.date, true, sum / window.len() as f64));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::IndicatorValue;
    use chrono::NaiveDate;

    fn make_prices(closes: &[f64]) -> Vec<PricePoint> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64),
                close,
            })
            .collect()
    }

    fn value(series: &IndicatorSeries, i: usize) -> f64 {
        match series.values[i].value {
            IndicatorValue::Simple(v) => v,
            _ => panic!("Expected Simple value"),
        }
    }

    #[test]
    fn sma_clamped_warmup_averages_available_history() {
        let prices = make_prices(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_sma(&prices, 3, WarmupPolicy::Clamped);

        assert!(series.values.iter().all(|p| p.valid));
        assert!((value(&series, 0) - 10.0).abs() < f64::EPSILON);
        assert!((value(&series, 1) - 15.0).abs() < f64::EPSILON);
        assert!((value(&series, 2) - 20.0).abs() < f64::EPSILON);
        assert!((value(&series, 3) - 30.0).abs() < f64::EPSILON);
        assert!((value(&series, 4) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sma_deferred_warmup_is_invalid_until_full() {
        let prices = make_prices(&[10.0, 20.0, 30.0, 40.0]);
        let series = calculate_sma(&prices, 3, WarmupPolicy::Deferred);

        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!((value(&series, 2) - 20.0).abs() < f64::EPSILON);
        assert!((value(&series, 3) - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sma_period_1_is_close() {
        let prices = make_prices(&[3.0, 7.0]);
        let series = calculate_sma(&prices, 1, WarmupPolicy::Deferred);
        assert!((value(&series, 0) - 3.0).abs() < f64::EPSILON);
        assert!((value(&series, 1) - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sma_period_0() {
        let prices = make_prices(&[10.0, 20.0]);
        let series = calculate_sma(&prices, 0, WarmupPolicy::Clamped);
        assert!(series.values.is_empty());
    }

    #[test]
    fn sma_indicator_type() {
        let series = calculate_sma(&make_prices(&[1.0]), 20, WarmupPolicy::Clamped);
        assert_eq!(series.indicator_type, IndicatorType::Sma(20));
    }
}
