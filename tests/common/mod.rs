#![allow(dead_code)]

use chrono::NaiveDate;
use quantlab::domain::error::QuantError;
pub use quantlab::domain::price::{PricePoint, PriceSeries};
use quantlab::domain::strategy::{StrategyConfig, StrategyKind};
use quantlab::ports::data_port::PriceSource;
use std::collections::HashMap;
use std::io::Write;

pub struct MockPriceSource {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_points(mut self, code: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(code.to_string(), points);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl PriceSource for MockPriceSource {
    fn fetch_prices(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceSeries, QuantError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(QuantError::DataSource {
                reason: reason.clone(),
            });
        }
        let points = self
            .data
            .get(code)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|p| start_date.is_none_or(|s| p.date >= s))
            .filter(|p| end_date.is_none_or(|e| p.date <= e))
            .collect();
        PriceSeries::new(points)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One point per calendar day from 2024-01-01.
pub fn series(closes: &[f64]) -> Vec<PricePoint> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint::new(start + chrono::Duration::days(i as i64), close))
        .collect()
}

pub fn rising(count: usize, start_price: f64) -> Vec<PricePoint> {
    let closes: Vec<f64> = (0..count).map(|i| start_price + i as f64).collect();
    series(&closes)
}

pub fn flat(count: usize, price: f64) -> Vec<PricePoint> {
    series(&vec![price; count])
}

/// `high, low, high, low, ...`
pub fn alternating(count: usize, high: f64, low: f64) -> Vec<PricePoint> {
    let closes: Vec<f64> = (0..count)
        .map(|i| if i % 2 == 0 { high } else { low })
        .collect();
    series(&closes)
}

/// Deterministic wave with a slow upward drift, enough to trigger every rule.
pub fn wave(count: usize) -> Vec<PricePoint> {
    let closes: Vec<f64> = (0..count)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.05 * t + 8.0 * (t / 6.0).sin() + 3.0 * (t / 2.5).cos()
        })
        .collect();
    series(&closes)
}

pub fn dma(short: usize, long: usize) -> StrategyConfig {
    StrategyConfig::new(
        "Dual MA",
        StrategyKind::DualMovingAverage {
            short_period: short,
            long_period: long,
        },
    )
}

pub fn grid(pct: f64) -> StrategyConfig {
    StrategyConfig::new("Grid", StrategyKind::Grid { grid_pct: pct })
}

/// One config of every kind with typical parameters.
pub fn all_kinds() -> Vec<StrategyConfig> {
    vec![
        dma(5, 20),
        StrategyConfig::new(
            "Momentum",
            StrategyKind::MomentumBreakout {
                lookback: 10,
                threshold_pct: 2.0,
            },
        ),
        StrategyConfig::new(
            "Mean Reversion",
            StrategyKind::MeanReversion {
                lookback: 10,
                threshold_pct: 2.0,
            },
        ),
        grid(3.0),
        StrategyConfig::new(
            "RSI",
            StrategyKind::Rsi {
                period: 14,
                oversold: 30.0,
            },
        ),
        StrategyConfig::new(
            "MACD",
            StrategyKind::Macd {
                fast: 12,
                slow: 26,
                signal: 9,
            },
        ),
    ]
}

pub fn write_temp_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
