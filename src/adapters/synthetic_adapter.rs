//! Seeded random-walk price generator for demos and tests.

use crate::domain::error::QuantError;
use crate::domain::price::{PricePoint, PriceSeries};
use crate::ports::data_port::PriceSource;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Daily closes from a multiplicative random walk on weekdays only.
/// The same seed always yields the same series.
#[derive(Debug, Clone)]
pub struct SyntheticAdapter {
    pub seed: u64,
    pub start_price: f64,
    /// Maximum absolute daily move as a fraction (0.02 = 2%).
    pub volatility: f64,
    /// Constant daily drift added to every move.
    pub drift: f64,
}

impl SyntheticAdapter {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            start_price: 100.0,
            volatility: 0.02,
            drift: 0.0,
        }
    }

    pub fn with_start_price(mut self, price: f64) -> Self {
        self.start_price = price;
        self
    }

    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }

    pub fn with_drift(mut self, drift: f64) -> Self {
        self.drift = drift;
        self
    }

    fn validate(&self) -> Result<(), QuantError> {
        if !(self.start_price > 0.0) || !self.start_price.is_finite() {
            return Err(QuantError::invalid_config("start_price", "start_price must be positive"));
        }
        if !(0.0..1.0).contains(&self.volatility) {
            return Err(QuantError::invalid_config("volatility", "volatility must be in [0, 1)"));
        }
        if !(self.drift.abs() < 1.0) {
            return Err(QuantError::invalid_config("drift", "drift must be in (-1, 1)"));
        }
        // Worst daily factor is 1 + drift - volatility; it must stay positive.
        if self.drift - self.volatility <= -1.0 {
            return Err(QuantError::invalid_config(
                "drift",
                "drift - volatility must be greater than -1",
            ));
        }
        Ok(())
    }

    /// `days` weekday closes starting at the first weekday on or after `start`.
    pub fn generate(&self, start: NaiveDate, days: usize) -> Result<PriceSeries, QuantError> {
        self.validate()?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut points = Vec::with_capacity(days);
        let mut date = next_weekday(start);
        let mut price = self.start_price;

        for i in 0..days {
            if i > 0 {
                let noise = if self.volatility > 0.0 {
                    rng.gen_range(-self.volatility..self.volatility)
                } else {
                    0.0
                };
                price *= 1.0 + self.drift + noise;
                date = next_weekday(date + Duration::days(1));
            }
            points.push(PricePoint::new(date, round_cents(price)));
        }

        PriceSeries::new(points)
    }
}

fn next_weekday(mut date: NaiveDate) -> NaiveDate {
    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        date += Duration::days(1);
    }
    date
}

fn round_cents(price: f64) -> f64 {
    ((price * 100.0).round() / 100.0).max(0.01)
}

impl PriceSource for SyntheticAdapter {
    /// Both bounds are required; the code is not used.
    fn fetch_prices(
        &self,
        _code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceSeries, QuantError> {
        let (Some(start), Some(end)) = (start_date, end_date) else {
            return Err(QuantError::DataSource {
                reason: "synthetic prices need both a start and an end date".to_string(),
            });
        };
        let span = usize::try_from((end - start).num_days() + 1).unwrap_or(0);
        let series = self.generate(start, span)?;
        Ok(series.between(start, end))
    }
}
