//! Daily close prices and the validated series the engine consumes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::QuantError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        PricePoint { date, close }
    }
}

/// Check that closes are positive and finite and dates strictly increase.
pub fn validate_points(points: &[PricePoint]) -> Result<(), QuantError> {
    for (i, point) in points.iter().enumerate() {
        if !point.close.is_finite() || point.close <= 0.0 {
            return Err(QuantError::InvalidPriceData {
                reason: format!("close on {} must be positive, got {}", point.date, point.close),
            });
        }
        if i > 0 && points[i - 1].date >= point.date {
            return Err(QuantError::InvalidPriceData {
                reason: format!(
                    "dates must be strictly increasing ({} follows {})",
                    point.date,
                    points[i - 1].date
                ),
            });
        }
    }
    Ok(())
}

/// Chronological, duplicate-free series of positive closes.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, QuantError> {
        validate_points(&points)?;
        Ok(PriceSeries { points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Keep only points with `start <= date <= end`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> PriceSeries {
        PriceSeries {
            points: self
                .points
                .iter()
                .filter(|p| p.date >= start && p.date <= end)
                .copied()
                .collect(),
        }
    }
}
