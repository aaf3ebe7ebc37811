//! Price data port trait.

use crate::domain::error::QuantError;
use crate::domain::price::PriceSeries;
use chrono::NaiveDate;

/// Anything that can supply a daily close series for an instrument code.
pub trait PriceSource {
    /// Closes for `code` with `start <= date <= end`; an open bound is
    /// unbounded. The result is chronological and validated.
    fn fetch_prices(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceSeries, QuantError>;
}
