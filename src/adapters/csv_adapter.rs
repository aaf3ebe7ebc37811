//! CSV price file adapter.
//!
//! Files are header-driven: a `date` (YYYY-MM-DD) and a `close` column are
//! required, anything else is ignored. Rows may appear in any order.

use crate::domain::error::QuantError;
use crate::domain::price::{PricePoint, PriceSeries};
use crate::ports::data_port::PriceSource;
use chrono::NaiveDate;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

enum Location {
    /// `<dir>/<code>.csv`
    Directory(PathBuf),
    /// One file regardless of code.
    File(PathBuf),
}

pub struct CsvAdapter {
    location: Location,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            location: Location::Directory(base_path),
        }
    }

    pub fn from_file(path: PathBuf) -> Self {
        Self {
            location: Location::File(path),
        }
    }

    fn csv_path(&self, code: &str) -> PathBuf {
        match &self.location {
            Location::Directory(dir) => dir.join(format!("{code}.csv")),
            Location::File(path) => path.clone(),
        }
    }
}

fn data_error(path: &Path, reason: impl std::fmt::Display) -> QuantError {
    QuantError::DataSource {
        reason: format!("{}: {}", path.display(), reason),
    }
}

/// Parse `date,close` rows from any reader; rows are returned sorted by date.
pub fn read_prices<R: Read>(reader: R, source: &Path) -> Result<Vec<PricePoint>, QuantError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers().map_err(|e| data_error(source, e))?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| data_error(source, format!("missing {name} column")))
    };
    let date_idx = column("date")?;
    let close_idx = column("close")?;

    let mut points = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| data_error(source, e))?;
        let line = row + 2;

        let date_str = record
            .get(date_idx)
            .ok_or_else(|| data_error(source, format!("line {line}: missing date")))?;
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
            data_error(source, format!("line {line}: invalid date '{date_str}': {e}"))
        })?;

        let close_str = record
            .get(close_idx)
            .ok_or_else(|| data_error(source, format!("line {line}: missing close")))?;
        let close: f64 = close_str.parse().map_err(|e| {
            data_error(source, format!("line {line}: invalid close '{close_str}': {e}"))
        })?;

        points.push(PricePoint::new(date, close));
    }

    points.sort_by_key(|p| p.date);
    Ok(points)
}

/// Write a `date,close` file with a header row.
pub fn write_prices<W: Write>(writer: W, points: &[PricePoint]) -> Result<(), QuantError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for point in points {
        wtr.serialize(point).map_err(|e| QuantError::DataSource {
            reason: format!("failed to write CSV: {e}"),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

impl PriceSource for CsvAdapter {
    fn fetch_prices(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceSeries, QuantError> {
        let path = self.csv_path(code);
        let file = std::fs::File::open(&path).map_err(|e| data_error(&path, e))?;

        let points: Vec<PricePoint> = read_prices(file, &path)?
            .into_iter()
            .filter(|p| start_date.is_none_or(|s| p.date >= s))
            .filter(|p| end_date.is_none_or(|e| p.date <= e))
            .collect();

        debug!(path = %path.display(), rows = points.len(), "Loaded prices");

        PriceSeries::new(points)
    }
}
