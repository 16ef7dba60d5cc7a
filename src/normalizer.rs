use chrono::{NaiveDateTime, TimeZone};
use tracing::{debug, warn};

use crate::{
    config::{MalformedRowPolicy, NormalizerConfig, DEFAULT_TIMESTAMP_FORMAT},
    error::NormalizeError,
    model::{Bar, Column, Price, RawRow},
};

/// Bars produced by a normalize call, plus the rows it dropped.
#[derive(Default, Debug, Clone)]
pub struct NormalizeReport {
    pub bars: Vec<Bar>,
    pub rejected: Vec<NormalizeError>,
}

/// Converts raw string rows into an ordered bar sequence.
#[derive(Default, Debug, Clone)]
pub struct TimeSeriesNormalizer {
    config: NormalizerConfig,
}

impl TimeSeriesNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    pub fn normalize(&self, rows: &[RawRow]) -> Result<Vec<Bar>, NormalizeError> {
        Ok(self.normalize_report(rows)?.bars)
    }

    /// Under [`MalformedRowPolicy::Abort`] the first bad row is returned as the
    /// error and `rejected` is always empty.
    pub fn normalize_report(&self, rows: &[RawRow]) -> Result<NormalizeReport, NormalizeError> {
        let mut report = NormalizeReport {
            bars: Vec::with_capacity(rows.len()),
            rejected: Vec::new(),
        };

        for row in rows {
            match self.normalize_row(row) {
                Ok(bar) => report.bars.push(bar),
                Err(err) => match self.config.policy() {
                    MalformedRowPolicy::Abort => return Err(err),
                    MalformedRowPolicy::Skip => {
                        warn!("skipping malformed row: {err}");
                        report.rejected.push(err);
                    }
                },
            }
        }

        // stable: equal times keep input order
        report.bars.sort_by_key(|bar| bar.time);

        debug!(
            rows = rows.len(),
            bars = report.bars.len(),
            rejected = report.rejected.len(),
            "normalized rows"
        );

        Ok(report)
    }

    pub fn normalize_row(&self, row: &RawRow) -> Result<Bar, NormalizeError> {
        Ok(Bar {
            time: self.parse_time(row)?,
            open: parse_price(row, Column::Open)?,
            high: parse_price(row, Column::High)?,
            low: parse_price(row, Column::Low)?,
            close: parse_price(row, Column::Close)?,
            volume: parse_volume(row)?,
        })
    }

    fn parse_time(&self, row: &RawRow) -> Result<i64, NormalizeError> {
        let value = field(row, Column::Timestamp)?;
        let format = self.config.timestamp_format();
        let invalid = || NormalizeError::UnparseableTimestamp {
            line: row.line,
            value: value.to_owned(),
            format: format.to_owned(),
        };

        // chrono accepts short numeric fields and any run of whitespace
        if format == DEFAULT_TIMESTAMP_FORMAT && !has_default_shape(value) {
            return Err(invalid());
        }

        let naive = NaiveDateTime::parse_from_str(value, format).map_err(|_| invalid())?;
        let local = self
            .config
            .offset()
            .from_local_datetime(&naive)
            .single()
            .ok_or_else(invalid)?;

        // whole seconds, sub-second part floored
        Ok(local.timestamp())
    }
}

/// `YYYY-MM-DD HH:MM:SS`, optionally followed by `.` and at least one digit.
fn has_default_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() < 19 {
        return false;
    }

    let (stamp, fraction) = bytes.split_at(19);
    let stamp_ok = stamp.iter().enumerate().all(|(ix, b)| match ix {
        4 | 7 => *b == b'-',
        10 => *b == b' ',
        13 | 16 => *b == b':',
        _ => b.is_ascii_digit(),
    });
    let fraction_ok = match fraction.split_first() {
        None => true,
        Some((b'.', digits)) => !digits.is_empty() && digits.iter().all(u8::is_ascii_digit),
        Some(_) => false,
    };

    stamp_ok && fraction_ok
}

fn field(row: &RawRow, column: Column) -> Result<&str, NormalizeError> {
    row.get(column)
        .map(str::trim)
        .ok_or(NormalizeError::MissingColumn {
            line: row.line,
            column,
        })
}

fn unparseable(row: &RawRow, column: Column, value: &str) -> NormalizeError {
    NormalizeError::UnparseableNumeric {
        line: row.line,
        column,
        value: value.to_owned(),
    }
}

fn parse_price(row: &RawRow, column: Column) -> Result<Price, NormalizeError> {
    let value = field(row, column)?;

    match value.parse::<Price>() {
        Ok(price) if price.is_finite() => Ok(price),
        _ => Err(unparseable(row, column, value)),
    }
}

/// Integer volume; a decimal value is truncated toward zero.
fn parse_volume(row: &RawRow) -> Result<u64, NormalizeError> {
    let value = field(row, Column::Volume)?;

    if let Ok(volume) = value.parse::<u64>() {
        return Ok(volume);
    }

    match value.parse::<f64>().map(f64::trunc) {
        Ok(volume) if volume.is_finite() && volume >= 0.0 && volume < u64::MAX as f64 => {
            Ok(volume as u64)
        }
        _ => Err(unparseable(row, Column::Volume, value)),
    }
}
