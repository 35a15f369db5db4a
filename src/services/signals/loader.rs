//! Reads the `datetime`/`close` series the crossover strategy runs on.

use super::SignalError;
use crate::types::{SeriesRow, Timestamp};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

pub const TIMESTAMP_COLUMN: &str = "datetime";
pub const CLOSE_COLUMN: &str = "close";

/// Load a time-ordered close series from a CSV file with a header row.
///
/// Extra columns are ignored. Every row must have as many fields as the header.
pub fn load_series(path: &Path) -> Result<Vec<SeriesRow>, SignalError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SignalError::NotFound(path.to_path_buf()),
        _ => SignalError::Computation(e.to_string()),
    })?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    let headers = reader.headers().map_err(SignalError::from_csv)?.clone();
    if headers.is_empty() {
        return Err(SignalError::EmptyInput);
    }

    let records = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(SignalError::from_csv)?;
    if records.is_empty() {
        return Err(SignalError::EmptyInput);
    }

    let position = |name: &str| headers.iter().position(|h| h == name);
    let (ts_idx, close_idx) = match (position(TIMESTAMP_COLUMN), position(CLOSE_COLUMN)) {
        (Some(ts_idx), Some(close_idx)) => (ts_idx, close_idx),
        (ts_idx, close_idx) => {
            let mut missing = Vec::new();
            if close_idx.is_none() {
                missing.push(CLOSE_COLUMN.to_string());
            }
            if ts_idx.is_none() {
                missing.push(TIMESTAMP_COLUMN.to_string());
            }
            return Err(SignalError::SchemaMismatch(missing));
        }
    };

    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let line = i + 2;
            let raw_ts = record.get(ts_idx).unwrap_or_default();
            let raw_close = record.get(close_idx).unwrap_or_default();

            let timestamp = raw_ts.parse::<Timestamp>().map_err(|e| {
                SignalError::MalformedInput(format!("line {}: {}", line, e))
            })?;
            let close = raw_close
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|close| close.is_finite())
                .ok_or_else(|| {
                    SignalError::MalformedInput(format!(
                        "line {}: invalid close {:?}",
                        line, raw_close
                    ))
                })?;

            Ok(SeriesRow::new(timestamp, close))
        })
        .collect()
}
