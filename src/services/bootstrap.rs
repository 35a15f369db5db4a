//! One-shot seeding of an empty store from a spreadsheet export.
//!
//! Workbooks (`.xlsx`, `.xls`, `.ods`, ...) are read through calamine; files
//! with a `.csv` extension are read as CSV. Only the first worksheet is used.

use super::repository::{MarketDataRepository, StoreError};
use crate::types::{NewMarketRecord, Timestamp};
use calamine::{open_workbook_auto, Data, DataType, Reader};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

/// Columns the seed file must provide, matched case-insensitively.
pub const SEED_COLUMNS: [&str; 6] = ["datetime", "close", "high", "low", "open", "volume"];

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("seed file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unreadable workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("unreadable CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("workbook has no worksheets")]
    NoWorksheet,

    #[error("seed file is missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Inserted { id: i64 },
    Failed { reason: String },
}

/// What happened to one data row of the seed file.
#[derive(Debug, Clone, PartialEq)]
pub struct RowResult {
    /// 1-based row number in the sheet, counting the header.
    pub row: usize,
    /// The row's datetime cell as read, empty when absent.
    pub timestamp: String,
    pub outcome: RowOutcome,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedReport {
    pub rows: Vec<RowResult>,
}

impl SeedReport {
    pub fn inserted(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| matches!(r.outcome, RowOutcome::Inserted { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.rows.len() - self.inserted()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeedOutcome {
    /// The store already held `existing` records; nothing was read.
    Skipped { existing: u64 },
    Loaded(SeedReport),
}

/// Load the seed file at `path` into `repo`, unless `repo` already has records.
///
/// Rows that fail to convert or insert are recorded and skipped; earlier
/// inserts are kept.
pub fn seed_if_empty(
    repo: &dyn MarketDataRepository,
    path: &Path,
) -> Result<SeedOutcome, BootstrapError> {
    let existing = repo.count()?;
    if existing > 0 {
        info!("Table already contains data. Skipping insertion.");
        return Ok(SeedOutcome::Skipped { existing });
    }

    let sheet = read_sheet(path)?;
    let columns = SeedColumns::locate(&sheet.headers)?;

    let mut report = SeedReport::default();
    for (i, cells) in sheet.rows.iter().enumerate() {
        if cells.iter().all(Option::is_none) {
            continue;
        }

        let timestamp = columns.text(cells, columns.datetime).unwrap_or_default().to_string();
        let outcome = match columns
            .build_record(cells)
            .and_then(|record| repo.create(&record).map_err(|e| e.to_string()))
        {
            Ok(created) => {
                info!("Inserted data for {} into the database.", timestamp);
                RowOutcome::Inserted { id: created.id }
            }
            Err(reason) => {
                warn!("Error inserting data for {}: {}", timestamp, reason);
                RowOutcome::Failed { reason }
            }
        };

        report.rows.push(RowResult {
            row: i + 2,
            timestamp,
            outcome,
        });
    }

    info!(
        inserted = report.inserted(),
        failed = report.failed(),
        "Seeded market data from {}",
        path.display()
    );
    Ok(SeedOutcome::Loaded(report))
}

/// Header row plus data rows, with blank cells as `None`.
struct Sheet {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

fn read_sheet(path: &Path) -> Result<Sheet, BootstrapError> {
    if !path.exists() {
        return Err(BootstrapError::NotFound(path.to_path_buf()));
    }

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        read_csv(path)
    } else {
        read_workbook(path)
    }
}

fn read_csv(path: &Path) -> Result<Sheet, BootstrapError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    let field = field.trim();
                    (!field.is_empty()).then(|| field.to_string())
                })
                .collect(),
        );
    }

    Ok(Sheet { headers, rows })
}

fn read_workbook(path: &Path) -> Result<Sheet, BootstrapError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(BootstrapError::NoWorksheet)??;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|header| {
            header
                .iter()
                .map(|cell| cell_text(cell).unwrap_or_default())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    let rows = rows
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
        .collect();

    Ok(Sheet { headers, rows })
}

/// Text form of a workbook cell. Date cells come out in canonical timestamp form.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::DateTime(_) | Data::DateTimeIso(_) => Some(
            cell.as_datetime()
                .map(|dt| Timestamp::new(dt).to_string())
                .unwrap_or_else(|| cell.to_string()),
        ),
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

/// Positions of the seed columns within a row.
#[derive(Debug, Clone, Copy)]
struct SeedColumns {
    datetime: usize,
    close: usize,
    high: usize,
    low: usize,
    open: usize,
    volume: usize,
}

impl SeedColumns {
    fn locate(headers: &[String]) -> Result<Self, BootstrapError> {
        let find = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
        let found: Vec<Option<usize>> = SEED_COLUMNS.iter().map(|&name| find(name)).collect();

        match found[..] {
            [Some(datetime), Some(close), Some(high), Some(low), Some(open), Some(volume)] => {
                Ok(Self {
                    datetime,
                    close,
                    high,
                    low,
                    open,
                    volume,
                })
            }
            _ => Err(BootstrapError::MissingColumns(
                SEED_COLUMNS
                    .iter()
                    .zip(&found)
                    .filter(|(_, idx)| idx.is_none())
                    .map(|(name, _)| name.to_string())
                    .collect(),
            )),
        }
    }

    fn text<'a>(&self, cells: &'a [Option<String>], idx: usize) -> Option<&'a str> {
        cells.get(idx).and_then(|cell| cell.as_deref())
    }

    fn build_record(&self, cells: &[Option<String>]) -> Result<NewMarketRecord, String> {
        let field = |name: &str, idx: usize| {
            self.text(cells, idx)
                .ok_or_else(|| format!("missing {}", name))
        };
        let price = |name: &str, idx: usize| -> Result<Decimal, String> {
            let raw = field(name, idx)?;
            Decimal::from_str(raw)
                .or_else(|_| Decimal::from_scientific(raw))
                .map_err(|e| format!("invalid {} {:?}: {}", name, raw, e))
        };

        let raw_ts = field("datetime", self.datetime)?;
        let timestamp = raw_ts.parse::<Timestamp>().map_err(|e| e.to_string())?;

        Ok(NewMarketRecord {
            timestamp,
            open: price("open", self.open)?,
            high: price("high", self.high)?,
            low: price("low", self.low)?,
            close: price("close", self.close)?,
            volume: parse_volume(field("volume", self.volume)?)?,
        })
    }
}

/// Integer volume; fractional values are truncated toward zero.
fn parse_volume(raw: &str) -> Result<i64, String> {
    if let Ok(volume) = raw.parse::<i64>() {
        return Ok(volume);
    }
    match raw.parse::<f64>() {
        Ok(volume) if volume.is_finite() && volume.abs() < i64::MAX as f64 => {
            Ok(volume.trunc() as i64)
        }
        _ => Err(format!("invalid volume {:?}", raw)),
    }
}
