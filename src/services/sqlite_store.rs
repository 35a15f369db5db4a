//! SQLite persistence for OHLCV records.
//!
//! Prices are stored as decimal text so they round-trip exactly; timestamps are
//! stored in their canonical `YYYY-MM-DDTHH:MM:SS` form.

use super::repository::{MarketDataRepository, StoreError};
use crate::types::{MarketRecord, NewMarketRecord, Timestamp};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// SQLite store for market data.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a SQLite store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        info!("SQLite store opened at {}", path.as_ref().display());
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing).
    pub fn new_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        debug!("In-memory SQLite store initialized");
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Initialize database schema.
    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS market_data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                datetime TEXT NOT NULL,
                open TEXT NOT NULL,
                high TEXT NOT NULL,
                low TEXT NOT NULL,
                close TEXT NOT NULL,
                volume INTEGER NOT NULL
            )",
            [],
        )?;

        debug!("SQLite schema initialized");
        Ok(())
    }
}

/// A row as SQLite hands it back, before decoding text columns.
struct StoredRow {
    id: i64,
    datetime: String,
    open: String,
    high: String,
    low: String,
    close: String,
    volume: i64,
}

impl StoredRow {
    fn decode(self) -> Result<MarketRecord, StoreError> {
        let id = self.id;
        let price = |field: &'static str, raw: &str| -> Result<Decimal, StoreError> {
            raw.parse().map_err(|e: rust_decimal::Error| StoreError::Corrupt {
                id,
                field,
                reason: e.to_string(),
            })
        };

        Ok(MarketRecord {
            id,
            datetime: self
                .datetime
                .parse::<Timestamp>()
                .map_err(|e| StoreError::Corrupt {
                    id,
                    field: "datetime",
                    reason: e.to_string(),
                })?,
            open: price("open", &self.open)?,
            high: price("high", &self.high)?,
            low: price("low", &self.low)?,
            close: price("close", &self.close)?,
            volume: self.volume,
        })
    }
}

impl MarketDataRepository for SqliteStore {
    fn count(&self) -> Result<u64, StoreError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM market_data", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn create(&self, record: &NewMarketRecord) -> Result<MarketRecord, StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO market_data (datetime, open, high, low, close, volume)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.timestamp.to_string(),
                record.open.to_string(),
                record.high.to_string(),
                record.low.to_string(),
                record.close.to_string(),
                record.volume,
            ],
        )?;
        let id = conn.last_insert_rowid();
        Ok(record.clone().into_record(id))
    }

    fn list(&self, limit: u32, offset: u64) -> Result<Vec<MarketRecord>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, datetime, open, high, low, close, volume
             FROM market_data
             ORDER BY id
             LIMIT ?1 OFFSET ?2",
        )?;

        let rows = stmt
            .query_map(params![limit, offset], |row| {
                Ok(StoredRow {
                    id: row.get(0)?,
                    datetime: row.get(1)?,
                    open: row.get(2)?,
                    high: row.get(3)?,
                    low: row.get(4)?,
                    close: row.get(5)?,
                    volume: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(StoredRow::decode).collect()
    }
}
