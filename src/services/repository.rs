//! Storage interface for OHLCV records.

use crate::types::{MarketRecord, NewMarketRecord};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("record {id} has an unreadable {field}: {reason}")]
    Corrupt {
        id: i64,
        field: &'static str,
        reason: String,
    },

    #[error("database connection lock poisoned")]
    LockPoisoned,
}

/// Count, create and page through OHLCV records.
///
/// Records are never updated or deleted; duplicates are accepted.
pub trait MarketDataRepository: Send + Sync {
    fn count(&self) -> Result<u64, StoreError>;

    fn create(&self, record: &NewMarketRecord) -> Result<MarketRecord, StoreError>;

    /// Up to `limit` records in insertion order, skipping the first `offset`.
    fn list(&self, limit: u32, offset: u64) -> Result<Vec<MarketRecord>, StoreError>;
}
