use super::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A stored OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    pub id: i64,
    pub datetime: Timestamp,
    #[serde(with = "rust_decimal::serde::float")]
    pub open: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub high: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub low: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub close: Decimal,
    pub volume: i64,
}

/// Incoming OHLCV bar, before the store assigns an id.
///
/// Prices accept JSON numbers or numeric strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewMarketRecord {
    pub timestamp: Timestamp,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
}

impl NewMarketRecord {
    pub(crate) fn into_record(self, id: i64) -> MarketRecord {
        MarketRecord {
            id,
            datetime: self.timestamp,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        }
    }
}
