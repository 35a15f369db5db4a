//! Field and cross-field checks for incoming OHLCV records.

use crate::types::NewMarketRecord;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every violation found in one input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("invalid input: {}", describe(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

const NOT_POSITIVE: &str = "Input should be greater than 0";

/// Check the invariants an OHLCV record must satisfy before it is stored:
/// positive prices and volume, `high >= low` and `high >= open`.
pub fn validate_new_record(record: &NewMarketRecord) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let prices = [
        ("open", record.open),
        ("high", record.high),
        ("low", record.low),
        ("close", record.close),
    ];
    for (field, value) in prices {
        if value <= Decimal::ZERO {
            errors.push(field, NOT_POSITIVE);
        }
    }
    if record.volume <= 0 {
        errors.push("volume", NOT_POSITIVE);
    }

    if record.high < record.low {
        errors.push("high", "High cannot be lower than low");
    }
    if record.high < record.open {
        errors.push("high", "High cannot be lower than open");
    }

    errors.into_result()
}
