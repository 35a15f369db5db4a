//! Moving-average crossover signals.
//!
//! Reads a close-price series, derives a fast/slow SMA trend signal and its
//! transitions, and summarises the resulting strategy returns.

pub mod crossover;
pub mod indicators;
pub mod loader;

pub use crossover::{CrossoverEngine, CrossoverFrame};
pub use loader::load_series;

use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading or evaluating the signal source.
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("signal source not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("signal source has no rows")]
    EmptyInput,

    #[error("signal source is missing columns: {}", .0.join(", "))]
    SchemaMismatch(Vec<String>),

    #[error("malformed signal source: {0}")]
    MalformedInput(String),

    #[error("{0}")]
    Computation(String),
}

impl SignalError {
    fn from_csv(err: csv::Error) -> Self {
        if err.is_io_error() {
            SignalError::Computation(err.to_string())
        } else {
            SignalError::MalformedInput(err.to_string())
        }
    }
}
