use super::Timestamp;
use serde::{Deserialize, Serialize};

/// One row of the signal source: a bar's timestamp and closing price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesRow {
    pub timestamp: Timestamp,
    pub close: f64,
}

impl SeriesRow {
    pub fn new(timestamp: Timestamp, close: f64) -> Self {
        Self { timestamp, close }
    }
}

/// Summary of the moving-average crossover strategy over a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyPerformance {
    /// Cumulative strategy return, in percent.
    pub total_returns: f64,
    /// Percentage of rows where the position change equals the next period's return.
    pub accuracy: f64,
    pub buy_signals: Vec<Timestamp>,
    pub sell_signals: Vec<Timestamp>,
}

impl StrategyPerformance {
    pub fn empty() -> Self {
        Self {
            total_returns: 0.0,
            accuracy: 0.0,
            buy_signals: Vec::new(),
            sell_signals: Vec::new(),
        }
    }
}
