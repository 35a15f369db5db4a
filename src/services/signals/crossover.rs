//! Fast/slow SMA crossover strategy.

use super::indicators::Sma;
use super::{load_series, SignalError};
use crate::config::CrossoverConfig;
use crate::types::{SeriesRow, StrategyPerformance, Timestamp};
use std::path::Path;
use tracing::debug;

/// Per-row values derived from a close series. Undefined entries (the first
/// row's position and returns) are already zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CrossoverFrame {
    pub timestamps: Vec<Timestamp>,
    pub sma_fast: Vec<f64>,
    pub sma_slow: Vec<f64>,
    /// 1 while the fast SMA is above the slow SMA, from the warm-up row onward.
    pub signal: Vec<i8>,
    /// +1 on a bullish cross, -1 on a bearish cross.
    pub position: Vec<i8>,
    /// Close-to-close fractional change.
    pub returns: Vec<f64>,
    /// This period's return times the previous period's position.
    pub strategy_returns: Vec<f64>,
}

impl CrossoverFrame {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Sum of strategy returns, in percent.
    pub fn total_returns_pct(&self) -> f64 {
        self.strategy_returns.iter().sum::<f64>() * 100.0
    }

    /// Share of rows (in percent) where the change in position equals the
    /// following period's return.
    ///
    /// The two series are unrelated in scale, so this mostly counts rows where
    /// both are zero. Kept for response compatibility; it is not a measure of
    /// prediction quality. The first and last rows never match because one side
    /// is undefined there.
    pub fn accuracy_pct(&self) -> f64 {
        let n = self.len();
        if n == 0 {
            return 0.0;
        }

        let matches = (1..n.saturating_sub(1))
            .filter(|&i| {
                let position_change = f64::from(self.position[i] - self.position[i - 1]);
                position_change == self.returns[i + 1]
            })
            .count();

        matches as f64 / n as f64 * 100.0
    }

    fn signal_times(&self, direction: i8) -> Vec<Timestamp> {
        self.position
            .iter()
            .zip(&self.timestamps)
            .filter(|(position, _)| **position == direction)
            .map(|(_, ts)| *ts)
            .collect()
    }

    pub fn buy_signals(&self) -> Vec<Timestamp> {
        self.signal_times(1)
    }

    pub fn sell_signals(&self) -> Vec<Timestamp> {
        self.signal_times(-1)
    }
}

/// Evaluates the crossover strategy over a close series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossoverEngine {
    fast: Sma,
    slow: Sma,
}

impl CrossoverEngine {
    pub fn new(fast_window: usize, slow_window: usize) -> Self {
        Self {
            fast: Sma::new(fast_window),
            slow: Sma::new(slow_window),
        }
    }

    pub fn fast_window(&self) -> usize {
        self.fast.period()
    }

    pub fn slow_window(&self) -> usize {
        self.slow.period()
    }

    /// Compute every derived column for `rows`.
    pub fn derive(&self, rows: &[SeriesRow]) -> CrossoverFrame {
        let n = rows.len();
        let closes: Vec<f64> = rows.iter().map(|r| r.close).collect();
        let sma_fast = self.fast.calculate(&closes);
        let sma_slow = self.slow.calculate(&closes);

        let warmup = self.fast.period();
        let signal: Vec<i8> = (0..n)
            .map(|i| i8::from(i >= warmup && sma_fast[i] > sma_slow[i]))
            .collect();

        let mut position = vec![0i8; n];
        let mut returns = vec![0.0; n];
        let mut strategy_returns = vec![0.0; n];
        for i in 1..n {
            position[i] = signal[i] - signal[i - 1];
            returns[i] = period_return(closes[i - 1], closes[i]);
            strategy_returns[i] = returns[i] * f64::from(position[i - 1]);
        }

        CrossoverFrame {
            timestamps: rows.iter().map(|r| r.timestamp).collect(),
            sma_fast,
            sma_slow,
            signal,
            position,
            returns,
            strategy_returns,
        }
    }

    /// Summarise the strategy over `rows`.
    pub fn evaluate(&self, rows: &[SeriesRow]) -> StrategyPerformance {
        if rows.is_empty() {
            return StrategyPerformance::empty();
        }

        let frame = self.derive(rows);
        let performance = StrategyPerformance {
            total_returns: round2(frame.total_returns_pct()),
            accuracy: round2(frame.accuracy_pct()),
            buy_signals: frame.buy_signals(),
            sell_signals: frame.sell_signals(),
        };

        debug!(
            rows = rows.len(),
            buys = performance.buy_signals.len(),
            sells = performance.sell_signals.len(),
            total_returns = performance.total_returns,
            "Evaluated crossover strategy"
        );
        performance
    }

    /// Load the series at `path` and summarise it.
    pub fn evaluate_file(&self, path: &Path) -> Result<StrategyPerformance, SignalError> {
        let rows = load_series(path)?;
        Ok(self.evaluate(&rows))
    }
}

impl Default for CrossoverEngine {
    fn default() -> Self {
        CrossoverConfig::default().into()
    }
}

impl From<CrossoverConfig> for CrossoverEngine {
    fn from(config: CrossoverConfig) -> Self {
        Self::new(config.fast_window, config.slow_window)
    }
}

/// Fractional change from `prev` to `curr`; zero when `prev` is zero.
fn period_return(prev: f64, curr: f64) -> f64 {
    let change = (curr - prev) / prev;
    if change.is_finite() {
        change
    } else {
        0.0
    }
}

/// Two decimal places, ties to even.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn series(closes: &[f64]) -> Vec<SeriesRow> {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| SeriesRow::new(Timestamp::new(start + Duration::days(i as i64)), *close))
            .collect()
    }

    #[test]
    fn test_small_series_derivation() {
        let engine = CrossoverEngine::new(2, 3);
        let frame = engine.derive(&series(&[10.0, 11.0, 12.0, 11.0, 10.0, 9.0]));

        assert_eq!(frame.signal, vec![0, 0, 1, 1, 0, 0]);
        assert_eq!(frame.position, vec![0, 0, 1, 0, -1, 0]);
        assert_eq!(frame.returns[0], 0.0);
        assert!((frame.returns[1] - 0.1).abs() < 1e-12);
        assert!((frame.strategy_returns[3] - (-1.0 / 12.0)).abs() < 1e-12);
        assert!((frame.strategy_returns[5] - 0.1).abs() < 1e-12);
        assert_eq!(frame.strategy_returns[4], 0.0);
    }

    #[test]
    fn test_small_series_summary() {
        let engine = CrossoverEngine::new(2, 3);
        let rows = series(&[10.0, 11.0, 12.0, 11.0, 10.0, 9.0]);
        let performance = engine.evaluate(&rows);

        assert_eq!(performance.total_returns, 1.67);
        assert_eq!(performance.accuracy, 0.0);
        assert_eq!(performance.buy_signals, vec![rows[2].timestamp]);
        assert_eq!(performance.sell_signals, vec![rows[4].timestamp]);
    }

    #[test]
    fn test_equal_averages_do_not_signal() {
        // Row 4: fast (5 + 3) / 2 and slow (4 + 5 + 3) / 3 are both 4.
        let engine = CrossoverEngine::new(2, 3);
        let frame = engine.derive(&series(&[1.0, 2.0, 4.0, 5.0, 3.0]));

        assert_eq!(frame.sma_fast[4], 4.0);
        assert_eq!(frame.sma_slow[4], 4.0);
        assert_eq!(frame.signal, vec![0, 0, 1, 1, 0]);
        assert_eq!(frame.position, vec![0, 0, 1, 0, -1]);
    }

    #[test]
    fn test_flat_tail_sells_once_slow_window_is_flat() {
        let mut closes: Vec<f64> = (0..300).map(|i| 100.0 + i as f64).collect();
        closes.extend(std::iter::repeat(431.17).take(250));
        let rows = series(&closes);

        let performance = CrossoverEngine::default().evaluate(&rows);
        assert_eq!(performance.buy_signals, vec![rows[50].timestamp]);
        assert_eq!(performance.sell_signals, vec![rows[499].timestamp]);
    }

    #[test]
    fn test_round2_ties_to_even() {
        assert_eq!(round2(99.625), 99.62);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(1.666), 1.67);
    }

    #[test]
    fn test_accuracy_tie_rounds_to_even() {
        // 797 of 800 rows match; 99.625 rounds down.
        let mut closes = vec![101.0; 5];
        closes.extend(std::iter::repeat(100.0).take(795));
        let frame_rows = series(&closes);

        let engine = CrossoverEngine::default();
        assert_eq!(engine.derive(&frame_rows).accuracy_pct(), 99.625);
        assert_eq!(engine.evaluate(&frame_rows).accuracy, 99.62);
    }

    #[test]
    fn test_rising_series_single_buy() {
        let closes: Vec<f64> = (0..210).map(|i| 100.0 + i as f64 * 0.5).collect();
        let rows = series(&closes);
        let performance = CrossoverEngine::default().evaluate(&rows);

        assert_eq!(performance.buy_signals, vec![rows[50].timestamp]);
        assert!(performance.sell_signals.is_empty());
        // Only the period after the buy carries a position: 0.5 / 125.
        assert!((performance.total_returns - 0.4).abs() < 1e-9);
        assert_eq!(performance.accuracy, 0.0);
    }

    #[test]
    fn test_flat_series_accuracy_counts_zero_matches() {
        let rows = series(&vec![100.0; 100]);
        let performance = CrossoverEngine::default().evaluate(&rows);

        assert_eq!(performance.accuracy, 98.0);
        assert_eq!(performance.total_returns, 0.0);
        assert!(performance.buy_signals.is_empty());
    }

    #[test]
    fn test_buys_and_sells_alternate() {
        let closes: Vec<f64> = (0..600)
            .map(|i| 100.0 + 20.0 * (i as f64 / 40.0).sin())
            .collect();
        let frame = CrossoverEngine::new(5, 20).derive(&series(&closes));

        let transitions: Vec<i8> = frame.position.iter().copied().filter(|p| *p != 0).collect();
        assert!(!transitions.is_empty());
        assert_eq!(transitions[0], 1);
        for pair in transitions.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_zero_close_does_not_poison_totals() {
        let engine = CrossoverEngine::new(1, 2);
        let performance = engine.evaluate(&series(&[0.0, 1.0, 2.0, 1.0]));
        assert!(performance.total_returns.is_finite());
        assert!(performance.accuracy.is_finite());
    }

    #[test]
    fn test_single_row() {
        let performance = CrossoverEngine::default().evaluate(&series(&[100.0]));
        assert_eq!(performance, StrategyPerformance::empty());
    }

    #[test]
    fn test_empty_series() {
        assert_eq!(CrossoverEngine::default().evaluate(&[]), StrategyPerformance::empty());
    }

    #[test]
    fn test_engine_from_config() {
        let engine = CrossoverEngine::from(CrossoverConfig {
            fast_window: 5,
            slow_window: 20,
        });
        assert_eq!(engine.fast_window(), 5);
        assert_eq!(engine.slow_window(), 20);
    }
}
