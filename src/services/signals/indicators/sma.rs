//! Simple Moving Average (SMA) indicator.

/// SMA (Simple Moving Average) indicator.
///
/// Produces one value per input: the mean of the trailing `period` closes.
/// Until the window fills, the mean covers every close seen so far, so the
/// first value equals the first close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Each mean is summed from its own window, so rounding error does not
    /// carry from one row to the next. A window of identical closes yields
    /// that close exactly.
    pub fn calculate(&self, closes: &[f64]) -> Vec<f64> {
        (0..closes.len())
            .map(|i| {
                let window = &closes[(i + 1).saturating_sub(self.period)..=i];
                let first = window[0];
                if window.iter().all(|&close| close == first) {
                    first
                } else {
                    window.iter().sum::<f64>() / window.len() as f64
                }
            })
            .collect()
    }
}
