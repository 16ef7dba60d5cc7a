//! Chart overlay indicators computed from a bar series.
//!
//! Values are `None` while an indicator is still warming up.

use crate::model::{Bar, Price};

pub const RSI_INTERVAL: usize = 14;
pub const ALMA_WINDOW: usize = 20;
pub const ALMA_OFFSET: f64 = 0.85;
pub const ALMA_SIGMA: f64 = 6.0;

/// Exponentially weighted mean with bias-adjusted weights: each new value has
/// weight 1 and older weights decay by `1 - alpha` per step.
#[derive(Debug)]
pub struct ExponentialAverage {
    decay: f64,
    value: Price,
    weight: f64,
    length: usize,
}

impl ExponentialAverage {
    pub fn new(alpha: f64) -> Self {
        Self {
            decay: 1.0 - alpha,
            value: 0.0,
            weight: 0.0,
            length: 0,
        }
    }

    /// Center of mass `com`, i.e. `alpha = 1 / (1 + com)`.
    pub fn with_com(com: f64) -> Self {
        Self::new(1.0 / (1.0 + com))
    }

    pub fn feed(&mut self, value: Price) {
        self.value = value + self.decay * self.value;
        self.weight = 1.0 + self.decay * self.weight;
        self.length += 1;
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn avg(&self) -> Price {
        self.value / self.weight
    }
}

/// Relative strength index of closes, smoothed with center of mass
/// `interval - 1`. The first value appears once `interval` price changes
/// have been seen. A window with no movement at all has no value.
pub fn rsi(bars: &[Bar], interval: usize) -> Vec<Option<Price>> {
    let mut result = Vec::with_capacity(bars.len());
    if bars.is_empty() {
        return result;
    }

    let com = interval.saturating_sub(1) as f64;
    let mut gain = ExponentialAverage::with_com(com);
    let mut loss = ExponentialAverage::with_com(com);

    result.push(None);

    for pair in bars.windows(2) {
        let delta = pair[1].close - pair[0].close;
        gain.feed(delta.max(0.0));
        loss.feed((-delta).max(0.0));

        if interval == 0 || gain.len() < interval {
            result.push(None);
            continue;
        }

        let (gain, loss) = (gain.avg(), loss.avg());
        result.push(match (gain > 0.0, loss > 0.0) {
            (false, false) => None,
            (true, false) => Some(100.0),
            _ => Some(100.0 - 100.0 / (1.0 + gain / loss)),
        });
    }

    result
}

/// Gaussian weights of the Arnaud Legoux moving average.
fn alma_weights(window: usize, offset: f64, sigma: f64) -> Vec<f64> {
    let m = (offset * (window - 1) as f64).floor();
    let s = window as f64 / sigma;

    (0..window)
        .map(|k| (-(k as f64 - m).powi(2) / (2.0 * s * s)).exp())
        .collect()
}

/// Arnaud Legoux moving average over `window` values ending at each index.
pub fn alma(values: &[Price], window: usize, offset: f64, sigma: f64) -> Vec<Option<Price>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let weights = alma_weights(window, offset, sigma);
    let total: f64 = weights.iter().sum();

    let mut result = vec![None; (window - 1).min(values.len())];
    result.extend(values.windows(window).map(|slice| {
        let weighted: f64 = slice.iter().zip(&weights).map(|(v, w)| v * w).sum();
        Some(weighted / total)
    }));

    result
}

pub fn closes(bars: &[Bar]) -> Vec<Price> {
    bars.iter().map(|bar| bar.close).collect()
}
