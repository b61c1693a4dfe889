//! Daily SMA and RSI over closing prices

use std::fmt;
use std::str::FromStr;
use ta::Next;
use ta::indicators::SimpleMovingAverage;
use thiserror::Error;

/// Indicators the technical tool knows how to compute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Sma,
    Rsi,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndicatorError {
    #[error("unsupported indicator: {0}")]
    Unsupported(String),

    #[error("window size must be greater than 0")]
    ZeroWindow,

    #[error("need {needed} closing prices, only {available} available")]
    NotEnoughData { needed: usize, available: usize },
}

impl FromStr for Indicator {
    type Err = IndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SMA" => Ok(Self::Sma),
            "RSI" => Ok(Self::Rsi),
            other => Err(IndicatorError::Unsupported(other.to_string())),
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sma => write!(f, "SMA"),
            Self::Rsi => write!(f, "RSI"),
        }
    }
}

/// One computed reading, rendered the way the model receives it
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorValue {
    pub kind: Indicator,
    pub window: usize,
    pub symbol: String,
    pub value: f64,
}

impl fmt::Display for IndicatorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) hiện tại của {} là: {:.2}",
            self.kind, self.window, self.symbol, self.value
        )
    }
}

impl Indicator {
    /// Closing prices needed for one value with this window
    pub fn min_samples(self, window: usize) -> usize {
        match self {
            Self::Sma => window,
            Self::Rsi => window.saturating_add(1),
        }
    }

    /// Latest value of the indicator over `closes` (oldest first)
    pub fn latest(self, closes: &[f64], window: usize) -> Result<f64, IndicatorError> {
        match self {
            Self::Sma => sma(closes, window),
            Self::Rsi => rsi(closes, window),
        }
    }
}

/// Mean of the last `window` closes
pub fn sma(closes: &[f64], window: usize) -> Result<f64, IndicatorError> {
    check_samples(closes.len(), window, Indicator::Sma)?;
    rolling_mean_last(closes.iter().copied(), window)
}

/// Relative strength index from plain rolling means of gains and losses
///
/// Uses the simple mean of the last `window` close-to-close changes rather
/// than Wilder smoothing. A window with no losses gives 100; a flat window
/// gives NaN.
pub fn rsi(closes: &[f64], window: usize) -> Result<f64, IndicatorError> {
    check_samples(closes.len(), window, Indicator::Rsi)?;

    let deltas: Vec<f64> = closes.windows(2).map(|pair| pair[1] - pair[0]).collect();
    let gain = rolling_mean_last(deltas.iter().map(|d| d.max(0.0)), window)?;
    let loss = rolling_mean_last(deltas.iter().map(|d| (-d).max(0.0)), window)?;

    let rs = gain / loss;
    Ok(100.0 - 100.0 / (1.0 + rs))
}

fn check_samples(available: usize, window: usize, indicator: Indicator) -> Result<(), IndicatorError> {
    if window == 0 {
        return Err(IndicatorError::ZeroWindow);
    }
    let needed = indicator.min_samples(window);
    if available < needed {
        return Err(IndicatorError::NotEnoughData { needed, available });
    }
    Ok(())
}

fn rolling_mean_last(values: impl Iterator<Item = f64>, window: usize) -> Result<f64, IndicatorError> {
    let mut sma = SimpleMovingAverage::new(window).map_err(|_| IndicatorError::ZeroWindow)?;
    Ok(values.fold(f64::NAN, |_, value| sma.next(value)))
}
