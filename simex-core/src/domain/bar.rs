//! Bar — one sampled interval of the price series.

use serde::{Deserialize, Serialize};

/// OHLCV bar with an epoch-millisecond timestamp.
///
/// Bars are consumed in strictly increasing `time` order; the engine ignores
/// any bar whose time is not past its clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Basic OHLCV sanity check: high bounds the other prices, nothing
    /// negative, nothing NaN.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.low >= 0.0
            && self.volume >= 0.0
    }
}

/// Which bar field fill conditions are tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferencePrice {
    Open,
    High,
    Low,
    #[default]
    Close,
}

impl ReferencePrice {
    /// Select the configured field from a bar.
    pub fn of(&self, bar: &Bar) -> f64 {
        match self {
            ReferencePrice::Open => bar.open,
            ReferencePrice::High => bar.high,
            ReferencePrice::Low => bar.low,
            ReferencePrice::Close => bar.close,
        }
    }
}
