//! Exchange construction parameters.

use crate::domain::ReferencePrice;
use crate::precision::DEFAULT_PRECISION;
use serde::{Deserialize, Serialize};

/// Configuration for one exchange instance.
///
/// Deserializes with field-level defaults so a TOML config may specify only
/// what it cares about. `fee` seeds both maker and taker rates; either can
/// be overridden separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Starting base-asset balance.
    pub balance_asset: f64,
    /// Starting quote-currency balance.
    pub balance_quote: f64,
    /// Proportional fee rate applied to fill proceeds (e.g. 0.00075).
    pub fee: f64,
    /// Maker fee override; falls back to `fee`.
    pub fee_maker: Option<f64>,
    /// Taker fee override; falls back to `fee`.
    pub fee_taker: Option<f64>,
    /// Bar field used for fill conditions.
    pub reference_price: ReferencePrice,
    /// Decimal digits kept by balance arithmetic.
    pub precision: u32,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            balance_asset: 0.0,
            balance_quote: 0.0,
            fee: 0.0,
            fee_maker: None,
            fee_taker: None,
            reference_price: ReferencePrice::Close,
            precision: DEFAULT_PRECISION,
        }
    }
}

impl ExchangeConfig {
    pub fn new(balance_asset: f64, balance_quote: f64, fee: f64) -> Self {
        Self {
            balance_asset,
            balance_quote,
            fee,
            ..Self::default()
        }
    }

    /// Maker rate after applying the `fee` fallback.
    pub fn resolved_fee_maker(&self) -> f64 {
        self.fee_maker.unwrap_or(self.fee)
    }

    /// Taker rate after applying the `fee` fallback.
    pub fn resolved_fee_taker(&self) -> f64 {
        self.fee_taker.unwrap_or(self.fee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = ExchangeConfig::new(1.0, 20000.0, 0.00075);
        assert_eq!(config.balance_asset, 1.0);
        assert_eq!(config.balance_quote, 20000.0);
        assert_eq!(config.reference_price, ReferencePrice::Close);
        assert_eq!(config.precision, DEFAULT_PRECISION);
    }

    #[test]
    fn single_fee_seeds_both_rates() {
        let config = ExchangeConfig::new(1.0, 20000.0, 0.00075);
        assert_eq!(config.resolved_fee_maker(), 0.00075);
        assert_eq!(config.resolved_fee_taker(), 0.00075);
    }

    #[test]
    fn maker_and_taker_override_independently() {
        let config = ExchangeConfig {
            fee_maker: Some(0.0002),
            fee_taker: Some(0.0004),
            ..ExchangeConfig::new(1.0, 20000.0, 0.00075)
        };
        assert_eq!(config.resolved_fee_maker(), 0.0002);
        assert_eq!(config.resolved_fee_taker(), 0.0004);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: ExchangeConfig =
            toml::from_str("balance_quote = 500.0\nfee = 0.001\n").unwrap();
        assert_eq!(config.balance_asset, 0.0);
        assert_eq!(config.balance_quote, 500.0);
        assert_eq!(config.reference_price, ReferencePrice::Close);
        assert_eq!(config.precision, DEFAULT_PRECISION);
    }
}
