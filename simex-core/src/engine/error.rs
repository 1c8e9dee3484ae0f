//! Engine error taxonomy.
//!
//! Every error is reported synchronously to the caller of the operation that
//! detected it; nothing is retried internally. A rejected operation leaves
//! engine state untouched except for the monotonic order-id counter.

use crate::domain::OrderId;
use std::fmt;
use thiserror::Error;

/// Which balance an insufficient-funds rejection refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceSide {
    Asset,
    Quote,
}

impl fmt::Display for BalanceSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceSide::Asset => write!(f, "asset"),
            BalanceSide::Quote => write!(f, "quote"),
        }
    }
}

/// Errors from exchange operations.
#[derive(Debug, Error, PartialEq)]
pub enum ExchangeError {
    /// Order creation would drive a balance negative. `shortfall` is the
    /// positive amount missing; formatting happens only at this boundary,
    /// the fields stay typed.
    #[error("insufficient {side} balance, missing {shortfall}")]
    InsufficientBalance { side: BalanceSide, shortfall: f64 },

    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    #[error("no bar sequence configured for pull-based advance")]
    MissingBarSequence,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_balance_formats_side_and_shortfall() {
        let err = ExchangeError::InsufficientBalance {
            side: BalanceSide::Asset,
            shortfall: 0.5,
        };
        assert_eq!(err.to_string(), "insufficient asset balance, missing 0.5");

        let err = ExchangeError::InsufficientBalance {
            side: BalanceSide::Quote,
            shortfall: 5000.0,
        };
        assert_eq!(err.to_string(), "insufficient quote balance, missing 5000");
    }

    #[test]
    fn order_not_found_names_the_id() {
        let err = ExchangeError::OrderNotFound(crate::domain::OrderId(7));
        assert_eq!(err.to_string(), "order 7 not found");
    }
}
