//! Exchange simulation: configuration, errors and the engine itself.

pub mod config;
pub mod error;
pub mod exchange;

pub use config::ExchangeConfig;
pub use error::{BalanceSide, ExchangeError};
pub use exchange::{Balances, Exchange};
