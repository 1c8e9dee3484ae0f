//! Simex Core — deterministic exchange simulation for backtesting.
//!
//! This crate contains the engine and everything it stands on:
//! - Domain types (bars, orders, reference price selection)
//! - Fixed-precision arithmetic with downward truncation
//! - Bar-driven exchange with resting limit orders and full fills
//! - Balance accounting with up-front reserves and taker-fee credits
//!
//! The engine is single-threaded and fully deterministic: the same bar
//! sequence and order schedule always produce the same balances, order
//! states and ids.

pub mod domain;
pub mod engine;
pub mod precision;
