//! Order record and its lifecycle vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonically assigned order identifier. The first order gets id 1; the
/// counter advances on every creation attempt, so a rejected creation leaves
/// an observable gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which balance an order consumes at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Accepted order types.
///
/// `Market` is accepted as a tag but rests and fills exactly like `Limit`:
/// it waits for the reference price to cross `order.price`. There is no
/// immediate-execution path in this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Limit,
    Market,
}

/// Order lifecycle states.
///
/// `New → Filled` and `New → Canceled`; both targets are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Accepted, unfilled, eligible for matching on every later bar.
    New,
    /// Completely filled. Orders never partially fill here.
    Filled,
    /// Terminated by explicit cancellation before fill.
    Canceled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Canceled)
    }
}

/// A single resting order.
///
/// Orders are never removed from the engine's collection; terminal orders
/// remain queryable for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub price: f64,
    pub orig_qty: f64,
    pub executed_qty: f64,
    pub cumulative_quote_qty: f64,
    pub status: OrderStatus,
    /// Creation time (engine clock at submission).
    pub time: i64,
    /// Last time the matching step or a cancellation touched this order.
    pub update_time: i64,
}

impl Order {
    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::New
    }

    pub fn remaining_qty(&self) -> f64 {
        self.orig_qty - self.executed_qty
    }
}
