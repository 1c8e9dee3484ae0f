//! Domain types shared across the engine: bars and orders.

pub mod bar;
pub mod order;

pub use bar::{Bar, ReferencePrice};
pub use order::{Order, OrderId, OrderSide, OrderStatus, OrderType};
