//! The exchange: bar-driven matching and accounting.
//!
//! One instance owns the order collection, both balances, and the simulated
//! clock. Time moves only by processing bars; on each advance every open
//! order is tested against the bar's reference price and either fills
//! completely or keeps resting. There is no partial-fill path.
//!
//! Single-writer by construction: no interior mutability, no background
//! work. Parallel backtests run parallel instances.

use crate::domain::{Bar, Order, OrderId, OrderSide, OrderStatus, OrderType, ReferencePrice};
use crate::engine::config::ExchangeConfig;
use crate::engine::error::{BalanceSide, ExchangeError};
use crate::precision::truncate;
use serde::{Deserialize, Serialize};

/// Snapshot of both account balances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Balances {
    pub asset: f64,
    pub quote: f64,
}

/// Deterministic single-instrument exchange simulator.
///
/// Balances are mutated only by order creation (reserve), cancellation
/// (release) and fill (credit net of the taker fee); every balance amount
/// passes through downward truncation at the configured precision, so the
/// account can never be over-credited by rounding.
pub struct Exchange {
    fee_maker: f64,
    fee_taker: f64,
    reference_price: ReferencePrice,
    precision: u32,
    balance_asset: f64,
    balance_quote: f64,
    /// Creation order; terminal orders are kept for audit.
    orders: Vec<Order>,
    /// Advances on every creation attempt, including rejected ones.
    next_order_id: u64,
    /// Engine clock, epoch milliseconds. Strictly monotonic.
    time: i64,
    bars: Option<Vec<Bar>>,
    cursor: usize,
}

impl Exchange {
    /// Push-based construction: the caller feeds bars to [`advance_time`].
    ///
    /// [`advance_time`]: Exchange::advance_time
    pub fn new(config: ExchangeConfig) -> Self {
        Self::build(config, None)
    }

    /// Pull-based construction: the exchange owns an ordered bar sequence
    /// consumed by [`next_bar`].
    ///
    /// [`next_bar`]: Exchange::next_bar
    pub fn with_bars(config: ExchangeConfig, bars: Vec<Bar>) -> Self {
        Self::build(config, Some(bars))
    }

    fn build(config: ExchangeConfig, bars: Option<Vec<Bar>>) -> Self {
        Self {
            fee_maker: config.resolved_fee_maker(),
            fee_taker: config.resolved_fee_taker(),
            reference_price: config.reference_price,
            precision: config.precision,
            balance_asset: config.balance_asset,
            balance_quote: config.balance_quote,
            orders: Vec::new(),
            next_order_id: 1,
            time: 0,
            bars,
            cursor: 0,
        }
    }

    // ── Time ───────────────────────────────────────────────────────────

    /// Advance the clock to `bar` and run the matching step.
    ///
    /// A bar whose time is not strictly past the clock is a stale duplicate
    /// and changes nothing. Returns whether time advanced.
    ///
    /// Orders created strictly before the new clock value are evaluated
    /// against the bar's reference price: a buy fills when the price is at
    /// or below its limit, a sell when at or above. A fill credits the
    /// receiving balance net of the taker fee and is final; evaluated orders
    /// that do not fill only get their `update_time` refreshed.
    pub fn advance_time(&mut self, bar: &Bar) -> bool {
        if bar.time <= self.time {
            return false;
        }
        self.time = bar.time;

        let price = self.reference_price.of(bar);
        let time = self.time;
        let fee_taker = self.fee_taker;
        let precision = self.precision;
        let balance_asset = &mut self.balance_asset;
        let balance_quote = &mut self.balance_quote;

        for order in &mut self.orders {
            // An order must not fill on the bar that created it.
            if order.status != OrderStatus::New || order.time >= time {
                continue;
            }

            let crossed = match order.side {
                OrderSide::Buy => price <= order.price,
                OrderSide::Sell => price >= order.price,
            };

            if crossed {
                match order.side {
                    OrderSide::Buy => {
                        *balance_asset +=
                            truncate(order.orig_qty * (1.0 - fee_taker), precision);
                    }
                    OrderSide::Sell => {
                        let quote = truncate(order.orig_qty * order.price, precision);
                        *balance_quote += truncate(quote * (1.0 - fee_taker), precision);
                    }
                }
                order.executed_qty = order.orig_qty;
                order.cumulative_quote_qty = order.orig_qty;
                order.status = OrderStatus::Filled;
            }

            order.update_time = time;
        }

        true
    }

    /// Consume and process the next bar of the owned sequence.
    ///
    /// Returns `Ok(None)` once the sequence is exhausted. An exchange
    /// constructed without a sequence always fails with
    /// [`ExchangeError::MissingBarSequence`].
    pub fn next_bar(&mut self) -> Result<Option<Bar>, ExchangeError> {
        let bars = self
            .bars
            .as_ref()
            .ok_or(ExchangeError::MissingBarSequence)?;

        let bar = match bars.get(self.cursor) {
            Some(bar) => *bar,
            None => return Ok(None),
        };

        self.cursor += 1;
        self.advance_time(&bar);
        Ok(Some(bar))
    }

    // ── Orders ─────────────────────────────────────────────────────────

    /// Create a resting order, reserving funds up front.
    ///
    /// A buy reserves `price * quantity` (truncated) from the quote balance,
    /// a sell reserves `quantity` from the asset balance. A reserve that
    /// would drive the balance negative rejects the creation with no state
    /// change other than the id counter, which advances on every attempt;
    /// ids are never reused, so rejections leave observable gaps.
    pub fn create_order(
        &mut self,
        side: OrderSide,
        order_type: OrderType,
        price: f64,
        quantity: f64,
    ) -> Result<Order, ExchangeError> {
        let id = OrderId(self.next_order_id);
        self.next_order_id += 1;

        match side {
            OrderSide::Buy => {
                let reserve = truncate(price * quantity, self.precision);
                if self.balance_quote - reserve < 0.0 {
                    return Err(ExchangeError::InsufficientBalance {
                        side: BalanceSide::Quote,
                        shortfall: reserve - self.balance_quote,
                    });
                }
                self.balance_quote -= reserve;
            }
            OrderSide::Sell => {
                if self.balance_asset - quantity < 0.0 {
                    return Err(ExchangeError::InsufficientBalance {
                        side: BalanceSide::Asset,
                        shortfall: quantity - self.balance_asset,
                    });
                }
                self.balance_asset -= quantity;
            }
        }

        let order = Order {
            id,
            side,
            order_type,
            price,
            orig_qty: quantity,
            executed_qty: 0.0,
            cumulative_quote_qty: 0.0,
            status: OrderStatus::New,
            time: self.time,
            update_time: self.time,
        };
        self.orders.push(order.clone());
        Ok(order)
    }

    /// Cancel an order, releasing its unfilled reserve.
    ///
    /// Canceling an already-terminal order succeeds without touching
    /// anything and returns the order as it stands; the operation is
    /// idempotent. Unknown ids fail with [`ExchangeError::OrderNotFound`].
    pub fn cancel_order(&mut self, id: OrderId) -> Result<Order, ExchangeError> {
        let precision = self.precision;
        let time = self.time;

        let index = self
            .orders
            .iter()
            .position(|order| order.id == id)
            .ok_or(ExchangeError::OrderNotFound(id))?;

        let order = &mut self.orders[index];
        if order.status.is_terminal() {
            return Ok(order.clone());
        }

        match order.side {
            OrderSide::Buy => {
                self.balance_quote += truncate(order.price * order.remaining_qty(), precision);
            }
            OrderSide::Sell => {
                self.balance_asset += order.remaining_qty();
            }
        }

        order.status = OrderStatus::Canceled;
        order.update_time = time;
        Ok(order.clone())
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn balances(&self) -> Balances {
        Balances {
            asset: self.balance_asset,
            quote: self.balance_quote,
        }
    }

    pub fn balance_asset(&self) -> f64 {
        self.balance_asset
    }

    pub fn balance_quote(&self) -> f64 {
        self.balance_quote
    }

    /// All orders in creation order, terminal ones included.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Look up a single order by id.
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| order.id == id)
    }

    /// Orders still eligible for matching.
    pub fn open_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|order| order.is_open())
    }

    /// Engine clock, epoch milliseconds. Zero until the first bar.
    pub fn time(&self) -> i64 {
        self.time
    }

    /// How many bars of the owned sequence have been consumed.
    pub fn bars_consumed(&self) -> usize {
        self.cursor
    }

    pub fn fee_maker(&self) -> f64 {
        self.fee_maker
    }

    pub fn fee_taker(&self) -> f64 {
        self.fee_taker
    }

    pub fn reference_price(&self) -> ReferencePrice {
        self.reference_price
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }
}
