//! Trades and per-call match outcomes.

use crate::orderbook::order::{Order, OrderId, Side};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single execution between a resting (maker) order and an incoming (taker) order.
///
/// The price is always the maker's price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Unique trade identifier
    pub id: Uuid,
    /// Instrument symbol
    pub symbol: String,
    /// Execution price (the resting order's price)
    pub price: u128,
    /// Executed quantity, always > 0
    pub quantity: u64,
    /// Buy side order of this trade
    pub buy_order_id: OrderId,
    /// Sell side order of this trade
    pub sell_order_id: OrderId,
    /// The resting order
    pub maker_order_id: OrderId,
    /// The incoming order
    pub taker_order_id: OrderId,
    /// Side of the incoming order
    pub taker_side: Side,
    /// Execution time in milliseconds since epoch
    pub timestamp: u64,
}

impl Trade {
    /// Notional value (price × quantity).
    #[must_use]
    #[inline]
    pub fn notional(&self) -> u128 {
        self.price.saturating_mul(self.quantity as u128)
    }
}

/// Records that a filled iceberg slice was replaced by a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IcebergRefresh {
    /// The iceberg parent
    pub parent_order_id: OrderId,
    /// The slice that just filled
    pub filled_child_id: OrderId,
    /// The slice now resting, if any reserve remained
    pub new_child_id: Option<OrderId>,
    /// Parent quantity still open after the refresh
    pub remaining_size: u64,
}

/// Outcome of submitting one order to an [`crate::OrderBook`].
#[derive(Debug, Clone, Default, Serialize)]
#[must_use]
pub struct MatchResult {
    /// The submitted order id (the iceberg parent id for icebergs)
    pub order_id: Option<OrderId>,
    /// All trades produced by this call, in execution order. Includes trades
    /// of stop orders triggered by this call.
    pub trades: Vec<Trade>,
    /// The part of the submitted order left resting in the book
    pub resting_order: Option<Order>,
    /// Orders (makers, the taker, icebergs, triggered stops) fully filled during this call
    pub filled_order_ids: Vec<OrderId>,
    /// Orders whose unfilled remainder was cancelled instead of resting
    /// (market and IOC remainders, triggered stops), with the cancelled quantity
    pub cancelled_remainders: Vec<(OrderId, u64)>,
    /// Stop orders that triggered during this call
    pub triggered_stop_ids: Vec<OrderId>,
    /// Iceberg slices that were replenished during this call
    pub iceberg_refreshes: Vec<IcebergRefresh>,
    /// `true` if the submitted order is now a pending stop
    pub stop_pending: bool,
}

impl MatchResult {
    pub(crate) fn new(order_id: OrderId) -> Self {
        Self {
            order_id: Some(order_id),
            ..Default::default()
        }
    }

    /// Total quantity executed across all trades.
    #[must_use]
    pub fn executed_quantity(&self) -> u64 {
        self.trades.iter().map(|t| t.quantity).sum()
    }

    /// Quantity executed by trades in which `order_id` took part.
    #[must_use]
    pub fn executed_quantity_for(&self, order_id: OrderId) -> u64 {
        self.trades
            .iter()
            .filter(|t| t.buy_order_id == order_id || t.sell_order_id == order_id)
            .map(|t| t.quantity)
            .sum()
    }

    /// Quantity of `order_id` cancelled instead of resting, zero if none.
    #[must_use]
    pub fn cancelled_quantity_for(&self, order_id: OrderId) -> u64 {
        self.cancelled_remainders
            .iter()
            .filter(|(id, _)| *id == order_id)
            .map(|(_, qty)| *qty)
            .sum()
    }

    /// `true` if the given order fully filled during this call.
    #[must_use]
    pub fn is_filled(&self, order_id: OrderId) -> bool {
        self.filled_order_ids.contains(&order_id)
    }
}
