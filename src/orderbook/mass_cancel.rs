//! Mass cancel operations for bulk order removal.
//!
//! Cancel every live order, or every order on one side, of one user or inside
//! a price range. Iceberg orders are cancelled as a whole through their parent
//! and pending stop orders are included.
//!
//! All mass cancel methods reuse the single-order `cancel_order` path,
//! ensuring consistent iceberg cleanup and empty price-level removal.

use super::book::OrderBook;
use super::order::{Order, OrderId, Side};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Result of a mass cancel operation.
///
/// Fields are private to keep the result immutable. Use the accessor methods.
///
/// # Examples
///
/// ```
/// use matching_core::orderbook::mass_cancel::MassCancelResult;
///
/// let result = MassCancelResult::default();
/// assert_eq!(result.cancelled_count(), 0);
/// assert!(result.cancelled_order_ids().is_empty());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[must_use]
pub struct MassCancelResult {
    /// The cancelled orders (iceberg parents for icebergs), in processing order.
    cancelled_orders: Vec<Order>,
}

impl MassCancelResult {
    pub(crate) fn new(cancelled_orders: Vec<Order>) -> Self {
        Self { cancelled_orders }
    }

    /// Returns the number of orders successfully cancelled.
    #[must_use]
    #[inline]
    pub fn cancelled_count(&self) -> usize {
        self.cancelled_orders.len()
    }

    /// Returns the identifiers of all cancelled orders, in processing order.
    #[must_use]
    pub fn cancelled_order_ids(&self) -> Vec<OrderId> {
        self.cancelled_orders.iter().map(|order| order.id).collect()
    }

    /// Returns the cancelled orders as they were when removed.
    #[must_use]
    #[inline]
    pub fn cancelled_orders(&self) -> &[Order] {
        &self.cancelled_orders
    }

    /// Total open quantity removed from the book.
    #[must_use]
    pub fn cancelled_quantity(&self) -> u64 {
        self.cancelled_orders
            .iter()
            .map(|order| order.remaining_quantity)
            .sum()
    }

    /// Returns `true` if no orders were cancelled.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cancelled_orders.is_empty()
    }
}

impl std::fmt::Display for MassCancelResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MassCancelResult {{ cancelled: {} }}",
            self.cancelled_count()
        )
    }
}

impl OrderBook {
    /// Cancel every live order in the book: both sides, hidden orders,
    /// icebergs and pending stops.
    ///
    /// # Examples
    ///
    /// ```
    /// use matching_core::{Order, OrderBook, Side};
    ///
    /// let mut book = OrderBook::new("TEST");
    /// book.add_order(Order::limit("TEST", Side::Buy, 100, 10)).unwrap();
    /// book.add_order(Order::limit("TEST", Side::Sell, 110, 5)).unwrap();
    ///
    /// let result = book.cancel_all_orders();
    /// assert_eq!(result.cancelled_count(), 2);
    /// assert_eq!(book.best_bid(), None);
    /// assert_eq!(book.best_ask(), None);
    /// ```
    pub fn cancel_all_orders(&mut self) -> MassCancelResult {
        trace!("Order book {}: Mass cancel ALL orders", self.symbol);
        let order_ids = self.collect_order_ids(|_| true);
        self.cancel_order_batch(&order_ids)
    }

    /// Cancel all live orders on a specific side.
    pub fn cancel_orders_by_side(&mut self, side: Side) -> MassCancelResult {
        trace!(
            "Order book {}: Mass cancel orders on side {}",
            self.symbol, side
        );
        let order_ids = self.collect_order_ids(|order| order.side == side);
        self.cancel_order_batch(&order_ids)
    }

    /// Cancel all live orders belonging to a specific user.
    pub fn cancel_orders_by_user(&mut self, user_id: &str) -> MassCancelResult {
        trace!(
            "Order book {}: Mass cancel orders for user {}",
            self.symbol, user_id
        );
        let order_ids = self.collect_order_ids(|order| order.user_id == user_id);
        self.cancel_order_batch(&order_ids)
    }

    /// Cancel all resting orders on a given side within a price range
    /// (inclusive on both ends). Pending stops are not affected.
    ///
    /// If `min_price > max_price`, no orders are cancelled.
    pub fn cancel_orders_by_price_range(
        &mut self,
        side: Side,
        min_price: u128,
        max_price: u128,
    ) -> MassCancelResult {
        trace!(
            "Order book {}: Mass cancel orders on side {} in price range [{}, {}]",
            self.symbol, side, min_price, max_price
        );
        if min_price > max_price {
            return MassCancelResult::default();
        }
        let order_ids = self.collect_order_ids(|order| {
            order.side == side
                && order.order_type != super::order::OrderType::Stop
                && (min_price..=max_price).contains(&order.price)
        });
        self.cancel_order_batch(&order_ids)
    }

    /// Ids of live orders matching `predicate`, with icebergs reported once
    /// through their parent. Resting orders come first, oldest first.
    fn collect_order_ids<F>(&self, predicate: F) -> Vec<OrderId>
    where
        F: Fn(&Order) -> bool,
    {
        let mut resting: Vec<(u64, OrderId)> = self
            .order_locations
            .values()
            .filter_map(|location| self.arena.get(location.key))
            .filter(|resting| !resting.order.is_iceberg_child && predicate(&resting.order))
            .map(|resting| (resting.sequence, resting.order.id))
            .collect();
        resting.sort_unstable_by_key(|(sequence, _)| *sequence);

        let mut order_ids: Vec<OrderId> = resting.into_iter().map(|(_, id)| id).collect();
        order_ids.extend(
            self.icebergs
                .values()
                .filter(|iceberg| predicate(&iceberg.parent))
                .map(|iceberg| iceberg.parent_id()),
        );
        order_ids.extend(
            self.pending_stops
                .iter()
                .filter(|stop| predicate(stop))
                .map(|stop| stop.id),
        );
        order_ids
    }

    /// Cancels each id through the single-order path, skipping ids that are
    /// no longer live.
    fn cancel_order_batch(&mut self, order_ids: &[OrderId]) -> MassCancelResult {
        let cancelled = order_ids
            .iter()
            .filter_map(|id| self.cancel_order(*id).ok())
            .collect();
        MassCancelResult::new(cancelled)
    }
}
