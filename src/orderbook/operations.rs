//! Order book operations like adding and canceling orders

use super::book::OrderBook;
use super::error::OrderBookError;
use super::iceberg::IcebergOrder;
use super::order::{Order, OrderId, OrderType, Side, TimeInForce};
use super::trade::MatchResult;
use crate::utils::current_time_millis;
use tracing::{debug, trace};

impl OrderBook {
    /// Submit an order to the book.
    ///
    /// Market, limit and hidden orders match immediately against the best
    /// opposite liquidity; what is left rests (GTC limit and hidden orders) or
    /// is cancelled (market orders, IOC). Iceberg orders match their full
    /// quantity aggressively, then rest one display slice at a time. Stop
    /// orders wait until the last trade price reaches their trigger.
    ///
    /// Any trade produced by the call may trigger pending stop orders; their
    /// executions are reported in the same [`MatchResult`].
    ///
    /// # Errors
    /// - [`OrderBookError::SymbolMismatch`] if the order belongs to another book.
    /// - [`OrderBookError::DuplicateOrderId`] if an order with the same id is live.
    /// - [`OrderBookError::InsufficientLiquidity`] if a fill-or-kill order
    ///   cannot be filled completely. The book is left untouched.
    /// - [`OrderBookError::InvalidOperation`] for iceberg orders without a
    ///   positive display quantity or with a time in force other than GTC,
    ///   and for iceberg slices submitted directly.
    pub fn add_order(&mut self, order: Order) -> Result<MatchResult, OrderBookError> {
        if order.symbol != self.symbol {
            return Err(OrderBookError::SymbolMismatch {
                expected: self.symbol.clone(),
                actual: order.symbol,
            });
        }
        if self.contains_order(order.id) {
            return Err(OrderBookError::DuplicateOrderId(order.id));
        }
        if order.is_iceberg_child {
            return Err(OrderBookError::InvalidOperation {
                message: "iceberg slices are managed by the book".to_string(),
            });
        }

        trace!(
            "Order book {}: adding order {} {} {} {} @ {}",
            self.symbol, order.id, order.order_type, order.side, order.quantity, order.price
        );

        let timestamp = current_time_millis();
        let mut result = match order.order_type {
            OrderType::Stop => self.add_stop_order(order, timestamp),
            OrderType::Iceberg => self.add_iceberg_order(order, timestamp)?,
            OrderType::Market | OrderType::Limit | OrderType::Hidden => {
                self.add_standard_order(order, timestamp)?
            }
        };

        if !result.trades.is_empty() {
            self.trigger_stops(&mut result, timestamp);
        }
        Ok(result)
    }

    fn add_standard_order(
        &mut self,
        mut taker: Order,
        timestamp: u64,
    ) -> Result<MatchResult, OrderBookError> {
        if taker.time_in_force == TimeInForce::Fok {
            let limit = (!taker.is_market()).then_some(taker.price);
            let available = self.peek_match(taker.side, taker.remaining_quantity, limit);
            if available < taker.remaining_quantity {
                return Err(OrderBookError::InsufficientLiquidity {
                    side: taker.side,
                    requested: taker.remaining_quantity,
                    available,
                });
            }
        }

        let mut result = MatchResult::new(taker.id);
        self.match_incoming(&mut taker, &mut result, timestamp);

        if taker.is_filled() {
            result.filled_order_ids.push(taker.id);
        } else if taker.order_type.is_limit_priced() && taker.time_in_force.allows_resting() {
            result.resting_order = Some(taker.clone());
            self.place_order_in_book(taker);
        } else {
            trace!(
                "Order book {}: cancelling unfilled {} of {}",
                self.symbol, taker.remaining_quantity, taker.id
            );
            result
                .cancelled_remainders
                .push((taker.id, taker.remaining_quantity));
        }
        Ok(result)
    }

    fn add_iceberg_order(
        &mut self,
        mut parent: Order,
        timestamp: u64,
    ) -> Result<MatchResult, OrderBookError> {
        if parent.display_quantity.is_none_or(|display| display == 0) {
            return Err(OrderBookError::InvalidOperation {
                message: format!("iceberg order {} needs a positive display quantity", parent.id),
            });
        }
        if parent.time_in_force != TimeInForce::Gtc {
            return Err(OrderBookError::InvalidOperation {
                message: format!(
                    "iceberg order {} must be GTC, got {}",
                    parent.id, parent.time_in_force
                ),
            });
        }

        let mut result = MatchResult::new(parent.id);
        self.match_incoming(&mut parent, &mut result, timestamp);
        if parent.is_filled() {
            result.filled_order_ids.push(parent.id);
            return Ok(result);
        }

        let parent_id = parent.id;
        let mut iceberg = IcebergOrder::new(parent).ok_or_else(|| {
            OrderBookError::InvalidOperation {
                message: format!("iceberg order {parent_id} needs a positive display quantity"),
            }
        })?;
        if let Some(child) = iceberg.next_child(timestamp) {
            self.place_order_in_book(child);
        }
        result.resting_order = Some(iceberg.parent.clone());
        self.icebergs.insert(parent_id, iceberg);
        Ok(result)
    }

    fn add_stop_order(&mut self, stop: Order, timestamp: u64) -> MatchResult {
        let mut result = MatchResult::new(stop.id);
        if self.stop_is_triggered(&stop) {
            result.triggered_stop_ids.push(stop.id);
            self.execute_triggered_stop(stop, &mut result, timestamp);
        } else {
            trace!(
                "Order book {}: stop {} pending at {}",
                self.symbol, stop.id, stop.price
            );
            self.pending_stops.push(stop);
            result.stop_pending = true;
        }
        result
    }

    fn stop_is_triggered(&self, stop: &Order) -> bool {
        match (self.last_trade_price, stop.side) {
            (Some(last), Side::Buy) => last >= stop.price,
            (Some(last), Side::Sell) => last <= stop.price,
            (None, _) => false,
        }
    }

    /// Fires pending stops until none triggers at the current last trade price.
    /// Trades of a triggered stop move the last price, so triggers cascade.
    fn trigger_stops(&mut self, result: &mut MatchResult, timestamp: u64) {
        while let Some(index) = self
            .pending_stops
            .iter()
            .position(|stop| self.stop_is_triggered(stop))
        {
            let stop = self.pending_stops.remove(index);
            result.triggered_stop_ids.push(stop.id);
            self.execute_triggered_stop(stop, result, timestamp);
        }
    }

    fn execute_triggered_stop(&mut self, mut stop: Order, result: &mut MatchResult, timestamp: u64) {
        debug!(
            "Order book {}: stop {} triggered at {:?}",
            self.symbol, stop.id, self.last_trade_price
        );
        stop.order_type = OrderType::Market;
        stop.time_in_force = TimeInForce::Ioc;
        stop.updated_at = timestamp;

        self.match_incoming(&mut stop, result, timestamp);
        if stop.is_filled() {
            result.filled_order_ids.push(stop.id);
        } else {
            result
                .cancelled_remainders
                .push((stop.id, stop.remaining_quantity));
        }
    }

    /// Cancel a live order.
    ///
    /// Resting orders, hidden orders and pending stops are removed directly.
    /// Cancelling an iceberg parent or any of its slices cancels the whole
    /// iceberg; the returned order is then the parent with its unfilled size.
    ///
    /// # Errors
    /// Returns [`OrderBookError::OrderNotFound`] if the order is unknown,
    /// already filled or already cancelled.
    pub fn cancel_order(&mut self, order_id: OrderId) -> Result<Order, OrderBookError> {
        if let Some(parent_id) = self.iceberg_parent_of(order_id) {
            return self.cancel_iceberg(parent_id);
        }

        if let Some(order) = self.remove_resting(order_id) {
            trace!("Order book {}: cancelled order {}", self.symbol, order_id);
            return Ok(order);
        }

        if let Some(index) = self.pending_stops.iter().position(|s| s.id == order_id) {
            trace!("Order book {}: cancelled stop {}", self.symbol, order_id);
            return Ok(self.pending_stops.remove(index));
        }

        Err(OrderBookError::OrderNotFound(order_id.to_string()))
    }

    fn iceberg_parent_of(&self, order_id: OrderId) -> Option<OrderId> {
        if self.icebergs.contains_key(&order_id) {
            return Some(order_id);
        }
        let location = self.order_locations.get(&order_id)?;
        let resting = self.arena.get(location.key)?;
        resting
            .order
            .parent_order_id
            .filter(|_| resting.order.is_iceberg_child)
    }

    fn cancel_iceberg(&mut self, parent_id: OrderId) -> Result<Order, OrderBookError> {
        let iceberg = self
            .icebergs
            .remove(&parent_id)
            .ok_or_else(|| OrderBookError::OrderNotFound(parent_id.to_string()))?;
        if let Some(child_id) = iceberg.current_child_id {
            self.remove_resting(child_id);
        }
        trace!(
            "Order book {}: cancelled iceberg {} with {} remaining",
            self.symbol, parent_id, iceberg.remaining_size
        );
        Ok(iceberg.parent)
    }

    /// `true` if the id belongs to a resting order, iceberg parent or pending stop.
    pub fn contains_order(&self, order_id: OrderId) -> bool {
        self.order_locations.contains_key(&order_id)
            || self.icebergs.contains_key(&order_id)
            || self.pending_stops.iter().any(|s| s.id == order_id)
    }
}
