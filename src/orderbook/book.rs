//! Core OrderBook implementation for managing price levels and orders

use super::iceberg::IcebergOrder;
use super::level::{BookSide, OrderArena, OrderKey, PriceLevel, RestingOrder};
use super::order::{Order, OrderId, Side};
use super::snapshot::{BookSnapshot, DepthLevel};
use crate::utils::current_time_millis;
use std::collections::HashMap;
use tracing::trace;
use uuid::Uuid;

/// Where a resting order lives, for O(1) lookup and cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLocation {
    /// Side of the order
    pub side: Side,
    /// Price level of the order
    pub price: u128,
    /// `true` if the order sits in the hidden pool
    pub hidden: bool,
    /// Arena key of the order node
    pub key: OrderKey,
}

/// The OrderBook holds every live order of one symbol.
///
/// Visible orders sit in the bid/ask ladders and show up in depth. Hidden
/// orders sit in a separate pair of ladders (the hidden pool) that never
/// appears in depth or in [`OrderBook::best_bid`]/[`OrderBook::best_ask`], but
/// the matching loop walks both pools together in price-time priority.
///
/// The book is a single-writer structure: callers that share it across
/// threads wrap it in a mutex (see [`crate::orderbook::manager::BookManager`]).
#[derive(Debug)]
pub struct OrderBook {
    /// The symbol or identifier for this order book
    pub(super) symbol: String,

    /// Visible bid levels, best (highest) price last in the map
    pub(super) bids: BookSide,

    /// Visible ask levels, best (lowest) price first in the map
    pub(super) asks: BookSide,

    /// Hidden bid levels
    pub(super) hidden_bids: BookSide,

    /// Hidden ask levels
    pub(super) hidden_asks: BookSide,

    /// Storage for every resting order node
    pub(super) arena: OrderArena,

    /// Order id to location index
    pub(super) order_locations: HashMap<OrderId, OrderLocation>,

    /// Live iceberg parents, keyed by parent id
    pub(super) icebergs: HashMap<OrderId, IcebergOrder>,

    /// Stop orders waiting for their trigger, in arrival order
    pub(super) pending_stops: Vec<Order>,

    /// Namespace for deterministic trade ids of this book
    pub(super) trade_id_namespace: Uuid,

    /// Arrival sequence of resting orders
    pub(super) next_sequence: u64,

    /// Sequence feeding trade id generation
    pub(super) next_trade_sequence: u64,

    /// The last price at which a trade occurred
    pub(super) last_trade_price: Option<u128>,
}

impl OrderBook {
    /// Create a new order book for the given symbol
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
            hidden_bids: BookSide::new(Side::Buy),
            hidden_asks: BookSide::new(Side::Sell),
            arena: OrderArena::with_capacity_and_key(1024),
            order_locations: HashMap::new(),
            icebergs: HashMap::new(),
            pending_stops: Vec::new(),
            trade_id_namespace: Uuid::new_v4(),
            next_sequence: 1,
            next_trade_sequence: 1,
            last_trade_price: None,
        }
    }

    /// Get the symbol of this order book
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Get the best visible bid price, if any
    pub fn best_bid(&self) -> Option<u128> {
        self.bids.best_price()
    }

    /// Get the best visible ask price, if any
    pub fn best_ask(&self) -> Option<u128> {
        self.asks.best_price()
    }

    /// Best bid across visible and hidden liquidity.
    pub fn effective_best_bid(&self) -> Option<u128> {
        match (self.bids.best_price(), self.hidden_bids.best_price()) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    /// Best ask across visible and hidden liquidity.
    pub fn effective_best_ask(&self) -> Option<u128> {
        match (self.asks.best_price(), self.hidden_asks.best_price()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Best price an incoming order on `side` would trade against, hidden liquidity included.
    pub fn best_opposite_price(&self, side: Side) -> Option<u128> {
        match side {
            Side::Buy => self.effective_best_ask(),
            Side::Sell => self.effective_best_bid(),
        }
    }

    /// Best displayed price an incoming order on `side` would trade against.
    pub fn best_visible_opposite_price(&self, side: Side) -> Option<u128> {
        match side {
            Side::Buy => self.best_ask(),
            Side::Sell => self.best_bid(),
        }
    }

    /// Get the mid price (average of best visible bid and ask)
    pub fn mid_price(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid as f64 + ask as f64) / 2.0),
            _ => None,
        }
    }

    /// Get the spread (best ask - best bid)
    pub fn spread(&self) -> Option<u128> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask.saturating_sub(bid)),
            _ => None,
        }
    }

    /// Get the last trade price, if any
    pub fn last_trade_price(&self) -> Option<u128> {
        self.last_trade_price
    }

    /// Number of orders resting in the ladders, hidden pool included.
    pub fn resting_order_count(&self) -> usize {
        self.order_locations.len()
    }

    /// Number of live orders: resting orders plus pending stops.
    pub fn order_count(&self) -> usize {
        self.order_locations.len() + self.pending_stops.len()
    }

    /// Number of stop orders waiting for their trigger.
    pub fn pending_stop_count(&self) -> usize {
        self.pending_stops.len()
    }

    /// Number of hidden orders resting in the hidden pool.
    pub fn hidden_order_count(&self) -> usize {
        self.order_locations.values().filter(|l| l.hidden).count()
    }

    /// Number of live iceberg parents.
    pub fn iceberg_count(&self) -> usize {
        self.icebergs.len()
    }

    /// `true` if nothing rests and no stop is pending.
    pub fn is_empty(&self) -> bool {
        self.order_locations.is_empty() && self.pending_stops.is_empty()
    }

    /// Location of a resting order.
    pub fn order_location(&self, order_id: OrderId) -> Option<OrderLocation> {
        self.order_locations.get(&order_id).copied()
    }

    /// Get a live order by its ID.
    ///
    /// Resolves resting orders (including iceberg slices and hidden orders),
    /// iceberg parents and pending stop orders.
    pub fn get_order(&self, order_id: OrderId) -> Option<Order> {
        if let Some(location) = self.order_locations.get(&order_id) {
            return self
                .arena
                .get(location.key)
                .map(|resting| resting.order.clone());
        }
        if let Some(iceberg) = self.icebergs.get(&order_id) {
            return Some(iceberg.parent.clone());
        }
        self.pending_stops
            .iter()
            .find(|order| order.id == order_id)
            .cloned()
    }

    /// Iceberg parent state, if `order_id` is a live iceberg parent.
    pub fn get_iceberg(&self, order_id: OrderId) -> Option<&IcebergOrder> {
        self.icebergs.get(&order_id)
    }

    /// Get all visible orders at a specific price level, in time priority.
    pub fn get_orders_at_price(&self, price: u128, side: Side) -> Vec<Order> {
        trace!(
            "Order book {}: Getting orders at price {} for side {:?}",
            self.symbol, price, side
        );
        let book_side = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        book_side
            .level(price)
            .map(|level| {
                level
                    .iter(&self.arena)
                    .map(|(_, resting)| resting.order.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Aggregated visible depth: up to `levels` price levels per side, best first.
    pub fn depth(&self, levels: usize) -> (Vec<DepthLevel>, Vec<DepthLevel>) {
        let collect = |side: &BookSide| -> Vec<DepthLevel> {
            side.levels()
                .take(levels)
                .map(|level: &PriceLevel| DepthLevel {
                    price: level.price(),
                    quantity: level.total_quantity(),
                    order_count: level.order_count(),
                })
                .collect()
        };
        (collect(&self.bids), collect(&self.asks))
    }

    /// Public snapshot of the book. Hidden orders are never included.
    pub fn create_snapshot(&self, depth: usize) -> BookSnapshot {
        let (bids, asks) = self.depth(depth);
        BookSnapshot {
            symbol: self.symbol.clone(),
            timestamp: current_time_millis(),
            bids,
            asks,
            last_trade_price: self.last_trade_price,
        }
    }

    /// Total visible quantity on one side.
    pub fn visible_quantity(&self, side: Side) -> u64 {
        match side {
            Side::Buy => self.bids.total_quantity(),
            Side::Sell => self.asks.total_quantity(),
        }
    }

    /// Total hidden quantity on one side.
    pub fn hidden_quantity(&self, side: Side) -> u64 {
        match side {
            Side::Buy => self.hidden_bids.total_quantity(),
            Side::Sell => self.hidden_asks.total_quantity(),
        }
    }

    /// Ladder and arena for one pool of one side, borrowed together.
    pub(super) fn side_and_arena(
        &mut self,
        side: Side,
        hidden: bool,
    ) -> (&mut BookSide, &mut OrderArena) {
        let book_side = match (side, hidden) {
            (Side::Buy, false) => &mut self.bids,
            (Side::Sell, false) => &mut self.asks,
            (Side::Buy, true) => &mut self.hidden_bids,
            (Side::Sell, true) => &mut self.hidden_asks,
        };
        (book_side, &mut self.arena)
    }

    pub(super) fn pool(&self, side: Side, hidden: bool) -> &BookSide {
        match (side, hidden) {
            (Side::Buy, false) => &self.bids,
            (Side::Sell, false) => &self.asks,
            (Side::Buy, true) => &self.hidden_bids,
            (Side::Sell, true) => &self.hidden_asks,
        }
    }

    pub(super) fn next_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    pub(super) fn next_trade_id(&mut self) -> Uuid {
        let sequence = self.next_trade_sequence;
        self.next_trade_sequence += 1;
        Uuid::new_v5(&self.trade_id_namespace, &sequence.to_be_bytes())
    }

    /// Places an order at the tail of its price level and indexes it.
    pub(super) fn place_order_in_book(&mut self, order: Order) {
        let (side, price, hidden, order_id) = (order.side, order.price, order.is_hidden, order.id);
        let sequence = self.next_sequence();
        let (book_side, arena) = self.side_and_arena(side, hidden);
        let key = book_side
            .level_or_insert(price)
            .push_back(arena, RestingOrder::new(order, sequence));

        self.order_locations.insert(
            order_id,
            OrderLocation {
                side,
                price,
                hidden,
                key,
            },
        );
        trace!(
            "Order book {}: resting {} {} @ {} (hidden: {})",
            self.symbol, order_id, side, price, hidden
        );
    }

    /// Splices a resting order out of its level, dropping the level if it empties.
    pub(super) fn remove_resting(&mut self, order_id: OrderId) -> Option<Order> {
        let location = self.order_locations.remove(&order_id)?;
        let (book_side, arena) = self.side_and_arena(location.side, location.hidden);
        let removed = book_side
            .level_mut(location.price)
            .and_then(|level| level.unlink(arena, location.key));
        book_side.remove_if_empty(location.price);
        removed.map(|resting| resting.order)
    }
}
