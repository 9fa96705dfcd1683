//! Order value objects: identifiers, sides, order types and the `Order` itself.

use crate::utils::current_time_millis;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Creates a new random identifier.
    pub fn new() -> Self {
        OrderId(Uuid::new_v4())
    }

    /// Creates a deterministic identifier from an integer. Handy for tests and replays.
    pub fn from_u64(value: u64) -> Self {
        OrderId(Uuid::from_u64_pair(0, value))
    }

    /// Wraps an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        OrderId(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Side of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Bid side.
    Buy,
    /// Ask side.
    Sell,
}

impl Side {
    /// Returns the other side of the book.
    #[must_use]
    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// The kind of order submitted to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Executes against whatever liquidity is available; never rests.
    Market,
    /// Executes up to its price, the remainder rests.
    Limit,
    /// Waits until the last trade price reaches `price`, then executes as a market order.
    Stop,
    /// Limit order that only shows `display_quantity` at a time.
    Iceberg,
    /// Limit order that never shows in public depth.
    Hidden,
}

impl OrderType {
    /// Returns `true` for order types that carry a limit price and may rest.
    #[inline]
    pub fn is_limit_priced(self) -> bool {
        matches!(self, OrderType::Limit | OrderType::Iceberg | OrderType::Hidden)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
            OrderType::Stop => "STOP",
            OrderType::Iceberg => "ICEBERG",
            OrderType::Hidden => "HIDDEN",
        };
        write!(f, "{name}")
    }
}

/// How long an order stays eligible for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good till cancelled: the unfilled remainder rests in the book.
    #[default]
    Gtc,
    /// Immediate or cancel: fill what crosses now, cancel the rest.
    Ioc,
    /// Fill or kill: fill completely right now or do nothing.
    Fok,
}

impl TimeInForce {
    /// Returns `true` if an unfilled remainder may rest in the book.
    #[inline]
    pub fn allows_resting(self) -> bool {
        matches!(self, TimeInForce::Gtc)
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeInForce::Gtc => write!(f, "GTC"),
            TimeInForce::Ioc => write!(f, "IOC"),
            TimeInForce::Fok => write!(f, "FOK"),
        }
    }
}

/// An order as it flows through the engine.
///
/// Prices are integer ticks and quantities integer units. `remaining_quantity`
/// never exceeds `quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier
    pub id: OrderId,
    /// Instrument symbol
    pub symbol: String,
    /// Buy or sell
    pub side: Side,
    /// Kind of order
    pub order_type: OrderType,
    /// Time-in-force policy
    #[serde(default)]
    pub time_in_force: TimeInForce,
    /// Limit price in ticks. Ignored for market orders, trigger price for stop orders.
    pub price: u128,
    /// Original quantity
    pub quantity: u64,
    /// Quantity still open
    pub remaining_quantity: u64,
    /// Visible slice size of an iceberg order
    #[serde(default)]
    pub display_quantity: Option<u64>,
    /// Parent iceberg order of a child slice
    #[serde(default)]
    pub parent_order_id: Option<OrderId>,
    /// `true` for slices generated from an iceberg parent
    #[serde(default)]
    pub is_iceberg_child: bool,
    /// `true` when the order is kept out of public depth
    #[serde(default)]
    pub is_hidden: bool,
    /// `true` when the engine moved the price closer to the opposite best
    #[serde(default)]
    pub is_price_improved: bool,
    /// Price as submitted, kept when price improvement changed it
    #[serde(default)]
    pub original_price: Option<u128>,
    /// Estimated market impact attached by the engine
    #[serde(default)]
    pub estimated_impact: Option<f64>,
    /// Owner of the order
    #[serde(default)]
    pub user_id: String,
    /// Creation time in milliseconds since epoch
    pub created_at: u64,
    /// Last modification time in milliseconds since epoch
    pub updated_at: u64,
}

impl Order {
    fn base(symbol: &str, side: Side, order_type: OrderType, price: u128, quantity: u64) -> Self {
        let now = current_time_millis();
        Self {
            id: OrderId::new(),
            symbol: symbol.to_string(),
            side,
            order_type,
            time_in_force: TimeInForce::Gtc,
            price,
            quantity,
            remaining_quantity: quantity,
            display_quantity: None,
            parent_order_id: None,
            is_iceberg_child: false,
            is_hidden: order_type == OrderType::Hidden,
            is_price_improved: false,
            original_price: None,
            estimated_impact: None,
            user_id: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a GTC limit order.
    pub fn limit(symbol: &str, side: Side, price: u128, quantity: u64) -> Self {
        Self::base(symbol, side, OrderType::Limit, price, quantity)
    }

    /// Creates a market order.
    pub fn market(symbol: &str, side: Side, quantity: u64) -> Self {
        Self::base(symbol, side, OrderType::Market, 0, quantity)
    }

    /// Creates a stop order triggering at `stop_price`.
    pub fn stop(symbol: &str, side: Side, stop_price: u128, quantity: u64) -> Self {
        Self::base(symbol, side, OrderType::Stop, stop_price, quantity)
    }

    /// Creates an iceberg order showing `display_quantity` at a time.
    pub fn iceberg(
        symbol: &str,
        side: Side,
        price: u128,
        quantity: u64,
        display_quantity: u64,
    ) -> Self {
        let mut order = Self::base(symbol, side, OrderType::Iceberg, price, quantity);
        order.display_quantity = Some(display_quantity);
        order
    }

    /// Creates a hidden limit order.
    pub fn hidden(symbol: &str, side: Side, price: u128, quantity: u64) -> Self {
        Self::base(symbol, side, OrderType::Hidden, price, quantity)
    }

    /// Replaces the generated identifier.
    #[must_use]
    pub fn with_id(mut self, id: OrderId) -> Self {
        self.id = id;
        self
    }

    /// Sets the owner of the order.
    #[must_use]
    pub fn with_user(mut self, user_id: &str) -> Self {
        self.user_id = user_id.to_string();
        self
    }

    /// Sets the time-in-force policy.
    #[must_use]
    pub fn with_time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = time_in_force;
        self
    }

    /// Quantity executed so far.
    #[inline]
    pub fn filled_quantity(&self) -> u64 {
        self.quantity.saturating_sub(self.remaining_quantity)
    }

    /// `true` once nothing remains open.
    #[inline]
    pub fn is_filled(&self) -> bool {
        self.remaining_quantity == 0
    }

    /// `true` for market orders and triggered stops, which match at any price.
    #[inline]
    pub fn is_market(&self) -> bool {
        self.order_type == OrderType::Market
    }

    /// Whether this order would trade against a resting order at `resting_price`.
    #[inline]
    pub fn crosses(&self, resting_price: u128) -> bool {
        if self.is_market() {
            return true;
        }
        match self.side {
            Side::Buy => self.price >= resting_price,
            Side::Sell => self.price <= resting_price,
        }
    }

    /// Reduces the open quantity. Never underflows.
    pub(crate) fn fill(&mut self, quantity: u64, timestamp: u64) {
        self.remaining_quantity = self.remaining_quantity.saturating_sub(quantity);
        self.updated_at = timestamp;
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}/{} @ {} ({})",
            self.id,
            self.order_type,
            self.side,
            self.remaining_quantity,
            self.quantity,
            self.price,
            self.time_in_force
        )
    }
}
