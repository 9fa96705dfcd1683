//! # In-Memory Order Matching Core
//!
//! A multi-symbol limit order book and matching engine. Orders are matched in
//! strict price-time priority; every symbol has its own book behind its own
//! lock, so callers on different threads trade different symbols without
//! contending.
//!
//! ## Key Features
//!
//! - **Price-Time Priority**: Each price level is a FIFO queue of resting orders
//!   stored in a generation-checked arena. Cancels splice an order out of its
//!   level in O(1) through an id index.
//!
//! - **Order Types**: Market, limit, stop, iceberg and hidden orders, with
//!   good-till-cancelled, immediate-or-cancel and fill-or-kill time in force.
//!
//! - **Iceberg Orders**: Only a display slice rests in the book. A filled slice
//!   is replaced by a new one at the back of its level until the reserve is
//!   exhausted.
//!
//! - **Hidden Liquidity**: Hidden orders never show in depth or in the public
//!   best bid/ask but match in price-time priority with displayed orders.
//!
//! - **Stop Orders**: Wait for the last trade price to reach their trigger and
//!   then execute as market orders. Triggers cascade within one submission.
//!
//! - **Market Impact Models**: Linear, square-root and logarithmic impact
//!   estimates attached to every order, with a registry for custom models.
//!
//! - **Price Improvement**: Optionally moves passive limit prices toward the
//!   opposite best, never crossing it.
//!
//! - **Events and Metrics**: Every state change is published on a bounded,
//!   non-blocking queue drained by a background thread. A full queue drops the
//!   event and counts it instead of stalling the matching path.
//!
//! ## Prices and Quantities
//!
//! Prices are integer ticks (`u128`) and quantities are integer units (`u64`).
//! A price of `10.00` with a tick of `0.01` is `1000`.
//!
//! ## Example
//!
//! ```
//! use matching_core::prelude::*;
//!
//! let engine = MatchingEngine::new(EngineConfig::default()).unwrap();
//! engine.start().unwrap();
//!
//! engine.add_order(Order::limit("BTC/USD", Side::Buy, 1000, 50)).unwrap();
//! engine.add_order(Order::limit("BTC/USD", Side::Buy, 1000, 50)).unwrap();
//!
//! let trades = engine.add_order(Order::market("BTC/USD", Side::Sell, 70)).unwrap();
//! assert_eq!(trades.len(), 2);
//! assert_eq!(trades[0].quantity, 50);
//! assert_eq!(trades[1].quantity, 20);
//!
//! let snapshot = engine.get_order_book("BTC/USD");
//! assert_eq!(snapshot.best_bid(), Some((1000, 30)));
//!
//! engine.stop().unwrap();
//! ```
//!
//! ## Using the Book Directly
//!
//! [`OrderBook`] can be used on its own when a single thread owns the symbol:
//!
//! ```
//! use matching_core::{Order, OrderBook, Side};
//!
//! let mut book = OrderBook::new("ETH/USD");
//! book.add_order(Order::limit("ETH/USD", Side::Sell, 2000, 10)).unwrap();
//! let result = book.add_order(Order::limit("ETH/USD", Side::Buy, 2000, 4)).unwrap();
//!
//! assert_eq!(result.trades[0].price, 2000);
//! assert_eq!(book.depth(1).1[0].quantity, 6);
//! ```
//!
//! ## Logging
//!
//! The crate logs through [`tracing`] and never installs a subscriber.
//!
//! ## Cargo Features
//!
//! - `metrics`: emit dropped-event, trade and rejection counters through the
//!   `metrics` facade.

pub mod engine;
pub mod impact;
pub mod orderbook;

pub mod prelude;
mod utils;

pub use engine::{
    CancelReason, EngineConfig, EngineError, EventListener, ImpactConfig, MatchingEngine,
    MatchingEvent, MatchingMetrics, PriceImprovementConfig, ValidationError, channel_listener,
};
pub use impact::{
    ImpactCalculatorFactory, ImpactError, LinearImpactCalculator, LogImpactCalculator,
    MarketImpactCalculator, SqrtImpactCalculator,
};
pub use orderbook::{
    BookManager, BookSnapshot, DepthLevel, MassCancelResult, MatchResult, Order, OrderBook,
    OrderBookError, OrderId, OrderType, Side, TimeInForce, Trade, TradeHistory,
};
pub use utils::current_time_millis;
