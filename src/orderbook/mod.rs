//! OrderBook implementation for managing price levels and order matching.

pub mod book;
pub mod error;
/// Iceberg parent bookkeeping and slice generation.
pub mod iceberg;
/// Bounded window of recent trades.
pub mod history;
pub mod level;
/// Per-symbol book registry.
pub mod manager;
/// Bulk cancellation by side, user or price range.
pub mod mass_cancel;
pub mod matching;
/// Contains the core logic for adding and canceling orders.
pub mod operations;
pub mod order;
pub mod snapshot;
/// Trades and per-call match outcomes
pub mod trade;

pub use book::{OrderBook, OrderLocation};
pub use error::OrderBookError;
pub use history::TradeHistory;
pub use iceberg::IcebergOrder;
pub use level::OrderKey;
pub use manager::{BookManager, SymbolState};
pub use mass_cancel::MassCancelResult;
pub use order::{Order, OrderId, OrderType, Side, TimeInForce};
pub use snapshot::{BookSnapshot, DepthLevel};
pub use trade::{IcebergRefresh, MatchResult, Trade};
