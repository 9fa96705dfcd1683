//! Events published by the matching engine.

use crate::orderbook::order::{Order, OrderId};
use crate::orderbook::trade::Trade;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::trace;

/// Why an order left the book without filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// Cancelled through `cancel_order`
    UserRequested,
    /// Cancelled by a mass cancel
    MassCancel,
    /// Market, IOC or triggered stop remainder that could not rest
    UnfilledRemainder,
}

/// Notification emitted after the engine changed state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchingEvent {
    /// An order passed validation and was submitted to its book
    OrderAdded {
        /// The order as submitted, after impact estimation and price improvement
        order: Order,
        /// Milliseconds since epoch
        timestamp: u64,
    },
    /// A trade was executed
    TradeExecuted {
        /// The trade
        trade: Trade,
    },
    /// An order has no quantity left
    OrderFilled {
        /// The filled order
        order_id: OrderId,
        /// Its symbol
        symbol: String,
        /// Milliseconds since epoch
        timestamp: u64,
    },
    /// An order was removed with quantity left
    OrderCanceled {
        /// The cancelled order
        order_id: OrderId,
        /// Its symbol
        symbol: String,
        /// Quantity that will never trade
        remaining_quantity: u64,
        /// What caused the cancel
        reason: CancelReason,
        /// Milliseconds since epoch
        timestamp: u64,
    },
    /// An order was refused
    OrderRejected {
        /// The refused order
        order_id: OrderId,
        /// Its symbol
        symbol: String,
        /// Human readable reason
        reason: String,
        /// Milliseconds since epoch
        timestamp: u64,
    },
}

impl MatchingEvent {
    /// Symbol the event belongs to.
    pub fn symbol(&self) -> &str {
        match self {
            MatchingEvent::OrderAdded { order, .. } => &order.symbol,
            MatchingEvent::TradeExecuted { trade } => &trade.symbol,
            MatchingEvent::OrderFilled { symbol, .. }
            | MatchingEvent::OrderCanceled { symbol, .. }
            | MatchingEvent::OrderRejected { symbol, .. } => symbol,
        }
    }

    /// Short name of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            MatchingEvent::OrderAdded { .. } => "order_added",
            MatchingEvent::TradeExecuted { .. } => "trade_executed",
            MatchingEvent::OrderFilled { .. } => "order_filled",
            MatchingEvent::OrderCanceled { .. } => "order_canceled",
            MatchingEvent::OrderRejected { .. } => "order_rejected",
        }
    }
}

/// Receives every published event on the engine's consumer thread.
pub type EventListener = Arc<dyn Fn(&MatchingEvent) + Send + Sync>;

/// Builds a listener forwarding events into a Tokio channel.
///
/// Events are silently discarded once the receiver is dropped.
pub fn channel_listener(sender: tokio::sync::mpsc::UnboundedSender<MatchingEvent>) -> EventListener {
    Arc::new(move |event: &MatchingEvent| {
        if sender.send(event.clone()).is_err() {
            trace!("Event receiver dropped, discarding {}", event.kind());
        }
    })
}
