//! Order book snapshot for market data

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::error::OrderBookError;
use crate::utils::current_time_millis;

/// Aggregated quantity at one visible price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel {
    /// Price of the level
    pub price: u128,
    /// Sum of the open quantity resting at this price
    pub quantity: u64,
    /// Number of orders resting at this price
    pub order_count: usize,
}

/// A public snapshot of the order book state at a specific point in time.
///
/// Hidden orders and undisplayed iceberg reserve never appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    /// The symbol or identifier for this order book
    pub symbol: String,

    /// Timestamp when the snapshot was created (milliseconds since epoch)
    pub timestamp: u64,

    /// Bid levels, best (highest) first
    pub bids: Vec<DepthLevel>,

    /// Ask levels, best (lowest) first
    pub asks: Vec<DepthLevel>,

    /// Price of the most recent trade, if any
    pub last_trade_price: Option<u128>,
}

impl BookSnapshot {
    /// Snapshot of a symbol with no book yet.
    pub fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            timestamp: current_time_millis(),
            bids: Vec::new(),
            asks: Vec::new(),
            last_trade_price: None,
        }
    }

    /// Get the best bid price and quantity
    pub fn best_bid(&self) -> Option<(u128, u64)> {
        let bid = self.bids.first().map(|level| (level.price, level.quantity));
        trace!("best_bid: {:?}", bid);
        bid
    }

    /// Get the best ask price and quantity
    pub fn best_ask(&self) -> Option<(u128, u64)> {
        let ask = self.asks.first().map(|level| (level.price, level.quantity));
        trace!("best_ask: {:?}", ask);
        ask
    }

    /// Get the mid price (average of best bid and best ask)
    pub fn mid_price(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some((bid_price, _)), Some((ask_price, _))) => {
                Some((bid_price as f64 + ask_price as f64) / 2.0)
            }
            _ => None,
        }
    }

    /// Get the spread (best ask - best bid)
    pub fn spread(&self) -> Option<u128> {
        match (self.best_bid(), self.best_ask()) {
            (Some((bid_price, _)), Some((ask_price, _))) => {
                Some(ask_price.saturating_sub(bid_price))
            }
            _ => None,
        }
    }

    /// Calculate the total volume on the bid side
    pub fn total_bid_volume(&self) -> u64 {
        self.bids.iter().map(|level| level.quantity).sum()
    }

    /// Calculate the total volume on the ask side
    pub fn total_ask_volume(&self) -> u64 {
        self.asks.iter().map(|level| level.quantity).sum()
    }

    /// Calculate the total value on the bid side (price * quantity)
    pub fn total_bid_value(&self) -> u128 {
        self.bids
            .iter()
            .map(|level| level.price.saturating_mul(level.quantity as u128))
            .sum()
    }

    /// Calculate the total value on the ask side (price * quantity)
    pub fn total_ask_value(&self) -> u128 {
        self.asks
            .iter()
            .map(|level| level.price.saturating_mul(level.quantity as u128))
            .sum()
    }

    /// Serialize the snapshot to JSON.
    pub fn to_json(&self) -> Result<String, OrderBookError> {
        serde_json::to_string(self).map_err(|e| OrderBookError::SerializationError {
            message: e.to_string(),
        })
    }

    /// Deserialize a snapshot from JSON.
    pub fn from_json(data: &str) -> Result<Self, OrderBookError> {
        serde_json::from_str(data).map_err(|e| OrderBookError::DeserializationError {
            message: e.to_string(),
        })
    }
}
