//! Bounded window of recent trades per symbol.

use super::trade::Trade;
use std::collections::VecDeque;

/// Fixed-capacity trade window. The oldest trade is evicted once full.
///
/// A running quantity total keeps [`TradeHistory::average_trade_size`] O(1).
#[derive(Debug, Clone)]
pub struct TradeHistory {
    trades: VecDeque<Trade>,
    capacity: usize,
    total_quantity: u128,
}

impl TradeHistory {
    /// Creates an empty window holding at most `capacity` trades (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            trades: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
            total_quantity: 0,
        }
    }

    /// Appends a trade, evicting the oldest one when full.
    pub fn push(&mut self, trade: Trade) {
        if self.trades.len() == self.capacity
            && let Some(evicted) = self.trades.pop_front()
        {
            self.total_quantity -= evicted.quantity as u128;
        }
        self.total_quantity += trade.quantity as u128;
        self.trades.push_back(trade);
    }

    /// Appends every trade in order.
    pub fn extend<'a, I>(&mut self, trades: I)
    where
        I: IntoIterator<Item = &'a Trade>,
    {
        for trade in trades {
            self.push(trade.clone());
        }
    }

    /// Mean quantity of the trades in the window, `0.0` when empty.
    pub fn average_trade_size(&self) -> f64 {
        if self.trades.is_empty() {
            return 0.0;
        }
        self.total_quantity as f64 / self.trades.len() as f64
    }

    /// The `n` most recent trades, newest first.
    pub fn recent(&self, n: usize) -> Vec<Trade> {
        self.trades.iter().rev().take(n).cloned().collect()
    }

    /// Number of trades held.
    pub fn len(&self) -> usize {
        self.trades.len()
    }

    /// `true` if no trade has been recorded.
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Maximum number of trades held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
