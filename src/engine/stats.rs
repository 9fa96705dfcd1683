//! Engine counters and latency tracking.

use crossbeam::atomic::AtomicCell;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Point-in-time copy of the engine counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingMetrics {
    /// Orders accepted and matched
    pub orders_processed: u64,
    /// Orders refused by validation, the book, or a stopped engine
    pub orders_rejected: u64,
    /// Orders cancelled on request or by mass cancel
    pub orders_cancelled: u64,
    /// Trades executed
    pub trades_executed: u64,
    /// Sum of executed trade quantities
    pub total_volume: u64,
    /// Mean `add_order` latency of processed orders
    pub average_latency: Duration,
    /// Worst `add_order` latency of processed orders
    pub max_latency: Duration,
    /// When the last order was processed, milliseconds since epoch
    pub last_processed_at: Option<u64>,
    /// Events dropped because the queue was full
    pub dropped_events: u64,
    /// Events accepted by the queue
    pub events_published: u64,
}

/// Lock-free counters shared by every caller thread.
#[derive(Debug, Default)]
pub struct EngineStats {
    orders_processed: AtomicU64,
    orders_rejected: AtomicU64,
    orders_cancelled: AtomicU64,
    trades_executed: AtomicU64,
    total_volume: AtomicU64,
    total_latency_ns: AtomicU64,
    max_latency_ns: AtomicU64,
    last_processed_at: AtomicCell<Option<u64>>,
    dropped_events: AtomicU64,
    events_published: AtomicU64,
}

impl EngineStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts for one processed order.
    pub fn record_order(&self, latency: Duration, trades: usize, volume: u64, timestamp: u64) {
        let latency_ns = u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX);
        self.orders_processed.fetch_add(1, Ordering::Relaxed);
        self.trades_executed
            .fetch_add(trades as u64, Ordering::Relaxed);
        self.total_volume.fetch_add(volume, Ordering::Relaxed);
        self.total_latency_ns
            .fetch_add(latency_ns, Ordering::Relaxed);
        self.max_latency_ns.fetch_max(latency_ns, Ordering::Relaxed);
        self.last_processed_at.store(Some(timestamp));
    }

    /// Accounts for one rejected order.
    pub fn record_rejection(&self) {
        self.orders_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Accounts for cancelled orders.
    pub fn record_cancellations(&self, count: usize) {
        self.orders_cancelled
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Accounts for an event accepted by the queue.
    pub fn record_published(&self) {
        self.events_published.fetch_add(1, Ordering::Relaxed);
    }

    /// Accounts for an event dropped on a full queue.
    pub fn record_dropped(&self) {
        self.dropped_events.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of events dropped so far.
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    /// Copy of every counter.
    pub fn snapshot(&self) -> MatchingMetrics {
        let orders_processed = self.orders_processed.load(Ordering::Relaxed);
        let total_latency_ns = self.total_latency_ns.load(Ordering::Relaxed);
        let average_latency = total_latency_ns
            .checked_div(orders_processed)
            .map(Duration::from_nanos)
            .unwrap_or_default();

        MatchingMetrics {
            orders_processed,
            orders_rejected: self.orders_rejected.load(Ordering::Relaxed),
            orders_cancelled: self.orders_cancelled.load(Ordering::Relaxed),
            trades_executed: self.trades_executed.load(Ordering::Relaxed),
            total_volume: self.total_volume.load(Ordering::Relaxed),
            average_latency,
            max_latency: Duration::from_nanos(self.max_latency_ns.load(Ordering::Relaxed)),
            last_processed_at: self.last_processed_at.load(),
            dropped_events: self.dropped_events.load(Ordering::Relaxed),
            events_published: self.events_published.load(Ordering::Relaxed),
        }
    }
}
