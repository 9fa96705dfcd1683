//! Iceberg order bookkeeping.
//!
//! An iceberg parent never rests itself. The book keeps one visible child
//! slice of at most `display_size` resting at a time; whenever that slice fully
//! fills and reserve remains, a new slice of `refresh_size` (capped by the
//! reserve) is created at the tail of the price level.

use super::order::{Order, OrderId, OrderType, TimeInForce};
use serde::Serialize;
use tracing::debug;

/// Parent-level state of an iceberg order.
#[derive(Debug, Clone, Serialize)]
pub struct IcebergOrder {
    /// The submitted parent; `remaining_quantity` mirrors `remaining_size`
    pub parent: Order,
    /// Size of each visible slice
    pub display_size: u64,
    /// Total parent quantity
    pub total_size: u64,
    /// Quantity not yet filled, including the live slice
    pub remaining_size: u64,
    /// Size of replenished slices
    pub refresh_size: u64,
    /// The slice currently working, if any
    pub current_child_id: Option<OrderId>,
    /// Number of slices created so far
    pub children_created: u32,
}

impl IcebergOrder {
    /// Builds the parent state. Returns `None` when the order carries no usable display size.
    pub fn new(parent: Order) -> Option<Self> {
        let display_size = parent.display_quantity.filter(|d| *d > 0)?;
        Some(Self {
            display_size,
            total_size: parent.quantity,
            remaining_size: parent.remaining_quantity,
            refresh_size: display_size,
            current_child_id: None,
            children_created: 0,
            parent,
        })
    }

    /// Parent identifier.
    #[inline]
    pub fn parent_id(&self) -> OrderId {
        self.parent.id
    }

    /// Quantity filled across every slice.
    #[inline]
    pub fn filled_size(&self) -> u64 {
        self.total_size.saturating_sub(self.remaining_size)
    }

    /// `true` once the whole parent quantity has traded.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.remaining_size == 0
    }

    /// Applies a fill of the live slice to the parent.
    pub fn record_fill(&mut self, quantity: u64, timestamp: u64) {
        self.remaining_size = self.remaining_size.saturating_sub(quantity);
        self.parent.remaining_quantity = self.remaining_size;
        self.parent.updated_at = timestamp;
    }

    /// Creates the next visible slice, or `None` when nothing remains.
    ///
    /// Must only be called when no slice is live.
    pub fn next_child(&mut self, timestamp: u64) -> Option<Order> {
        if self.remaining_size == 0 {
            self.current_child_id = None;
            return None;
        }
        let slice = if self.children_created == 0 {
            self.display_size
        } else {
            self.refresh_size
        };
        let size = slice.min(self.remaining_size);

        let child = Order {
            id: OrderId::new(),
            symbol: self.parent.symbol.clone(),
            side: self.parent.side,
            order_type: OrderType::Limit,
            time_in_force: TimeInForce::Gtc,
            price: self.parent.price,
            quantity: size,
            remaining_quantity: size,
            display_quantity: None,
            parent_order_id: Some(self.parent.id),
            is_iceberg_child: true,
            is_hidden: false,
            is_price_improved: self.parent.is_price_improved,
            original_price: self.parent.original_price,
            estimated_impact: None,
            user_id: self.parent.user_id.clone(),
            created_at: timestamp,
            updated_at: timestamp,
        };
        self.children_created += 1;
        self.current_child_id = Some(child.id);
        debug!(
            "Iceberg {}: slice #{} {} of {} remaining",
            self.parent.id, self.children_created, size, self.remaining_size
        );
        Some(child)
    }
}
