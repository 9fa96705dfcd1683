//! Price levels and price-ordered book sides.
//!
//! A [`PriceLevel`] is a FIFO queue of resting orders at one price, kept as an
//! intrusive doubly linked list over [`OrderKey`]s into the book's
//! [`OrderArena`], so an order can be spliced out in O(1) once its key is
//! known. Keys are generation-checked: a key whose slot was freed no longer
//! resolves, even after the slot is reused. A [`BookSide`] keeps levels
//! ordered by price; the best level is the highest bid or the lowest ask.

use super::order::{Order, Side};
use slotmap::{SlotMap, new_key_type};
use std::collections::BTreeMap;

new_key_type! {
    /// Handle to a resting order in the book's arena.
    pub struct OrderKey;
}

/// Storage for every resting order of a book, visible and hidden pools alike.
pub type OrderArena = SlotMap<OrderKey, RestingOrder>;

/// An order resting in the book together with its queue links.
#[derive(Debug, Clone)]
pub struct RestingOrder {
    /// The order itself; `remaining_quantity` is the open quantity
    pub order: Order,
    /// Book-wide arrival sequence, used for time priority across pools
    pub sequence: u64,
    prev: Option<OrderKey>,
    next: Option<OrderKey>,
}

impl RestingOrder {
    /// Wraps an order for insertion into a level.
    pub fn new(order: Order, sequence: u64) -> Self {
        Self {
            order,
            sequence,
            prev: None,
            next: None,
        }
    }
}

/// FIFO queue of resting orders at a single price.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    price: u128,
    head: Option<OrderKey>,
    tail: Option<OrderKey>,
    total_quantity: u64,
    order_count: usize,
}

impl PriceLevel {
    /// Creates an empty level.
    pub fn new(price: u128) -> Self {
        Self {
            price,
            head: None,
            tail: None,
            total_quantity: 0,
            order_count: 0,
        }
    }

    /// Price of this level.
    #[inline]
    pub fn price(&self) -> u128 {
        self.price
    }

    /// Sum of the open quantity of every order at this level.
    #[inline]
    pub fn total_quantity(&self) -> u64 {
        self.total_quantity
    }

    /// Number of resting orders.
    #[inline]
    pub fn order_count(&self) -> usize {
        self.order_count
    }

    /// `true` once the queue is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    /// Key of the oldest order.
    #[inline]
    pub fn front(&self) -> Option<OrderKey> {
        self.head
    }

    /// Appends an order at the tail of the queue.
    pub fn push_back(
        &mut self,
        arena: &mut OrderArena,
        mut resting: RestingOrder,
    ) -> OrderKey {
        let quantity = resting.order.remaining_quantity;
        resting.prev = self.tail;
        resting.next = None;
        let key = arena.insert(resting);

        match self.tail.and_then(|tail| arena.get_mut(tail)) {
            Some(tail) => tail.next = Some(key),
            None => self.head = Some(key),
        }
        self.tail = Some(key);
        self.order_count += 1;
        self.total_quantity = self.total_quantity.saturating_add(quantity);
        key
    }

    /// Splices an order out of the queue and frees its slot.
    ///
    /// Returns `None` if the key is stale.
    pub fn unlink(
        &mut self,
        arena: &mut OrderArena,
        key: OrderKey,
    ) -> Option<RestingOrder> {
        let removed = arena.remove(key)?;

        match removed.prev.and_then(|prev| arena.get_mut(prev)) {
            Some(prev) => prev.next = removed.next,
            None => self.head = removed.next,
        }
        match removed.next.and_then(|next| arena.get_mut(next)) {
            Some(next) => next.prev = removed.prev,
            None => self.tail = removed.prev,
        }

        self.order_count -= 1;
        self.total_quantity = self
            .total_quantity
            .saturating_sub(removed.order.remaining_quantity);
        Some(removed)
    }

    /// Accounts for a partial fill of one of this level's orders.
    #[inline]
    pub fn reduce_quantity(&mut self, quantity: u64) {
        self.total_quantity = self.total_quantity.saturating_sub(quantity);
    }

    /// Iterates resting orders from oldest to newest.
    pub fn iter<'a>(&self, arena: &'a OrderArena) -> LevelIter<'a> {
        LevelIter {
            arena,
            current: self.head,
        }
    }
}

/// FIFO iterator over a level's orders.
pub struct LevelIter<'a> {
    arena: &'a OrderArena,
    current: Option<OrderKey>,
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = (OrderKey, &'a RestingOrder);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.current?;
        let resting = self.arena.get(key)?;
        self.current = resting.next;
        Some((key, resting))
    }
}

/// One side of a book: price levels ordered so the best price is cheap to find.
#[derive(Debug, Clone)]
pub struct BookSide {
    side: Side,
    levels: BTreeMap<u128, PriceLevel>,
}

impl BookSide {
    /// Creates an empty side.
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    /// Which side of the book this is.
    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Best price: highest bid or lowest ask.
    pub fn best_price(&self) -> Option<u128> {
        match self.side {
            Side::Buy => self.levels.keys().next_back().copied(),
            Side::Sell => self.levels.keys().next().copied(),
        }
    }

    /// The level at `price`, if present.
    pub fn level(&self, price: u128) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    /// Mutable access to the level at `price`, if present.
    pub fn level_mut(&mut self, price: u128) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&price)
    }

    /// The level at `price`, created if absent.
    pub fn level_or_insert(&mut self, price: u128) -> &mut PriceLevel {
        self.levels
            .entry(price)
            .or_insert_with(|| PriceLevel::new(price))
    }

    /// Drops the level at `price` if it no longer holds orders.
    pub fn remove_if_empty(&mut self, price: u128) -> bool {
        if self.levels.get(&price).is_some_and(PriceLevel::is_empty) {
            self.levels.remove(&price);
            return true;
        }
        false
    }

    /// Levels from best to worst price.
    pub fn levels(&self) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        match self.side {
            Side::Buy => Box::new(self.levels.values().rev()),
            Side::Sell => Box::new(self.levels.values()),
        }
    }

    /// Number of price levels.
    #[inline]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// `true` if there are no levels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Open quantity across every level.
    pub fn total_quantity(&self) -> u64 {
        self.levels.values().map(PriceLevel::total_quantity).sum()
    }

    /// Removes every level.
    pub fn clear(&mut self) {
        self.levels.clear();
    }
}
