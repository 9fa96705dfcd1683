//! Contains the core matching logic for the order book.
//!
//! Visible and hidden liquidity are matched together: the next maker is the
//! front order of whichever pool offers the better price, and at equal prices
//! the one that arrived first.

use super::book::OrderBook;
use super::level::OrderKey;
use super::order::{Order, Side};
use super::trade::{IcebergRefresh, MatchResult, Trade};
use tracing::{debug, trace, warn};

/// The resting order an incoming order would trade with next.
#[derive(Debug, Clone, Copy)]
struct MakerCandidate {
    price: u128,
    hidden: bool,
    key: OrderKey,
}

impl OrderBook {
    /// Front order of the best level of one pool on `side`, with its sequence.
    fn pool_front(&self, side: Side, hidden: bool) -> Option<(MakerCandidate, u64)> {
        let pool = self.pool(side, hidden);
        let price = pool.best_price()?;
        let key = pool.level(price)?.front()?;
        let sequence = self.arena.get(key)?.sequence;
        Some((
            MakerCandidate {
                price,
                hidden,
                key,
            },
            sequence,
        ))
    }

    /// Next maker for an incoming order on `taker_side`, across both pools.
    fn best_maker(&self, taker_side: Side) -> Option<MakerCandidate> {
        let maker_side = taker_side.opposite();
        let visible = self.pool_front(maker_side, false);
        let hidden = self.pool_front(maker_side, true);

        match (visible, hidden) {
            (Some((v, v_seq)), Some((h, h_seq))) => {
                let hidden_better = match maker_side {
                    Side::Sell => h.price < v.price,
                    Side::Buy => h.price > v.price,
                };
                if hidden_better || (h.price == v.price && h_seq < v_seq) {
                    Some(h)
                } else {
                    Some(v)
                }
            }
            (Some((v, _)), None) => Some(v),
            (None, Some((h, _))) => Some(h),
            (None, None) => None,
        }
    }

    /// Matches `taker` against resting liquidity until it is filled or no
    /// longer crosses. Trades, fills and iceberg refreshes are recorded into
    /// `result`; `taker.remaining_quantity` is reduced in place.
    pub(super) fn match_incoming(&mut self, taker: &mut Order, result: &mut MatchResult, timestamp: u64) {
        while taker.remaining_quantity > 0 {
            let Some(maker) = self.best_maker(taker.side) else {
                break;
            };
            if !taker.crosses(maker.price) {
                break;
            }
            self.execute_against(taker, maker, result, timestamp);
        }
    }

    fn execute_against(
        &mut self,
        taker: &mut Order,
        maker: MakerCandidate,
        result: &mut MatchResult,
        timestamp: u64,
    ) {
        let maker_side = taker.side.opposite();
        let (book_side, arena) = self.side_and_arena(maker_side, maker.hidden);

        let Some(level) = book_side.level_mut(maker.price) else {
            return;
        };
        let Some(resting) = arena.get_mut(maker.key) else {
            warn!(
                "Order book: stale maker key at {} on {}",
                maker.price, maker_side
            );
            return;
        };

        let quantity = taker.remaining_quantity.min(resting.order.remaining_quantity);
        resting.order.fill(quantity, timestamp);
        let maker_id = resting.order.id;
        let maker_filled = resting.order.is_filled();
        let iceberg_parent = resting
            .order
            .parent_order_id
            .filter(|_| resting.order.is_iceberg_child);

        level.reduce_quantity(quantity);
        if maker_filled {
            level.unlink(arena, maker.key);
        }

        taker.fill(quantity, timestamp);

        let (buy_order_id, sell_order_id) = match taker.side {
            Side::Buy => (taker.id, maker_id),
            Side::Sell => (maker_id, taker.id),
        };
        let trade = Trade {
            id: self.next_trade_id(),
            symbol: self.symbol.clone(),
            price: maker.price,
            quantity,
            buy_order_id,
            sell_order_id,
            maker_order_id: maker_id,
            taker_order_id: taker.id,
            taker_side: taker.side,
            timestamp,
        };
        trace!(
            "Order book {}: trade {} x {} maker {} taker {}",
            self.symbol, trade.price, trade.quantity, maker_id, taker.id
        );
        result.trades.push(trade);
        self.last_trade_price = Some(maker.price);

        if maker_filled {
            self.order_locations.remove(&maker_id);
            result.filled_order_ids.push(maker_id);
        }

        if let Some(parent_id) = iceberg_parent {
            self.on_iceberg_child_fill(parent_id, maker_id, quantity, maker_filled, result, timestamp);
        }

        let (book_side, _) = self.side_and_arena(maker_side, maker.hidden);
        book_side.remove_if_empty(maker.price);
    }

    /// Updates iceberg bookkeeping after one of its slices traded, replacing a
    /// fully filled slice at the tail of its level while reserve remains.
    fn on_iceberg_child_fill(
        &mut self,
        parent_id: super::order::OrderId,
        child_id: super::order::OrderId,
        quantity: u64,
        child_filled: bool,
        result: &mut MatchResult,
        timestamp: u64,
    ) {
        let Some(iceberg) = self.icebergs.get_mut(&parent_id) else {
            return;
        };
        iceberg.record_fill(quantity, timestamp);
        if !child_filled {
            return;
        }

        let next_child = iceberg.next_child(timestamp);
        let remaining_size = iceberg.remaining_size;
        let new_child_id = next_child.as_ref().map(|child| child.id);

        if let Some(child) = next_child {
            self.place_order_in_book(child);
        } else {
            self.icebergs.remove(&parent_id);
            result.filled_order_ids.push(parent_id);
            debug!("Iceberg {}: fully filled", parent_id);
        }

        result.iceberg_refreshes.push(IcebergRefresh {
            parent_order_id: parent_id,
            filled_child_id: child_id,
            new_child_id,
            remaining_size,
        });
    }

    /// Quantity an order on `side` could execute right now, up to `quantity`,
    /// at prices no worse than `price_limit` (`None` for market orders).
    ///
    /// Counts visible and hidden liquidity plus the undisplayed reserve of
    /// icebergs at acceptable prices.
    pub fn peek_match(&self, side: Side, quantity: u64, price_limit: Option<u128>) -> u64 {
        let maker_side = side.opposite();
        let acceptable = |price: u128| match (price_limit, side) {
            (None, _) => true,
            (Some(limit), Side::Buy) => price <= limit,
            (Some(limit), Side::Sell) => price >= limit,
        };

        let mut matched_quantity = 0u64;
        for hidden in [false, true] {
            for level in self.pool(maker_side, hidden).levels() {
                if matched_quantity >= quantity || !acceptable(level.price()) {
                    break;
                }
                matched_quantity = matched_quantity.saturating_add(level.total_quantity());
            }
        }

        if matched_quantity < quantity {
            for iceberg in self.icebergs.values() {
                if iceberg.parent.side != maker_side || !acceptable(iceberg.parent.price) {
                    continue;
                }
                let live = iceberg
                    .current_child_id
                    .and_then(|id| self.order_locations.get(&id))
                    .and_then(|location| self.arena.get(location.key))
                    .map(|resting| resting.order.remaining_quantity)
                    .unwrap_or(0);
                matched_quantity =
                    matched_quantity.saturating_add(iceberg.remaining_size.saturating_sub(live));
            }
        }

        matched_quantity.min(quantity)
    }
}
